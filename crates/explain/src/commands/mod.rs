//! Command handlers, one module per subcommand.

pub mod completion;
pub mod diff;
pub mod file;
pub mod function;
pub mod install_skill;
pub mod next;
pub mod repo;
pub mod seed;
pub mod topics;
