//! `explain` -- AI-powered code explanation with an exploration queue.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod explainer;
mod inspect;
mod model;
mod output;
mod prompts;
mod skill;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;
use explain_session::SessionError;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Exit code when `next` finds no pending topic.
const EXIT_EMPTY_QUEUE: i32 = 2;

fn main() {
    // First Ctrl+C: exit cleanly. Second: force exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(0);
    });

    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("explain=debug")
            .with_writer(std::io::stderr)
            .init();
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        // Seeds
        Some(Commands::Repo(args)) => commands::repo::run(&ctx, &args),
        Some(Commands::File(args)) => commands::file::run(&ctx, &args),
        Some(Commands::Function(args)) => commands::function::run(&ctx, &args),
        Some(Commands::Diff(args)) => commands::diff::run(&ctx, &args),
        // Exploration queue
        Some(Commands::Topics(args)) => commands::topics::run(&ctx, &args),
        Some(Commands::Next(args)) => commands::next::run(&ctx, &args),
        // Setup
        Some(Commands::InstallSkill(args)) => commands::install_skill::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<SessionError>() {
        Some(err) if err.is_empty_queue() => EXIT_EMPTY_QUEUE,
        _ => 1,
    }
}
