//! Terminal detection.

use std::env;

/// Returns `true` if stdout is a terminal.
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Determines if ANSI colour codes should be used.
///
/// - `NO_COLOR` (any value) disables colour (<https://no-color.org/>)
/// - `CLICOLOR=0` disables colour
/// - `TERM=dumb` disables colour
/// - `CLICOLOR_FORCE` (any value) forces colour even without a TTY
/// - otherwise colour follows TTY detection
pub fn supports_color() -> bool {
    color_from_env(
        env::var_os("NO_COLOR").is_some(),
        env::var("CLICOLOR").ok().as_deref(),
        env::var("TERM").ok().as_deref(),
        env::var_os("CLICOLOR_FORCE").is_some(),
        is_tty,
    )
}

fn color_from_env(
    no_color: bool,
    clicolor: Option<&str>,
    term: Option<&str>,
    force: bool,
    tty: impl FnOnce() -> bool,
) -> bool {
    if no_color || clicolor == Some("0") || term == Some("dumb") {
        return false;
    }
    force || tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_variables_win() {
        assert!(!color_from_env(true, None, None, true, || true));
        assert!(!color_from_env(false, Some("0"), None, true, || true));
        assert!(!color_from_env(false, None, Some("dumb"), true, || true));
    }

    #[test]
    fn force_overrides_tty() {
        assert!(color_from_env(false, None, Some("xterm"), true, || false));
        assert!(!color_from_env(false, None, Some("xterm"), false, || false));
        assert!(color_from_env(false, Some("1"), None, false, || true));
    }
}
