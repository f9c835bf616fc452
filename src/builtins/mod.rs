//! The job-control built-ins.
//!
//! Built-in names match against the raw command line, not the token vector:
//! exactly `jobs`, `fg` and `bg`. Anything else — including `fg 1` — goes to
//! the launcher.

pub mod bg;
pub mod fg;
pub mod jobs;

use crate::shell::Shell;

/// Run `line` as a built-in if it names one. Returns `true` when handled.
pub fn dispatch(line: &str, shell: &mut Shell) -> bool {
    match line {
        "jobs" => jobs::builtin_jobs(shell),
        "fg" => fg::builtin_fg(shell),
        "bg" => bg::builtin_bg(shell),
        _ => return false,
    }
    shell.notify_and_prune();
    true
}
