//! Error taxonomy for the shell.
//!
//! Only `Parse` ever reaches the user as text; redirection and exec failures
//! surface through a child's exit status, and terminal failures are fatal
//! only for the startup `setpgid`.

use nix::errno::Errno;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("syntax error near unexpected token `{0}`")]
    Parse(String),

    #[error("redirection failed")]
    Redirect,

    #[error("fork failed: {0}")]
    Fork(#[source] Errno),

    #[error("exec failed: {0}")]
    Exec(#[source] Errno),

    #[error("terminal control failed: {0}")]
    Terminal(#[source] Errno),
}
