//! Controlling-terminal handoff.
//!
//! Exactly one process group owns the tty at any instant. The shell's group
//! holds it whenever the prompt is readable; a foreground job holds it for
//! the span of the foreground wait.

use crate::error::ShellError;
use log::warn;
use nix::unistd::{getpgrp, getpid, setpgid, Pid};
use std::os::unix::io::RawFd;

pub struct TerminalControl {
    shell_pgid: Pid,
    terminal_fd: RawFd,
    is_interactive: bool,
}

impl TerminalControl {
    /// Put the shell into its own process group and take the terminal.
    ///
    /// Failing to create the group is the one fatal startup error; every
    /// later terminal call is best-effort because SIGTTOU is ignored.
    pub fn acquire() -> Result<Self, ShellError> {
        let terminal_fd = libc::STDIN_FILENO;
        let shell_pid = getpid();
        setpgid(shell_pid, shell_pid).map_err(ShellError::Terminal)?;

        let control = Self {
            shell_pgid: getpgrp(),
            terminal_fd,
            is_interactive: atty::is(atty::Stream::Stdin),
        };
        control.reclaim();
        Ok(control)
    }

    /// A handle that never touches the tty, for non-interactive use.
    pub fn detached() -> Self {
        Self {
            shell_pgid: getpgrp(),
            terminal_fd: libc::STDIN_FILENO,
            is_interactive: false,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    /// Grant the terminal to `pgid` ahead of a foreground wait.
    pub fn give_terminal_to(&self, pgid: Pid) {
        if !self.is_interactive {
            return;
        }
        if unsafe { libc::tcsetpgrp(self.terminal_fd, pgid.as_raw()) } != 0 {
            warn!("tcsetpgrp to group {} failed", pgid);
        }
    }

    /// Return the terminal to the shell's own group.
    pub fn reclaim(&self) {
        if !self.is_interactive {
            return;
        }
        if unsafe { libc::tcsetpgrp(self.terminal_fd, self.shell_pgid.as_raw()) } != 0 {
            warn!("tcsetpgrp back to the shell failed");
        }
    }
}
