//! Redirection applier.
//!
//! Runs in a forked child between fork and exec: opens the requested files
//! and rewires the standard descriptors, in the fixed order error, input,
//! output. Any failure leaves the child with its stdio torn down and a
//! [`ShellError::Redirect`], on which the caller exits with failure.

use crate::error::ShellError;
use crate::parser::ast::ProcessSpec;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::os::unix::io::RawFd;

fn create_mode() -> Mode {
    // rw-rw-r--
    Mode::from_bits_truncate(0o664)
}

fn wire(fd: RawFd, target: RawFd) -> bool {
    let ok = dup2(fd, target).is_ok();
    let _ = close(fd);
    ok
}

/// Rewire stdin/stdout/stderr of the current process per `spec`.
pub fn apply(spec: &ProcessSpec) -> Result<(), ShellError> {
    let mut failed = false;

    if let Some(path) = &spec.stderr_file {
        match open(
            path.as_str(),
            OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_TRUNC,
            create_mode(),
        ) {
            Ok(fd) => failed |= !wire(fd, libc::STDERR_FILENO),
            Err(_) => failed = true,
        }
    }

    if let Some(path) = &spec.stdin_file {
        match open(path.as_str(), OFlag::O_RDONLY, Mode::empty()) {
            Ok(fd) => failed |= !wire(fd, libc::STDIN_FILENO),
            Err(_) => {
                eprintln!("-yash: {}: No such file or directory", path);
                failed = true;
            }
        }
    }

    if let Some(path) = &spec.stdout_file {
        match open(
            path.as_str(),
            OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_TRUNC,
            create_mode(),
        ) {
            Ok(fd) => failed |= !wire(fd, libc::STDOUT_FILENO),
            Err(_) => failed = true,
        }
    }

    if failed {
        for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            let _ = close(fd);
        }
        return Err(ShellError::Redirect);
    }

    Ok(())
}
