//! Signal dispositions for the shell and its children.

use nix::sys::signal::{signal, SigHandler, Signal};

/// Installed once at startup. SIGINT, SIGTSTP, SIGTTOU and SIGTTIN are all
/// ignored: the terminal can neither interrupt nor suspend the shell, and
/// writing to the tty from outside the foreground group does not stop it.
pub fn install_shell_dispositions() {
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTSTP, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTTIN, SigHandler::SigIgn);
    }
}

/// Child half of the preamble between fork and exec: Ctrl-C and Ctrl-Z act
/// on the job again, while SIGTTOU stays ignored so the terminal handoff
/// cannot stop the child.
pub fn install_child_dispositions() {
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTSTP, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
    }
}
