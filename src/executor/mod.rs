//! Process launcher.
//!
//! Every job runs in a process group whose pgid equals the first forked pid.
//! A pipeline hides behind an intermediate supervisor child, so the shell
//! observes exactly one pid per job and pipeline completion is reported
//! atomically.

use crate::error::ShellError;
use crate::parser::ast::{JobSpec, ProcessSpec};
use crate::redirect;
use crate::signal;
use crate::terminal::TerminalControl;
use log::debug;
use nix::sys::wait::waitpid;
use nix::unistd::{dup2, execvp, fork, getpid, pipe, setpgid, ForkResult, Pid};
use std::ffi::CString;
use std::os::unix::io::AsRawFd;
use std::process;

/// Fork the job and return its process-group id. The child side never
/// returns: it execs or exits with failure.
pub fn launch(job: &JobSpec, terminal: &TerminalControl) -> Result<Pid, ShellError> {
    let foreground = !job.background;
    match &job.second {
        Some(second) => launch_pipeline(&job.first, second, foreground, terminal),
        None => launch_single(&job.first, foreground, terminal),
    }
}

fn launch_single(
    spec: &ProcessSpec,
    foreground: bool,
    terminal: &TerminalControl,
) -> Result<Pid, ShellError> {
    match unsafe { fork() }.map_err(ShellError::Fork)? {
        ForkResult::Child => {
            child_preamble(foreground, terminal);
            if redirect::apply(spec).is_err() {
                process::exit(1);
            }
            exec_program(spec)
        }
        ForkResult::Parent { child } => {
            // mirror the child's setpgid so the group exists before the
            // shell signals or waits on it
            let _ = setpgid(child, child);
            debug!("launched {:?} as group {}", spec.argv.first(), child);
            Ok(child)
        }
    }
}

fn launch_pipeline(
    producer: &ProcessSpec,
    consumer: &ProcessSpec,
    foreground: bool,
    terminal: &TerminalControl,
) -> Result<Pid, ShellError> {
    match unsafe { fork() }.map_err(ShellError::Fork)? {
        ForkResult::Child => run_supervisor(producer, consumer, foreground, terminal),
        ForkResult::Parent { child } => {
            let _ = setpgid(child, child);
            debug!("launched pipeline supervisor as group {}", child);
            Ok(child)
        }
    }
}

/// Between fork and exec: restore job-control signals, move into a fresh
/// process group keyed by our own pid, and take the terminal when this job
/// is the foreground one.
fn child_preamble(foreground: bool, terminal: &TerminalControl) {
    signal::install_child_dispositions();
    let pid = getpid();
    if setpgid(pid, pid).is_err() {
        process::exit(1);
    }
    if foreground {
        terminal.give_terminal_to(pid);
    }
}

/// Body of the pipeline supervisor child: owns the pipe, forks both stages
/// into its own process group, then waits for both unconditionally before
/// exiting. A SIGTSTP to the group stops every member but the supervisor
/// keeps waiting; the stop is reported through the supervisor's own stop.
fn run_supervisor(
    producer: &ProcessSpec,
    consumer: &ProcessSpec,
    foreground: bool,
    terminal: &TerminalControl,
) -> ! {
    child_preamble(foreground, terminal);

    let (pipe_read, pipe_write) = match pipe() {
        Ok(ends) => ends,
        Err(_) => process::exit(1),
    };

    let producer_pid = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            drop(pipe_read);
            if dup2(pipe_write.as_raw_fd(), libc::STDOUT_FILENO).is_err() {
                process::exit(1);
            }
            drop(pipe_write);
            if redirect::apply(producer).is_err() {
                process::exit(1);
            }
            exec_program(producer)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(_) => process::exit(1),
    };

    let consumer_pid = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            drop(pipe_write);
            if dup2(pipe_read.as_raw_fd(), libc::STDIN_FILENO).is_err() {
                process::exit(1);
            }
            drop(pipe_read);
            if redirect::apply(consumer).is_err() {
                process::exit(1);
            }
            exec_program(consumer)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(_) => process::exit(1),
    };

    // both ends must close here or the consumer never sees EOF
    drop(pipe_read);
    drop(pipe_write);

    let _ = waitpid(producer_pid, None);
    let _ = waitpid(consumer_pid, None);
    process::exit(0);
}

/// Exec the program named by `argv[0]`, searching PATH. Never returns; any
/// failure exits the child with status 1, which the shell later reconciles
/// as Done.
fn exec_program(spec: &ProcessSpec) -> ! {
    let mut args = Vec::with_capacity(spec.argv.len());
    for arg in &spec.argv {
        match CString::new(arg.as_str()) {
            Ok(arg) => args.push(arg),
            Err(_) => process::exit(1),
        }
    }

    // the parser guarantees a non-empty argv
    if let Some(program) = args.first() {
        if let Err(errno) = execvp(program, &args) {
            debug!("{}", ShellError::Exec(errno));
        }
    }
    process::exit(1);
}
