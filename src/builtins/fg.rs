//! The `fg` built-in.

use crate::jobs::{self, JobStatus};
use crate::shell::Shell;
use log::debug;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Resume the most recent live job in the foreground: strip the `" &"`
/// suffix, echo the command, continue the group and wait on it with the
/// terminal. A table without a live job is a no-op.
pub fn builtin_fg(shell: &mut Shell) {
    jobs::drain(&mut shell.jobs);

    let pgid = match shell.jobs.next_job_to_fg() {
        Some(job) => job.pgid,
        None => return,
    };

    if let Some(job) = shell.jobs.find_by_pgid_mut(pgid) {
        job.strip_background_suffix();
        println!("{}", job.command);
        // the job number stays: no new job can be created while this one
        // holds the foreground
        job.background = false;
        job.status = JobStatus::Running;
    }

    debug!("fg: resuming group {}", pgid);
    let _ = kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGCONT);
    shell.wait_foreground(pgid);
}
