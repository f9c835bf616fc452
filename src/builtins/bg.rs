//! The `bg` built-in.

use crate::jobs::{self, JobStatus};
use crate::shell::Shell;
use log::debug;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Resume the most recent stopped background job without the terminal. A
/// table without a stopped job is a no-op.
pub fn builtin_bg(shell: &mut Shell) {
    jobs::drain(&mut shell.jobs);

    let pgid = match shell.jobs.next_job_to_bg() {
        Some(job) => job.pgid,
        None => return,
    };

    if let Some(job) = shell.jobs.find_by_pgid_mut(pgid) {
        job.push_background_suffix();
    }
    if let Some(job) = shell.jobs.find_by_pgid(pgid) {
        if let Some(number) = job.number {
            if let Some(line) = job.notify_line(shell.jobs.marker(number)) {
                println!("{line}");
            }
        }
    }
    if let Some(job) = shell.jobs.find_by_pgid_mut(pgid) {
        job.status = JobStatus::Running;
    }

    debug!("bg: resuming group {}", pgid);
    let _ = kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGCONT);
}
