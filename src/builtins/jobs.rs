//! The `jobs` listing.

use crate::jobs::{drain, JobStatus};
use crate::shell::Shell;

/// Report finished background jobs in the short form and drop them, then
/// list every running or stopped background job in the table form.
pub fn builtin_jobs(shell: &mut Shell) {
    drain(&mut shell.jobs);

    let mut finished = Vec::new();
    for job in shell.jobs.iter().filter(|j| j.status == JobStatus::Done) {
        if let Some(number) = job.number {
            if let Some(line) = job.notify_line(shell.jobs.marker(number)) {
                finished.push(line);
            }
        }
    }
    for line in finished {
        println!("{line}");
    }
    shell.jobs.prune_done();

    let mut listing = Vec::new();
    for job in shell.jobs.iter().filter(|j| j.background) {
        if let Some(number) = job.number {
            if let Some(line) = job.status_line(shell.jobs.marker(number)) {
                listing.push(line);
            }
        }
    }
    for line in listing {
        println!("{line}");
    }
}
