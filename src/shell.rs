//! The single `Shell` value threaded through the prompt loop.
//!
//! Owns the job table and the terminal handle; the prompt loop, the
//! launcher and the built-ins all act on the shell instead of on globals.

use crate::error::ShellError;
use crate::executor;
use crate::jobs::{self, Job, JobStatus, JobTable};
use crate::parser::ast::JobSpec;
use crate::terminal::TerminalControl;
use log::debug;
use nix::unistd::Pid;

pub struct Shell {
    pub jobs: JobTable,
    pub terminal: TerminalControl,
}

impl Shell {
    pub fn new(terminal: TerminalControl) -> Self {
        Self {
            jobs: JobTable::new(),
            terminal,
        }
    }

    /// Non-blocking reap pass, run at every prompt and ahead of every
    /// built-in.
    pub fn drain(&mut self) {
        jobs::drain(&mut self.jobs);
    }

    /// Report every finished numbered job in the table form, then drop the
    /// Done entries. Unnumbered foreground jobs leave silently.
    pub fn notify_and_prune(&mut self) {
        let mut lines = Vec::new();
        for job in self.jobs.iter().filter(|j| j.status == JobStatus::Done) {
            if let Some(number) = job.number {
                if let Some(line) = job.status_line(self.jobs.marker(number)) {
                    lines.push(line);
                }
            }
        }
        for line in lines {
            println!("{line}");
        }
        self.jobs.prune_done();
    }

    /// Launch a parsed job and register it under its pgid; block on it when
    /// it runs in the foreground.
    pub fn run_job(&mut self, spec: JobSpec, command: String) -> Result<(), ShellError> {
        let pgid = executor::launch(&spec, &self.terminal)?;
        let number = if spec.background {
            Some(self.jobs.next_background_number())
        } else {
            None
        };
        self.jobs.add(Job::new(pgid, command, number, spec.background));
        debug!("registered group {} (background: {})", pgid, spec.background);

        if !spec.background {
            self.wait_foreground(pgid);
        }
        Ok(())
    }

    /// Foreground wait plus the stop report: a job suspended under the wait
    /// comes back renumbered at the tail, and the user is told right away.
    pub fn wait_foreground(&mut self, pgid: Pid) {
        jobs::wait_foreground(&mut self.jobs, pgid, &self.terminal);

        if let Some(job) = self.jobs.find_by_pgid(pgid) {
            if job.status == JobStatus::Stopped {
                if let Some(number) = job.number {
                    if let Some(line) = job.status_line(self.jobs.marker(number)) {
                        println!("{line}");
                    }
                }
            }
        }
    }
}
