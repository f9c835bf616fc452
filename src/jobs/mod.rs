//! Job table and wait coordination.
//!
//! The table owns every launched job, keyed by process-group id. Status only
//! ever changes through [`JobTable::reconcile`], which is fed by the two wait
//! modes: [`drain`] (non-blocking, run at every prompt and before each
//! built-in) and [`wait_foreground`] (blocking, while a foreground job owns
//! the terminal).

use crate::terminal::TerminalControl;
use log::debug;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "Running",
            JobStatus::Stopped => "Stopped",
            JobStatus::Done => "Done",
        }
    }
}

/// One unit of user work: a single process or a whole pipeline behind one
/// process group.
#[derive(Debug, Clone)]
pub struct Job {
    /// Process-group id assigned by the launcher; unique among live jobs.
    pub pgid: Pid,
    /// The command as the user typed it. Only `fg`/`bg` rewrite it, by
    /// stripping or appending the trailing `" &"`.
    pub command: String,
    /// Background job number; `None` marks the at-most-one foreground job.
    pub number: Option<u32>,
    pub background: bool,
    pub status: JobStatus,
}

impl Job {
    pub fn new(pgid: Pid, command: String, number: Option<u32>, background: bool) -> Self {
        Self {
            pgid,
            command,
            number,
            background,
            status: JobStatus::Running,
        }
    }

    /// Ensure the command text carries the trailing `" &"` of a background
    /// job.
    pub fn push_background_suffix(&mut self) {
        if !self.command.ends_with(" &") {
            self.command.push_str(" &");
        }
    }

    /// Drop the trailing `" &"` when the job moves to the foreground.
    pub fn strip_background_suffix(&mut self) {
        if let Some(stripped) = self.command.strip_suffix(" &") {
            self.command.truncate(stripped.len());
        }
    }

    /// `[<n>]<m>\t<Status>\t\t\t<command>` — the full table form, used by the
    /// `jobs` listing and for status reports at the prompt. `None` for the
    /// unnumbered foreground job.
    pub fn status_line(&self, marker: char) -> Option<String> {
        let number = self.number?;
        Some(format!(
            "[{}]{}\t{}\t\t\t{}",
            number,
            marker,
            self.status.as_str(),
            self.command
        ))
    }

    /// `[<n>]<m>\t<command>` — the short form used by `bg` and by `jobs` when
    /// it reports finished entries.
    pub fn notify_line(&self, marker: char) -> Option<String> {
        let number = self.number?;
        Some(format!("[{}]{}\t{}", number, marker, self.command))
    }
}

/// Ordered collection of live jobs; insertion order is display order.
#[derive(Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Append at the tail.
    pub fn add(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn find_by_pgid(&self, pgid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.pgid == pgid)
    }

    pub fn find_by_pgid_mut(&mut self, pgid: Pid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.pgid == pgid)
    }

    /// Highest job number held by a background job; 0 when there is none.
    pub fn most_recent_background_number(&self) -> u32 {
        self.jobs
            .iter()
            .filter(|j| j.background)
            .filter_map(|j| j.number)
            .max()
            .unwrap_or(0)
    }

    /// Numbers are assigned monotonically over the live background jobs.
    pub fn next_background_number(&self) -> u32 {
        self.most_recent_background_number() + 1
    }

    /// The job `fg` resumes: the most recently inserted job that is not Done.
    pub fn next_job_to_fg(&self) -> Option<&Job> {
        self.jobs.iter().rev().find(|j| j.status != JobStatus::Done)
    }

    /// The job `bg` resumes: the most recently inserted stopped background
    /// job, if any is stopped at all.
    pub fn next_job_to_bg(&self) -> Option<&Job> {
        self.jobs
            .iter()
            .rev()
            .find(|j| j.background && j.status == JobStatus::Stopped)
    }

    /// Unlink the job and hand ownership to the caller, who may drop it or
    /// re-insert it under a new number.
    pub fn remove_by_pgid(&mut self, pgid: Pid) -> Option<Job> {
        let index = self.jobs.iter().position(|j| j.pgid == pgid)?;
        Some(self.jobs.remove(index))
    }

    /// Drop every Done job.
    pub fn prune_done(&mut self) {
        self.jobs.retain(|j| j.status != JobStatus::Done);
    }

    /// `+` for the job holding the largest number currently in the table,
    /// `-` for everyone else.
    pub fn marker(&self, number: u32) -> char {
        let max = self.jobs.iter().filter_map(|j| j.number).max().unwrap_or(0);
        if number == max {
            '+'
        } else {
            '-'
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Fold one `waitpid` result into the table. Returns `false` when the
    /// status carries no reaped child, which is what terminates the wait
    /// loops.
    pub fn reconcile(&mut self, status: WaitStatus) -> bool {
        match status {
            WaitStatus::Exited(pid, _) | WaitStatus::Signaled(pid, _, _) => {
                debug!("reconcile: group {} done", pid);
                if let Some(job) = self.find_by_pgid_mut(pid) {
                    job.status = JobStatus::Done;
                }
                true
            }
            WaitStatus::Stopped(pid, sig) => {
                debug!("reconcile: group {} stopped by {}", pid, sig);
                let mut relabel = false;
                if let Some(job) = self.find_by_pgid_mut(pid) {
                    job.status = JobStatus::Stopped;
                    relabel = !job.background
                        && matches!(sig, Signal::SIGTSTP | Signal::SIGSTOP);
                }
                if relabel {
                    self.move_to_background(pid);
                }
                true
            }
            WaitStatus::StillAlive => false,
            _ => true,
        }
    }

    /// A stopped foreground job becomes a background job at the tail with a
    /// fresh number, so `fg` and `bg` can address it like any other.
    fn move_to_background(&mut self, pgid: Pid) {
        if let Some(mut job) = self.remove_by_pgid(pgid) {
            job.background = true;
            job.number = Some(self.next_background_number());
            self.jobs.push(job);
        }
    }
}

/// Non-blocking reap pass: collect every pending child status change and
/// fold it into the table. Idempotent between child events.
pub fn drain(table: &mut JobTable) {
    loop {
        match waitpid(
            Pid::from_raw(-1),
            Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
        ) {
            Ok(status) => {
                if !table.reconcile(status) {
                    break;
                }
            }
            // ECHILD: nothing left to reap
            Err(_) => break,
        }
    }
}

/// Blocking wait for the foreground job. The terminal belongs to the job's
/// group for the duration and is reclaimed before returning, however the
/// wait ends.
pub fn wait_foreground(table: &mut JobTable, pgid: Pid, terminal: &TerminalControl) {
    terminal.give_terminal_to(pgid);
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WUNTRACED)) {
            Ok(status) => {
                if !table.reconcile(status) {
                    break;
                }
                match table.find_by_pgid(pgid).map(|j| j.status) {
                    Some(JobStatus::Running) => continue,
                    _ => break,
                }
            }
            Err(_) => break,
        }
    }
    terminal.reclaim();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(pgid: i32, command: &str, number: Option<u32>, background: bool) -> Job {
        Job::new(Pid::from_raw(pgid), command.to_string(), number, background)
    }

    #[test]
    fn test_add_and_find() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        assert!(table.find_by_pgid(Pid::from_raw(100)).is_some());
        assert!(table.find_by_pgid(Pid::from_raw(101)).is_none());
    }

    #[test]
    fn test_background_numbering_is_monotonic() {
        let mut table = JobTable::new();
        assert_eq!(table.most_recent_background_number(), 0);
        table.add(job(100, "sleep 30 &", Some(table.next_background_number()), true));
        table.add(job(200, "sleep 60 &", Some(table.next_background_number()), true));
        assert_eq!(table.most_recent_background_number(), 2);

        // numbering follows the live maximum, so a freed tail number is
        // handed out again
        table.remove_by_pgid(Pid::from_raw(200));
        assert_eq!(table.next_background_number(), 2);
    }

    #[test]
    fn test_marker_tracks_largest_number() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        table.add(job(200, "sleep 60 &", Some(2), true));
        assert_eq!(table.marker(2), '+');
        assert_eq!(table.marker(1), '-');
    }

    #[test]
    fn test_next_job_to_fg_skips_done() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        table.add(job(200, "sleep 60 &", Some(2), true));
        table.find_by_pgid_mut(Pid::from_raw(200)).unwrap().status = JobStatus::Done;
        assert_eq!(table.next_job_to_fg().unwrap().pgid, Pid::from_raw(100));
    }

    #[test]
    fn test_next_job_to_bg_wants_stopped() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        assert!(table.next_job_to_bg().is_none());
        table.find_by_pgid_mut(Pid::from_raw(100)).unwrap().status = JobStatus::Stopped;
        assert_eq!(table.next_job_to_bg().unwrap().pgid, Pid::from_raw(100));
    }

    #[test]
    fn test_prune_done() {
        let mut table = JobTable::new();
        table.add(job(100, "a", Some(1), true));
        table.add(job(200, "b", Some(2), true));
        table.find_by_pgid_mut(Pid::from_raw(100)).unwrap().status = JobStatus::Done;
        table.prune_done();
        assert_eq!(table.len(), 1);
        assert!(table.find_by_pgid(Pid::from_raw(100)).is_none());
    }

    #[test]
    fn test_reconcile_exit_marks_done() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        assert!(table.reconcile(WaitStatus::Exited(Pid::from_raw(100), 0)));
        assert_eq!(
            table.find_by_pgid(Pid::from_raw(100)).unwrap().status,
            JobStatus::Done
        );
    }

    #[test]
    fn test_reconcile_signal_marks_done() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        table.reconcile(WaitStatus::Signaled(
            Pid::from_raw(100),
            Signal::SIGINT,
            false,
        ));
        assert_eq!(
            table.find_by_pgid(Pid::from_raw(100)).unwrap().status,
            JobStatus::Done
        );
    }

    #[test]
    fn test_reconcile_stop_renumbers_foreground_job() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        table.add(job(200, "sleep 60", None, false));
        table.reconcile(WaitStatus::Stopped(Pid::from_raw(200), Signal::SIGTSTP));

        let stopped = table.find_by_pgid(Pid::from_raw(200)).unwrap();
        assert_eq!(stopped.status, JobStatus::Stopped);
        assert!(stopped.background);
        assert_eq!(stopped.number, Some(2));
        // re-inserted at the tail
        assert_eq!(table.iter().last().unwrap().pgid, Pid::from_raw(200));
    }

    #[test]
    fn test_reconcile_stop_keeps_background_number() {
        let mut table = JobTable::new();
        table.add(job(100, "sleep 30 &", Some(1), true));
        table.reconcile(WaitStatus::Stopped(Pid::from_raw(100), Signal::SIGTSTP));
        let stopped = table.find_by_pgid(Pid::from_raw(100)).unwrap();
        assert_eq!(stopped.status, JobStatus::Stopped);
        assert_eq!(stopped.number, Some(1));
    }

    #[test]
    fn test_reconcile_still_alive_is_no_progress() {
        let mut table = JobTable::new();
        assert!(!table.reconcile(WaitStatus::StillAlive));
    }

    #[test]
    fn test_command_suffix_round_trip() {
        let mut j = job(100, "sleep 30", Some(1), true);
        j.push_background_suffix();
        assert_eq!(j.command, "sleep 30 &");
        // appending twice never doubles the suffix
        j.push_background_suffix();
        assert_eq!(j.command, "sleep 30 &");
        j.strip_background_suffix();
        assert_eq!(j.command, "sleep 30");
        j.strip_background_suffix();
        assert_eq!(j.command, "sleep 30");
    }

    #[test]
    fn test_status_line_format() {
        let j = job(100, "sleep 30 &", Some(1), true);
        assert_eq!(
            j.status_line('+').unwrap(),
            "[1]+\tRunning\t\t\tsleep 30 &"
        );
    }

    #[test]
    fn test_notify_line_format() {
        let mut j = job(100, "sleep 30 &", Some(2), true);
        j.status = JobStatus::Done;
        assert_eq!(j.notify_line('-').unwrap(), "[2]-\tsleep 30 &");
    }

    #[test]
    fn test_foreground_job_renders_nothing() {
        let j = job(100, "sleep 30", None, false);
        assert!(j.status_line('+').is_none());
        assert!(j.notify_line('+').is_none());
    }
}
