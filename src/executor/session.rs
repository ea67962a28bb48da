use std::time::{Duration, Instant};
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use crate::supervisor::Outcome;

/// State of one foreground execution, from just before the first fork until
/// the last child is reaped.
#[derive(Debug)]
pub struct ForegroundSession {
    spawned: Vec<Pid>,
    outstanding: Vec<Pid>,
    statuses: Vec<(Pid, WaitStatus)>,
    deadline: Option<Instant>,
    outcome: Option<Outcome>,
}

impl ForegroundSession {
    pub fn new(timeout: Duration) -> Self {
        ForegroundSession {
            spawned: Vec::new(),
            outstanding: Vec::new(),
            statuses: Vec::new(),
            // too far out to represent: no deadline rather than a panic
            deadline: (!timeout.is_zero())
                .then(|| Instant::now().checked_add(timeout))
                .flatten(),
            outcome: None,
        }
    }

    pub fn spawned(&mut self, pid: Pid) {
        self.spawned.push(pid);
        self.outstanding.push(pid);
    }

    pub fn reaped(&mut self, pid: Pid, status: WaitStatus) {
        self.outstanding.retain(|&p| p != pid);
        self.statuses.push((pid, status));
    }

    pub fn finish(&mut self, outcome: Outcome) {
        debug_assert!(self.outstanding.is_empty());
        self.outcome = Some(outcome);
    }

    /// Children not reaped yet, in spawn order.
    pub fn outstanding(&self) -> &[Pid] {
        &self.outstanding
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `None` until `finish` is called.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Exit code of the last command in the pipeline, shell style: 128 + n
    /// when it was killed by signal n.
    pub fn exit_code(&self) -> Option<i32> {
        let last = *self.spawned.last()?;
        self.statuses
            .iter()
            .find(|(pid, _)| *pid == last)
            .and_then(|(_, status)| match *status {
                WaitStatus::Exited(_, code) => Some(code),
                WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn test_reaping_in_any_order() {
        let (left, right) = (Pid::from_raw(10), Pid::from_raw(11));
        let mut session = ForegroundSession::new(Duration::from_secs(5));
        session.spawned(left);
        session.spawned(right);
        assert_eq!(session.outstanding(), &[left, right]);

        session.reaped(right, WaitStatus::Exited(right, 3));
        assert_eq!(session.outstanding(), &[left]);
        assert_eq!(session.outcome(), None);

        session.reaped(left, WaitStatus::Exited(left, 0));
        session.finish(Outcome::Completed);
        assert!(session.outstanding().is_empty());
        assert_eq!(session.outcome(), Some(Outcome::Completed));
        // the right-hand command decides the pipeline's code
        assert_eq!(session.exit_code(), Some(3));
    }

    #[test]
    fn test_killed_child_exit_code() {
        let pid = Pid::from_raw(20);
        let mut session = ForegroundSession::new(Duration::from_secs(1));
        session.spawned(pid);
        session.reaped(pid, WaitStatus::Signaled(pid, Signal::SIGKILL, false));
        session.finish(Outcome::Expired);
        assert_eq!(session.exit_code(), Some(128 + 9));
        assert_eq!(session.outcome(), Some(Outcome::Expired));
    }

    #[test]
    fn test_deadline_only_with_timeout() {
        assert!(ForegroundSession::new(Duration::ZERO).deadline().is_none());
        let session = ForegroundSession::new(Duration::from_secs(3));
        assert!(session.deadline().unwrap() > Instant::now());
    }

    #[test]
    fn test_unfinished_session() {
        let session = ForegroundSession::new(Duration::ZERO);
        assert_eq!(session.outcome(), None);
        assert_eq!(session.exit_code(), None);
    }

    #[test]
    fn test_unrepresentable_timeout_has_no_deadline() {
        let session = ForegroundSession::new(Duration::from_secs(u64::MAX));
        assert!(session.deadline().is_none());
        assert_eq!(session.outcome(), None);
    }
}
