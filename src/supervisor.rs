//! Timeout and interrupt supervision of the foreground pipeline.
//!
//! `SIGALRM` and `SIGINT` handlers only read the tracked child PIDs, send
//! `SIGKILL`, set a flag and (for the timer) write a fixed message. All
//! bookkeeping stays on the main flow, which blocks both signals whenever it
//! changes the tracked set.

use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::{Duration, Instant};

use libc::c_int;
use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::{Pid, alarm};

use crate::executor::ForegroundSession;

pub const TIMEOUT_MESSAGE: &[u8] = b"Bwahaha ... tonight I dine on turtle soup\n";

/// Most children a foreground pipeline can have.
pub const MAX_TRACKED: usize = 2;

/// PIDs of the foreground children still outstanding. 0 marks a free slot.
pub struct Tracked {
    slots: [AtomicI32; MAX_TRACKED],
}

impl Tracked {
    pub const fn new() -> Self {
        Tracked {
            slots: [AtomicI32::new(0), AtomicI32::new(0)],
        }
    }

    pub fn insert(&self, pid: Pid) -> bool {
        self.slots.iter().any(|slot| {
            slot.compare_exchange(0, pid.as_raw(), Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        })
    }

    pub fn remove(&self, pid: Pid) {
        for slot in &self.slots {
            let _ = slot.compare_exchange(pid.as_raw(), 0, Ordering::SeqCst, Ordering::SeqCst);
        }
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::SeqCst);
        }
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.slots
            .iter()
            .map(|slot| slot.load(Ordering::SeqCst))
            .filter(|&raw| raw > 0)
            .map(Pid::from_raw)
    }

    /// Sends `SIGKILL` to every tracked PID that is still running. Returns
    /// whether any was killed. Children that already exited (unreaped
    /// zombies) are skipped, so a late event is a no-op.
    fn kill_all(&self) -> bool {
        let mut killed = false;
        for pid in self.pids() {
            if still_running(pid) && signal::kill(pid, Signal::SIGKILL).is_ok() {
                killed = true;
            }
        }
        killed
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Tracked::new()
    }
}

/// Whether `pid`, a child of this process, has not terminated yet. Only
/// peeks: the child stays reapable. Async-signal-safe.
pub fn still_running(pid: Pid) -> bool {
    let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
    let rc = unsafe {
        libc::waitid(
            libc::P_PID,
            pid.as_raw() as libc::id_t,
            info.as_mut_ptr(),
            libc::WEXITED | libc::WNOHANG | libc::WNOWAIT,
        )
    };
    // si_pid stays 0 when nothing has changed
    rc == 0 && unsafe { info.assume_init_ref().si_pid() } == 0
}

/// Keeps the interrupted code's `errno` intact across a handler.
struct SavedErrno(c_int);

impl SavedErrno {
    fn save() -> Self {
        SavedErrno(unsafe { *libc::__errno_location() })
    }
}

impl Drop for SavedErrno {
    fn drop(&mut self) {
        unsafe { *libc::__errno_location() = self.0 };
    }
}

static FOREGROUND: Tracked = Tracked::new();
static EXPIRED: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_alarm(_sig: c_int) {
    let _errno = SavedErrno::save();
    if FOREGROUND.kill_all() {
        EXPIRED.store(true, Ordering::SeqCst);
        unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                TIMEOUT_MESSAGE.as_ptr().cast(),
                TIMEOUT_MESSAGE.len(),
            );
        }
    }
}

extern "C" fn handle_interrupt(_sig: c_int) {
    let _errno = SavedErrno::save();
    if FOREGROUND.kill_all() {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }
}

/// How a foreground execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Expired,
    Interrupted,
}

#[derive(Debug)]
pub enum SupervisorError {
    Install(Signal, Errno),
    Mask(Errno),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorError::Install(sig, e) => write!(f, "cannot install {} handler: {}", sig, e),
            SupervisorError::Mask(e) => write!(f, "cannot change signal mask: {}", e),
        }
    }
}

impl std::error::Error for SupervisorError {}

/// Owner of the process-wide timer and the `SIGALRM`/`SIGINT` handlers.
/// Create one per process.
pub struct Supervisor {
    timeout: Duration,
    signals: SigSet,
}

impl Supervisor {
    pub fn install(timeout: Duration) -> Result<Self, SupervisorError> {
        let mut signals = SigSet::empty();
        signals.add(Signal::SIGALRM);
        signals.add(Signal::SIGINT);

        // No SA_RESTART: a blocked read or wait returns EINTR to the main flow.
        for (sig, handler) in [
            (Signal::SIGALRM, handle_alarm as extern "C" fn(c_int)),
            (Signal::SIGINT, handle_interrupt as extern "C" fn(c_int)),
        ] {
            let action = SigAction::new(SigHandler::Handler(handler), SaFlags::empty(), signals);
            unsafe { signal::sigaction(sig, &action) }
                .map_err(|e| SupervisorError::Install(sig, e))?;
        }

        Ok(Supervisor { timeout, signals })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Blocks the supervised signals until the guard is dropped.
    pub fn block(&self) -> Result<Blocked<'_>, SupervisorError> {
        self.signals.thread_block().map_err(SupervisorError::Mask)?;
        Ok(Blocked { signals: &self.signals })
    }

    /// Idle -> Armed. Replaces any pending timer with one that fires at the
    /// session's deadline. Call with signals blocked, before the first child
    /// is forked.
    pub fn arm(&self, session: &ForegroundSession) {
        FOREGROUND.clear();
        EXPIRED.store(false, Ordering::SeqCst);
        INTERRUPTED.store(false, Ordering::SeqCst);
        match session.deadline() {
            Some(deadline) => {
                alarm::set(alarm_secs(deadline.saturating_duration_since(Instant::now())));
            }
            None => {
                alarm::cancel();
            }
        }
    }

    /// Makes `pid` a forced-termination target. Call with signals blocked.
    pub fn track(&self, pid: Pid) {
        let inserted = FOREGROUND.insert(pid);
        debug_assert!(inserted, "more than {} foreground children", MAX_TRACKED);
    }

    /// Call with signals blocked, after the child is observed as terminated
    /// and before it is reaped.
    pub fn untrack(&self, pid: Pid) {
        FOREGROUND.remove(pid);
    }

    /// Terminal state -> Idle. Cancels the timer and reports which event, if
    /// any, ended the execution.
    pub fn disarm(&self) -> Outcome {
        alarm::cancel();
        FOREGROUND.clear();
        if INTERRUPTED.swap(false, Ordering::SeqCst) {
            EXPIRED.store(false, Ordering::SeqCst);
            Outcome::Interrupted
        } else if EXPIRED.swap(false, Ordering::SeqCst) {
            Outcome::Expired
        } else {
            Outcome::Completed
        }
    }

    /// Kills every tracked child right away. Used when spawning fails midway.
    pub fn kill_tracked(&self) {
        FOREGROUND.kill_all();
    }

    /// Runs in a freshly forked child: drop the inherited handlers and mask
    /// so the new program sees default signal behaviour.
    pub fn reset_in_child(&self) {
        // SIGPIPE too: the Rust runtime ignores it, and exec keeps ignored
        // dispositions.
        for sig in [Signal::SIGALRM, Signal::SIGINT, Signal::SIGPIPE] {
            let _ = unsafe { signal::signal(sig, SigHandler::SigDfl) };
        }
        let _ = self.signals.thread_unblock();
    }
}

/// Whole seconds for `alarm(2)`: rounded up, at least 1, at most `u32::MAX`.
fn alarm_secs(remaining: Duration) -> u32 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    secs.clamp(1, u64::from(u32::MAX)) as u32
}

pub struct Blocked<'a> {
    signals: &'a SigSet,
}

impl Drop for Blocked<'_> {
    fn drop(&mut self) {
        let _ = self.signals.thread_unblock();
    }
}
