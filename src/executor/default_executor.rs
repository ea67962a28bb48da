use std::mem::MaybeUninit;

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, Pid, fork, pipe};

use crate::ast::{Command, Pipeline};
use crate::supervisor::Supervisor;
use super::executor::{ExecError, ExecStatus, Executor};
use super::redirect::{self, PipeFds, Side};
use super::session::ForegroundSession;

/// Runs pipelines as forked children under the supervisor's timer.
pub struct DefaultExecutor<'a> {
    supervisor: &'a Supervisor,
}

impl<'a> DefaultExecutor<'a> {
    pub fn new(supervisor: &'a Supervisor) -> Self {
        DefaultExecutor { supervisor }
    }
}

impl Executor for DefaultExecutor<'_> {
    fn exec(&mut self, pipeline: &Pipeline) -> ExecStatus {
        let mut session = ForegroundSession::new(self.supervisor.timeout());

        // Forks and PID bookkeeping happen with SIGALRM/SIGINT blocked, so an
        // early timer is delivered only once every child is tracked.
        {
            let _blocked = self.supervisor.block()?;
            self.supervisor.arm(&session);
            if let Err(e) = self.spawn_all(pipeline, &mut session) {
                self.abandon(&mut session);
                return Err(e);
            }
        }

        self.wait_all(&mut session)?;
        session.finish(self.supervisor.disarm());
        Ok(session)
    }
}

impl DefaultExecutor<'_> {
    fn spawn_all(&self, pipeline: &Pipeline, session: &mut ForegroundSession) -> Result<(), ExecError> {
        match pipeline {
            Pipeline::Single(cmd) => {
                let pid = self.spawn(cmd, None)?;
                self.register(session, pid);
            }
            Pipeline::Piped(left, right) => {
                let (read, write) = pipe().map_err(ExecError::Pipe)?;
                let fds = PipeFds { read, write };

                let pid = self.spawn(left, Some((&fds, Side::Left)))?;
                self.register(session, pid);
                let pid = self.spawn(right, Some((&fds, Side::Right)))?;
                self.register(session, pid);
                // parent keeps no pipe end open
                drop(fds);
            }
        }
        Ok(())
    }

    fn spawn(&self, cmd: &Command, pipe: Option<(&PipeFds, Side)>) -> Result<Pid, ExecError> {
        match syscall(|| unsafe { fork() }).map_err(ExecError::Fork)? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                self.supervisor.reset_in_child();
                let err = redirect::run_child(cmd, pipe);
                eprintln!("penn-shredder: {}", err);
                unsafe { libc::_exit(1) }
            }
        }
    }

    fn register(&self, session: &mut ForegroundSession, pid: Pid) {
        self.supervisor.track(pid);
        session.spawned(pid);
    }

    fn wait_all(&self, session: &mut ForegroundSession) -> Result<(), ExecError> {
        while let Some(&pid) = session.outstanding().first() {
            // Observe the exit without reaping: the PID stays a zombie, so a
            // late kill from a handler cannot hit a recycled process.
            wait_exited(pid).map_err(ExecError::Wait)?;
            let status = {
                let _blocked = self.supervisor.block()?;
                self.supervisor.untrack(pid);
                syscall(|| waitpid(pid, None)).map_err(ExecError::Wait)?
            };
            session.reaped(pid, status);
        }
        Ok(())
    }

    /// Spawning failed midway: kill and reap whatever already started.
    fn abandon(&self, session: &mut ForegroundSession) {
        self.supervisor.kill_tracked();
        for pid in session.outstanding().to_vec() {
            if let Ok(status) = syscall(|| waitpid(pid, None)) {
                session.reaped(pid, status);
            }
        }
        self.supervisor.disarm();
    }
}

/// Blocks until `pid` has terminated, leaving it unreaped.
fn wait_exited(pid: Pid) -> nix::Result<()> {
    let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
    syscall(|| {
        let rc = unsafe {
            libc::waitid(
                libc::P_PID,
                pid.as_raw() as libc::id_t,
                info.as_mut_ptr(),
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        Errno::result(rc).map(drop)
    })
}

/// Retries a system call interrupted by a signal handler.
fn syscall<F, T>(mut f: F) -> nix::Result<T>
where
    F: FnMut() -> nix::Result<T>,
{
    loop {
        match f() {
            Err(Errno::EINTR) => (),
            result => return result,
        }
    }
}

