use std::{fmt, io};
use nix::errno::Errno;
use crate::ast::{Pipeline, RedirectKind};
use crate::supervisor::SupervisorError;
use super::session::ForegroundSession;

pub type ExecStatus = Result<ForegroundSession, ExecError>;

/// Parent-side failures. All of them end the interpreter.
#[derive(Debug)]
pub enum ExecError {
    Fork(Errno),
    Pipe(Errno),
    Wait(Errno),
    Signal(SupervisorError),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Fork(e) => write!(f, "invalid: error in creating child process: {}", e),
            ExecError::Pipe(e) => write!(f, "error creating pipe: {}", e),
            ExecError::Wait(e) => write!(f, "invalid: error in child process termination: {}", e),
            ExecError::Signal(e) => write!(f, "signal setup failed: {}", e),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Fork(e) | ExecError::Pipe(e) | ExecError::Wait(e) => Some(e),
            ExecError::Signal(e) => Some(e),
        }
    }
}

impl From<SupervisorError> for ExecError {
    fn from(e: SupervisorError) -> Self {
        ExecError::Signal(e)
    }
}

/// Failures inside a forked child. Reported by the child itself, which then
/// exits with status 1; they never reach the parent.
#[derive(Debug)]
pub enum ChildError {
    InputRedirect(String, io::Error),
    OutputRedirect(String, io::Error),
    PipeConflict(RedirectKind),
    Dup(Errno),
    InvalidArgument(String),
    Exec(String, Errno),
}

impl fmt::Display for ChildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildError::InputRedirect(path, e) => {
                write!(f, "invalid standard input redirect: {}: {}", path, e)
            }
            ChildError::OutputRedirect(path, e) => {
                write!(f, "invalid standard output redirect: {}: {}", path, e)
            }
            ChildError::PipeConflict(RedirectKind::In) => {
                write!(f, "invalid standard input redirect: conflicts with pipe")
            }
            ChildError::PipeConflict(RedirectKind::Out) => {
                write!(f, "invalid standard output redirect: conflicts with pipe")
            }
            ChildError::Dup(e) => write!(f, "cannot duplicate descriptor: {}", e),
            ChildError::InvalidArgument(arg) => write!(f, "invalid argument: {:?}", arg),
            ChildError::Exec(prog, e) => write!(f, "{}: {}", prog, e),
        }
    }
}

impl std::error::Error for ChildError {}

pub trait Executor {
    /// Runs the pipeline in the foreground and returns once every child has
    /// been reaped.
    fn exec(&mut self, pipeline: &Pipeline) -> ExecStatus;
}
