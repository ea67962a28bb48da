//! Descriptor wiring and program replacement inside a forked child.
//!
//! Nothing here returns to the interpreter: the caller either execs or
//! `_exit`s, so `OwnedFd`/`File` values inherited from the parent are closed
//! by raw descriptor and never dropped.

use std::convert::Infallible;
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{close, dup2, execvp};

use crate::ast::{Command, RedirectKind};
use super::executor::ChildError;

pub(super) struct PipeFds {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

/// Sets up the child's descriptors, then replaces its image. Only returns on
/// failure.
pub(super) fn run_child(cmd: &Command, pipe: Option<(&PipeFds, Side)>) -> ChildError {
    if let Err(e) = prepare(cmd, pipe) {
        return e;
    }
    match exec_program(cmd) {
        Ok(never) => match never {},
        Err(e) => e,
    }
}

fn prepare(cmd: &Command, pipe: Option<(&PipeFds, Side)>) -> Result<(), ChildError> {
    if let Some((fds, side)) = pipe {
        check_conflict(cmd, side)?;
        wire_pipe(fds, side)?;
    }
    apply_redirects(cmd)
}

/// The pipe already owns stdout of the left side and stdin of the right.
pub(super) fn check_conflict(cmd: &Command, side: Side) -> Result<(), ChildError> {
    match side {
        Side::Left if cmd.output_path.is_some() => Err(ChildError::PipeConflict(RedirectKind::Out)),
        Side::Right if cmd.input_path.is_some() => Err(ChildError::PipeConflict(RedirectKind::In)),
        _ => Ok(()),
    }
}

fn wire_pipe(fds: &PipeFds, side: Side) -> Result<(), ChildError> {
    let (src, target) = match side {
        Side::Left => (fds.write.as_raw_fd(), STDOUT_FILENO),
        Side::Right => (fds.read.as_raw_fd(), STDIN_FILENO),
    };
    dup2(src, target).map_err(ChildError::Dup)?;
    let _ = close(fds.read.as_raw_fd());
    let _ = close(fds.write.as_raw_fd());
    Ok(())
}

fn apply_redirects(cmd: &Command) -> Result<(), ChildError> {
    if let Some(path) = &cmd.input_path {
        let file = File::open(path).map_err(|e| ChildError::InputRedirect(path.clone(), e))?;
        replace_fd(file, STDIN_FILENO)?;
    }
    if let Some(path) = &cmd.output_path {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path)
            .map_err(|e| ChildError::OutputRedirect(path.clone(), e))?;
        replace_fd(file, STDOUT_FILENO)?;
    }
    Ok(())
}

fn replace_fd(file: File, target: RawFd) -> Result<(), ChildError> {
    if file.as_raw_fd() == target {
        // already in place; dropping would close it
        std::mem::forget(file);
        return Ok(());
    }
    dup2(file.as_raw_fd(), target).map_err(ChildError::Dup)?;
    Ok(())
}

fn exec_program(cmd: &Command) -> Result<Infallible, ChildError> {
    let argv = cmd
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()).map_err(|_| ChildError::InvalidArgument(arg.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    execvp(&argv[0], &argv).map_err(|e| ChildError::Exec(cmd.program().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(input: Option<&str>, output: Option<&str>) -> Command {
        let mut c = Command::new(vec!["cat".to_string()]);
        c.input_path = input.map(str::to_string);
        c.output_path = output.map(str::to_string);
        c
    }

    #[test]
    fn test_left_side_output_conflicts() {
        assert!(matches!(
            check_conflict(&cmd(None, Some("out")), Side::Left),
            Err(ChildError::PipeConflict(RedirectKind::Out))
        ));
        assert!(check_conflict(&cmd(Some("in"), None), Side::Left).is_ok());
    }

    #[test]
    fn test_right_side_input_conflicts() {
        assert!(matches!(
            check_conflict(&cmd(Some("in"), None), Side::Right),
            Err(ChildError::PipeConflict(RedirectKind::In))
        ));
        assert!(check_conflict(&cmd(None, Some("out")), Side::Right).is_ok());
    }

    #[test]
    fn test_nul_in_argument_is_rejected_before_exec() {
        let c = Command::new(vec!["echo".to_string(), "a\0b".to_string()]);
        assert!(matches!(
            exec_program(&c),
            Err(ChildError::InvalidArgument(arg)) if arg == "a\0b"
        ));
    }
}
