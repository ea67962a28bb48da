use std::fmt;
use std::io;
use crate::config::ConfigError;
use crate::executor::ExecError;
use crate::parser::ParseError;
use crate::supervisor::SupervisorError;

#[derive(Debug)]
pub enum ShellError {
    Config(ConfigError),
    Signal(SupervisorError),
    Parse(ParseError),
    Exec(ExecError),
    Io(io::Error),
}

impl ShellError {
    /// Errors that end the interpreter instead of just the current line.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ShellError::Parse(_))
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Config(e) => write!(f, "config error: {}", e),
            ShellError::Signal(e) => write!(f, "{}", e),
            ShellError::Parse(e) => write!(f, "{}", e),
            ShellError::Exec(e) => write!(f, "{}", e),
            ShellError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Config(e) => Some(e),
            ShellError::Signal(e) => Some(e),
            ShellError::Parse(e) => Some(e),
            ShellError::Exec(e) => Some(e),
            ShellError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ShellError {
    fn from(e: ConfigError) -> Self {
        ShellError::Config(e)
    }
}

impl From<SupervisorError> for ShellError {
    fn from(e: SupervisorError) -> Self {
        ShellError::Signal(e)
    }
}

impl From<ParseError> for ShellError {
    fn from(e: ParseError) -> Self {
        ShellError::Parse(e)
    }
}

impl From<ExecError> for ShellError {
    fn from(e: ExecError) -> Self {
        ShellError::Exec(e)
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::Io(e)
    }
}
