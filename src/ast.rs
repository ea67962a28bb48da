/// One program invocation: argv plus optional file redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

impl Command {
    pub fn new(argv: Vec<String>) -> Self {
        Command {
            argv,
            input_path: None,
            output_path: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

/// One command, or two connected by a pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pipeline {
    Single(Command),
    Piped(Command, Command),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    In,
    Out,
}
