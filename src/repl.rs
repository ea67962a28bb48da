use crate::config::Config;
use crate::error::ShellError;
use crate::executor::{DefaultExecutor, Executor, ForegroundSession};
use crate::io::input::Input;
use crate::parser;
use crate::prompt::ShellPrompt;
use crate::supervisor::{Outcome, Supervisor};

pub struct Repl {
    prompt: ShellPrompt,
    supervisor: Supervisor,
}

impl Repl {
    /// Installs the timer and interrupt handlers; build at most one per process.
    pub fn new(config: &Config) -> Result<Self, ShellError> {
        Ok(Repl {
            prompt: ShellPrompt::new(config.prompt.clone()),
            supervisor: Supervisor::install(config.timeout)?,
        })
    }

    /// Returns `Ok` at end of input and `Err` on the first fatal error.
    pub fn run(&mut self) -> Result<(), ShellError> {
        loop {
            self.prompt.show_prompt()?;
            let line = match self.prompt.read_line()? {
                Input::Line(line) => line,
                Input::Interrupted => continue,
                Input::Eof => return Ok(()),
            };

            match self.eval(&line) {
                // Ctrl-C killed the foreground: start the prompt on a fresh line
                Ok(session) if session.outcome() == Some(Outcome::Interrupted) => println!(),
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => eprintln!("penn-shredder: {}", e),
            }
        }
    }

    /// Parses and runs one line in the foreground.
    pub fn eval(&mut self, line: &str) -> Result<ForegroundSession, ShellError> {
        let pipeline = parser::parse_line(line)?;
        let mut executor = DefaultExecutor::new(&self.supervisor);
        Ok(executor.exec(&pipeline)?)
    }
}
