use std::io::{self, Write};
use crate::io::input::{Input, LineReader};

pub const EOF_MARKER: &str = "^D";

pub struct ShellPrompt {
    prompt: String,
    reader: LineReader,
}

impl ShellPrompt {
    pub fn new(prompt: impl Into<String>) -> Self {
        ShellPrompt {
            prompt: prompt.into(),
            reader: LineReader::stdin(),
        }
    }

    pub fn show_prompt(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(self.prompt.as_bytes())?;
        stdout.flush()
    }

    pub fn read_line(&mut self) -> io::Result<Input> {
        let input = self.reader.read_line()?;
        match input {
            // EOF (e.g. Ctrl-D)
            Input::Eof => println!("{}", EOF_MARKER),
            // Ctrl-C at the prompt: move to a fresh line
            Input::Interrupted => println!(),
            Input::Line(_) => {}
        }
        Ok(input)
    }
}
