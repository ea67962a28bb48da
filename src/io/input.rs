use std::io;
use std::os::fd::RawFd;
use nix::errno::Errno;
use nix::unistd;

const CHUNK: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// A signal arrived while waiting for input.
    Interrupted,
    Eof,
}

/// Reads lines straight from a descriptor with `read(2)`, so a signal
/// handler can break a blocked read instead of it being retried.
pub struct LineReader {
    fd: RawFd,
    buf: Vec<u8>,
    eof: bool,
}

impl LineReader {
    pub fn new(fd: RawFd) -> Self {
        LineReader { fd, buf: Vec::new(), eof: false }
    }

    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }

    pub fn read_line(&mut self) -> io::Result<Input> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                return Ok(Input::Line(decode(&line[..pos])));
            }
            if self.eof {
                if self.buf.is_empty() {
                    return Ok(Input::Eof);
                }
                let line = std::mem::take(&mut self.buf);
                return Ok(Input::Line(decode(&line)));
            }

            let mut chunk = [0u8; CHUNK];
            match unistd::read(self.fd, &mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(Errno::EINTR) => return Ok(Input::Interrupted),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
