use std::iter::Peekable;
use std::str::Chars;

use super::token::Token;

/// Cursor over one input line. Each call to `next_token` advances it;
/// re-scanning needs a fresh `Lexer`.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
        }
    }

    /// Scans the whole line.
    pub fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).collect()
    }

    /// Returns `None` once the line is exhausted.
    pub fn next_token(&mut self) -> Option<Token> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

        let ch = self.chars.next()?;
        match ch {
            '|' => return Some(Token::Pipe),
            '<' => return Some(Token::RedirectIn),
            '>' => return Some(Token::RedirectOut),
            _ => {}
        }

        let mut buf = String::new();
        buf.push(ch);
        while let Some(c) = self
            .chars
            .next_if(|c| !c.is_whitespace() && !Token::is_symbol(*c))
        {
            buf.push(c);
        }
        Some(Token::Word(buf))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}
