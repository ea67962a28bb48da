use crate::ast::{Command, Pipeline, RedirectKind};
use crate::lexer::Token;
use crate::parser::{ParseError, Parser};

pub struct DefaultParser<'a> {
    tokens: &'a [Token],
}

impl<'a> DefaultParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    fn count(tokens: &[Token], kind: &Token) -> usize {
        tokens.iter().filter(|t| *t == kind).count()
    }
}

impl Parser for DefaultParser<'_> {
    fn parse(&mut self) -> Result<Pipeline, ParseError> {
        if Self::count(self.tokens, &Token::Pipe) >= 2 {
            return Err(ParseError::MultiplePipes);
        }

        match self.tokens.iter().position(|t| *t == Token::Pipe) {
            Some(at) => {
                let left = parse_command(&self.tokens[..at])?;
                let right = parse_command(&self.tokens[at + 1..])?;
                Ok(Pipeline::Piped(left, right))
            }
            None => Ok(Pipeline::Single(parse_command(self.tokens)?)),
        }
    }
}

// A group holds no pipe tokens. Each redirection symbol binds the word right
// after it, so `<` and `>` may come in either order.
fn parse_command(tokens: &[Token]) -> Result<Command, ParseError> {
    if DefaultParser::count(tokens, &Token::RedirectIn) >= 2 {
        return Err(ParseError::MultipleInputRedirects);
    }
    if DefaultParser::count(tokens, &Token::RedirectOut) >= 2 {
        return Err(ParseError::MultipleOutputRedirects);
    }

    let first_redirect = tokens
        .iter()
        .position(|t| matches!(t, Token::RedirectIn | Token::RedirectOut))
        .unwrap_or(tokens.len());

    let argv: Vec<String> = tokens[..first_redirect]
        .iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(w.clone()),
            _ => None,
        })
        .collect();

    if argv.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let mut cmd = Command::new(argv);
    for (i, tok) in tokens.iter().enumerate().skip(first_redirect) {
        let kind = match tok {
            Token::RedirectIn => RedirectKind::In,
            Token::RedirectOut => RedirectKind::Out,
            _ => continue,
        };
        let target = match tokens.get(i + 1) {
            Some(Token::Word(w)) => w.clone(),
            _ => return Err(ParseError::MissingRedirectTarget(kind)),
        };
        match kind {
            RedirectKind::In => cmd.input_path = Some(target),
            RedirectKind::Out => cmd.output_path = Some(target),
        }
    }
    Ok(cmd)
}
