pub mod default;

use std::fmt;
use crate::ast::{Pipeline, RedirectKind};
use crate::lexer::Lexer;
use default::DefaultParser;

pub trait Parser {
    fn parse(&mut self) -> Result<Pipeline, ParseError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    EmptyCommand,
    MultiplePipes,
    MultipleInputRedirects,
    MultipleOutputRedirects,
    MissingRedirectTarget(RedirectKind),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyCommand => write!(f, "invalid: empty command"),
            ParseError::MultiplePipes => write!(f, "invalid pipeline: more than one pipe"),
            ParseError::MultipleInputRedirects => write!(f, "invalid: multiple standard input redirects"),
            ParseError::MultipleOutputRedirects => write!(f, "invalid: multiple standard output redirects"),
            ParseError::MissingRedirectTarget(RedirectKind::In) => {
                write!(f, "invalid standard input redirect: missing file name")
            }
            ParseError::MissingRedirectTarget(RedirectKind::Out) => {
                write!(f, "invalid standard output redirect: missing file name")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Lexes and parses one input line.
pub fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
    let tokens = Lexer::tokenize(line);
    DefaultParser::new(&tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Command;

    fn cmd(argv: &[&str]) -> Command {
        Command::new(argv.iter().map(|s| s.to_string()).collect())
    }

    fn with_redirects(mut c: Command, input: Option<&str>, output: Option<&str>) -> Command {
        c.input_path = input.map(str::to_string);
        c.output_path = output.map(str::to_string);
        c
    }

    #[test]
    fn test_simple_command() {
        assert_eq!(
            parse_line("grep -n foo bar.txt"),
            Ok(Pipeline::Single(cmd(&["grep", "-n", "foo", "bar.txt"])))
        );
    }

    #[test]
    fn test_pipeline() {
        assert_eq!(
            parse_line("ls -l | wc -l"),
            Ok(Pipeline::Piped(cmd(&["ls", "-l"]), cmd(&["wc", "-l"])))
        );
    }

    #[test]
    fn test_redirect_out() {
        assert_eq!(
            parse_line("echo hi > out.txt"),
            Ok(Pipeline::Single(with_redirects(cmd(&["echo", "hi"]), None, Some("out.txt"))))
        );
    }

    #[test]
    fn test_redirect_in() {
        assert_eq!(
            parse_line("sort<names.txt"),
            Ok(Pipeline::Single(with_redirects(cmd(&["sort"]), Some("names.txt"), None)))
        );
    }

    #[test]
    fn test_both_redirects_in_either_order() {
        let expected = Ok(Pipeline::Single(with_redirects(
            cmd(&["tr", "a", "b"]),
            Some("in.txt"),
            Some("out.txt"),
        )));
        assert_eq!(parse_line("tr a b < in.txt > out.txt"), expected);
        assert_eq!(parse_line("tr a b > out.txt < in.txt"), expected);
    }

    #[test]
    fn test_pipeline_sides_keep_their_redirects() {
        assert_eq!(
            parse_line("cat < in.txt | sort > out.txt"),
            Ok(Pipeline::Piped(
                with_redirects(cmd(&["cat"]), Some("in.txt"), None),
                with_redirects(cmd(&["sort"]), None, Some("out.txt")),
            ))
        );
    }

    #[test]
    fn test_multiple_pipes_rejected() {
        assert_eq!(parse_line("a | b | c"), Err(ParseError::MultiplePipes));
        assert_eq!(parse_line("a || b"), Err(ParseError::MultiplePipes));
    }

    #[test]
    fn test_multiple_redirects_rejected() {
        assert_eq!(parse_line("a > x > y"), Err(ParseError::MultipleOutputRedirects));
        assert_eq!(parse_line("a < x < y"), Err(ParseError::MultipleInputRedirects));
        assert_eq!(parse_line("a | b < x < y"), Err(ParseError::MultipleInputRedirects));
    }

    #[test]
    fn test_missing_redirect_target() {
        assert_eq!(
            parse_line("cat <"),
            Err(ParseError::MissingRedirectTarget(RedirectKind::In))
        );
        assert_eq!(
            parse_line("ls > | wc"),
            Err(ParseError::MissingRedirectTarget(RedirectKind::Out))
        );
        assert_eq!(
            parse_line("cat < > out"),
            Err(ParseError::MissingRedirectTarget(RedirectKind::In))
        );
    }

    #[test]
    fn test_empty_command_rejected() {
        assert_eq!(parse_line(""), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("   \t"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("< in.txt"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("| wc"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("ls |"), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn test_bare_redirect_is_empty_command() {
        assert_eq!(parse_line("<"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line(">"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("< >"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("ls | >"), Err(ParseError::EmptyCommand));
    }
}
