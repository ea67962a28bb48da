mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::Token;

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_words_split_on_whitespace() {
        assert_eq!(
            Lexer::tokenize("  ls   -l\t/tmp  "),
            vec![word("ls"), word("-l"), word("/tmp")]
        );
    }

    #[test]
    fn test_redirect_out() {
        assert_eq!(
            Lexer::tokenize("echo hi > out.txt"),
            vec![word("echo"), word("hi"), Token::RedirectOut, word("out.txt")]
        );
    }

    #[test]
    fn test_symbols_split_abutting_words() {
        assert_eq!(
            Lexer::tokenize("cat<in.txt|wc>out"),
            vec![
                word("cat"),
                Token::RedirectIn,
                word("in.txt"),
                Token::Pipe,
                word("wc"),
                Token::RedirectOut,
                word("out"),
            ]
        );
    }

    #[test]
    fn test_adjacent_symbols() {
        assert_eq!(
            Lexer::tokenize("a||b>>c"),
            vec![
                word("a"),
                Token::Pipe,
                Token::Pipe,
                word("b"),
                Token::RedirectOut,
                Token::RedirectOut,
                word("c"),
            ]
        );
    }

    #[test]
    fn test_no_quoting() {
        assert_eq!(
            Lexer::tokenize("echo \"a|b\""),
            vec![word("echo"), word("\"a"), Token::Pipe, word("b\"")]
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(Lexer::tokenize("").is_empty());
        assert!(Lexer::tokenize(" \t \n").is_empty());
    }

    #[test]
    fn test_next_token_advances_and_ends() {
        let mut lexer = Lexer::new("sleep 1");
        assert_eq!(lexer.next_token(), Some(word("sleep")));
        assert_eq!(lexer.next_token(), Some(word("1")));
        assert_eq!(lexer.next_token(), None);
        assert_eq!(lexer.next_token(), None);
    }
}
