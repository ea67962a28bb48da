#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Pipe,        // |
    RedirectIn,  // <
    RedirectOut, // >
}

impl Token {
    pub fn is_symbol(ch: char) -> bool {
        matches!(ch, '|' | '<' | '>')
    }
}
