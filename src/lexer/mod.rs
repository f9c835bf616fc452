//! Whitespace tokenizer.
//!
//! A command line splits on runs of ASCII space or tab and nothing else.
//! Tokens carry no interpretation here; the parser decides which words act
//! as operators.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    #[regex(r"[^ \t]+", |lex| lex.slice().to_string())]
    Word(String),
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Word(word) => word,
        }
    }
}

pub struct Lexer;

impl Lexer {
    /// Tokenize one command line. Empty input yields an empty vector, which
    /// the prompt loop reads as "nothing to do".
    pub fn tokenize(input: &str) -> Vec<Token> {
        Token::lexer(input).flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> Vec<String> {
        Lexer::tokenize(input)
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(Lexer::tokenize("").is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        assert!(Lexer::tokenize("  \t \t  ").is_empty());
    }

    #[test]
    fn test_simple_split() {
        assert_eq!(words("ls -l /tmp"), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn test_tabs_and_runs() {
        assert_eq!(words("cat\t\tfile   x"), vec!["cat", "file", "x"]);
    }

    #[test]
    fn test_operators_need_whitespace() {
        // splitting is on whitespace only, so glued operators stay one word
        assert_eq!(words("a|b"), vec!["a|b"]);
        assert_eq!(words("a | b"), vec!["a", "|", "b"]);
        assert_eq!(words("2>err"), vec!["2>err"]);
        assert_eq!(words("2> err"), vec!["2>", "err"]);
    }
}
