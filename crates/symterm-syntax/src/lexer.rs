//! Converts raw input text into a `Token` stream. Scans character by
//! character, longest-match-first for the multi-character operators
//! (`=!=` before `!=`, `===` before `==`, `:=` before `:`, `=.` before `=`,
//! `<=`/`>=` before `<`/`>`) so the parser never has to un-consume.

use crate::error::ParseError;
use crate::token::Token;

pub struct Lexer {
    input: Vec<char>,
    current: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer { input: input.chars().collect(), current: 0 }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                tokens.push(Token::Eof);
                return Ok(tokens);
            }
            tokens.push(self.next_token()?);
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let c = self.advance();
        match c {
            '_' => self.underscores(),
            '"' => self.string(),
            ch if ch.is_ascii_digit() => self.number(ch),
            ch if ch.is_ascii_alphabetic() => Ok(self.identifier(ch)),

            ';' => Ok(Token::Semicolon),
            ',' => Ok(Token::Comma),
            '(' => Ok(Token::LeftParen),
            ')' => Ok(Token::RightParen),
            '[' => Ok(Token::LeftBracket),
            ']' => Ok(Token::RightBracket),
            '{' => Ok(Token::LeftBrace),
            '}' => Ok(Token::RightBrace),

            '=' if self.match_char('!') => {
                self.expect_char('=')?;
                Ok(Token::UnsameQ)
            }
            '=' if self.match_char('=') => {
                if self.match_char('=') {
                    Ok(Token::SameQ)
                } else {
                    Ok(Token::Equal)
                }
            }
            '=' if self.match_char('.') => Ok(Token::UnsetOp),
            '=' if self.match_char(':') => {
                // Accept `=:` defensively, but the canonical spelling is `:=`.
                Ok(Token::SetDelayed)
            }
            '=' => Ok(Token::Assign),

            ':' if self.match_char('=') => Ok(Token::SetDelayed),
            ':' => Ok(Token::Colon),

            '!' if self.match_char('=') => Ok(Token::Unequal),
            '!' => Ok(Token::Bang),

            '<' if self.match_char('=') => Ok(Token::LessEqual),
            '<' => Ok(Token::Less),
            '>' if self.match_char('=') => Ok(Token::GreaterEqual),
            '>' => Ok(Token::Greater),

            '&' if self.match_char('&') => Ok(Token::And),
            '|' if self.match_char('|') => Ok(Token::Or),

            '+' => Ok(Token::Plus),
            '-' => Ok(Token::Minus),
            '*' => Ok(Token::Star),
            '/' => Ok(Token::Slash),
            '^' => Ok(Token::Caret),

            other => Err(ParseError::UnexpectedToken {
                expected: "a valid token".to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// `_`, `__`, `___`: any further consecutive underscore is illegal.
    fn underscores(&mut self) -> Result<Token, ParseError> {
        let mut count = 1;
        while self.peek() == Some('_') {
            self.advance();
            count += 1;
        }
        match count {
            1 => Ok(Token::Blank1),
            2 => Ok(Token::Blank2),
            3 => Ok(Token::Blank3),
            n => Err(ParseError::IllegalUnderscoreRun(n)),
        }
    }

    fn string(&mut self) -> Result<Token, ParseError> {
        let mut s = String::new();
        loop {
            match self.advance_opt() {
                None => return Err(ParseError::UnterminatedString),
                Some('"') => return Ok(Token::Str(s)),
                Some('\\') => match self.advance_opt() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('\\') => s.push('\\'),
                    Some('"') => s.push('"'),
                    Some(other) => s.push(other),
                    None => return Err(ParseError::UnterminatedString),
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn number(&mut self, start: char) -> Result<Token, ParseError> {
        let mut text = start.to_string();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            text.push(self.advance());
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push(self.advance());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push(self.advance());
            }
            return text.parse::<f64>().map(Token::Real).map_err(|_| ParseError::InvalidNumberFormat(text));
        }
        text.parse::<i64>().map(Token::Integer).map_err(|_| ParseError::InvalidNumberFormat(text))
    }

    fn identifier(&mut self, start: char) -> Token {
        let mut text = start.to_string();
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            text.push(self.advance());
        }
        Token::Identifier(text)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.advance();
            }
            if self.peek() == Some('#') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    fn advance(&mut self) -> char {
        let c = self.input[self.current];
        self.current += 1;
        c
    }

    fn advance_opt(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += 1;
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        if self.match_char(expected) {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.peek().map(|c| c.to_string()).unwrap_or_else(|| "EOF".to_string()),
            })
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.current).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.current + offset).copied()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(s: &str) -> Vec<Token> {
        Lexer::new(s).tokenize().unwrap()
    }

    #[test]
    fn lexes_atoms() {
        assert_eq!(lex("42"), vec![Token::Integer(42), Token::Eof]);
        assert_eq!(lex("3.5"), vec![Token::Real(3.5), Token::Eof]);
        assert_eq!(lex("foo"), vec![Token::Identifier("foo".into()), Token::Eof]);
        assert_eq!(lex("\"hi\\n\""), vec![Token::Str("hi\n".into()), Token::Eof]);
    }

    #[test]
    fn lexes_blanks_by_underscore_count() {
        assert_eq!(lex("_"), vec![Token::Blank1, Token::Eof]);
        assert_eq!(lex("__"), vec![Token::Blank2, Token::Eof]);
        assert_eq!(lex("___"), vec![Token::Blank3, Token::Eof]);
        assert!(matches!(Lexer::new("____").tokenize(), Err(ParseError::IllegalUnderscoreRun(4))));
    }

    #[test]
    fn lexes_longest_operator_match_first() {
        assert_eq!(lex("=!="), vec![Token::UnsameQ, Token::Eof]);
        assert_eq!(lex("==="), vec![Token::SameQ, Token::Eof]);
        assert_eq!(lex("=="), vec![Token::Equal, Token::Eof]);
        assert_eq!(lex(":="), vec![Token::SetDelayed, Token::Eof]);
        assert_eq!(lex("=."), vec![Token::UnsetOp, Token::Eof]);
        assert_eq!(lex("<="), vec![Token::LessEqual, Token::Eof]);
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(lex("1 # a comment\n+ 2"), vec![Token::Integer(1), Token::Plus, Token::Integer(2), Token::Eof]);
    }

    #[test]
    fn bare_dot_is_not_a_recognized_token() {
        // The grammar has no member-access or statement-terminator use of
        // `.`; a lone dot is simply an unexpected character.
        assert!(Lexer::new("1 . 2").tokenize().is_err());
    }
}
