//! DSL tokenizer.
//!
//! Splits DSL text into terminals. Field names, indicator names, word
//! operators and logic connectors are separate token classes, so the parser
//! decides between "a field" and "the start of an indicator call" from a
//! single token of lookahead. Words are classified case-insensitively; any
//! word that is not a label, field, operator or connector is an indicator
//! name, and the AST builder checks it against the registry.

use crate::domain::error::ParseError;
use crate::domain::ohlcv::PriceField;
use crate::domain::rule::{CompareOp, LogicOp};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    EntryLabel,
    ExitLabel,
    Field,
    IndicatorName,
    Number,
    Operator,
    Logic,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::EntryLabel => "'ENTRY:'",
            TokenKind::ExitLabel => "'EXIT:'",
            TokenKind::Field => "field",
            TokenKind::IndicatorName => "indicator name",
            TokenKind::Number => "number",
            TokenKind::Operator => "comparison operator",
            TokenKind::Logic => "AND/OR",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; words are uppercased.
    pub text: String,
    /// Byte offset of the first character.
    pub position: usize,
}

impl Token {
    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        if self.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            self.text.clone()
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            position: start,
        }
    }

    fn error(&self, message: String, token: String, position: usize) -> ParseError {
        ParseError {
            message,
            token,
            position,
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        let ch = match self.peek() {
            Some(ch) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    position: start,
                });
            }
        };

        match ch {
            '(' => {
                self.advance();
                Ok(self.token(TokenKind::LParen, start))
            }
            ')' => {
                self.advance();
                Ok(self.token(TokenKind::RParen, start))
            }
            ',' => {
                self.advance();
                Ok(self.token(TokenKind::Comma, start))
            }
            '>' | '<' | '=' | '!' => self.lex_symbol_operator(start),
            c if c.is_ascii_digit() || c == '.' => self.lex_number(start),
            '-' | '+' if self
                .peek_second()
                .is_some_and(|c| c.is_ascii_digit() || c == '.') =>
            {
                self.lex_number(start)
            }
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(start),
            other => Err(self.error(
                format!("unexpected character '{}'", other),
                other.to_string(),
                start,
            )),
        }
    }

    fn lex_symbol_operator(&mut self, start: usize) -> Result<Token, ParseError> {
        for symbol in [">=", "<=", "==", "!=", ">", "<"] {
            if self.remaining().starts_with(symbol) {
                self.pos += symbol.len();
                return Ok(self.token(TokenKind::Operator, start));
            }
        }
        let found: String = self
            .remaining()
            .chars()
            .take_while(|c| matches!(c, '>' | '<' | '=' | '!'))
            .collect();
        Err(self.error(format!("unknown operator '{}'", found), found, start))
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, ParseError> {
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }

        let mut digits = 0;
        let mut has_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits > 0 && matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.pos;
            self.advance();
            if matches!(self.peek(), Some('-') | Some('+')) {
                self.advance();
            }
            let mut exp_digits = 0;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                exp_digits += 1;
                self.advance();
            }
            if exp_digits == 0 {
                self.pos = mark;
            }
        }

        let text = &self.input[start..self.pos];
        if digits == 0 {
            return Err(self.error(
                format!("invalid number '{}'", text),
                text.to_string(),
                start,
            ));
        }
        if self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            let tail: String = self
                .remaining()
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            let found = format!("{}{}", text, tail);
            return Err(self.error(format!("invalid number '{}'", found), found, start));
        }
        Ok(self.token(TokenKind::Number, start))
    }

    fn lex_word(&mut self, start: usize) -> Result<Token, ParseError> {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let word = self.input[start..self.pos].to_ascii_uppercase();

        if self.peek() == Some(':') && (word == "ENTRY" || word == "EXIT") {
            self.advance();
            let kind = if word == "ENTRY" {
                TokenKind::EntryLabel
            } else {
                TokenKind::ExitLabel
            };
            return Ok(Token {
                kind,
                text: format!("{}:", word),
                position: start,
            });
        }

        let kind = if PriceField::from_name(&word).is_some() {
            TokenKind::Field
        } else if CompareOp::from_token(&word).is_some() {
            TokenKind::Operator
        } else if LogicOp::from_token(&word).is_some() {
            TokenKind::Logic
        } else {
            TokenKind::IndicatorName
        };

        Ok(Token {
            kind,
            text: word,
            position: start,
        })
    }
}

/// Tokenize DSL text. The result always ends with a single `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
