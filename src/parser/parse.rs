//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! the error type, token cursor helpers and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The grammar productions live in `declarations`, which extends [`Parser`]
//! with its own `impl` block. The parser makes a single left-to-right pass with
//! one token of look-ahead and never backtracks.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {location}: expected {expected}, found {found}")]
pub struct ParseError {
    /// What the grammar production wanted, e.g. `'{' after struct name`
    pub expected: String,
    /// Display form of the offending token
    pub found: String,
    pub location: SourceLocation,
}

/// Recursive descent parser for annotated declarations
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    /// Build a parser over an already lexed token stream.
    ///
    /// An `Eof` token is appended if the stream does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let location = tokens.last().map(|t| t.location).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                location,
                len: 0,
            });
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Lex `source` and build a parser over the result.
    pub fn from_source(source: &str) -> Result<Self, LexError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::new(tokens))
    }

    /// Parse the entire file
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();
        let mut namespace = Vec::new();

        while !self.is_at_end() {
            self.parse_item(&mut namespace, &mut program)?;
        }

        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        // Eof is always last, so clamping keeps peek total
        let idx = self.position.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        tok
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn check_punct(&self, text: &str) -> bool {
        self.peek().is_punct(text)
    }

    pub(crate) fn check_keyword(&self, text: &str) -> bool {
        self.peek().is_keyword(text)
    }

    pub(crate) fn check_grouper(&self, ch: char) -> bool {
        self.peek().is_grouper(ch)
    }

    pub(crate) fn match_punct(&mut self, text: &str) -> bool {
        if self.check_punct(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError {
            expected: expected.into(),
            found: self.peek().to_string(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_punct(&mut self, text: &str, context: &str) -> Result<Token, ParseError> {
        if self.check_punct(text) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("'{}' {}", text, context)))
        }
    }

    pub(crate) fn expect_grouper(&mut self, ch: char, context: &str) -> Result<Token, ParseError> {
        if self.check_grouper(ch) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("'{}' {}", ch, context)))
        }
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<Token, ParseError> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.error(format!("identifier {}", context)))
        }
    }

    pub(crate) fn expect_integer(&mut self, context: &str) -> Result<u32, ParseError> {
        if self.peek().kind == TokenKind::Integer {
            if let Some(value) = crate::parser::lexer::parse_integer(&self.peek().text) {
                self.advance();
                return Ok(value);
            }
        }
        Err(self.error(format!("non-negative integer {}", context)))
    }
}
