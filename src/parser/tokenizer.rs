//! Grammar-agnostic tokenizer
//!
//! Converts source text into a flat list of [`RawToken`]s using nothing but a
//! [`LexerConfig`] table: delimiters, quotes, grouping pairs, skip prefixes and
//! punctuators. It has no idea what a `struct` is; classifying words into
//! keywords and identifiers is left to [`super::lexer`].
//!
//! # Scanning rules
//!
//! - Delimiters end the current word and are dropped.
//! - A quote character starts a literal that runs to the next unescaped
//!   matching quote.
//! - The escape character suppresses quote/grouping recognition for the
//!   character after it.
//! - Grouping characters must balance; the open/close stack is checked as the
//!   scan proceeds and once more at end of input.
//! - Line-skip prefixes discard text to end of line, block-skip pairs discard
//!   text up to the matching close marker.
//! - The statement terminator is always emitted as its own token.

use super::ast::SourceLocation;
use rustc_hash::FxHashSet;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Why a region of text was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipTag {
    Comment,
    Preprocessor,
}

/// Tokenizer configuration table
///
/// Built once with the `with_*` methods and read-only afterwards.
#[derive(Debug, Clone)]
pub struct LexerConfig {
    terminator: char,
    escape: char,
    delimiters: Vec<char>,
    line_skips: Vec<(String, SkipTag)>,
    block_skips: Vec<(String, String, SkipTag)>,
    groupers: Vec<(char, char)>,
    quotes: Vec<char>,
    punctuators: Vec<String>,
    keywords: FxHashSet<String>,
}

impl LexerConfig {
    pub fn new(terminator: char, escape: char) -> Self {
        LexerConfig {
            terminator,
            escape,
            delimiters: Vec::new(),
            line_skips: Vec::new(),
            block_skips: Vec::new(),
            groupers: Vec::new(),
            quotes: Vec::new(),
            punctuators: Vec::new(),
            keywords: FxHashSet::default(),
        }
    }

    pub fn with_delimiters(mut self, delimiters: &str) -> Self {
        self.delimiters.extend(delimiters.chars());
        self
    }

    pub fn with_line_skip(mut self, prefix: &str, tag: SkipTag) -> Self {
        self.line_skips.push((prefix.to_string(), tag));
        self
    }

    pub fn with_block_skip(mut self, open: &str, close: &str, tag: SkipTag) -> Self {
        self.block_skips
            .push((open.to_string(), close.to_string(), tag));
        self
    }

    pub fn with_grouper(mut self, open: char, close: char) -> Self {
        self.groupers.push((open, close));
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quotes.push(quote);
        self
    }

    /// Add a punctuator. Longer punctuators always win over their prefixes.
    pub fn with_punctuator(mut self, punct: &str) -> Self {
        self.punctuators.push(punct.to_string());
        self.punctuators
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keywords.insert(keyword.to_string());
        self
    }

    pub fn terminator(&self) -> char {
        self.terminator
    }

    pub fn escape(&self) -> char {
        self.escape
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    fn is_delimiter(&self, ch: char) -> bool {
        self.delimiters.contains(&ch)
    }

    fn is_quote(&self, ch: char) -> bool {
        self.quotes.contains(&ch)
    }

    fn closer_for(&self, open: char) -> Option<char> {
        self.groupers
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, c)| *c)
    }

    fn is_closer(&self, ch: char) -> bool {
        self.groupers.iter().any(|(_, c)| *c == ch)
    }

    fn line_skip_at(&self, rest: &str) -> Option<&(String, SkipTag)> {
        self.line_skips.iter().find(|(p, _)| rest.starts_with(p.as_str()))
    }

    fn block_skip_at(&self, rest: &str) -> Option<&(String, String, SkipTag)> {
        self.block_skips
            .iter()
            .find(|(open, _, _)| rest.starts_with(open.as_str()))
    }

    fn punctuator_at(&self, rest: &str) -> Option<&str> {
        self.punctuators
            .iter()
            .find(|p| rest.starts_with(p.as_str()))
            .map(String::as_str)
    }
}

/// Grammar-agnostic token category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Word,
    Punctuator,
    Terminator,
    GroupOpen,
    GroupClose,
    Literal,
}

/// A token before keyword classification
///
/// `start`/`len` is the byte span in the source. `text` is owned because
/// escapes and quotes make it differ from the raw span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub kind: RawKind,
    pub text: String,
    pub start: usize,
    pub len: usize,
}

/// A region of text that produced no tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRegion {
    pub tag: SkipTag,
    pub start: usize,
    pub len: usize,
}

/// Result of a complete tokenizer run
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: Vec<RawToken>,
    pub skipped: Vec<SkippedRegion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedComment,
    /// A grouping character was opened and never closed
    UnclosedGroup(char),
    /// A closing character with no open group, or closing the wrong one
    UnexpectedClose { found: char, expected: Option<char> },
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            LexErrorKind::UnterminatedComment => write!(f, "unterminated block comment"),
            LexErrorKind::UnclosedGroup(open) => write!(f, "unmatched '{}'", open),
            LexErrorKind::UnexpectedClose {
                found,
                expected: Some(expected),
            } => write!(f, "found '{}' while expecting '{}'", found, expected),
            LexErrorKind::UnexpectedClose {
                found,
                expected: None,
            } => write!(f, "unmatched '{}'", found),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at {location}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

/// Byte offset → line/column lookup
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex {
            source,
            line_starts,
        }
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[line];
        let end = offset.min(self.source.len());
        let column = self
            .source
            .get(line_start..end)
            .map(|s| s.chars().count())
            .unwrap_or(end - line_start)
            + 1;
        SourceLocation::new(offset, line + 1, column)
    }
}

/// Single-use tokenizer over one source buffer
pub struct Tokenizer<'a> {
    source: &'a str,
    config: &'a LexerConfig,
    lines: LineIndex<'a>,
    position: usize,
    /// Open groups: (expected closer, opener, offset of opener)
    groups: Vec<(char, char, usize)>,
    word: String,
    word_start: usize,
    out: Tokenized,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, config: &'a LexerConfig) -> Self {
        Tokenizer {
            source,
            config,
            lines: LineIndex::new(source),
            position: 0,
            groups: Vec::new(),
            word: String::new(),
            word_start: 0,
            out: Tokenized::default(),
        }
    }

    /// Tokenize the entire input
    pub fn run(mut self) -> Result<Tokenized, LexError> {
        let config = self.config;
        let source = self.source;

        while let Some(ch) = self.peek() {
            let rest = &source[self.position..];

            if let Some((open, close, tag)) = config.block_skip_at(rest) {
                self.flush_word();
                self.skip_block(open.len(), close, *tag)?;
                continue;
            }

            if let Some((prefix, tag)) = config.line_skip_at(rest) {
                self.flush_word();
                self.skip_line(prefix.len(), *tag);
                continue;
            }

            if ch == config.escape {
                self.escaped_char();
                continue;
            }

            if config.is_delimiter(ch) {
                self.flush_word();
                self.advance();
                continue;
            }

            if config.is_quote(ch) {
                self.flush_word();
                self.literal(ch)?;
                continue;
            }

            if let Some(close) = config.closer_for(ch) {
                self.flush_word();
                self.groups.push((close, ch, self.position));
                self.emit_char(RawKind::GroupOpen, ch);
                continue;
            }

            if config.is_closer(ch) {
                self.flush_word();
                self.close_group(ch)?;
                continue;
            }

            if ch == config.terminator {
                self.flush_word();
                self.emit_char(RawKind::Terminator, ch);
                continue;
            }

            if let Some(punct) = config.punctuator_at(rest) {
                self.flush_word();
                let start = self.position;
                self.position += punct.len();
                self.out.tokens.push(RawToken {
                    kind: RawKind::Punctuator,
                    text: punct.to_string(),
                    start,
                    len: punct.len(),
                });
                continue;
            }

            if self.word.is_empty() {
                self.word_start = self.position;
            }
            self.word.push(ch);
            self.advance();
        }

        self.flush_word();

        if let Some(&(_, open, offset)) = self.groups.last() {
            return Err(self.error(LexErrorKind::UnclosedGroup(open), offset));
        }

        trace!(
            tokens = self.out.tokens.len(),
            skipped = self.out.skipped.len(),
            "tokenized"
        );
        Ok(self.out)
    }

    fn close_group(&mut self, ch: char) -> Result<(), LexError> {
        let top = self.groups.last().copied();
        match top {
            Some((expected, _, _)) if expected == ch => {
                self.groups.pop();
                self.emit_char(RawKind::GroupClose, ch);
                Ok(())
            }
            Some((expected, _, _)) => Err(self.error(
                LexErrorKind::UnexpectedClose {
                    found: ch,
                    expected: Some(expected),
                },
                self.position,
            )),
            None => Err(self.error(
                LexErrorKind::UnexpectedClose {
                    found: ch,
                    expected: None,
                },
                self.position,
            )),
        }
    }

    /// Escape outside a literal: the next character joins the current word verbatim.
    fn escaped_char(&mut self) {
        if self.word.is_empty() {
            self.word_start = self.position;
        }
        self.advance();
        if let Some(next) = self.advance() {
            self.word.push(next);
        }
    }

    /// Quoted literal; the token text excludes the quotes and escape characters.
    fn literal(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.position;
        self.advance();
        let mut text = String::new();

        loop {
            match self.advance() {
                None => return Err(self.error(LexErrorKind::UnterminatedString, start)),
                Some(c) if c == self.config.escape => match self.advance() {
                    Some(next) => text.push(next),
                    None => return Err(self.error(LexErrorKind::UnterminatedString, start)),
                },
                Some(c) if c == quote => break,
                Some(c) => text.push(c),
            }
        }

        self.out.tokens.push(RawToken {
            kind: RawKind::Literal,
            text,
            start,
            len: self.position - start,
        });
        Ok(())
    }

    fn skip_line(&mut self, prefix_len: usize, tag: SkipTag) {
        let start = self.position;
        self.position += prefix_len;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
        self.record_skip(tag, start);
    }

    fn skip_block(&mut self, open_len: usize, close: &str, tag: SkipTag) -> Result<(), LexError> {
        let start = self.position;
        let body = start + open_len;
        let source = self.source;
        match source[body..].find(close) {
            Some(rel) => {
                self.position = body + rel + close.len();
                self.record_skip(tag, start);
                Ok(())
            }
            None => Err(self.error(LexErrorKind::UnterminatedComment, start)),
        }
    }

    fn record_skip(&mut self, tag: SkipTag, start: usize) {
        trace!(?tag, start, end = self.position, "skipped region");
        self.out.skipped.push(SkippedRegion {
            tag,
            start,
            len: self.position - start,
        });
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.word);
        self.out.tokens.push(RawToken {
            kind: RawKind::Word,
            text,
            start: self.word_start,
            len: self.position - self.word_start,
        });
    }

    fn emit_char(&mut self, kind: RawKind, ch: char) {
        let start = self.position;
        self.advance();
        self.out.tokens.push(RawToken {
            kind,
            text: ch.to_string(),
            start,
            len: ch.len_utf8(),
        });
    }

    fn error(&self, kind: LexErrorKind, offset: usize) -> LexError {
        LexError {
            kind,
            location: self.lines.location(offset),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }
}
