//! Lexer for the declaration subset
//!
//! Runs the generic [`Tokenizer`] with the fixed [`LexerConfig::declarations`]
//! table and classifies each raw word as a keyword, identifier or integer.
//! Comments and preprocessor lines are dropped by the tokenizer; the regions
//! are kept in [`Lexer::skipped`] for diagnostics.

use super::ast::SourceLocation;
use super::tokenizer::{LineIndex, RawKind, SkipTag, SkippedRegion, Tokenizer};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

pub use super::tokenizer::{LexError, LexErrorKind, LexerConfig};

/// Marker macro attaching an explicit semantic name to a field
pub const SEMANTIC_MARKER: &str = "SEMANTIC";
/// Marker macro carrying a register index (input slot on fields, binding slot on aggregates)
pub const REGISTER_MARKER: &str = "REGISTER";
/// Marker macro carrying a per-instance step rate
pub const INSTANCE_DATA_MARKER: &str = "INSTANCE_DATA";

static DECLARATION_CONFIG: LazyLock<LexerConfig> = LazyLock::new(LexerConfig::declarations);

impl LexerConfig {
    /// The table used for annotated struct headers.
    pub fn declarations() -> Self {
        let mut config = LexerConfig::new(';', '\\')
            .with_delimiters(" \t\r\n\x0c\x0b")
            .with_line_skip("//", SkipTag::Comment)
            .with_line_skip("#", SkipTag::Preprocessor)
            .with_block_skip("/*", "*/", SkipTag::Comment)
            .with_grouper('(', ')')
            .with_grouper('{', '}')
            .with_grouper('[', ']')
            .with_quote('"')
            .with_quote('\'');

        for punct in ["::", ":", "=", ",", "<", ">", "*", "&", ".", "-", "+"] {
            config = config.with_punctuator(punct);
        }
        for keyword in [
            "namespace",
            "struct",
            "class",
            "using",
            "alignas",
            "public",
            "private",
            "protected",
        ] {
            config = config.with_keyword(keyword);
        }
        config
    }

    /// Shared instance of [`LexerConfig::declarations`].
    pub fn shared() -> &'static LexerConfig {
        &DECLARATION_CONFIG
    }
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    /// A word starting with a digit
    Integer,
    /// Multi-character punctuators and the statement terminator
    Punctuator,
    /// `(`, `)`, `{`, `}`, `[`, `]`
    Grouper,
    StringLiteral,
    /// A word that is neither an identifier nor a number
    Unknown,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer literal",
            TokenKind::Punctuator => "punctuator",
            TokenKind::Grouper => "grouping character",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Unknown => "unrecognized text",
            TokenKind::Eof => "end of file",
        };
        f.write_str(name)
    }
}

/// A classified lexeme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
    /// Byte length of the source span
    pub len: usize,
}

impl Token {
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.is(TokenKind::Punctuator, text)
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Keyword, text)
    }

    pub fn is_grouper(&self, ch: char) -> bool {
        self.kind == TokenKind::Grouper && self.text.starts_with(ch)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Keyword | TokenKind::Punctuator | TokenKind::Grouper => {
                write!(f, "'{}'", self.text)
            }
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::StringLiteral => write!(f, "string literal \"{}\"", self.text),
            kind => write!(f, "{} '{}'", kind, self.text),
        }
    }
}

/// Lexer for annotated declaration headers
pub struct Lexer<'a> {
    source: &'a str,
    config: &'a LexerConfig,
    tokens: Vec<Token>,
    skipped: Vec<SkippedRegion>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, LexerConfig::shared())
    }

    pub fn with_config(source: &'a str, config: &'a LexerConfig) -> Self {
        Lexer {
            source,
            config,
            tokens: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Run tokenization to completion.
    ///
    /// On failure no tokens are retained.
    pub fn execute(&mut self) -> Result<(), LexError> {
        self.tokens.clear();
        self.skipped.clear();

        let raw = Tokenizer::new(self.source, self.config).run()?;
        let lines = LineIndex::new(self.source);

        let mut tokens = Vec::with_capacity(raw.tokens.len() + 1);
        for tok in raw.tokens {
            let kind = match tok.kind {
                RawKind::Word => self.classify_word(&tok.text),
                RawKind::Punctuator | RawKind::Terminator => TokenKind::Punctuator,
                RawKind::GroupOpen | RawKind::GroupClose => TokenKind::Grouper,
                RawKind::Literal => TokenKind::StringLiteral,
            };
            tokens.push(Token {
                kind,
                text: tok.text,
                location: lines.location(tok.start),
                len: tok.len,
            });
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            location: lines.location(self.source.len()),
            len: 0,
        });

        debug!(
            tokens = tokens.len(),
            skipped = raw.skipped.len(),
            "lexed declaration source"
        );
        self.tokens = tokens;
        self.skipped = raw.skipped;
        Ok(())
    }

    /// Tokenize the entire input and hand back the token stream.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        self.execute()?;
        Ok(std::mem::take(&mut self.tokens))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn skipped(&self) -> &[SkippedRegion] {
        &self.skipped
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        let mut chars = word.chars();
        match chars.next() {
            _ if self.config.is_keyword(word) => TokenKind::Keyword,
            Some(c) if c.is_ascii_digit() => TokenKind::Integer,
            Some(c) if c.is_alphabetic() || c == '_' => {
                if chars.all(|c| c.is_alphanumeric() || c == '_') {
                    TokenKind::Identifier
                } else {
                    TokenKind::Unknown
                }
            }
            _ => TokenKind::Unknown,
        }
    }
}

/// Parse an integer literal: decimal or `0x` hex, with an optional `u`/`U` suffix.
pub fn parse_integer(text: &str) -> Option<u32> {
    let digits = text.trim_end_matches(['u', 'U']);
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        digits.parse::<u32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("struct S { float4 _p; };");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Grouper,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Punctuator,
                TokenKind::Grouper,
                TokenKind::Punctuator,
                TokenKind::Eof,
            ]
        );
        assert!(tokens[0].is_keyword("struct"));
        assert!(tokens[5].is_punct(";"));
    }

    #[test]
    fn test_markers_and_numbers() {
        let mut lexer = Lexer::new("REGISTER(0x10) INSTANCE_DATA(1u)");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Integer);
        assert_eq!(parse_integer(&tokens[2].text), Some(16));
        assert_eq!(parse_integer(&tokens[6].text), Some(1));
        assert_eq!(parse_integer("12abc"), None);
    }

    #[test]
    fn test_comments_and_preprocessor() {
        let mut lexer = Lexer::new("#pragma once\n// note\nusing A = B; /* x */");
        lexer.execute().unwrap();
        let texts: Vec<&str> = lexer.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["using", "A", "=", "B", ";", ""]);
        assert_eq!(lexer.skipped().len(), 3);
        assert_eq!(lexer.skipped()[0].tag, SkipTag::Preprocessor);
    }

    #[test]
    fn test_locations() {
        let mut lexer = Lexer::new("namespace a\n{\n  struct B {};\n}");
        let tokens = lexer.tokenize().unwrap();
        let strukt = &tokens[3];
        assert!(strukt.is_keyword("struct"));
        assert_eq!(strukt.location.line, 3);
        assert_eq!(strukt.location.column, 3);
        assert_eq!(strukt.location.offset, 16);
    }

    #[test]
    fn test_failure_discards_tokens() {
        let mut lexer = Lexer::new("struct S {");
        assert!(lexer.execute().is_err());
        assert!(lexer.tokens().is_empty());

        let mut lexer = Lexer::new("struct S { int x; };");
        lexer.execute().unwrap();
        assert!(!lexer.tokens().is_empty());
    }
}
