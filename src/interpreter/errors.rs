//! Error types for catalog construction and code generation
//!
//! [`CompileError`] is the single failure type returned by the
//! [`Interpreter`](crate::interpreter::engine::Interpreter) session. Lexing and
//! parsing failures are wrapped transparently; the remaining variants come from
//! type resolution and from the validation pass that runs before any text is
//! emitted.
//!
//! All errors are terminal for the call that produced them.

use crate::interpreter::catalog::OutputKind;
use crate::parser::ast::SourceLocation;
use crate::parser::lexer::LexError;
use crate::parser::parse::ParseError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Unterminated literal or comment, or unbalanced grouping
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Unexpected token
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Two aggregates share a name within one catalog
    #[error("duplicate type '{name}' at {location}, first declared at {first}")]
    DuplicateType {
        name: String,
        location: SourceLocation,
        first: SourceLocation,
    },

    /// `using` names a target that is neither built in nor a known alias
    #[error("alias '{alias}' at {location} refers to unknown type '{target}'")]
    UnresolvedAlias {
        alias: String,
        target: String,
        location: SourceLocation,
    },

    /// A field type with no mapping to the shader dialect
    #[error("field '{field}' of '{aggregate}' at {location} has unknown type '{type_name}'")]
    UnknownType {
        type_name: String,
        field: String,
        aggregate: String,
        location: SourceLocation,
    },

    /// A vertex input field whose semantic is empty or starts with a digit
    #[error("field '{field}' of '{aggregate}' at {location} has no usable semantic ('{semantic}')")]
    InvalidSemantic {
        field: String,
        aggregate: String,
        semantic: String,
        location: SourceLocation,
    },

    /// Two aggregates of the same output kind claim one binding slot
    #[error("{kind} '{second}' at {location} claims register {slot}, already bound to '{first}'")]
    RegisterConflict {
        kind: OutputKind,
        slot: String,
        first: String,
        second: String,
        location: SourceLocation,
        /// Ordinal of the source text `location` refers to
        source_index: usize,
    },

    /// Generation or a query was requested before a successful parse
    #[error("no type catalog: parse a source file first")]
    NoCatalog,
}

impl CompileError {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            CompileError::Lex(e) => Some(e.location),
            CompileError::Parse(e) => Some(e.location),
            CompileError::DuplicateType { location, .. } => Some(*location),
            CompileError::UnresolvedAlias { location, .. } => Some(*location),
            CompileError::UnknownType { location, .. } => Some(*location),
            CompileError::InvalidSemantic { location, .. } => Some(*location),
            CompileError::RegisterConflict { location, .. } => Some(*location),
            CompileError::NoCatalog => None,
        }
    }

    /// Which appended source `location()` belongs to, when the error is raised
    /// after several sources were combined into one catalog.
    pub fn source_index(&self) -> Option<usize> {
        match self {
            CompileError::RegisterConflict { source_index, .. } => Some(*source_index),
            _ => None,
        }
    }
}
