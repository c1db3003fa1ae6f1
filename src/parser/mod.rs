//! Annotated declaration parser
//!
//! This module transforms header text into a declaration AST:
//! - [`tokenizer`]: Grammar-agnostic scanning driven by a [`LexerConfig`](tokenizer::LexerConfig)
//! - [`lexer`]: The fixed declaration configuration and token classification
//! - [`parse`] / `declarations`: Recursive descent over the token stream
//! - [`ast`]: Declaration node definitions
//!
//! # Supported Subset
//!
//! - `namespace` blocks, possibly nested or written as `a::b`
//! - `struct` / `class` bodies of plain field declarations, with optional `alignas(N)`
//! - `using Alias = Type;`
//! - Marker macros `SEMANTIC(name)`, `REGISTER(n)` and `INSTANCE_DATA(n)`
//! - Comments and preprocessor lines are skipped
//!
//! No expressions, templates, methods or initializers.

pub mod ast;
mod declarations;
pub mod lexer;
pub mod parse;
pub mod tokenizer;
