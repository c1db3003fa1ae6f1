//! # Introduction
//!
//! shaderdecl reads C++ headers that declare GPU-facing structs, annotated
//! with no-op marker macros, and emits the matching shader-dialect
//! declarations plus an in-memory catalog of byte offsets, sizes and
//! semantics. A terminal browser built with [ratatui](https://docs.rs/ratatui)
//! shows the catalog next to the generated text.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Tokenizer → Lexer → Parser → Catalog → Layout → Generated text
//! ```
//!
//! 1. [`parser`]: tokenises the header and builds a declaration AST.
//! 2. [`interpreter`]: resolves types through aliases and the built-in
//!    table, lays out each aggregate under the
//!    [`OutputKind`](interpreter::catalog::OutputKind) its source was added
//!    as, and emits text per kind.
//! 3. [`ui`]: ratatui-based catalog browser; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use shaderdecl::interpreter::catalog::OutputKind;
//! use shaderdecl::interpreter::engine::Interpreter;
//!
//! let mut session = Interpreter::new();
//! session
//!     .parse_source("struct CB REGISTER(0) { float4 color; };", OutputKind::ConstantBuffer)
//!     .unwrap();
//! let text = &session.generate(OutputKind::ConstantBuffer).unwrap().text;
//! assert!(text.contains("cbuffer CB : register(b0)"));
//! ```

pub mod interpreter;
pub mod parser;
pub mod ui;
