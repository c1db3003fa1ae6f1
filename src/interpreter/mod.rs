//! Type resolution and shader code generation
//!
//! This module turns a parsed [`Program`](crate::parser::ast::Program) into
//! resolved metadata and shader-dialect text:
//! - [`engine`]: The [`Interpreter`](engine::Interpreter) session and its state machine
//! - [`catalog`]: Resolved aggregates and the queries over them
//! - [`type_system`]: Built-in types, aliases, layout and semantic rules
//! - [`codegen`]: Register validation and text emission
//! - [`input_layout`]: Vertex input element lists
//! - [`errors`]: The [`CompileError`](errors::CompileError) taxonomy
//!
//! # Session Model
//!
//! A session moves `Empty → Parsed → Generated(kind)`. Any failed parse
//! returns it to `Empty`; generating another kind does not re-parse.

pub mod catalog;
pub mod codegen;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod input_layout;
pub mod type_system;
