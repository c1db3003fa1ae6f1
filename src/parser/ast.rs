// AST definitions for the declaration subset

use std::fmt;

/// Source location information for error reporting
///
/// `offset` is a byte offset into the source text; `line` and `column` are
/// 1-based and counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line, self.column, self.offset
        )
    }
}

/// A type name as written, e.g. `float4` or `DirectX::XMFLOAT4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub segments: Vec<String>,
    pub location: SourceLocation,
}

impl TypeName {
    /// The qualified spelling, segments joined with `::`.
    pub fn qualified(&self) -> String {
        self.segments.join("::")
    }

    /// The last path segment.
    pub fn base(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Structured form of a marker macro attached to a field or aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// `SEMANTIC(NAME)`
    Semantic(String),
    /// `REGISTER(n)`
    Register(u32),
    /// `INSTANCE_DATA(n)`
    InstanceData(u32),
}

/// A field declaration inside a struct body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: TypeName,
    pub annotations: Vec<Annotation>,
    pub location: SourceLocation,
}

impl FieldDecl {
    pub fn semantic(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Semantic(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn register(&self) -> Option<u32> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Register(n) => Some(*n),
            _ => None,
        })
    }

    pub fn instance_step_rate(&self) -> Option<u32> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::InstanceData(n) => Some(*n),
            _ => None,
        })
    }
}

/// `struct Name [REGISTER(n)] { fields };`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    /// Enclosing namespace path, outermost first
    pub namespace: Vec<String>,
    pub alignment: Option<u32>,
    pub register: Option<u32>,
    pub fields: Vec<FieldDecl>,
    pub location: SourceLocation,
}

impl StructDecl {
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// `using Alias = Target;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDecl {
    pub alias: String,
    pub namespace: Vec<String>,
    pub target: TypeName,
    pub location: SourceLocation,
}

/// Top-level declaration, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Alias(AliasDecl),
    Struct(StructDecl),
}

/// A parsed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            declarations: Vec::new(),
        }
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Struct(s) => Some(s),
            _ => None,
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = &AliasDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Alias(a) => Some(a),
            _ => None,
        })
    }
}

pub(crate) fn qualify(namespace: &[String], name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace.join("::"), name)
    }
}
