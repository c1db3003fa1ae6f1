//! Cross-language type knowledge and layout rules
//!
//! This module is the only place that knows how host type names map to the
//! shader dialect:
//!
//! - [`builtin`] / [`lookup`]: the built-in type table (size, alignment,
//!   dialect spelling, vertex format)
//! - [`AliasTable`]: user `using` aliases rewritten to built-in names
//! - [`compute_layout`]: byte offsets and padding for each output kind
//! - [`derive_semantic`]: the fallback semantic name for an unannotated field
//!
//! # Layout Rules
//!
//! - Constant buffer: a field of 16 bytes or more, or one that would straddle a
//!   16-byte boundary, starts on the next boundary. The total is rounded up to
//!   a multiple of 16.
//! - Vertex input and structured buffer: each field is aligned to its own size,
//!   capped at 16 bytes and reduced to a power of two (`float3` aligns to 4).
//!   No tail padding unless the struct is `alignas(N)`.

use crate::interpreter::catalog::OutputKind;
use crate::interpreter::constants::{MAX_FIELD_ALIGNMENT, PACKING_BOUNDARY};
use crate::parser::ast::TypeName;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// A type the shader dialect understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinType {
    /// Spelling in the shader dialect
    pub dialect: &'static str,
    pub size: u32,
    pub align: u32,
    /// Vertex format of one row, e.g. `R32G32B32A32_FLOAT`
    pub format: &'static str,
    /// Input-layout rows; 4 for a 4x4 matrix
    pub rows: u32,
}

impl BuiltinType {
    const fn new(dialect: &'static str, size: u32, format: &'static str, rows: u32) -> Self {
        let capped = if size < MAX_FIELD_ALIGNMENT {
            size
        } else {
            MAX_FIELD_ALIGNMENT
        };
        // largest power of two dividing the capped size: float3 aligns to 4
        let align = capped & capped.wrapping_neg();
        BuiltinType {
            dialect,
            size,
            align,
            format,
            rows,
        }
    }
}

static BUILTIN_TYPES: LazyLock<FxHashMap<&'static str, BuiltinType>> = LazyLock::new(|| {
    let int = BuiltinType::new("int", 4, "R32_SINT", 1);
    let uint = BuiltinType::new("uint", 4, "R32_UINT", 1);
    let float = BuiltinType::new("float", 4, "R32_FLOAT", 1);
    let float2 = BuiltinType::new("float2", 8, "R32G32_FLOAT", 1);
    let float3 = BuiltinType::new("float3", 12, "R32G32B32_FLOAT", 1);
    let float4 = BuiltinType::new("float4", 16, "R32G32B32A32_FLOAT", 1);
    let int2 = BuiltinType::new("int2", 8, "R32G32_SINT", 1);
    let int3 = BuiltinType::new("int3", 12, "R32G32B32_SINT", 1);
    let int4 = BuiltinType::new("int4", 16, "R32G32B32A32_SINT", 1);
    let uint2 = BuiltinType::new("uint2", 8, "R32G32_UINT", 1);
    let uint3 = BuiltinType::new("uint3", 12, "R32G32B32_UINT", 1);
    let uint4 = BuiltinType::new("uint4", 16, "R32G32B32A32_UINT", 1);
    let float4x4 = BuiltinType::new("float4x4", 64, "R32G32B32A32_FLOAT", 4);

    let entries = [
        ("int", int),
        ("int32_t", int),
        ("INT", int),
        ("uint", uint),
        ("unsigned", uint),
        ("uint32_t", uint),
        ("UINT", uint),
        ("float", float),
        ("FLOAT", float),
        ("float2", float2),
        ("XMFLOAT2", float2),
        ("float3", float3),
        ("XMFLOAT3", float3),
        ("float4", float4),
        ("XMFLOAT4", float4),
        ("XMFLOAT4A", float4),
        ("XMVECTOR", float4),
        ("int2", int2),
        ("XMINT2", int2),
        ("int3", int3),
        ("XMINT3", int3),
        ("int4", int4),
        ("XMINT4", int4),
        ("uint2", uint2),
        ("XMUINT2", uint2),
        ("uint3", uint3),
        ("XMUINT3", uint3),
        ("uint4", uint4),
        ("XMUINT4", uint4),
        ("float4x4", float4x4),
        ("XMFLOAT4X4", float4x4),
        ("XMFLOAT4X4A", float4x4),
        ("XMMATRIX", float4x4),
        ("matrix", float4x4),
        ("vector", float4),
        ("DWORD", uint),
    ];
    entries.into_iter().collect()
});

/// Look up a built-in type by exact spelling.
pub fn builtin(name: &str) -> Option<&'static BuiltinType> {
    BUILTIN_TYPES.get(name)
}

/// Look up a possibly qualified name: the full spelling first, then its last segment.
pub fn lookup(qualified: &str) -> Option<&'static BuiltinType> {
    builtin(qualified).or_else(|| {
        qualified
            .rsplit("::")
            .next()
            .filter(|base| *base != qualified)
            .and_then(builtin)
    })
}

/// User aliases, rewritten to the built-in spelling they stand for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    rewrites: FxHashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` (both its short and qualified spelling) for `target`.
    ///
    /// Returns `None` when the target is neither built in nor a known alias.
    pub fn define(
        &mut self,
        alias: &str,
        qualified_alias: &str,
        target: &TypeName,
    ) -> Option<&str> {
        let canonical = self.canonical(target)?;
        self.rewrites.insert(alias.to_string(), canonical.clone());
        self.rewrites.insert(qualified_alias.to_string(), canonical);
        self.rewrites.get(alias).map(String::as_str)
    }

    /// Resolve a type name to its built-in spelling through any aliases.
    pub fn canonical(&self, name: &TypeName) -> Option<String> {
        let qualified = name.qualified();
        if let Some(target) = self
            .rewrites
            .get(&qualified)
            .or_else(|| self.rewrites.get(name.base()))
        {
            return Some(target.clone());
        }
        lookup(&qualified).map(|_| qualified)
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.rewrites.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }
}

/// Where one field lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPlacement {
    pub offset: u32,
    /// Implicit padding inserted immediately before the field
    pub padding_before: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub placements: Vec<FieldPlacement>,
    pub size: u32,
    pub tail_padding: u32,
}

fn align_up(value: u32, align: u32) -> u32 {
    let align = align.max(1);
    value.div_ceil(align) * align
}

/// Place fields given as `(size, align)` pairs under the rules of `kind`.
pub fn compute_layout(kind: OutputKind, fields: &[(u32, u32)], alignment: Option<u32>) -> Layout {
    let mut placements = Vec::with_capacity(fields.len());
    let mut offset = 0;

    for &(size, align) in fields {
        let start = match kind {
            OutputKind::ConstantBuffer => {
                let used = offset % PACKING_BOUNDARY;
                if size >= PACKING_BOUNDARY || used + size > PACKING_BOUNDARY {
                    align_up(offset, PACKING_BOUNDARY)
                } else {
                    offset
                }
            }
            OutputKind::VertexInput | OutputKind::StructuredBuffer => align_up(offset, align),
        };
        placements.push(FieldPlacement {
            offset: start,
            padding_before: start - offset,
        });
        offset = start + size;
    }

    let mut size = match kind {
        OutputKind::ConstantBuffer => align_up(offset, PACKING_BOUNDARY),
        _ => offset,
    };
    if let Some(a) = alignment {
        // Constant buffers never shrink below their 16-byte rows
        let boundary = match kind {
            OutputKind::ConstantBuffer => a.max(PACKING_BOUNDARY),
            _ => a,
        };
        size = align_up(size, boundary);
    }

    Layout {
        placements,
        size,
        tail_padding: size - offset,
    }
}

/// Fallback semantic for an unannotated field.
///
/// Leading underscores are stripped, other non-alphanumeric characters
/// dropped, and the rest upper-cased: `_position` → `POSITION`.
pub fn derive_semantic(identifier: &str) -> String {
    identifier
        .trim_start_matches('_')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Whether `semantic` can be emitted after a `:` in a vertex input struct.
///
/// Names derived from `_` or `_0` come out empty or numeric, which the shader
/// compiler rejects.
pub fn is_valid_semantic(semantic: &str) -> bool {
    semantic
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Split a trailing decimal run off a semantic: `TEXCOORD1` → (`TEXCOORD`, 1).
pub fn split_semantic_index(semantic: &str) -> (&str, u32) {
    let name = semantic.trim_end_matches(|c: char| c.is_ascii_digit());
    let index = semantic[name.len()..].parse().unwrap_or(0);
    (name, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::SourceLocation;

    fn type_name(s: &str) -> TypeName {
        TypeName {
            segments: s.split("::").map(str::to_string).collect(),
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin("float4x4").unwrap().size, 64);
        assert_eq!(lookup("DirectX::XMFLOAT3").unwrap().dialect, "float3");
        assert_eq!(lookup("XMFLOAT4X4").unwrap().align, 16);
        assert_eq!(lookup("float3").unwrap().align, 4);
        assert!(lookup("Texture2D").is_none());
    }

    #[test]
    fn test_alias_chain() {
        let mut aliases = AliasTable::new();
        assert_eq!(
            aliases.define("vec4", "m::vec4", &type_name("DirectX::XMFLOAT4")),
            Some("DirectX::XMFLOAT4")
        );
        assert!(aliases.define("color", "color", &type_name("vec4")).is_some());
        let canonical = |name: &str| aliases.canonical(&type_name(name));
        assert_eq!(canonical("color").as_deref(), Some("DirectX::XMFLOAT4"));
        assert_eq!(canonical("m::vec4").as_deref(), Some("DirectX::XMFLOAT4"));
        assert!(aliases.define("bad", "bad", &type_name("Nope")).is_none());
    }

    #[test]
    fn test_cbuffer_layout() {
        // 12 + 4 packs exactly
        let l = compute_layout(OutputKind::ConstantBuffer, &[(12, 4), (4, 4)], None);
        assert_eq!(l.size, 16);
        assert_eq!(l.placements[1].offset, 12);

        // a 16-byte field after 12 bytes moves to the next boundary
        let l = compute_layout(OutputKind::ConstantBuffer, &[(12, 4), (16, 16)], None);
        assert_eq!(l.placements[1], FieldPlacement { offset: 16, padding_before: 4 });
        assert_eq!(l.size, 32);

        // two 12-byte vectors
        let l = compute_layout(OutputKind::ConstantBuffer, &[(12, 4), (12, 4)], None);
        assert_eq!(l.placements[1].offset, 16);
        assert_eq!(l.size, 32);
        assert_eq!(l.tail_padding, 4);
    }

    #[test]
    fn test_plain_layout() {
        let l = compute_layout(OutputKind::VertexInput, &[(4, 4), (8, 8), (64, 16)], None);
        let offsets: Vec<u32> = l.placements.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16]);
        assert_eq!(l.size, 80);
        assert_eq!(l.tail_padding, 0);

        let l = compute_layout(OutputKind::StructuredBuffer, &[(4, 4)], Some(16));
        assert_eq!(l.size, 16);
        assert_eq!(l.tail_padding, 12);
    }

    #[test]
    fn test_semantic_derivation() {
        assert_eq!(derive_semantic("_position"), "POSITION");
        assert_eq!(derive_semantic("__texCoord1"), "TEXCOORD1");
        assert_eq!(derive_semantic("world_matrix"), "WORLDMATRIX");
        assert_eq!(split_semantic_index("TEXCOORD1"), ("TEXCOORD", 1));
        assert_eq!(split_semantic_index("SV_Position"), ("SV_Position", 0));
    }

    #[test]
    fn test_degenerate_semantics_are_invalid() {
        assert_eq!(derive_semantic("_"), "");
        assert_eq!(derive_semantic("_0"), "0");
        assert!(!is_valid_semantic(&derive_semantic("_")));
        assert!(!is_valid_semantic(&derive_semantic("_0")));
        assert!(is_valid_semantic("SV_Position"));
        assert!(is_valid_semantic(&derive_semantic("_uv0")));
    }

    #[test]
    fn test_alignas_on_constant_buffer_keeps_row_multiple() {
        // alignas(8) cannot pull a cbuffer below a whole 16-byte row
        let l = compute_layout(OutputKind::ConstantBuffer, &[(4, 4)], Some(8));
        assert_eq!(l.size, 16);

        let l = compute_layout(OutputKind::ConstantBuffer, &[(4, 4)], Some(32));
        assert_eq!(l.size, 32);
        assert_eq!(l.tail_padding, 28);

        let l = compute_layout(OutputKind::VertexInput, &[(4, 4)], Some(8));
        assert_eq!(l.size, 8);
    }
}
