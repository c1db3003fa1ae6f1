//! Shader-dialect code generation
//!
//! Generation is two passes over laid-out aggregates: [`validate`] checks every
//! binding slot first, then [`emit`] renders text. Both look only at the
//! aggregates declared for the requested kind, so a `cbuffer` at `b0` and a
//! structured buffer at `t0` never meet. Nothing is rendered if validation
//! fails.

use crate::interpreter::catalog::{OutputKind, TypeMetaData};
use crate::interpreter::constants::{DEFAULT_INDENT, GENERATED_HEADER};
use crate::interpreter::errors::CompileError;
use rustc_hash::FxHashMap;
use std::fmt;

/// Formatting knobs for generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Write the header comment line
    pub header: bool,
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            header: true,
            indent: DEFAULT_INDENT,
        }
    }
}

/// Emitted text for one output kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub kind: OutputKind,
    pub text: String,
}

impl fmt::Display for GeneratedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Reject two aggregates that claim the same binding slot.
///
/// Vertex-input structs have no binding slot and always pass.
pub fn validate(kind: OutputKind, types: &[&TypeMetaData]) -> Result<(), CompileError> {
    let Some(class) = kind.register_class() else {
        return Ok(());
    };

    let mut claimed: FxHashMap<u32, &TypeMetaData> = FxHashMap::default();
    for &meta in types.iter().filter(|m| m.kind == kind) {
        let Some(slot) = meta.register else {
            continue;
        };
        if let Some(first) = claimed.get(&slot) {
            return Err(CompileError::RegisterConflict {
                kind,
                slot: format!("{}{}", class, slot),
                first: first.qualified_name.clone(),
                second: meta.qualified_name.clone(),
                location: meta.location,
                source_index: meta.source_index,
            });
        }
        claimed.insert(slot, meta);
    }
    Ok(())
}

/// Render the aggregates of `kind` among `types`. Callers run [`validate`] first.
pub fn emit(kind: OutputKind, types: &[&TypeMetaData], options: &GeneratorOptions) -> String {
    Emitter {
        kind,
        types,
        options,
    }
    .to_string()
}

struct Emitter<'a> {
    kind: OutputKind,
    types: &'a [&'a TypeMetaData],
    options: &'a GeneratorOptions,
}

impl Emitter<'_> {
    fn aggregate(&self, f: &mut fmt::Formatter<'_>, meta: &TypeMetaData) -> fmt::Result {
        let indent = " ".repeat(self.options.indent);

        match (self.kind, meta.register) {
            (OutputKind::ConstantBuffer, Some(slot)) => {
                writeln!(f, "cbuffer {} : register(b{})", meta.name, slot)?
            }
            (OutputKind::ConstantBuffer, None) => writeln!(f, "cbuffer {}", meta.name)?,
            _ => writeln!(f, "struct {}", meta.name)?,
        }
        writeln!(f, "{{")?;

        for field in &meta.fields {
            match self.kind {
                OutputKind::VertexInput => writeln!(
                    f,
                    "{}{} {} : {};",
                    indent, field.dialect_type, field.name, field.semantic
                )?,
                _ => writeln!(f, "{}{} {};", indent, field.dialect_type, field.name)?,
            }
        }

        writeln!(f, "}};")?;

        if let (OutputKind::StructuredBuffer, Some(slot)) = (self.kind, meta.register) {
            writeln!(f, "// register(t{}), stride {}", slot, meta.size)?;
        }
        Ok(())
    }
}

impl fmt::Display for Emitter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.header {
            writeln!(f, "// {}", GENERATED_HEADER)?;
        }
        let selected = self.types.iter().filter(|m| m.kind == self.kind);
        for (i, meta) in selected.enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            self.aggregate(f, meta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::catalog::TypeCatalog;
    use crate::parser::parse::Parser;

    fn catalog(source: &str, kind: OutputKind) -> TypeCatalog {
        let program = Parser::from_source(source).unwrap().parse_program().unwrap();
        TypeCatalog::build(&program, kind).unwrap()
    }

    fn bare() -> GeneratorOptions {
        GeneratorOptions {
            header: false,
            ..GeneratorOptions::default()
        }
    }

    #[test]
    fn test_vertex_input_text() {
        let cat = catalog(
            "struct VS_Input { float4 _position; float2 _uv SEMANTIC(TEXCOORD0); };",
            OutputKind::VertexInput,
        );
        let types: Vec<&TypeMetaData> = cat.iter().collect();
        let text = emit(OutputKind::VertexInput, &types, &bare());
        assert_eq!(
            text,
            concat!(
                "struct VS_Input\n{\n",
                "    float4 _position : POSITION;\n",
                "    float2 _uv : TEXCOORD0;\n",
                "};\n"
            )
        );
    }

    #[test]
    fn test_cbuffer_text_with_and_without_register() {
        let cat = catalog(
            "struct A REGISTER(0) { DirectX::XMFLOAT4X4 m; }; struct B { float x; };",
            OutputKind::ConstantBuffer,
        );
        let types: Vec<&TypeMetaData> = cat.iter().collect();
        let text = emit(OutputKind::ConstantBuffer, &types, &GeneratorOptions::default());
        let expected = format!(
            concat!(
                "// {}\n",
                "cbuffer A : register(b0)\n{{\n    float4x4 m;\n}};\n\n",
                "cbuffer B\n{{\n    float x;\n}};\n"
            ),
            GENERATED_HEADER
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_structured_buffer_stride_comment() {
        let cat = catalog(
            "struct Particle REGISTER(3) { float3 pos; float life; };",
            OutputKind::StructuredBuffer,
        );
        let types: Vec<&TypeMetaData> = cat.iter().collect();
        let options = GeneratorOptions {
            header: false,
            indent: 2,
        };
        let text = emit(OutputKind::StructuredBuffer, &types, &options);
        assert_eq!(
            text,
            "struct Particle\n{\n  float3 pos;\n  float life;\n};\n// register(t3), stride 16\n"
        );
    }

    #[test]
    fn test_register_conflict() {
        let source = "struct A REGISTER(1) { float x; }; struct B REGISTER(1) { float y; };";
        let cat = catalog(source, OutputKind::StructuredBuffer);
        let types: Vec<&TypeMetaData> = cat.iter().collect();
        let err = validate(OutputKind::StructuredBuffer, &types).unwrap_err();
        match err {
            CompileError::RegisterConflict {
                slot, first, second, ..
            } => {
                assert_eq!(slot, "t1");
                assert_eq!(first, "A");
                assert_eq!(second, "B");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // vertex input structs never bind a slot
        let cat = catalog(source, OutputKind::VertexInput);
        let types: Vec<&TypeMetaData> = cat.iter().collect();
        assert!(validate(OutputKind::VertexInput, &types).is_ok());
    }

    #[test]
    fn test_other_kinds_are_skipped() {
        let program = |src: &str| Parser::from_source(src).unwrap().parse_program().unwrap();
        let mut cat = TypeCatalog::new();
        cat.extend(&program("struct V { float4 _pos; };"), OutputKind::VertexInput)
            .unwrap();
        cat.extend(&program("struct C REGISTER(0) { float4 c; };"), OutputKind::ConstantBuffer)
            .unwrap();
        cat.extend(&program("struct S REGISTER(0) { float4 s; };"), OutputKind::StructuredBuffer)
            .unwrap();
        let types: Vec<&TypeMetaData> = cat.iter().collect();

        // b0 and t0 are different register classes
        for kind in OutputKind::ALL {
            assert!(validate(kind, &types).is_ok());
        }

        let text = emit(OutputKind::ConstantBuffer, &types, &bare());
        assert_eq!(text, "cbuffer C : register(b0)\n{\n    float4 c;\n};\n");
    }
}
