// Property tests for layout and generation

use proptest::prelude::*;
use shaderdecl::interpreter::catalog::OutputKind;
use shaderdecl::interpreter::engine::Interpreter;

const HOST_TYPES: &[(&str, &str)] = &[
    ("float", "float"),
    ("int", "int"),
    ("uint32_t", "uint"),
    ("DirectX::XMFLOAT2", "float2"),
    ("DirectX::XMFLOAT3", "float3"),
    ("DirectX::XMFLOAT4", "float4"),
    ("DirectX::XMINT3", "int3"),
    ("DirectX::XMFLOAT4X4", "float4x4"),
];

fn kind_strategy() -> impl Strategy<Value = OutputKind> {
    prop_oneof![
        Just(OutputKind::VertexInput),
        Just(OutputKind::ConstantBuffer),
        Just(OutputKind::StructuredBuffer),
    ]
}

/// Type indices for 1..10 fields per struct, 1..4 structs
fn structs_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(
        prop::collection::vec(0..HOST_TYPES.len(), 1..10),
        1..4,
    )
}

/// Type indices for one struct's fields
fn fields_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..HOST_TYPES.len(), 1..10)
}

fn render(structs: &[Vec<usize>]) -> String {
    let mut source = String::from("namespace Gen {\n");
    for (s, fields) in structs.iter().enumerate() {
        source.push_str(&format!("struct S{} REGISTER({}) {{\n", s, s));
        for (f, &ty) in fields.iter().enumerate() {
            source.push_str(&format!("    {} _field{};\n", HOST_TYPES[ty].0, f));
        }
        source.push_str("};\n");
    }
    source.push_str("}\n");
    source
}

proptest! {
    #[test]
    fn generation_is_deterministic(structs in structs_strategy(), kind in kind_strategy()) {
        let source = render(&structs);

        let mut a = Interpreter::new();
        a.parse_source(&source, kind).unwrap();
        let first = a.generate(kind).unwrap().text.clone();
        for other in OutputKind::ALL {
            a.generate(other).unwrap();
        }
        let again = a.generate(kind).unwrap().text.clone();

        let mut b = Interpreter::new();
        b.parse_source(&source, kind).unwrap();
        let fresh = b.generate(kind).unwrap().text.clone();

        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &fresh);
    }

    #[test]
    fn field_order_is_preserved(structs in structs_strategy(), kind in kind_strategy()) {
        let mut session = Interpreter::new();
        session.parse_source(&render(&structs), kind).unwrap();
        let text = session.generate(kind).unwrap().text.clone();

        for fields in &structs {
            let mut cursor = 0;
            for (f, &ty) in fields.iter().enumerate() {
                let needle = format!("{} _field{}", HOST_TYPES[ty].1, f);
                let found = text[cursor..].find(&needle);
                prop_assert!(found.is_some(), "missing {} in\n{}", needle, text);
                cursor += found.unwrap_or(0) + needle.len();
            }
        }
    }

    #[test]
    fn layout_accounts_for_every_byte(structs in structs_strategy(), kind in kind_strategy()) {
        let mut session = Interpreter::new();
        session.parse_source(&render(&structs), kind).unwrap();

        let resolved = session.resolve(kind).unwrap();
        prop_assert_eq!(resolved.len(), structs.len());
        for meta in resolved {
            let field_bytes: u32 = meta.fields.iter().map(|f| f.size).sum();
            prop_assert_eq!(meta.size, field_bytes + meta.padding());

            let mut end = 0;
            for field in &meta.fields {
                prop_assert!(field.offset >= end);
                if kind == OutputKind::ConstantBuffer {
                    let crosses = field.offset / 16 != (field.offset + field.size - 1) / 16;
                    prop_assert!(!crosses || field.offset % 16 == 0);
                }
                end = field.offset + field.size;
            }

            if kind == OutputKind::ConstantBuffer {
                prop_assert_eq!(meta.size % 16, 0);
            }
        }
    }

    #[test]
    fn aliases_are_transparent(types in fields_strategy()) {
        let mut direct = String::from("struct D {\n");
        let mut aliased = String::new();
        for (i, &ty) in types.iter().enumerate() {
            direct.push_str(&format!("    {} _f{};\n", HOST_TYPES[ty].0, i));
            aliased.push_str(&format!("using alias{} = {};\n", i, HOST_TYPES[ty].0));
        }
        direct.push_str("};\n");
        aliased.push_str("struct D {\n");
        for i in 0..types.len() {
            aliased.push_str(&format!("    alias{} _f{};\n", i, i));
        }
        aliased.push_str("};\n");

        for kind in OutputKind::ALL {
            let mut a = Interpreter::new();
            a.parse_source(&direct, kind).unwrap();
            let mut b = Interpreter::new();
            b.parse_source(&aliased, kind).unwrap();

            let left_types = a.resolve(kind).unwrap();
            let right_types = b.resolve(kind).unwrap();
            let (left, right) = (&left_types[0], &right_types[0]);
            prop_assert_eq!(left.size, right.size);
            for (l, r) in left.fields.iter().zip(&right.fields) {
                prop_assert_eq!(l.size, r.size);
                prop_assert_eq!(l.offset, r.offset);
                prop_assert_eq!(l.dialect_type, r.dialect_type);
            }
            prop_assert_eq!(
                &a.generate(kind).unwrap().text,
                &b.generate(kind).unwrap().text
            );
        }
    }

    #[test]
    fn vertex_layout_agrees_with_catalog(types in fields_strategy()) {
        let mut source = String::from("struct V {\n");
        for (i, &ty) in types.iter().enumerate() {
            source.push_str(&format!("    {} _f{};\n", HOST_TYPES[ty].0, i));
        }
        source.push_str("};\n");

        let mut session = Interpreter::new();
        session.parse_source(&source, OutputKind::VertexInput).unwrap();
        let meta = session.type_named("V").unwrap();
        let layout = session.input_layout("V").unwrap().unwrap();

        let mut elements = layout.iter();
        for field in &meta.fields {
            let row_size = field.size / field.rows.max(1);
            for row in 0..field.rows.max(1) {
                let element = elements.next();
                prop_assert!(element.is_some());
                let offset = element.map_or(0, |e| e.aligned_byte_offset);
                prop_assert_eq!(offset, field.offset + row * row_size);
            }
        }
        prop_assert!(elements.next().is_none());
    }
}
