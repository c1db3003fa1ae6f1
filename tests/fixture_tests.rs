use shaderdecl::interpreter::catalog::OutputKind;
use shaderdecl::interpreter::codegen::GeneratorOptions;
use shaderdecl::interpreter::engine::Interpreter;
use std::fs;
use std::path::Path;

/// Header files in the order a build script would feed them, each with the
/// kind its aggregates are generated as.
const FIXTURES: &[(&str, OutputKind)] = &[
    ("shader_types.h", OutputKind::VertexInput),
    ("vertex_inputs.h", OutputKind::VertexInput),
    ("constant_buffers.h", OutputKind::ConstantBuffer),
    ("structured_buffers.h", OutputKind::StructuredBuffer),
];

fn load_fixture() -> Interpreter {
    let mut session = Interpreter::with_options(GeneratorOptions {
        header: false,
        ..GeneratorOptions::default()
    });
    for &(file, kind) in FIXTURES {
        let path = Path::new("tests/fixtures").join(file);
        let source = fs::read_to_string(&path).expect("Failed to read fixture file");
        session.append_source(&source, kind).expect("Parsing failed");
    }
    session
}

#[test]
fn test_fixture_catalog() {
    let session = load_fixture();

    let names: Vec<&str> = (0..session.type_count())
        .filter_map(|i| session.type_at(i))
        .map(|m| m.qualified_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Engine::Shaders::VS_Input",
            "Engine::Shaders::CB_View",
            "Engine::Shaders::CB_Light",
            "Engine::Shaders::SB_Particle",
        ]
    );
    assert_eq!(session.kinds(), OutputKind::ALL.to_vec());

    let input = session.type_named("VS_Input").unwrap();
    assert_eq!(input.kind, OutputKind::VertexInput);
    assert_eq!(input.source_index, 1);
    let offsets: Vec<u32> = input.fields.iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 12, 24, 32]);
    assert_eq!(input.size, 96);
}

#[test]
fn test_fixture_constant_buffers() {
    let mut session = load_fixture();

    let buffers = session.resolve(OutputKind::ConstantBuffer).unwrap();
    let names: Vec<&str> = buffers.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["CB_View", "CB_Light"]);

    let light = buffers[1];
    let offsets: Vec<u32> = light.fields.iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 12, 16, 32]);
    assert_eq!(light.size, 48);

    let text = session.generate(OutputKind::ConstantBuffer).unwrap().text.clone();
    println!("Generated:\n{}", text);

    let expected = "\
cbuffer CB_View : register(b0)
{
    float4x4 _cb2DProjectionMatrix;
    float4x4 _cbViewMatrix;
};

cbuffer CB_Light : register(b1)
{
    float3 _direction;
    float _intensity;
    float3 _color;
    float4 _ambient;
};
";
    assert_eq!(text, expected);
}

#[test]
fn test_fixture_structured_buffer_shares_slot_number() {
    let mut session = load_fixture();

    let text = session.generate(OutputKind::StructuredBuffer).unwrap().text.clone();
    let expected = "\
struct SB_Particle
{
    float3 _position;
    float _age;
    float4 _color;
};
// register(t0), stride 32
";
    assert_eq!(text, expected);
}

#[test]
fn test_fixture_vertex_structs() {
    let mut session = load_fixture();
    let text = session.generate(OutputKind::VertexInput).unwrap().text.clone();

    assert!(text.starts_with("struct VS_Input\n{\n    float3 _position : POSITION;\n"));
    assert!(text.contains("    float2 _texCoord0 : TEXCOORD0;\n"));
    assert!(text.contains("    float4x4 _world : WORLD;\n"));
    assert!(!text.contains("CB_"));
    assert!(!text.contains("SB_"));

    let layout = session.input_layout("VS_Input").unwrap().unwrap();
    assert_eq!(layout.len(), 7);
    assert_eq!(layout[2].semantic_name, "TEXCOORD");
    assert_eq!(layout[2].semantic_index, 0);
    assert_eq!(layout[2].aligned_byte_offset, 24);
    assert_eq!(layout[6].semantic_index, 3);
    assert_eq!(layout[6].aligned_byte_offset, 48);
}
