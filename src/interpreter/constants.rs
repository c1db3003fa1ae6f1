// Constants for layout resolution and code generation

/// Constant-buffer packing boundary in bytes; a field never straddles it
pub const PACKING_BOUNDARY: u32 = 16;

/// Upper bound on a field's natural alignment outside constant buffers
pub const MAX_FIELD_ALIGNMENT: u32 = 16;

/// Largest value accepted in `alignas(N)`
pub const MAX_STRUCT_ALIGNMENT: u32 = 256;

/// Comment line written at the top of every generated file
pub const GENERATED_HEADER: &str =
    "Generated by shaderdecl from annotated struct headers. Do not edit.";

/// Spaces per indentation level in generated source
pub const DEFAULT_INDENT: usize = 4;
