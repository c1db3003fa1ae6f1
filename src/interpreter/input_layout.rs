//! Vertex input layout description
//!
//! Turns a resolved vertex-input aggregate into the element list a graphics
//! device needs to bind vertex and instance streams. Each field becomes one
//! element per row; a `float4x4` contributes four consecutive rows with
//! consecutive semantic indices.

use crate::interpreter::catalog::{OutputKind, TypeMetaData};
use crate::interpreter::type_system::{compute_layout, split_semantic_index};
use rustc_hash::FxHashMap;

/// How an element advances through its stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClassification {
    PerVertex,
    PerInstance,
}

/// One element of a vertex input layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElement {
    pub semantic_name: String,
    pub semantic_index: u32,
    pub format: &'static str,
    pub input_slot: u32,
    /// Byte offset within the element's input slot
    pub aligned_byte_offset: u32,
    pub classification: InputClassification,
    /// Instances drawn per element advance; 0 for per-vertex data
    pub instance_data_step_rate: u32,
}

/// Byte offset of every field within its own input slot.
///
/// Each slot is laid out with the same rules as the aggregate, over just the
/// fields bound to it. When every field shares one slot the offsets are the
/// catalog's own field offsets.
fn slot_offsets(meta: &TypeMetaData) -> Vec<u32> {
    let mut slots: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
    for (i, field) in meta.fields.iter().enumerate() {
        slots.entry(field.register.unwrap_or(0)).or_default().push(i);
    }

    let mut offsets = vec![0; meta.fields.len()];
    for members in slots.values() {
        let sizes: Vec<(u32, u32)> = members
            .iter()
            .map(|&i| (meta.fields[i].size, meta.fields[i].align))
            .collect();
        let layout = compute_layout(OutputKind::VertexInput, &sizes, None);
        for (&i, placement) in members.iter().zip(layout.placements) {
            offsets[i] = placement.offset;
        }
    }
    offsets
}

/// Build the input layout for one aggregate.
pub fn build(meta: &TypeMetaData) -> Vec<InputElement> {
    let mut elements = Vec::new();
    let offsets = slot_offsets(meta);

    for (field, &base_offset) in meta.fields.iter().zip(&offsets) {
        let (name, base_index) = split_semantic_index(&field.semantic);
        let (classification, step_rate) = match field.instance_step_rate {
            Some(rate) => (InputClassification::PerInstance, rate),
            None => (InputClassification::PerVertex, 0),
        };
        let rows = field.rows.max(1);
        let row_size = field.size / rows;

        for row in 0..rows {
            elements.push(InputElement {
                semantic_name: name.to_string(),
                semantic_index: base_index + row,
                format: field.format,
                input_slot: field.register.unwrap_or(0),
                aligned_byte_offset: base_offset + row * row_size,
                classification,
                instance_data_step_rate: step_rate,
            });
        }
    }

    elements
}
