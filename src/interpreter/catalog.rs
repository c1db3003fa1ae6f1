//! Type catalog: resolved metadata for every parsed aggregate
//!
//! A [`TypeCatalog`] is built from parsed [`Program`]s in declaration order.
//! Every source is added under one [`OutputKind`], and each aggregate it
//! declares keeps that kind: its layout follows the kind's packing rules and
//! only generation for that kind emits it. Building rewrites field types
//! through the `using` aliases seen so far and maps them onto the built-in
//! type table. The catalog is never mutated after it is built.

use crate::interpreter::errors::CompileError;
use crate::interpreter::type_system::{
    self, compute_layout, derive_semantic, is_valid_semantic, AliasTable,
};
use crate::parser::ast::{qualify, Declaration, Program, SourceLocation, StructDecl};
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// The three shapes of generated source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKind {
    /// Plain structs with per-field semantics, used for vertex input layouts
    VertexInput,
    /// `cbuffer` blocks bound at `register(bN)`
    ConstantBuffer,
    /// Element structs for structured buffers bound at `register(tN)`
    StructuredBuffer,
}

impl OutputKind {
    pub const ALL: [OutputKind; 3] = [
        OutputKind::VertexInput,
        OutputKind::ConstantBuffer,
        OutputKind::StructuredBuffer,
    ];

    /// Register class letter, for kinds that bind to a slot
    pub fn register_class(self) -> Option<char> {
        match self {
            OutputKind::VertexInput => None,
            OutputKind::ConstantBuffer => Some('b'),
            OutputKind::StructuredBuffer => Some('t'),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::VertexInput => "vertex input struct",
            OutputKind::ConstantBuffer => "constant buffer",
            OutputKind::StructuredBuffer => "structured buffer",
        };
        f.write_str(name)
    }
}

/// Stable identity assigned to an aggregate when it enters a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub u32);

/// Implemented by host-side types that have a generated shader counterpart.
///
/// ```ignore
/// struct CbView { projection: [[f32; 4]; 4], view: [[f32; 4]; 4] }
/// impl HostType for CbView {
///     const TYPE_NAME: &'static str = "CB_View";
/// }
/// ```
pub trait HostType {
    /// Declared (short or qualified) name of the matching aggregate
    const TYPE_NAME: &'static str;
}

/// One resolved field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFieldMetadata {
    pub name: String,
    /// Type as written in the source
    pub declared_type: String,
    /// Type after alias rewriting
    pub resolved_type: String,
    pub dialect_type: &'static str,
    pub size: u32,
    pub align: u32,
    pub offset: u32,
    pub padding_before: u32,
    /// `SEMANTIC(...)` as written, if any
    pub semantic_annotation: Option<String>,
    /// Effective semantic: the annotation, or one derived from the name
    pub semantic: String,
    /// `REGISTER(n)` on the field: the vertex input slot
    pub register: Option<u32>,
    pub instance_step_rate: Option<u32>,
    /// Vertex format of one row
    pub format: &'static str,
    pub rows: u32,
    pub location: SourceLocation,
}

/// A resolved aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetaData {
    pub name: String,
    pub qualified_name: String,
    pub tag: TypeTag,
    /// The output this aggregate was declared for; its layout follows these rules
    pub kind: OutputKind,
    /// Ordinal of the source that declared it, in the order sources were added
    pub source_index: usize,
    /// `REGISTER(n)` on the aggregate: the buffer binding slot
    pub register: Option<u32>,
    pub alignment: Option<u32>,
    pub fields: Vec<TypeFieldMetadata>,
    pub size: u32,
    pub tail_padding: u32,
    pub location: SourceLocation,
}

impl TypeMetaData {
    pub fn field(&self, name: &str) -> Option<&TypeFieldMetadata> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total implicit padding, between fields and at the tail
    pub fn padding(&self) -> u32 {
        self.fields.iter().map(|f| f.padding_before).sum::<u32>() + self.tail_padding
    }

    fn apply_layout(&mut self) {
        let sizes: Vec<(u32, u32)> = self.fields.iter().map(|f| (f.size, f.align)).collect();
        let layout = compute_layout(self.kind, &sizes, self.alignment);

        self.size = layout.size;
        self.tail_padding = layout.tail_padding;
        for (field, placement) in self.fields.iter_mut().zip(layout.placements) {
            field.offset = placement.offset;
            field.padding_before = placement.padding_before;
        }
    }
}

/// Insertion-ordered mapping from type name to metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    entries: Vec<TypeMetaData>,
    /// Short and qualified names → index into `entries`
    by_name: FxHashMap<String, usize>,
    aliases: AliasTable,
    /// Number of sources added so far
    sources: usize,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from one parsed file whose aggregates are all `kind`.
    pub fn build(program: &Program, kind: OutputKind) -> Result<Self, CompileError> {
        let mut catalog = TypeCatalog::new();
        catalog.extend(program, kind)?;
        Ok(catalog)
    }

    /// Add another file's declarations as aggregates of `kind`. Aliases from
    /// earlier files stay visible.
    ///
    /// On error the catalog may hold part of `program`; callers discard it.
    pub fn extend(&mut self, program: &Program, kind: OutputKind) -> Result<(), CompileError> {
        for decl in &program.declarations {
            match decl {
                Declaration::Alias(alias) => {
                    let qualified = qualify(&alias.namespace, &alias.alias);
                    if self
                        .aliases
                        .define(&alias.alias, &qualified, &alias.target)
                        .is_none()
                    {
                        return Err(CompileError::UnresolvedAlias {
                            alias: alias.alias.clone(),
                            target: alias.target.qualified(),
                            location: alias.location,
                        });
                    }
                }
                Declaration::Struct(decl) => {
                    let meta = self.resolve_struct(decl, kind)?;
                    self.insert(meta)?;
                }
            }
        }
        self.sources += 1;

        debug!(
            %kind,
            types = self.entries.len(),
            aliases = self.aliases.len(),
            "catalog updated"
        );
        Ok(())
    }

    fn resolve_struct(
        &self,
        decl: &StructDecl,
        kind: OutputKind,
    ) -> Result<TypeMetaData, CompileError> {
        let mut fields = Vec::with_capacity(decl.fields.len());

        for field in &decl.fields {
            let resolved = self.aliases.canonical(&field.field_type);
            let builtin = resolved.as_deref().and_then(type_system::lookup);
            let (Some(resolved), Some(builtin)) = (resolved, builtin) else {
                return Err(CompileError::UnknownType {
                    type_name: field.field_type.qualified(),
                    field: field.name.clone(),
                    aggregate: decl.name.clone(),
                    location: field.field_type.location,
                });
            };

            let semantic_annotation = field.semantic().map(str::to_string);
            let semantic = semantic_annotation
                .clone()
                .unwrap_or_else(|| derive_semantic(&field.name));
            if kind == OutputKind::VertexInput && !is_valid_semantic(&semantic) {
                return Err(CompileError::InvalidSemantic {
                    field: field.name.clone(),
                    aggregate: decl.name.clone(),
                    semantic,
                    location: field.location,
                });
            }

            fields.push(TypeFieldMetadata {
                name: field.name.clone(),
                declared_type: field.field_type.qualified(),
                resolved_type: resolved,
                dialect_type: builtin.dialect,
                size: builtin.size,
                align: builtin.align,
                offset: 0,
                padding_before: 0,
                semantic_annotation,
                semantic,
                register: field.register(),
                instance_step_rate: field.instance_step_rate(),
                format: builtin.format,
                rows: builtin.rows,
                location: field.location,
            });
        }

        let mut meta = TypeMetaData {
            name: decl.name.clone(),
            qualified_name: decl.qualified_name(),
            tag: TypeTag(self.entries.len() as u32),
            kind,
            source_index: self.sources,
            register: decl.register,
            alignment: decl.alignment,
            fields,
            size: 0,
            tail_padding: 0,
            location: decl.location,
        };
        meta.apply_layout();
        Ok(meta)
    }

    fn insert(&mut self, meta: TypeMetaData) -> Result<(), CompileError> {
        if let Some(&existing) = self.by_name.get(&meta.name) {
            return Err(CompileError::DuplicateType {
                name: meta.name.clone(),
                location: meta.location,
                first: self.entries[existing].location,
            });
        }

        let index = self.entries.len();
        self.by_name.insert(meta.name.clone(), index);
        self.by_name.insert(meta.qualified_name.clone(), index);
        self.entries.push(meta);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TypeMetaData> {
        self.entries.get(index)
    }

    /// Look up by short or qualified name
    pub fn get_by_name(&self, name: &str) -> Option<&TypeMetaData> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn get_by_tag(&self, tag: TypeTag) -> Option<&TypeMetaData> {
        self.entries.get(tag.0 as usize).filter(|m| m.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeMetaData> {
        self.entries.iter()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Aggregates declared for `kind`, in catalog order
    pub fn of_kind(&self, kind: OutputKind) -> impl Iterator<Item = &TypeMetaData> {
        self.entries.iter().filter(move |m| m.kind == kind)
    }

    /// Output kinds with at least one aggregate, in [`OutputKind::ALL`] order
    pub fn kinds(&self) -> Vec<OutputKind> {
        OutputKind::ALL
            .into_iter()
            .filter(|&kind| self.entries.iter().any(|m| m.kind == kind))
            .collect()
    }
}
