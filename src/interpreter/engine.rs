// Compilation session for annotated declaration files

use crate::interpreter::catalog::{HostType, OutputKind, TypeCatalog, TypeMetaData, TypeTag};
use crate::interpreter::codegen::{self, GeneratedSource, GeneratorOptions};
use crate::interpreter::errors::CompileError;
use crate::interpreter::input_layout::{self, InputElement};
use crate::parser::ast::Program;
use crate::parser::parse::Parser;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing parsed, or the last parse failed
    Empty,
    /// Catalog populated; queries available
    Parsed,
    /// Catalog populated and text generated for this kind
    Generated(OutputKind),
}

/// One compilation session: owns a catalog and the text generated from it
pub struct Interpreter {
    /// Resolved aggregates; `None` until a parse succeeds
    catalog: Option<TypeCatalog>,

    /// Generated text per output kind, valid for the current catalog
    generated: FxHashMap<OutputKind, GeneratedSource>,

    options: GeneratorOptions,

    state: SessionState,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Interpreter {
            catalog: None,
            generated: FxHashMap::default(),
            options,
            state: SessionState::Empty,
        }
    }

    /// Parse a file whose aggregates are all `kind`, replacing any existing
    /// catalog.
    ///
    /// On failure the session is left `Empty`.
    pub fn parse_source(&mut self, source: &str, kind: OutputKind) -> Result<(), CompileError> {
        self.reset();

        let program =
            Self::parse_program(source).inspect_err(|e| warn!(error = %e, "parse failed"))?;
        let catalog = TypeCatalog::build(&program, kind)
            .inspect_err(|e| warn!(error = %e, "type resolution failed"))?;

        info!(%kind, types = catalog.len(), "parsed source");
        self.catalog = Some(catalog);
        self.state = SessionState::Parsed;
        Ok(())
    }

    /// Add another file's declarations to the current catalog as aggregates
    /// of `kind`.
    ///
    /// Aliases from earlier files remain visible. Starts a fresh catalog when
    /// the session is `Empty`. On failure the whole session is reset.
    pub fn append_source(&mut self, source: &str, kind: OutputKind) -> Result<(), CompileError> {
        let mut catalog = self.catalog.take().unwrap_or_default();
        self.reset();

        let result =
            Self::parse_program(source).and_then(|program| catalog.extend(&program, kind));
        if let Err(e) = result {
            warn!(error = %e, "append failed, session reset");
            return Err(e);
        }

        info!(%kind, types = catalog.len(), "appended source");
        self.catalog = Some(catalog);
        self.state = SessionState::Parsed;
        Ok(())
    }

    fn parse_program(source: &str) -> Result<Program, CompileError> {
        let mut parser = Parser::from_source(source)?;
        let program = parser.parse_program()?;
        debug!(declarations = program.declarations.len(), "parsed declarations");
        Ok(program)
    }

    /// Generate text for the aggregates declared as `kind`, reusing an earlier
    /// result for the same kind.
    ///
    /// A kind with no aggregates generates just the header.
    pub fn generate(&mut self, kind: OutputKind) -> Result<&GeneratedSource, CompileError> {
        let catalog = self.catalog.as_ref().ok_or(CompileError::NoCatalog)?;

        if !self.generated.contains_key(&kind) {
            let types: Vec<&TypeMetaData> = catalog.of_kind(kind).collect();
            codegen::validate(kind, &types)?;
            let text = codegen::emit(kind, &types, &self.options);
            debug!(%kind, bytes = text.len(), "generated source");
            self.generated.insert(kind, GeneratedSource { kind, text });
        }

        self.state = SessionState::Generated(kind);
        self.generated.get(&kind).ok_or(CompileError::NoCatalog)
    }

    /// Aggregates declared as `kind`, in catalog order
    pub fn resolve(&self, kind: OutputKind) -> Result<Vec<&TypeMetaData>, CompileError> {
        Ok(self.catalog()?.of_kind(kind).collect())
    }

    /// Kinds with at least one aggregate in the catalog
    pub fn kinds(&self) -> Vec<OutputKind> {
        self.catalog.as_ref().map(TypeCatalog::kinds).unwrap_or_default()
    }

    /// Element list for binding the named aggregate as vertex input.
    ///
    /// `None` when no vertex-input aggregate has that name.
    pub fn input_layout(&self, name: &str) -> Result<Option<Vec<InputElement>>, CompileError> {
        Ok(self
            .catalog()?
            .get_by_name(name)
            .filter(|meta| meta.kind == OutputKind::VertexInput)
            .map(input_layout::build))
    }

    pub fn catalog(&self) -> Result<&TypeCatalog, CompileError> {
        self.catalog.as_ref().ok_or(CompileError::NoCatalog)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Last generated text for `kind`, if any
    pub fn generated(&self, kind: OutputKind) -> Option<&GeneratedSource> {
        self.generated.get(&kind)
    }

    /// Drop the catalog and all generated text
    pub fn reset(&mut self) {
        self.catalog = None;
        self.generated.clear();
        self.state = SessionState::Empty;
    }

    // ===== Queries =====

    pub fn type_count(&self) -> usize {
        self.catalog.as_ref().map_or(0, TypeCatalog::len)
    }

    pub fn type_at(&self, index: usize) -> Option<&TypeMetaData> {
        self.catalog.as_ref()?.get(index)
    }

    /// Look up by short or qualified name
    pub fn type_named(&self, name: &str) -> Option<&TypeMetaData> {
        self.catalog.as_ref()?.get_by_name(name)
    }

    pub fn type_by_tag(&self, tag: TypeTag) -> Option<&TypeMetaData> {
        self.catalog.as_ref()?.get_by_tag(tag)
    }

    /// Metadata for the aggregate a host type mirrors
    pub fn type_of<T: HostType>(&self) -> Option<&TypeMetaData> {
        self.type_named(T::TYPE_NAME)
    }
}
