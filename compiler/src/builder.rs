use crate::{
    error::CompileError,
    formatter::Formatter,
    generator::GeneratedFile,
    registry::{BuilderRegistry, Language},
};
use brine_wire_schema::{Schema, TypeDef, TypeKind};

/// Renders one type kind in one target language.
///
/// Builders for types that contain other types never hard-code how a
/// constituent is written; they ask the [RenderContext] for its reference,
/// which goes back through the registry to the constituent's own builder.
pub trait Builder: Send + Sync {
    /// Name or expression the target language uses to refer to the type.
    fn render_reference(&self, ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError>;

    /// Structural declaration of the type.
    fn render_declaration(
        &self,
        ctx: &RenderContext,
        def: &TypeDef,
        out: &mut Formatter,
    ) -> Result<(), CompileError>;

    fn render_pack(
        &self,
        ctx: &RenderContext,
        def: &TypeDef,
        out: &mut Formatter,
    ) -> Result<(), CompileError>;

    fn render_unpack(
        &self,
        ctx: &RenderContext,
        def: &TypeDef,
        out: &mut Formatter,
    ) -> Result<(), CompileError>;
}

/// Lays out the files of one target language. The types themselves are
/// rendered by the builders the [RenderContext] resolves.
pub trait Emitter: Send + Sync {
    /// Other names the language can be selected by, besides its own.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Rejects schemas the language cannot represent, such as two names that
    /// render as the same identifier. Runs before anything is rendered.
    fn check(&self, _ctx: &RenderContext) -> Result<(), CompileError> {
        Ok(())
    }

    fn emit(&self, ctx: &RenderContext) -> Result<Vec<GeneratedFile>, CompileError>;
}

/// Everything a builder can see while rendering one project.
pub struct RenderContext<'a> {
    pub schema:   &'a Schema,
    pub registry: &'a BuilderRegistry,
    pub language: Language,
    pub project:  &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn builder_for(&self, def: &TypeDef) -> Result<&'a dyn Builder, CompileError> {
        self.registry.get(self.language, def.kind())
    }

    pub fn definition(&self, type_name: &str) -> Result<&'a TypeDef, CompileError> {
        self.schema
            .get(type_name)
            .ok_or_else(|| CompileError::UnknownType(type_name.to_string()))
    }

    /// Reference to `type_name`, rendered by the builder registered for its kind.
    pub fn reference(&self, type_name: &str) -> Result<String, CompileError> {
        let def = self.definition(type_name)?;
        self.builder_for(def)?.render_reference(self, def)
    }

    pub fn declaration(&self, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        self.builder_for(def)?.render_declaration(self, def, out)
    }

    pub fn pack(&self, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        self.builder_for(def)?.render_pack(self, def, out)
    }

    pub fn unpack(&self, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        self.builder_for(def)?.render_unpack(self, def, out)
    }
}

pub(crate) fn mismatch(def: &TypeDef, expected: TypeKind) -> CompileError {
    CompileError::KindMismatch { type_name: def.name().to_string(), expected }
}
