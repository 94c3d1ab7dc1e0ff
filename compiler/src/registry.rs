use crate::{
    builder::{Builder, Emitter},
    error::CompileError,
    gen_c, gen_ruby, gen_rust,
};
use brine_wire_schema::TypeKind;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::trace;

/// A target language, known by the name it is selected with.
///
/// Backends name their language with a constant, e.g. `Language::C` in
/// [gen_c]; a language is usable once an [Emitter] is registered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language(&'static str);

impl Language {
    pub const fn new(name: &'static str) -> Language {
        Language(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Emitters keyed by language and builders keyed by `(language, kind)`.
///
/// Populate it once, then share it read-only. Each key can be registered
/// exactly once; lookups of missing keys fail with
/// [CompileError::UnsupportedTarget].
#[derive(Default)]
pub struct BuilderRegistry {
    emitters: BTreeMap<Language, Box<dyn Emitter>>,
    builders: HashMap<(Language, TypeKind), Box<dyn Builder>>,
}

impl BuilderRegistry {
    /// An empty registry.
    pub fn new() -> BuilderRegistry {
        BuilderRegistry::default()
    }

    /// A registry holding the C, Ruby and Rust backends.
    pub fn with_defaults() -> Result<BuilderRegistry, CompileError> {
        let mut registry = BuilderRegistry::new();
        gen_c::register(&mut registry)?;
        gen_ruby::register(&mut registry)?;
        gen_rust::register(&mut registry)?;
        Ok(registry)
    }

    pub fn register_emitter(
        &mut self,
        language: Language,
        emitter: Box<dyn Emitter>,
    ) -> Result<(), CompileError> {
        if self.emitters.contains_key(&language) {
            return Err(CompileError::DuplicateLanguage(language.to_string()));
        }
        trace!(%language, aliases = ?emitter.aliases(), "registered emitter");
        self.emitters.insert(language, emitter);
        Ok(())
    }

    pub fn register(
        &mut self,
        language: Language,
        kind: TypeKind,
        builder: Box<dyn Builder>,
    ) -> Result<(), CompileError> {
        if self.builders.contains_key(&(language, kind)) {
            return Err(CompileError::DuplicateBuilder { language: language.to_string(), kind });
        }
        trace!(%language, %kind, "registered builder");
        self.builders.insert((language, kind), builder);
        Ok(())
    }

    pub fn emitter(&self, language: Language) -> Result<&dyn Emitter, CompileError> {
        self.emitters
            .get(&language)
            .map(|emitter| emitter.as_ref())
            .ok_or_else(|| CompileError::UnsupportedTarget { language: language.to_string(), kind: None })
    }

    pub fn get(&self, language: Language, kind: TypeKind) -> Result<&dyn Builder, CompileError> {
        self.builders
            .get(&(language, kind))
            .map(|builder| builder.as_ref())
            .ok_or_else(|| CompileError::UnsupportedTarget {
                language: language.to_string(),
                kind:     Some(kind),
            })
    }

    /// Resolves a language by its name or one of its aliases, ignoring case.
    pub fn language(&self, name: &str) -> Result<Language, CompileError> {
        let wanted = name.to_ascii_lowercase();
        self.emitters
            .iter()
            .find(|(language, emitter)| {
                language.name() == wanted || emitter.aliases().iter().any(|alias| *alias == wanted)
            })
            .map(|(language, _)| *language)
            .ok_or_else(|| CompileError::UnsupportedTarget { language: name.to_string(), kind: None })
    }

    /// Languages with a registered emitter, by name.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.emitters.keys().copied()
    }

    pub fn supports(&self, language: Language, kind: TypeKind) -> bool {
        self.builders.contains_key(&(language, kind))
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}
