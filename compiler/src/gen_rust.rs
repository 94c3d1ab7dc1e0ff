use crate::{
    builder::{mismatch, Builder, Emitter, RenderContext},
    error::CompileError,
    formatter::Formatter,
    generator::GeneratedFile,
    registry::{BuilderRegistry, Language},
    utils::{check_names, escape_keyword, quote, to_pascal_case, to_snake_case},
};
use brine_wire_schema::{BuiltIn, TypeDef, TypeKind};
use std::path::PathBuf;
use tracing::debug;

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl",
    "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "Self", "static",
    "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "async", "await", "dyn",
];

/// Prelude names a generated type must not shadow.
const RUST_RESERVED_TYPES: &[&str] = &["Box", "Err", "None", "Ok", "Option", "Result", "Some", "String", "Vec"];

impl Language {
    pub const RUST: Language = Language::new("rust");
}

pub fn register(registry: &mut BuilderRegistry) -> Result<(), CompileError> {
    registry.register_emitter(Language::RUST, Box::new(RustEmitter))?;
    registry.register(Language::RUST, TypeKind::BuiltIn, Box::new(BuiltInBuilder))?;
    registry.register(Language::RUST, TypeKind::Scalar, Box::new(ScalarBuilder))?;
    registry.register(Language::RUST, TypeKind::Enumeration, Box::new(EnumerationBuilder))?;
    registry.register(Language::RUST, TypeKind::Composite, Box::new(CompositeBuilder))?;
    registry.register(Language::RUST, TypeKind::FixedArray, Box::new(FixedArrayBuilder))?;
    registry.register(Language::RUST, TypeKind::VariableArray, Box::new(VariableArrayBuilder))?;
    registry.register(Language::RUST, TypeKind::Group, Box::new(GroupBuilder))?;
    Ok(())
}

/// Renders `<project>.rs`, a module implementing the `brine_wire` traits for
/// every declared type.
pub struct RustEmitter;

impl Emitter for RustEmitter {
    fn aliases(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn check(&self, ctx: &RenderContext) -> Result<(), CompileError> {
        let language = ctx.language.name();
        check_names(
            language,
            "types",
            RUST_RESERVED_TYPES,
            ctx.schema.declared().map(|def| (def.name(), type_name(def.name()))),
        )?;
        for def in ctx.schema.declared() {
            let scope = format!("{} {}", def.kind(), def.name());
            match def {
                TypeDef::Enumeration(t) => check_names(
                    language,
                    &scope,
                    &[],
                    t.labels().iter().map(|l| (l.as_str(), type_name(l))),
                )?,
                TypeDef::Composite(t) => check_names(
                    language,
                    &scope,
                    &[],
                    t.fields().iter().map(|f| (f.name.as_str(), field_name(&f.name))),
                )?,
                TypeDef::Group(t) => check_names(
                    language,
                    &scope,
                    &[],
                    t.variants().iter().map(|v| (v.name.as_str(), type_name(&v.name))),
                )?,
                _ => {}
            }
        }
        Ok(())
    }

    fn emit(&self, ctx: &RenderContext) -> Result<Vec<GeneratedFile>, CompileError> {
        let schema = ctx.schema;
        let mut out = Formatter::new("    ");
        out.line(format!(
            "// Generated by bwire from schema {} {}. Do not edit.",
            schema.name(),
            schema.version()
        ));
        out.blank();
        out.line("use brine_wire as wire;");
        out.line("use brine_wire::{Pack as _, Unpack as _};");
        out.blank();
        out.line(format!("pub const SCHEMA_NAME: &str = {};", quote(schema.name())));
        out.line(format!("pub const SCHEMA_VERSION: &str = {};", quote(&schema.version().to_string())));

        for def in schema.ordered() {
            debug!(type_name = def.name(), kind = %def.kind(), "rendering rust");
            out.blank();
            ctx.declaration(def, &mut out)?;
            out.blank();
            ctx.pack(def, &mut out)?;
            out.blank();
            ctx.unpack(def, &mut out)?;
        }

        Ok(vec![GeneratedFile {
            path:     PathBuf::from(format!("{}.rs", ctx.project)),
            contents: out.finish(),
        }])
    }
}

fn type_name(name: &str) -> String {
    escape_keyword(&to_pascal_case(name), RUST_KEYWORDS)
}

fn field_name(name: &str) -> String {
    escape_keyword(&to_snake_case(name), RUST_KEYWORDS)
}

fn primitive(builtin: BuiltIn) -> &'static str {
    match builtin {
        BuiltIn::Int8 => "i8",
        BuiltIn::Int16 => "i16",
        BuiltIn::Int32 => "i32",
        BuiltIn::Int64 => "i64",
        BuiltIn::UInt8 => "u8",
        BuiltIn::UInt16 => "u16",
        BuiltIn::UInt32 => "u32",
        BuiltIn::UInt64 => "u64",
        BuiltIn::Float32 => "f32",
        BuiltIn::Float64 => "f64",
    }
}

fn pack_impl<F>(out: &mut Formatter, ty: &str, body: F) -> Result<(), CompileError>
where
    F: FnOnce(&mut Formatter) -> Result<(), CompileError>,
{
    out.braces(format!("impl wire::Pack for {} {{", ty), "}", |out| {
        out.braces(
            "fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {",
            "}",
            body,
        )
    })
}

fn unpack_impl<F>(out: &mut Formatter, ty: &str, body: F) -> Result<(), CompileError>
where
    F: FnOnce(&mut Formatter) -> Result<(), CompileError>,
{
    out.braces(format!("impl wire::Unpack for {} {{", ty), "}", |out| {
        out.braces(
            "fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {",
            "}",
            body,
        )
    })
}

fn length_error(out: &mut Formatter, schema_name: &str, len: &str, limit: &str) -> Result<(), CompileError> {
    out.braces("return Err(wire::WireError::Length {", "});", |out| {
        out.line(format!("type_name: {}.to_string(),", quote(schema_name)));
        out.line(format!("len:       {},", len));
        out.line(format!("limit:     {},", limit));
        Ok(())
    })
}

/// Builtins map onto Rust primitives; their codec lives in the runtime crate.
struct BuiltInBuilder;

impl Builder for BuiltInBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        match def {
            TypeDef::BuiltIn { builtin } => Ok(primitive(*builtin).to_string()),
            _ => Err(mismatch(def, TypeKind::BuiltIn)),
        }
    }

    fn render_declaration(&self, _: &RenderContext, _: &TypeDef, _: &mut Formatter) -> Result<(), CompileError> {
        Ok(())
    }

    fn render_pack(&self, _: &RenderContext, _: &TypeDef, _: &mut Formatter) -> Result<(), CompileError> {
        Ok(())
    }

    fn render_unpack(&self, _: &RenderContext, _: &TypeDef, _: &mut Formatter) -> Result<(), CompileError> {
        Ok(())
    }
}

struct ScalarBuilder;

impl Builder for ScalarBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(type_name(def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?;
        let name = type_name(t.name());
        let inner = ctx.reference(t.builtin().name())?;
        out.line(format!("/// `{}`, encoded as {}.", t.name(), t.builtin()));
        out.line("#[derive(Debug, Clone, Copy, PartialEq)]");
        out.line(format!("pub struct {}(pub {});", name, inner));
        out.blank();
        out.braces(format!("impl {} {{", name), "}", |out| {
            out.braces(format!("pub fn new(value: {}) -> Result<Self, wire::WireError> {{", inner), "}", |out| {
                out.line(format!("let value = {}(value);", name));
                out.line("wire::Pack::validate(&value)?;");
                out.line("Ok(value)");
                Ok(())
            })
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?;
        pack_impl(out, &type_name(t.name()), |out| {
            out.line("self.0.pack_into(bb)");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?;
        let name = type_name(t.name());
        let inner = ctx.reference(t.builtin().name())?;
        unpack_impl(out, &name, |out| {
            out.line(format!("Ok({}({}::unpack_from(bb)?))", name, inner));
            Ok(())
        })
    }
}

struct EnumerationBuilder;

impl Builder for EnumerationBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(type_name(def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let name = type_name(t.name());
        let tag = ctx.reference(t.tag_type().name())?;
        let labels: Vec<String> = t.labels().iter().map(|l| quote(l)).collect();

        out.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        out.braces(format!("pub enum {} {{", name), "}", |out| {
            for label in t.labels() {
                out.line(format!("{},", type_name(label)));
            }
            Ok(())
        })?;
        out.blank();
        out.braces(format!("impl {} {{", name), "}", |out| {
            out.line(format!(
                "pub const LABELS: [&'static str; {}] = [{}];",
                labels.len(),
                labels.join(", ")
            ));
            out.blank();
            out.braces(format!("pub fn ordinal(self) -> {} {{", tag), "}", |out| {
                out.line(format!("self as {}", tag));
                Ok(())
            })?;
            out.blank();
            out.braces(format!("pub fn from_ordinal(ordinal: {}) -> Option<Self> {{", tag), "}", |out| {
                out.braces("match ordinal {", "}", |out| {
                    for (i, label) in t.labels().iter().enumerate() {
                        out.line(format!("{} => Some({}::{}),", i, name, type_name(label)));
                    }
                    out.line("_ => None,");
                    Ok(())
                })
            })?;
            out.blank();
            out.braces("pub fn label(self) -> &'static str {", "}", |out| {
                out.line("Self::LABELS[self as usize]");
                Ok(())
            })
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        pack_impl(out, &type_name(t.name()), |out| {
            out.line("self.ordinal().pack_into(bb)");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let name = type_name(t.name());
        let tag = ctx.reference(t.tag_type().name())?;
        unpack_impl(out, &name, |out| {
            out.line(format!("let ordinal = {}::unpack_from(bb)?;", tag));
            out.braces(format!("{}::from_ordinal(ordinal).ok_or_else(|| wire::WireError::InvalidEnumerationValue {{", name), "})", |out| {
                out.line(format!("type_name: {}.to_string(),", quote(t.name())));
                out.line("value:     u64::from(ordinal),");
                Ok(())
            })
        })
    }
}

struct CompositeBuilder;

impl Builder for CompositeBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(type_name(def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        out.line("#[derive(Debug, Clone, PartialEq)]");
        out.braces(format!("pub struct {} {{", type_name(t.name())), "}", |out| {
            for field in t.fields() {
                out.line(format!("pub {}: {},", field_name(&field.name), ctx.reference(&field.type_name)?));
            }
            Ok(())
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        pack_impl(out, &type_name(t.name()), |out| {
            if t.fields().is_empty() {
                out.line("let _ = bb;");
            }
            for field in t.fields() {
                out.line(format!("self.{}.pack_into(bb)?;", field_name(&field.name)));
            }
            out.line("Ok(())");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        let name = type_name(t.name());
        unpack_impl(out, &name, |out| {
            if t.fields().is_empty() {
                out.line("let _ = bb;");
            }
            // Struct literal fields are evaluated in the order written
            out.braces(format!("Ok({} {{", name), "})", |out| {
                for field in t.fields() {
                    out.line(format!(
                        "{}: {}::unpack_from(bb)?,",
                        field_name(&field.name),
                        ctx.reference(&field.type_name)?
                    ));
                }
                Ok(())
            })
        })
    }
}

struct FixedArrayBuilder;

impl Builder for FixedArrayBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(type_name(def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        let name = type_name(t.name());
        let element = ctx.reference(t.element())?;
        out.line(format!("/// Exactly {} elements.", t.count()));
        out.line("#[derive(Debug, Clone, PartialEq)]");
        out.line(format!("pub struct {}(Vec<{}>);", name, element));
        out.blank();
        out.braces(format!("impl {} {{", name), "}", |out| {
            out.line(format!("pub const COUNT: usize = {};", t.count()));
            out.blank();
            out.braces(format!("pub fn new(elements: Vec<{}>) -> Result<Self, wire::WireError> {{", element), "}", |out| {
                out.braces("if elements.len() != Self::COUNT {", "}", |out| {
                    length_error(out, t.name(), "elements.len() as u64", "Self::COUNT as u64")
                })?;
                out.line(format!("let value = {}(elements);", name));
                out.line("wire::Pack::validate(&value)?;");
                out.line("Ok(value)");
                Ok(())
            })?;
            out.blank();
            out.braces(format!("pub fn elements(&self) -> &[{}] {{", element), "}", |out| {
                out.line("&self.0");
                Ok(())
            })?;
            out.blank();
            out.braces(format!("pub fn into_elements(self) -> Vec<{}> {{", element), "}", |out| {
                out.line("self.0");
                Ok(())
            })
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        pack_impl(out, &type_name(t.name()), |out| {
            out.braces("for element in &self.0 {", "}", |out| {
                out.line("element.pack_into(bb)?;");
                Ok(())
            })?;
            out.line("Ok(())");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        let name = type_name(t.name());
        let element = ctx.reference(t.element())?;
        unpack_impl(out, &name, |out| {
            // Never reserve more elements than there are bytes left
            out.line("let mut elements = Vec::with_capacity(Self::COUNT.min(bb.remaining()));");
            out.braces("for _ in 0..Self::COUNT {", "}", |out| {
                out.line(format!("elements.push({}::unpack_from(bb)?);", element));
                Ok(())
            })?;
            out.line(format!("Ok({}(elements))", name));
            Ok(())
        })
    }
}

struct VariableArrayBuilder;

impl Builder for VariableArrayBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(type_name(def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        let name = type_name(t.name());
        let element = ctx.reference(t.element())?;
        out.line(format!("/// At most {} elements, prefixed by a {} count.", t.max(), t.size_type()));
        out.line("#[derive(Debug, Clone, PartialEq)]");
        out.line(format!("pub struct {}(Vec<{}>);", name, element));
        out.blank();
        out.braces(format!("impl {} {{", name), "}", |out| {
            out.line(format!("pub const MAX: usize = {};", t.max()));
            out.blank();
            out.braces(format!("pub fn new(elements: Vec<{}>) -> Result<Self, wire::WireError> {{", element), "}", |out| {
                out.braces("if elements.len() > Self::MAX {", "}", |out| {
                    length_error(out, t.name(), "elements.len() as u64", "Self::MAX as u64")
                })?;
                out.line(format!("let value = {}(elements);", name));
                out.line("wire::Pack::validate(&value)?;");
                out.line("Ok(value)");
                Ok(())
            })?;
            out.blank();
            out.braces(format!("pub fn elements(&self) -> &[{}] {{", element), "}", |out| {
                out.line("&self.0");
                Ok(())
            })?;
            out.blank();
            out.braces(format!("pub fn into_elements(self) -> Vec<{}> {{", element), "}", |out| {
                out.line("self.0");
                Ok(())
            })
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        let size = ctx.reference(t.size_type().name())?;
        pack_impl(out, &type_name(t.name()), |out| {
            out.braces("if self.0.len() > Self::MAX {", "}", |out| {
                length_error(out, t.name(), "self.0.len() as u64", "Self::MAX as u64")
            })?;
            out.line(format!("(self.0.len() as {}).pack_into(bb)?;", size));
            out.braces("for element in &self.0 {", "}", |out| {
                out.line("element.pack_into(bb)?;");
                Ok(())
            })?;
            out.line("Ok(())");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        let name = type_name(t.name());
        let size = ctx.reference(t.size_type().name())?;
        let element = ctx.reference(t.element())?;
        unpack_impl(out, &name, |out| {
            out.line(format!("let len = u64::from({}::unpack_from(bb)?);", size));
            out.braces("if len > Self::MAX as u64 {", "}", |out| {
                length_error(out, t.name(), "len", "Self::MAX as u64")
            })?;
            out.line("let mut elements = Vec::with_capacity((len as usize).min(bb.remaining()));");
            out.braces("for _ in 0..len {", "}", |out| {
                out.line(format!("elements.push({}::unpack_from(bb)?);", element));
                Ok(())
            })?;
            out.line(format!("Ok({}(elements))", name));
            Ok(())
        })
    }
}

struct GroupBuilder;

impl Builder for GroupBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(type_name(def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let name = type_name(t.name());
        let tag = ctx.reference(t.tag_type().name())?;
        let variants: Vec<String> = t.variants().iter().map(|v| quote(&v.name)).collect();

        out.line("#[derive(Debug, Clone, PartialEq)]");
        out.braces(format!("pub enum {} {{", name), "}", |out| {
            for variant in t.variants() {
                out.line(format!("{}({}),", type_name(&variant.name), ctx.reference(&variant.type_name)?));
            }
            Ok(())
        })?;
        out.blank();
        out.braces(format!("impl {} {{", name), "}", |out| {
            out.line(format!(
                "pub const VARIANTS: [&'static str; {}] = [{}];",
                variants.len(),
                variants.join(", ")
            ));
            out.blank();
            out.braces(format!("pub fn tag(&self) -> {} {{", tag), "}", |out| {
                out.braces("match self {", "}", |out| {
                    for (i, variant) in t.variants().iter().enumerate() {
                        out.line(format!("{}::{}(_) => {},", name, type_name(&variant.name), i));
                    }
                    Ok(())
                })
            })
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let name = type_name(t.name());
        pack_impl(out, &name, |out| {
            out.line("self.tag().pack_into(bb)?;");
            out.braces("match self {", "}", |out| {
                for variant in t.variants() {
                    out.line(format!("{}::{}(payload) => payload.pack_into(bb),", name, type_name(&variant.name)));
                }
                Ok(())
            })
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let name = type_name(t.name());
        let tag = ctx.reference(t.tag_type().name())?;
        unpack_impl(out, &name, |out| {
            out.braces(format!("match {}::unpack_from(bb)? {{", tag), "}", |out| {
                for (i, variant) in t.variants().iter().enumerate() {
                    out.line(format!(
                        "{} => Ok({}::{}({}::unpack_from(bb)?)),",
                        i,
                        name,
                        type_name(&variant.name),
                        ctx.reference(&variant.type_name)?
                    ));
                }
                out.braces("tag => Err(wire::WireError::InvalidVariant {", "}),", |out| {
                    out.line(format!("type_name: {}.to_string(),", quote(t.name())));
                    out.line("value:     u64::from(tag),");
                    Ok(())
                })
            })
        })
    }
}
