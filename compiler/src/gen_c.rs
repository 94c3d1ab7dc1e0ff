use crate::{
    builder::{mismatch, Builder, Emitter, RenderContext},
    error::CompileError,
    formatter::Formatter,
    generator::GeneratedFile,
    registry::{BuilderRegistry, Language},
    utils::{check_names, escape_keyword},
};
use brine_wire_schema::{BuiltIn, Numeric, TypeDef, TypeKind, FLOAT32_LIMIT};
use std::path::PathBuf;
use tracing::debug;

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if",
    "inline", "int", "long", "register", "restrict", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
    "unsigned", "void", "volatile", "while", "bool", "true", "false",
];

/// Identifiers of the headers and prelude that schema names must not take.
const C_RESERVED: &[&str] = &[
    "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t",
    "uint32_t", "uint64_t", "size_t", "wire_status", "wire_buffer",
    "wire_reader", "WIRE_OK", "WIRE_ERR_RANGE", "WIRE_ERR_LENGTH",
    "WIRE_ERR_TRUNCATED", "WIRE_ERR_INVALID_ENUM", "WIRE_ERR_INVALID_VARIANT",
    "WIRE_ERR_BUFFER_FULL", "WIRE_TRY", "WIRE_PRELUDE_H",
];

const PRELUDE: &[&str] = &[
    "#ifndef WIRE_PRELUDE_H",
    "#define WIRE_PRELUDE_H",
    "",
    "enum wire_status {",
    "    WIRE_OK = 0,",
    "    WIRE_ERR_RANGE,",
    "    WIRE_ERR_LENGTH,",
    "    WIRE_ERR_TRUNCATED,",
    "    WIRE_ERR_INVALID_ENUM,",
    "    WIRE_ERR_INVALID_VARIANT,",
    "    WIRE_ERR_BUFFER_FULL,",
    "};",
    "",
    "/* Output buffer: pack routines append at `used`, never past `capacity`. */",
    "struct wire_buffer {",
    "    uint8_t * data;",
    "    size_t capacity;",
    "    size_t used;",
    "};",
    "",
    "/* Input buffer: unpack routines consume from `pos` up to `len`. */",
    "struct wire_reader {",
    "    const uint8_t * data;",
    "    size_t len;",
    "    size_t pos;",
    "};",
    "",
    "#define WIRE_TRY(expr) \\",
    "    do { \\",
    "        enum wire_status wire_try_status_ = (expr); \\",
    "        if (wire_try_status_ != WIRE_OK) { \\",
    "            return wire_try_status_; \\",
    "        } \\",
    "    } while (0)",
    "",
    "#endif /* WIRE_PRELUDE_H */",
];

impl Language {
    pub const C: Language = Language::new("c");
}

/// Largest element count of a C array member. The declaration reserves room
/// for every element and unpacking copies the whole struct on the stack.
pub const MAX_ARRAY_ELEMENTS: u64 = 65_536;

pub fn register(registry: &mut BuilderRegistry) -> Result<(), CompileError> {
    registry.register_emitter(Language::C, Box::new(CEmitter))?;
    registry.register(Language::C, TypeKind::BuiltIn, Box::new(BuiltInBuilder))?;
    registry.register(Language::C, TypeKind::Scalar, Box::new(ScalarBuilder))?;
    registry.register(Language::C, TypeKind::Enumeration, Box::new(EnumerationBuilder))?;
    registry.register(Language::C, TypeKind::Composite, Box::new(CompositeBuilder))?;
    registry.register(Language::C, TypeKind::FixedArray, Box::new(FixedArrayBuilder))?;
    registry.register(Language::C, TypeKind::VariableArray, Box::new(VariableArrayBuilder))?;
    registry.register(Language::C, TypeKind::Group, Box::new(GroupBuilder))?;
    Ok(())
}

/// Renders `<project>.h` with declarations and prototypes, and `<project>.c`
/// with the pack/unpack routines.
pub struct CEmitter;

impl Emitter for CEmitter {
    fn check(&self, ctx: &RenderContext) -> Result<(), CompileError> {
        let language = ctx.language.name();
        let mut tags = Vec::new();
        let mut ordinary = Vec::new();

        for def in ctx.schema.declared() {
            let name = def.name();
            ordinary.push((name, format!("pack_{}", name)));
            ordinary.push((name, format!("unpack_{}", name)));
            ordinary.push((name, format!("MAX_ENCODED_LENGTH_{}", name)));
            match def {
                TypeDef::Scalar(t) => ordinary.push((t.name(), t.name().to_string())),
                TypeDef::Enumeration(t) => {
                    tags.push((t.name(), t.name().to_string()));
                    for label in t.labels() {
                        ordinary.push((label.as_str(), constant(t.name(), label)));
                    }
                }
                TypeDef::Group(t) => {
                    let tag_enum = format!("{}_tag", t.name());
                    tags.push((t.name(), t.name().to_string()));
                    tags.push((t.name(), tag_enum.clone()));
                    for variant in t.variants() {
                        ordinary.push((variant.name.as_str(), constant(&tag_enum, &variant.name)));
                    }
                    check_names(
                        language,
                        &format!("group {}", t.name()),
                        &[],
                        t.variants().iter().map(|v| (v.name.as_str(), member(&v.name))),
                    )?;
                }
                TypeDef::Composite(t) => {
                    tags.push((t.name(), t.name().to_string()));
                    check_names(
                        language,
                        &format!("composite {}", t.name()),
                        &[],
                        t.fields().iter().map(|f| (f.name.as_str(), member(&f.name))),
                    )?;
                }
                TypeDef::FixedArray(t) => {
                    tags.push((t.name(), t.name().to_string()));
                    check_array_size(t.name(), t.count())?;
                }
                TypeDef::VariableArray(t) => {
                    tags.push((t.name(), t.name().to_string()));
                    check_array_size(t.name(), t.max())?;
                }
                TypeDef::BuiltIn { .. } => {}
            }
        }

        let reserved: Vec<&str> = C_KEYWORDS.iter().chain(C_RESERVED).copied().collect();
        check_names(language, "struct and enum tags", &reserved, tags)?;
        check_names(language, "typedefs and enumerators", &reserved, ordinary)
    }

    fn emit(&self, ctx: &RenderContext) -> Result<Vec<GeneratedFile>, CompileError> {
        let schema = ctx.schema;
        let banner = format!(
            "/* Generated by bwire from schema {} {}. Do not edit. */",
            schema.name(),
            schema.version()
        );
        let guard = format!("{}_H", ctx.project.to_uppercase());

        let mut header = Formatter::new("    ");
        header.line(&banner);
        header.line(format!("#ifndef {}", guard));
        header.line(format!("#define {}", guard));
        header.blank();
        header.line("#include <stddef.h>");
        header.line("#include <stdint.h>");
        header.blank();
        for line in PRELUDE {
            header.line(line);
        }

        let mut prototypes = Formatter::new("    ");
        let mut source = Formatter::new("    ");
        source.line(&banner);
        source.line("#include <string.h>");
        source.line(format!("#include \"{}.h\"", ctx.project));

        for def in schema.ordered() {
            debug!(type_name = def.name(), kind = %def.kind(), "rendering c");
            header.blank();
            ctx.declaration(def, &mut header)?;
            if def.kind() != TypeKind::BuiltIn {
                header.line(format!(
                    "#define MAX_ENCODED_LENGTH_{} ({})",
                    def.name(),
                    schema.max_encoded_len(def)
                ));
                prototypes.line(format!("{};", pack_signature(ctx, def)?));
                prototypes.line(format!("{};", unpack_signature(ctx, def)?));
            }
            source.blank();
            ctx.pack(def, &mut source)?;
            source.blank();
            ctx.unpack(def, &mut source)?;
        }

        header.blank();
        header.append(prototypes);
        header.blank();
        header.line(format!("#endif /* {} */", guard));

        Ok(vec![
            GeneratedFile {
                path:     PathBuf::from(format!("{}.h", ctx.project)),
                contents: header.finish(),
            },
            GeneratedFile {
                path:     PathBuf::from(format!("{}.c", ctx.project)),
                contents: source.finish(),
            },
        ])
    }
}

fn check_array_size(type_name: &str, count: u64) -> Result<(), CompileError> {
    if count > MAX_ARRAY_ELEMENTS {
        return Err(CompileError::ArrayTooLarge {
            language:  Language::C.to_string(),
            type_name: type_name.to_string(),
            count,
            limit:     MAX_ARRAY_ELEMENTS,
        });
    }
    Ok(())
}

fn member(name: &str) -> String {
    escape_keyword(name, C_KEYWORDS)
}

fn constant(type_name: &str, label: &str) -> String {
    format!("{}_{}", type_name, label).to_uppercase()
}

fn primitive(builtin: BuiltIn) -> &'static str {
    match builtin {
        BuiltIn::Int8 => "int8_t",
        BuiltIn::Int16 => "int16_t",
        BuiltIn::Int32 => "int32_t",
        BuiltIn::Int64 => "int64_t",
        BuiltIn::UInt8 => "uint8_t",
        BuiltIn::UInt16 => "uint16_t",
        BuiltIn::UInt32 => "uint32_t",
        BuiltIn::UInt64 => "uint64_t",
        BuiltIn::Float32 => "float",
        BuiltIn::Float64 => "double",
    }
}

fn pack_signature(ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
    Ok(format!(
        "enum wire_status pack_{}(struct wire_buffer * buf, const {} * src)",
        def.name(),
        ctx.reference(def.name())?
    ))
}

fn unpack_signature(ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
    Ok(format!(
        "enum wire_status unpack_{}(struct wire_reader * rd, {} * dst)",
        def.name(),
        ctx.reference(def.name())?
    ))
}

fn function<F>(out: &mut Formatter, signature: String, body: F) -> Result<(), CompileError>
where
    F: FnOnce(&mut Formatter) -> Result<(), CompileError>,
{
    out.braces(format!("{} {{", signature), "}", body)
}

/// float32 must lie strictly inside the single precision limit; float64
/// only rejects NaN.
fn float_check(out: &mut Formatter, builtin: BuiltIn, value: &str) -> Result<(), CompileError> {
    let condition = match builtin {
        BuiltIn::Float32 => format!("!({0} > -{1:e} && {0} < {1:e})", value, FLOAT32_LIMIT),
        BuiltIn::Float64 => format!("{0} != {0}", value),
        _ => return Ok(()),
    };
    out.braces(format!("if ({}) {{", condition), "}", |out| {
        out.line("return WIRE_ERR_RANGE;");
        Ok(())
    })
}

struct BuiltInBuilder;

impl Builder for BuiltInBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        match def {
            TypeDef::BuiltIn { builtin } => Ok(primitive(*builtin).to_string()),
            _ => Err(mismatch(def, TypeKind::BuiltIn)),
        }
    }

    /// Builtins are the `<stdint.h>` types.
    fn render_declaration(&self, _: &RenderContext, _: &TypeDef, _: &mut Formatter) -> Result<(), CompileError> {
        Ok(())
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let builtin = def.as_builtin().ok_or_else(|| mismatch(def, TypeKind::BuiltIn))?;
        let width = builtin.byte_length();
        function(out, format!("static inline {}", pack_signature(ctx, def)?), |out| {
            float_check(out, builtin, "*src")?;
            out.braces(format!("if (buf->capacity - buf->used < {}) {{", width), "}", |out| {
                out.line("return WIRE_ERR_BUFFER_FULL;");
                Ok(())
            })?;
            match builtin.numeric() {
                Numeric::Float if width == 4 => {
                    out.line("uint32_t raw;");
                    out.line("memcpy(&raw, src, sizeof raw);");
                    out.line("uint64_t bits = raw;");
                }
                Numeric::Float => {
                    out.line("uint64_t bits;");
                    out.line("memcpy(&bits, src, sizeof bits);");
                }
                Numeric::Signed | Numeric::Unsigned => out.line("uint64_t bits = (uint64_t)*src;"),
            }
            out.braces(format!("for (size_t i = 0; i < {}; i++) {{", width), "}", |out| {
                out.line("buf->data[buf->used++] = (uint8_t)(bits >> (8 * i));");
                Ok(())
            })?;
            out.line("return WIRE_OK;");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let builtin = def.as_builtin().ok_or_else(|| mismatch(def, TypeKind::BuiltIn))?;
        let width = builtin.byte_length();
        function(out, format!("static inline {}", unpack_signature(ctx, def)?), |out| {
            out.braces(format!("if (rd->len - rd->pos < {}) {{", width), "}", |out| {
                out.line("return WIRE_ERR_TRUNCATED;");
                Ok(())
            })?;
            out.line("uint64_t bits = 0;");
            out.braces(format!("for (size_t i = 0; i < {}; i++) {{", width), "}", |out| {
                out.line("bits |= (uint64_t)rd->data[rd->pos++] << (8 * i);");
                Ok(())
            })?;
            match builtin.numeric() {
                Numeric::Float => {
                    out.line(format!("{} value;", primitive(builtin)));
                    if width == 4 {
                        out.line("uint32_t raw = (uint32_t)bits;");
                        out.line("memcpy(&value, &raw, sizeof raw);");
                    } else {
                        out.line("memcpy(&value, &bits, sizeof bits);");
                    }
                    float_check(out, builtin, "value")?;
                    out.line("*dst = value;");
                }
                Numeric::Signed | Numeric::Unsigned => {
                    out.line(format!("*dst = ({})bits;", primitive(builtin)))
                }
            }
            out.line("return WIRE_OK;");
            Ok(())
        })
    }
}

struct ScalarBuilder;

impl Builder for ScalarBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?.name().to_string())
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?;
        out.line(format!("typedef {} {};", ctx.reference(t.builtin().name())?, t.name()));
        Ok(())
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?;
        function(out, pack_signature(ctx, def)?, |out| {
            out.line(format!("return pack_{}(buf, src);", t.builtin()));
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?;
        function(out, unpack_signature(ctx, def)?, |out| {
            out.line(format!("return unpack_{}(rd, dst);", t.builtin()));
            Ok(())
        })
    }
}

struct EnumerationBuilder;

impl Builder for EnumerationBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        Ok(format!("enum {}", t.name()))
    }

    fn render_declaration(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        out.braces(format!("enum {} {{", t.name()), "};", |out| {
            for (i, label) in t.labels().iter().enumerate() {
                out.line(format!("{} = {},", constant(t.name(), label), i));
            }
            Ok(())
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let tag = ctx.reference(t.tag_type().name())?;
        function(out, pack_signature(ctx, def)?, |out| {
            out.braces(format!("if ((uint64_t)*src >= {}) {{", t.labels().len()), "}", |out| {
                out.line("return WIRE_ERR_INVALID_ENUM;");
                Ok(())
            })?;
            out.line(format!("{} ordinal = ({})*src;", tag, tag));
            out.line(format!("return pack_{}(buf, &ordinal);", t.tag_type()));
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let tag = ctx.reference(t.tag_type().name())?;
        function(out, unpack_signature(ctx, def)?, |out| {
            out.line(format!("{} ordinal;", tag));
            out.line(format!("WIRE_TRY(unpack_{}(rd, &ordinal));", t.tag_type()));
            out.braces(format!("if (ordinal >= {}) {{", t.labels().len()), "}", |out| {
                out.line("return WIRE_ERR_INVALID_ENUM;");
                Ok(())
            })?;
            out.line(format!("*dst = (enum {})ordinal;", t.name()));
            out.line("return WIRE_OK;");
            Ok(())
        })
    }
}

struct CompositeBuilder;

impl Builder for CompositeBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        Ok(format!("struct {}", t.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        out.braces(format!("struct {} {{", t.name()), "};", |out| {
            if t.fields().is_empty() {
                // C has no empty structs
                out.line("uint8_t empty_;");
            }
            for field in t.fields() {
                out.line(format!("{} {};", ctx.reference(&field.type_name)?, member(&field.name)));
            }
            Ok(())
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        function(out, pack_signature(ctx, def)?, |out| {
            if t.fields().is_empty() {
                out.line("(void)buf;");
                out.line("(void)src;");
            }
            for field in t.fields() {
                out.line(format!("WIRE_TRY(pack_{}(buf, &src->{}));", field.type_name, member(&field.name)));
            }
            out.line("return WIRE_OK;");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        function(out, unpack_signature(ctx, def)?, |out| {
            if t.fields().is_empty() {
                out.line("(void)rd;");
                out.line("dst->empty_ = 0;");
                out.line("return WIRE_OK;");
                return Ok(());
            }
            out.line(format!("struct {} tmp;", t.name()));
            for field in t.fields() {
                out.line(format!("WIRE_TRY(unpack_{}(rd, &tmp.{}));", field.type_name, member(&field.name)));
            }
            out.line("*dst = tmp;");
            out.line("return WIRE_OK;");
            Ok(())
        })
    }
}

struct FixedArrayBuilder;

impl Builder for FixedArrayBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        Ok(format!("struct {}", t.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        out.braces(format!("struct {} {{", t.name()), "};", |out| {
            out.line(format!("{} elems[{}];", ctx.reference(t.element())?, t.count()));
            Ok(())
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        function(out, pack_signature(ctx, def)?, |out| {
            out.braces(format!("for (size_t i = 0; i < {}; i++) {{", t.count()), "}", |out| {
                out.line(format!("WIRE_TRY(pack_{}(buf, &src->elems[i]));", t.element()));
                Ok(())
            })?;
            out.line("return WIRE_OK;");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        function(out, unpack_signature(ctx, def)?, |out| {
            out.line(format!("struct {} tmp;", t.name()));
            out.braces(format!("for (size_t i = 0; i < {}; i++) {{", t.count()), "}", |out| {
                out.line(format!("WIRE_TRY(unpack_{}(rd, &tmp.elems[i]));", t.element()));
                Ok(())
            })?;
            out.line("*dst = tmp;");
            out.line("return WIRE_OK;");
            Ok(())
        })
    }
}

struct VariableArrayBuilder;

impl Builder for VariableArrayBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        Ok(format!("struct {}", t.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        out.braces(format!("struct {} {{", t.name()), "};", |out| {
            out.line(format!("{} length;", ctx.reference(t.size_type().name())?));
            out.line(format!("{} elems[{}];", ctx.reference(t.element())?, t.max()));
            Ok(())
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        function(out, pack_signature(ctx, def)?, |out| {
            out.braces(format!("if (src->length > {}) {{", t.max()), "}", |out| {
                out.line("return WIRE_ERR_LENGTH;");
                Ok(())
            })?;
            out.line(format!("WIRE_TRY(pack_{}(buf, &src->length));", t.size_type()));
            out.braces("for (size_t i = 0; i < src->length; i++) {", "}", |out| {
                out.line(format!("WIRE_TRY(pack_{}(buf, &src->elems[i]));", t.element()));
                Ok(())
            })?;
            out.line("return WIRE_OK;");
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        function(out, unpack_signature(ctx, def)?, |out| {
            out.line(format!("struct {} tmp;", t.name()));
            out.line(format!("WIRE_TRY(unpack_{}(rd, &tmp.length));", t.size_type()));
            out.braces(format!("if (tmp.length > {}) {{", t.max()), "}", |out| {
                out.line("return WIRE_ERR_LENGTH;");
                Ok(())
            })?;
            out.braces("for (size_t i = 0; i < tmp.length; i++) {", "}", |out| {
                out.line(format!("WIRE_TRY(unpack_{}(rd, &tmp.elems[i]));", t.element()));
                Ok(())
            })?;
            out.line("*dst = tmp;");
            out.line("return WIRE_OK;");
            Ok(())
        })
    }
}

struct GroupBuilder;

impl Builder for GroupBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        Ok(format!("struct {}", t.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let tag_enum = format!("{}_tag", t.name());
        out.braces(format!("enum {} {{", tag_enum), "};", |out| {
            for (i, variant) in t.variants().iter().enumerate() {
                out.line(format!("{} = {},", constant(&tag_enum, &variant.name), i));
            }
            Ok(())
        })?;
        out.blank();
        out.braces(format!("struct {} {{", t.name()), "};", |out| {
            out.line(format!("{} tag;", ctx.reference(t.tag_type().name())?));
            out.braces("union {", "} data;", |out| {
                for variant in t.variants() {
                    out.line(format!("{} {};", ctx.reference(&variant.type_name)?, member(&variant.name)));
                }
                Ok(())
            })
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let tag_enum = format!("{}_tag", t.name());
        function(out, pack_signature(ctx, def)?, |out| {
            out.braces("switch (src->tag) {", "}", |out| {
                for variant in t.variants() {
                    out.line(format!("case {}:", constant(&tag_enum, &variant.name)));
                    out.indented(|out| {
                        out.line(format!("WIRE_TRY(pack_{}(buf, &src->tag));", t.tag_type()));
                        out.line(format!(
                            "return pack_{}(buf, &src->data.{});",
                            variant.type_name,
                            member(&variant.name)
                        ));
                        Ok(())
                    })?;
                }
                out.line("default:");
                out.indented(|out| {
                    out.line("return WIRE_ERR_INVALID_VARIANT;");
                    Ok(())
                })
            })
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let tag_enum = format!("{}_tag", t.name());
        function(out, unpack_signature(ctx, def)?, |out| {
            out.line(format!("struct {} tmp;", t.name()));
            out.line(format!("WIRE_TRY(unpack_{}(rd, &tmp.tag));", t.tag_type()));
            out.braces("switch (tmp.tag) {", "}", |out| {
                for variant in t.variants() {
                    out.line(format!("case {}:", constant(&tag_enum, &variant.name)));
                    out.indented(|out| {
                        out.line(format!(
                            "WIRE_TRY(unpack_{}(rd, &tmp.data.{}));",
                            variant.type_name,
                            member(&variant.name)
                        ));
                        out.line("break;");
                        Ok(())
                    })?;
                }
                out.line("default:");
                out.indented(|out| {
                    out.line("return WIRE_ERR_INVALID_VARIANT;");
                    Ok(())
                })
            })?;
            out.line("*dst = tmp;");
            out.line("return WIRE_OK;");
            Ok(())
        })
    }
}
