use crate::{
    builder::{mismatch, Builder, Emitter, RenderContext},
    error::CompileError,
    formatter::Formatter,
    generator::GeneratedFile,
    registry::{BuilderRegistry, Language},
    utils::{check_names, to_pascal_case},
};
use brine_wire_schema::{BuiltIn, Numeric, TypeDef, TypeKind, FLOAT32_LIMIT};
use std::path::PathBuf;
use tracing::debug;

/// Runtime shared by every generated class: error types, a byte reader and
/// the `Wire::Type` base class.
const RUNTIME: &[&str] = &[
    "module Wire",
    "  class Error < StandardError; end",
    "",
    "  class RangeError < Error",
    "    def initialize(msg = \"Out of range value\")",
    "      super",
    "    end",
    "  end",
    "",
    "  class LengthError < Error",
    "    def initialize(msg = \"invalid length\")",
    "      super",
    "    end",
    "  end",
    "",
    "  class TruncatedBufferError < Error; end",
    "  class InvalidEnumerationValue < Error; end",
    "  class InvalidVariantError < Error; end",
    "  class TrailingBytesError < Error; end",
    "",
    "  class Reader",
    "    def initialize(bytes)",
    "      @bytes = bytes.b",
    "      @pos = 0",
    "    end",
    "",
    "    def take(count)",
    "      remaining = @bytes.bytesize - @pos",
    "      if count > remaining",
    "        raise TruncatedBufferError, \"Truncated buffer: needed #{count} bytes but only #{remaining} remain\"",
    "      end",
    "      chunk = @bytes.byteslice(@pos, count)",
    "      @pos += count",
    "      chunk",
    "    end",
    "",
    "    def finish!(type)",
    "      remaining = @bytes.bytesize - @pos",
    "      raise TrailingBytesError, \"#{remaining} trailing bytes after #{type.name}\" unless remaining.zero?",
    "    end",
    "  end",
    "",
    "  class Type",
    "    def self.construct(value)",
    "      value.is_a?(self) ? value : new(value)",
    "    end",
    "",
    "    def self.unpack(bytes)",
    "      reader = Reader.new(bytes)",
    "      value = unpack_from(reader)",
    "      reader.finish!(self)",
    "      value",
    "    end",
    "",
    "    def pack",
    "      out = String.new(encoding: Encoding::BINARY)",
    "      pack_into(out)",
    "      out",
    "    end",
    "",
    "    def ==(other)",
    "      other.is_a?(self.class) && other.to_ruby == to_ruby",
    "    end",
    "    alias eql? ==",
    "",
    "    def hash",
    "      to_ruby.hash",
    "    end",
    "  end",
    "",
    "  class Builtin < Type",
    "    attr_reader :value",
    "",
    "    def self.in_range?(value)",
    "      value.is_a?(Integer) && value >= self::MIN && value <= self::MAX",
    "    end",
    "",
    "    def initialize(value)",
    "      unless self.class.in_range?(value)",
    "        raise RangeError, \"Out of range value #{value.inspect} for #{self.class.name}\"",
    "      end",
    "      @value = value",
    "    end",
    "",
    "    def to_ruby",
    "      @value",
    "    end",
    "  end",
    "end",
];

/// Methods every generated composite already has. A field reader with one
/// of these names would replace it.
const RUBY_RESERVED_FIELDS: &[&str] = &[
    "class", "clone", "display", "dup", "extend", "freeze", "hash", "initialize", "inspect", "instance_variables", "itself",
    "method", "methods", "object_id", "pack", "pack_into", "public_send",
    "send", "singleton_class", "tap", "then", "to_ruby", "to_s",
];

impl Language {
    pub const RUBY: Language = Language::new("ruby");
}

pub fn register(registry: &mut BuilderRegistry) -> Result<(), CompileError> {
    registry.register_emitter(Language::RUBY, Box::new(RubyEmitter))?;
    registry.register(Language::RUBY, TypeKind::BuiltIn, Box::new(BuiltInBuilder))?;
    registry.register(Language::RUBY, TypeKind::Scalar, Box::new(ScalarBuilder))?;
    registry.register(Language::RUBY, TypeKind::Enumeration, Box::new(EnumerationBuilder))?;
    registry.register(Language::RUBY, TypeKind::Composite, Box::new(CompositeBuilder))?;
    registry.register(Language::RUBY, TypeKind::FixedArray, Box::new(FixedArrayBuilder))?;
    registry.register(Language::RUBY, TypeKind::VariableArray, Box::new(VariableArrayBuilder))?;
    registry.register(Language::RUBY, TypeKind::Group, Box::new(GroupBuilder))?;
    Ok(())
}

/// Renders `<project>.rb`: one module holding the runtime and a class per type.
pub struct RubyEmitter;

impl Emitter for RubyEmitter {
    fn aliases(&self) -> &'static [&'static str] {
        &["rb"]
    }

    fn check(&self, ctx: &RenderContext) -> Result<(), CompileError> {
        let language = ctx.language.name();
        check_names(
            language,
            "classes",
            &["Wire"],
            ctx.schema.declared().map(|def| (def.name(), to_pascal_case(def.name()))),
        )?;
        for t in ctx.schema.declared().filter_map(TypeDef::as_composite) {
            check_names(
                language,
                &format!("composite {}", t.name()),
                RUBY_RESERVED_FIELDS,
                t.fields().iter().map(|f| (f.name.as_str(), f.name.clone())),
            )?;
        }
        Ok(())
    }

    fn emit(&self, ctx: &RenderContext) -> Result<Vec<GeneratedFile>, CompileError> {
        let schema = ctx.schema;
        let mut out = Formatter::new("  ");
        out.line(format!(
            "# Generated by bwire from schema {} {}. Do not edit.",
            schema.name(),
            schema.version()
        ));
        out.blank();
        out.braces(format!("module {}", to_pascal_case(ctx.project)), "end", |out| {
            out.line(format!("SCHEMA_NAME = \"{}\"", schema.name()));
            out.line(format!("SCHEMA_VERSION = \"{}\"", schema.version()));
            out.blank();
            for line in RUNTIME {
                out.line(line);
            }

            for def in schema.ordered() {
                debug!(type_name = def.name(), kind = %def.kind(), "rendering ruby");
                let mut declaration = Formatter::new("  ");
                ctx.declaration(def, &mut declaration)?;
                let mut pack = Formatter::new("  ");
                ctx.pack(def, &mut pack)?;
                let mut unpack = Formatter::new("  ");
                ctx.unpack(def, &mut unpack)?;

                out.blank();
                let header = format!("class {} < {}", ctx.reference(def.name())?, superclass(ctx, def)?);
                out.braces(header, "end", |out| {
                    let sections = [declaration, pack, unpack].into_iter().filter(|s| !s.is_empty());
                    for (i, section) in sections.enumerate() {
                        if i > 0 {
                            out.blank();
                        }
                        out.append(section);
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;

        Ok(vec![GeneratedFile {
            path:     PathBuf::from(format!("{}.rb", ctx.project)),
            contents: out.finish(),
        }])
    }
}

fn superclass(ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
    match def {
        TypeDef::BuiltIn { .. } => Ok("Wire::Builtin".to_string()),
        TypeDef::Scalar(t) => ctx.reference(t.builtin().name()),
        _ => Ok("Wire::Type".to_string()),
    }
}

fn class_name(builtin: BuiltIn) -> &'static str {
    match builtin {
        BuiltIn::Int8 => "Int8",
        BuiltIn::Int16 => "Int16",
        BuiltIn::Int32 => "Int32",
        BuiltIn::Int64 => "Int64",
        BuiltIn::UInt8 => "UInt8",
        BuiltIn::UInt16 => "UInt16",
        BuiltIn::UInt32 => "UInt32",
        BuiltIn::UInt64 => "UInt64",
        BuiltIn::Float32 => "Float32",
        BuiltIn::Float64 => "Float64",
    }
}

/// `Array#pack` directive for the little-endian encoding of `builtin`.
fn directive(builtin: BuiltIn) -> &'static str {
    match builtin {
        BuiltIn::Int8 => "c",
        BuiltIn::Int16 => "s<",
        BuiltIn::Int32 => "l<",
        BuiltIn::Int64 => "q<",
        BuiltIn::UInt8 => "C",
        BuiltIn::UInt16 => "S<",
        BuiltIn::UInt32 => "L<",
        BuiltIn::UInt64 => "Q<",
        BuiltIn::Float32 => "e",
        BuiltIn::Float64 => "E",
    }
}

fn method<F>(out: &mut Formatter, signature: &str, body: F) -> Result<(), CompileError>
where
    F: FnOnce(&mut Formatter) -> Result<(), CompileError>,
{
    out.braces(format!("def {}", signature), "end", body)
}

struct BuiltInBuilder;

impl Builder for BuiltInBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        match def {
            TypeDef::BuiltIn { builtin } => Ok(format!("Wire::{}", class_name(*builtin))),
            _ => Err(mismatch(def, TypeKind::BuiltIn)),
        }
    }

    fn render_declaration(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let builtin = def.as_builtin().ok_or_else(|| mismatch(def, TypeKind::BuiltIn))?;
        out.line(format!("WIDTH = {}", builtin.byte_length()));
        match (builtin.numeric(), builtin.int_range()) {
            (Numeric::Float, _) if builtin == BuiltIn::Float32 => {
                out.line(format!("LIMIT = {:e}", FLOAT32_LIMIT));
                out.blank();
                method(out, "self.in_range?(value)", |out| {
                    out.line("value.is_a?(Numeric) && value > -LIMIT && value < LIMIT");
                    Ok(())
                })?;
                out.blank();
                // Round to single precision so values survive a round trip
                method(out, "initialize(value)", |out| {
                    out.line("super");
                    out.line(format!("@value = [@value.to_f].pack(\"{0}\").unpack1(\"{0}\")", directive(builtin)));
                    Ok(())
                })
            }
            (Numeric::Float, _) => {
                out.blank();
                method(out, "self.in_range?(value)", |out| {
                    out.line("value.is_a?(Numeric) && !value.to_f.nan?");
                    Ok(())
                })?;
                out.blank();
                method(out, "initialize(value)", |out| {
                    out.line("super");
                    out.line("@value = @value.to_f");
                    Ok(())
                })
            }
            (_, Some((min, max))) => {
                out.line(format!("MIN = {}", min));
                out.line(format!("MAX = {}", max));
                Ok(())
            }
            (_, None) => Err(mismatch(def, TypeKind::BuiltIn)),
        }
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let builtin = def.as_builtin().ok_or_else(|| mismatch(def, TypeKind::BuiltIn))?;
        method(out, "pack_into(out)", |out| {
            out.line(format!("out << [@value].pack(\"{}\")", directive(builtin)));
            Ok(())
        })
    }

    fn render_unpack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let builtin = def.as_builtin().ok_or_else(|| mismatch(def, TypeKind::BuiltIn))?;
        method(out, "self.unpack_from(reader)", |out| {
            out.line(format!("new(reader.take(WIDTH).unpack1(\"{}\"))", directive(builtin)));
            Ok(())
        })
    }
}

/// A scalar is a subclass of its builtin and inherits everything.
struct ScalarBuilder;

impl Builder for ScalarBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(to_pascal_case(def.as_scalar().ok_or_else(|| mismatch(def, TypeKind::Scalar))?.name()))
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

struct EnumerationBuilder;

impl Builder for EnumerationBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(to_pascal_case(def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?.name()))
    }

    fn render_declaration(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let labels: Vec<String> = t.labels().iter().map(|l| format!(":{}", l)).collect();
        out.line(format!("LABELS = [{}].freeze", labels.join(", ")));
        out.blank();
        out.line("attr_reader :label");
        out.blank();
        method(out, "initialize(label)", |out| {
            out.line("label = label.to_sym if label.is_a?(String)");
            out.braces("unless LABELS.include?(label)", "end", |out| {
                out.line(r#"raise Wire::InvalidEnumerationValue, "Invalid enumeration value #{label.inspect} for #{self.class.name}""#);
                Ok(())
            })?;
            out.line("@label = label");
            Ok(())
        })?;
        out.blank();
        method(out, "ordinal", |out| {
            out.line("LABELS.index(@label)");
            Ok(())
        })?;
        out.blank();
        method(out, "to_ruby", |out| {
            out.line("@label");
            Ok(())
        })
    }

    fn render_pack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let tag = ctx.reference(t.tag_type().name())?;
        method(out, "pack_into(out)", |out| {
            out.line(format!("{}.new(ordinal).pack_into(out)", tag));
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_enumeration().ok_or_else(|| mismatch(def, TypeKind::Enumeration))?;
        let tag = ctx.reference(t.tag_type().name())?;
        method(out, "self.unpack_from(reader)", |out| {
            out.line(format!("ordinal = {}.unpack_from(reader).value", tag));
            out.braces("if ordinal >= LABELS.length", "end", |out| {
                out.line(r#"raise Wire::InvalidEnumerationValue, "Invalid enumeration value #{ordinal} for #{name}""#);
                Ok(())
            })?;
            out.line("new(LABELS[ordinal])");
            Ok(())
        })
    }
}

/// Composites take a Hash with every declared field, in any key order.
struct CompositeBuilder;

impl Builder for CompositeBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(to_pascal_case(def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        let mut fields = Vec::with_capacity(t.fields().len());
        for field in t.fields() {
            fields.push(format!("{}: {}", field.name, ctx.reference(&field.type_name)?));
        }
        if fields.is_empty() {
            out.line("FIELDS = {}.freeze");
        } else {
            out.line(format!("FIELDS = {{ {} }}.freeze", fields.join(", ")));
        }
        if !t.fields().is_empty() {
            let readers: Vec<String> = t.fields().iter().map(|f| format!(":{}", f.name)).collect();
            out.blank();
            out.line(format!("attr_reader {}", readers.join(", ")));
        }
        out.blank();
        method(out, "initialize(fields)", |out| {
            out.line("fields = fields.transform_keys(&:to_sym)");
            out.line("missing = FIELDS.keys - fields.keys");
            out.line("unknown = fields.keys - FIELDS.keys");
            out.line(r#"raise ArgumentError, "Missing fields #{missing.join(', ')} for #{self.class.name}" unless missing.empty?"#);
            out.line(r#"raise ArgumentError, "Unknown fields #{unknown.join(', ')} for #{self.class.name}" unless unknown.empty?"#);
            out.line(r#"FIELDS.each { |name, type| instance_variable_set("@#{name}", type.construct(fields[name])) }"#);
            Ok(())
        })?;
        out.blank();
        method(out, "to_ruby", |out| {
            out.line(r#"FIELDS.keys.to_h { |name| [name, instance_variable_get("@#{name}").to_ruby] }"#);
            Ok(())
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        method(out, "pack_into(out)", |out| {
            for field in t.fields() {
                out.line(format!("@{}.pack_into(out)", field.name));
            }
            Ok(())
        })
    }

    fn render_unpack(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_composite().ok_or_else(|| mismatch(def, TypeKind::Composite))?;
        method(out, "self.unpack_from(reader)", |out| {
            out.line("fields = {}");
            for field in t.fields() {
                out.line(format!(
                    "fields[:{}] = {}.unpack_from(reader)",
                    field.name,
                    ctx.reference(&field.type_name)?
                ));
            }
            out.line("new(fields)");
            Ok(())
        })
    }
}

fn array_members(out: &mut Formatter) -> Result<(), CompileError> {
    out.blank();
    out.line("attr_reader :elements");
    out.blank();
    method(out, "to_ruby", |out| {
        out.line("@elements.map(&:to_ruby)");
        Ok(())
    })
}

fn array_pack(out: &mut Formatter) -> Result<(), CompileError> {
    out.line("@elements.each { |element| element.pack_into(out) }");
    Ok(())
}

struct FixedArrayBuilder;

impl Builder for FixedArrayBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(to_pascal_case(def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        out.line(format!("COUNT = {}", t.count()));
        out.line(format!("ELEMENT = {}", ctx.reference(t.element())?));
        array_members(out)?;
        out.blank();
        method(out, "initialize(elements)", |out| {
            out.line("elements = elements.bytes if elements.is_a?(String)");
            out.line("elements = elements.to_a");
            out.braces("unless elements.length == COUNT", "end", |out| {
                out.line(r#"raise Wire::LengthError, "invalid length #{elements.length} for #{self.class.name} (count #{COUNT})""#);
                Ok(())
            })?;
            out.line("@elements = elements.map { |element| ELEMENT.construct(element) }");
            Ok(())
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        method(out, "pack_into(out)", array_pack)
    }

    fn render_unpack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        def.as_fixed_array().ok_or_else(|| mismatch(def, TypeKind::FixedArray))?;
        method(out, "self.unpack_from(reader)", |out| {
            out.line("new(Array.new(COUNT) { ELEMENT.unpack_from(reader) })");
            Ok(())
        })
    }
}

struct VariableArrayBuilder;

impl Builder for VariableArrayBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(to_pascal_case(def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        out.line(format!("MAX = {}", t.max()));
        out.line(format!("SIZE_TYPE = {}", ctx.reference(t.size_type().name())?));
        out.line(format!("ELEMENT = {}", ctx.reference(t.element())?));
        array_members(out)?;
        out.blank();
        method(out, "initialize(elements)", |out| {
            out.line("elements = elements.bytes if elements.is_a?(String)");
            out.line("elements = elements.to_a");
            out.braces("if elements.length > MAX", "end", |out| {
                out.line(r#"raise Wire::LengthError, "invalid length #{elements.length} for #{self.class.name} (max #{MAX})""#);
                Ok(())
            })?;
            out.line("@elements = elements.map { |element| ELEMENT.construct(element) }");
            Ok(())
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        method(out, "pack_into(out)", |out| {
            out.line("SIZE_TYPE.new(@elements.length).pack_into(out)");
            array_pack(out)
        })
    }

    fn render_unpack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        def.as_variable_array().ok_or_else(|| mismatch(def, TypeKind::VariableArray))?;
        method(out, "self.unpack_from(reader)", |out| {
            out.line("length = SIZE_TYPE.unpack_from(reader).value");
            out.braces("if length > MAX", "end", |out| {
                out.line(r#"raise Wire::LengthError, "invalid length #{length} for #{name} (max #{MAX})""#);
                Ok(())
            })?;
            out.line("new(Array.new(length) { ELEMENT.unpack_from(reader) })");
            Ok(())
        })
    }
}

/// Groups are built from `[variant, payload]` pairs.
struct GroupBuilder;

impl Builder for GroupBuilder {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(to_pascal_case(def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?.name()))
    }

    fn render_declaration(&self, ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        let t = def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        let mut variants = Vec::with_capacity(t.variants().len());
        for variant in t.variants() {
            variants.push(format!("{}: {}", variant.name, ctx.reference(&variant.type_name)?));
        }
        out.line(format!("VARIANTS = {{ {} }}.freeze", variants.join(", ")));
        out.line(format!("TAG = {}", ctx.reference(t.tag_type().name())?));
        out.blank();
        out.line("attr_reader :variant, :payload");
        out.blank();
        method(out, "initialize(value)", |out| {
            out.line("variant, payload = value");
            out.line("variant = variant.to_sym");
            out.line("type = VARIANTS[variant]");
            out.line(r#"raise Wire::InvalidVariantError, "Unknown variant #{variant.inspect} for #{self.class.name}" if type.nil?"#);
            out.line("@variant = variant");
            out.line("@payload = type.construct(payload)");
            Ok(())
        })?;
        out.blank();
        method(out, "tag", |out| {
            out.line("VARIANTS.keys.index(@variant)");
            Ok(())
        })?;
        out.blank();
        method(out, "to_ruby", |out| {
            out.line("[@variant, @payload.to_ruby]");
            Ok(())
        })
    }

    fn render_pack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        method(out, "pack_into(out)", |out| {
            out.line("TAG.new(tag).pack_into(out)");
            out.line("@payload.pack_into(out)");
            Ok(())
        })
    }

    fn render_unpack(&self, _ctx: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        def.as_group().ok_or_else(|| mismatch(def, TypeKind::Group))?;
        method(out, "self.unpack_from(reader)", |out| {
            out.line("tag = TAG.unpack_from(reader).value");
            out.braces("if tag >= VARIANTS.length", "end", |out| {
                out.line(r#"raise Wire::InvalidVariantError, "Invalid variant #{tag} for #{name}""#);
                Ok(())
            })?;
            out.line("variant, type = VARIANTS.to_a[tag]");
            out.line("new([variant, type.unpack_from(reader)])");
            Ok(())
        })
    }
}
