#![cfg(test)]

use brine_wire_compiler::{
    compile_schema, formatter::Formatter, gen_c::CEmitter, generate, write_project, Builder,
    BuilderRegistry, CompileError, Emitter, GeneratedFile, Language, RenderContext,
};
use brine_wire_schema::{TypeDef, TypeKind, TYPE_KINDS};
use std::fs;
use std::path::{Path, PathBuf};

const SHAPES: &str = "
    schema shapes 2.0.0;
    scalar coord int32;
    enumeration color { red; green; blue; }
    composite point { color color; coord x; coord y; }
    fixed_array tag uint8[4];
    variable_array path point[16] uint8;
    group shape { point dot; path line; }
";

/// Refers to every type by its schema name and renders nothing else.
struct Named;

impl Builder for Named {
    fn render_reference(&self, _ctx: &RenderContext, def: &TypeDef) -> Result<String, CompileError> {
        Ok(def.name().to_string())
    }

    fn render_declaration(&self, _: &RenderContext, def: &TypeDef, out: &mut Formatter) -> Result<(), CompileError> {
        out.line(format!("/* {} */", def.name()));
        Ok(())
    }

    fn render_pack(&self, _: &RenderContext, _: &TypeDef, _: &mut Formatter) -> Result<(), CompileError> {
        Ok(())
    }

    fn render_unpack(&self, _: &RenderContext, _: &TypeDef, _: &mut Formatter) -> Result<(), CompileError> {
        Ok(())
    }
}

/// Lists the declarations of every type in one text file.
struct Listing;

impl Emitter for Listing {
    fn aliases(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn emit(&self, ctx: &RenderContext) -> Result<Vec<GeneratedFile>, CompileError> {
        let mut out = Formatter::new("  ");
        for def in ctx.schema.declared() {
            ctx.declaration(def, &mut out)?;
        }
        Ok(vec![GeneratedFile {
            path:     PathBuf::from(format!("{}.txt", ctx.project)),
            contents: out.finish(),
        }])
    }
}

fn partial_registry() -> BuilderRegistry {
    let mut registry = BuilderRegistry::new();
    registry.register_emitter(Language::C, Box::new(CEmitter)).unwrap();
    for kind in TYPE_KINDS {
        if kind != TypeKind::Group {
            registry.register(Language::C, kind, Box::new(Named)).unwrap();
        }
    }
    registry
}

fn compile_and_write(text: &str, language: Language, dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let schema = compile_schema(text)?;
    let registry = BuilderRegistry::with_defaults()?;
    let files = generate(&schema, &registry, language, "out")?;
    write_project(dir, &files)
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_generate_every_language() {
    let schema = compile_schema(SHAPES).unwrap();
    let registry = BuilderRegistry::with_defaults().unwrap();

    let mut paths = Vec::new();
    for language in registry.languages() {
        let files = generate(&schema, &registry, language, "shapes").unwrap();
        assert!(files.iter().all(|f| !f.contents.is_empty()));
        paths.extend(files.into_iter().map(|f| f.path));
    }
    assert_eq!(
        paths,
        [
            PathBuf::from("shapes.h"),
            PathBuf::from("shapes.c"),
            PathBuf::from("shapes.rb"),
            PathBuf::from("shapes.rs"),
        ]
    );
}

#[test]
fn test_generate_is_deterministic() {
    let schema = compile_schema(SHAPES).unwrap();
    let registry = BuilderRegistry::with_defaults().unwrap();
    for language in registry.languages() {
        let first = generate(&schema, &registry, language, "shapes").unwrap();
        let second = generate(&schema, &registry, language, "shapes").unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_rust_output_matches_checked_in_code() {
    let registry = BuilderRegistry::with_defaults().unwrap();
    let cases = [
        (
            include_str!("../../example/schema/shapes.wire"),
            "shapes",
            include_str!("../../example/src/generated.rs"),
        ),
        (
            include_str!("../../sdk/tests/generated/blobs.wire"),
            "blobs",
            include_str!("../../sdk/tests/generated/blobs.rs"),
        ),
    ];
    for (text, project, expected) in cases {
        let schema = compile_schema(text).unwrap();
        let files = generate(&schema, &registry, Language::RUST, project).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contents, expected, "{}.rs is out of date", project);
    }
}

#[test]
fn test_missing_builder_fails_before_rendering() {
    let schema = compile_schema(SHAPES).unwrap();
    let registry = partial_registry();

    let err = generate(&schema, &registry, Language::C, "shapes").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedTarget { kind: Some(TypeKind::Group), .. }
    ));
    assert_eq!(err.to_string(), "Unsupported target \"c\": no builder for group");

    let err = generate(&schema, &registry, Language::RUBY, "shapes").unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedTarget { kind: None, .. }));
}

#[test]
fn test_custom_builders_are_used() {
    let schema = compile_schema("schema s 1.0.0; scalar meters float64;").unwrap();
    let registry = partial_registry();

    let files = generate(&schema, &registry, Language::C, "units").unwrap();
    let header = &files[0];
    assert_eq!(header.path, PathBuf::from("units.h"));
    assert!(header.contents.contains("/* meters */"));
}

#[test]
fn test_new_language_is_registered_not_coded() {
    const TEXT: Language = Language::new("text");

    let mut registry = BuilderRegistry::with_defaults().unwrap();
    registry.register_emitter(TEXT, Box::new(Listing)).unwrap();
    for kind in TYPE_KINDS {
        registry.register(TEXT, kind, Box::new(Named)).unwrap();
    }
    assert_eq!(registry.language("TXT").unwrap(), TEXT);
    assert_eq!(registry.languages().count(), 4);

    let schema = compile_schema("schema s 1.0.0; scalar meters float64; composite p { meters x; }").unwrap();
    let files = generate(&schema, &registry, TEXT, "units").unwrap();
    assert_eq!(
        files,
        [GeneratedFile { path: PathBuf::from("units.txt"), contents: "/* meters */\n/* p */\n".into() }]
    );
}

#[test]
fn test_invalid_project_name() {
    let schema = compile_schema(SHAPES).unwrap();
    let registry = BuilderRegistry::with_defaults().unwrap();
    let err = generate(&schema, &registry, Language::RUST, "my-project").unwrap_err();
    assert!(matches!(err, CompileError::InvalidProject(ref name) if name == "my-project"));
}

#[test]
fn test_colliding_names_are_rejected() {
    let schema = compile_schema("schema s 1.0.0; enumeration e { red; RED; }").unwrap();
    let registry = BuilderRegistry::with_defaults().unwrap();

    let err = generate(&schema, &registry, Language::C, "s").unwrap_err();
    assert_eq!(
        err.to_string(),
        "\"red\" and \"RED\" in typedefs and enumerators both render as E_RED in c"
    );
    let err = generate(&schema, &registry, Language::RUST, "s").unwrap_err();
    assert_eq!(err.to_string(), "\"red\" and \"RED\" in enumeration e both render as Red in rust");
    // Ruby keeps labels as symbols, which stay distinct
    assert!(generate(&schema, &registry, Language::RUBY, "s").is_ok());

    let schema = compile_schema("schema s 1.0.0; composite rec { uint8 pack; uint8 class; }").unwrap();
    let err = generate(&schema, &registry, Language::RUBY, "s").unwrap_err();
    assert!(matches!(err, CompileError::ReservedName { ref name, .. } if name == "pack"));
    assert!(generate(&schema, &registry, Language::C, "s").is_ok());

    let schema = compile_schema("schema s 1.0.0; composite rec { uint8 int; uint8 int_; }").unwrap();
    let err = generate(&schema, &registry, Language::C, "s").unwrap_err();
    assert!(matches!(err, CompileError::NameCollision { ref mangled, .. } if mangled == "int_"));

    let schema = compile_schema("schema s 1.0.0; scalar result uint8; group g { uint8 a; }").unwrap();
    let err = generate(&schema, &registry, Language::RUST, "s").unwrap_err();
    assert!(matches!(err, CompileError::ReservedName { ref mangled, .. } if mangled == "Result"));

    // The group's tag enum is named `g_tag` in C
    let schema = compile_schema("schema s 1.0.0; group g { uint8 a; } enumeration g_tag { x; }").unwrap();
    let err = generate(&schema, &registry, Language::C, "s").unwrap_err();
    assert!(matches!(err, CompileError::NameCollision { ref mangled, .. } if mangled == "g_tag"));
}

#[test]
fn test_oversized_c_arrays_are_rejected() {
    let schema = compile_schema(
        "schema s 1.0.0;
         fixed_array chunk uint64[1000];
         variable_array blob chunk[4294967295] uint32;",
    )
    .unwrap();
    let registry = BuilderRegistry::with_defaults().unwrap();

    let err = generate(&schema, &registry, Language::C, "s").unwrap_err();
    assert!(matches!(
        err,
        CompileError::ArrayTooLarge { ref type_name, count: 4294967295, .. } if type_name == "blob"
    ));
    // Rust and Ruby arrays grow as they are filled
    assert!(generate(&schema, &registry, Language::RUST, "s").is_ok());
    assert!(generate(&schema, &registry, Language::RUBY, "s").is_ok());
}

#[test]
fn test_failed_generation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let cyclic = "schema s 1.0.0; composite a { b x; } composite b { a y; }";
    let err = compile_and_write(cyclic, Language::C, dir.path()).unwrap_err();
    assert!(matches!(err, CompileError::Schema(_)));

    let colliding = "schema s 1.0.0; enumeration e { red; RED; }";
    let err = compile_and_write(colliding, Language::C, dir.path()).unwrap_err();
    assert!(matches!(err, CompileError::NameCollision { .. }));
    assert!(entries(dir.path()).is_empty());

    compile_and_write("schema s 1.0.0; enumeration e { red; }", Language::C, dir.path()).unwrap();
    assert_eq!(entries(dir.path()), ["out.c", "out.h"]);
}

#[test]
fn test_write_project() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("generated");
    let files = vec![
        GeneratedFile { path: PathBuf::from("a.h"), contents: "// a\n".into() },
        GeneratedFile { path: PathBuf::from("nested/b.c"), contents: "// b\n".into() },
    ];

    let written = write_project(&out, &files).unwrap();
    assert_eq!(written, [out.join("a.h"), out.join("nested/b.c")]);
    assert_eq!(fs::read_to_string(out.join("a.h")).unwrap(), "// a\n");
    assert_eq!(fs::read_to_string(out.join("nested/b.c")).unwrap(), "// b\n");

    // Only the generated files remain, no staging directory
    assert_eq!(entries(&out), ["a.h", "nested"]);

    // Rewriting replaces the previous contents
    let files = vec![GeneratedFile { path: PathBuf::from("a.h"), contents: "// a2\n".into() }];
    write_project(&out, &files).unwrap();
    assert_eq!(fs::read_to_string(out.join("a.h")).unwrap(), "// a2\n");
}

#[test]
fn test_write_project_restores_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.h"), "// old\n").unwrap();
    // `x` is a file, so `x/b.c` cannot be put in place after `a.h` was
    fs::write(dir.path().join("x"), "").unwrap();

    let files = vec![
        GeneratedFile { path: PathBuf::from("a.h"), contents: "// new\n".into() },
        GeneratedFile { path: PathBuf::from("x/b.c"), contents: "// b\n".into() },
    ];
    assert!(matches!(write_project(dir.path(), &files), Err(CompileError::Io(_))));

    assert_eq!(fs::read_to_string(dir.path().join("a.h")).unwrap(), "// old\n");
    assert_eq!(entries(dir.path()), ["a.h", "x"]);
}
