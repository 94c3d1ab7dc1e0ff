mod config;

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use brine_wire::describe_to_json;
use brine_wire_compiler::{
    compile_schema, generate, write_project, BuilderRegistry, CompileError,
};
use brine_wire_schema::Schema;
use config::Config;

#[derive(Parser)]
#[command(name = "bwire")]
#[command(about = "Generate C, Ruby or Rust codecs from brine-wire schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate pack/unpack code for every type of the schema
    Generate {
        /// Target language: c, ruby (rb) or rust (rs)
        language: String,

        /// Project name, used for the generated file names
        project: String,

        /// Schema file (defaults to `schema` in bwire.toml, then `schema.wire`)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Output directory (defaults to `output_dir` in bwire.toml, then `.`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse and validate the schema without generating anything
    Check {
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Print the validated schema as JSON
    Describe {
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dir = PathBuf::from(".");

    if let Err(e) = run(cli, &dir) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(dir)?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Generate { language, project, schema, output } => {
            // Fails on an unknown language before the schema is read
            let registry = BuilderRegistry::with_defaults()?;
            let language = registry.language(&language)?;
            let schema = read_schema(&config.schema_path(dir, schema))?;

            let files = generate(&schema, &registry, language, &project)?;
            let out_dir = config.output_dir(dir, output);
            for path in write_project(&out_dir, &files)? {
                println!("Generated {}", path.display());
            }
            Ok(())
        }

        Commands::Check { schema } => {
            let schema = read_schema(&config.schema_path(dir, schema))?;
            println!(
                "Schema {} {} is valid ({} types)",
                schema.name(),
                schema.version(),
                schema.declared().count()
            );
            Ok(())
        }

        Commands::Describe { schema } => {
            let schema = read_schema(&config.schema_path(dir, schema))?;
            println!("{}", describe_to_json(&schema)?);
            Ok(())
        }
    }
}

fn read_schema(path: &Path) -> Result<Schema, CompileError> {
    info!(path = %path.display(), "reading schema");
    let text = fs::read_to_string(path)?;
    compile_schema(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        schema sensors 0.3.0;
        scalar celsius float32;
        composite reading { uint16 sensor; celsius value; }
        variable_array batch reading[64] uint8;
    ";

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bwire").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn generate_uses_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("wire")).unwrap();
        fs::write(dir.path().join("wire/sensors.wire"), SCHEMA).unwrap();
        fs::write(
            dir.path().join("bwire.toml"),
            "schema = \"wire/sensors.wire\"\noutput_dir = \"gen\"\n",
        )
        .unwrap();

        run(cli(&["generate", "c", "sensors"]), dir.path()).unwrap();
        assert!(dir.path().join("gen/sensors.h").is_file());
        assert!(dir.path().join("gen/sensors.c").is_file());

        run(cli(&["generate", "rb", "sensors", "--output", "ruby"]), dir.path()).unwrap();
        assert!(dir.path().join("ruby/sensors.rb").is_file());
        assert!(!dir.path().join("gen/sensors.rb").exists());
    }

    #[test]
    fn default_schema_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.wire"), SCHEMA).unwrap();

        run(cli(&["check"]), dir.path()).unwrap();
        run(cli(&["generate", "rust", "sensors"]), dir.path()).unwrap();
        let code = fs::read_to_string(dir.path().join("sensors.rs")).unwrap();
        assert!(code.contains("pub struct Celsius(pub f32);"));
    }

    #[test]
    fn failures_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("schema.wire"),
            "schema loop 1.0.0; composite a { b x; } composite b { a y; }",
        )
        .unwrap();

        let err = run(cli(&["generate", "c", "loop"]), dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "Cyclic schema: a -> b -> a");

        let err = run(cli(&["generate", "cobol", "loop"]), dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported target \"cobol\"");

        fs::write(dir.path().join("schema.wire"), "schema e 1.0.0; enumeration e { red; RED; }").unwrap();
        let err = run(cli(&["generate", "rs", "e"]), dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "\"red\" and \"RED\" in enumeration e both render as Red in rust");

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(cli(&["describe"]), dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
