use brine_wire_schema::Schema;
use crate::{
    tokenizer::tokenize_schema,
    parser::parse_schema,
    error::CompileError,
};
use tracing::debug;

/// Compile a textual schema into a validated, acyclic [Schema].
/// Returns `Err(CompileError)` if tokenization, parsing or validation fails.
pub fn compile_schema(text: &str) -> Result<Schema, CompileError> {
    let tokens = tokenize_schema(text)?;
    let schema = parse_schema(&tokens)?;
    debug!(
        schema = schema.name(),
        version = %schema.version(),
        types = schema.declared().count(),
        "compiled schema"
    );
    Ok(schema)
}
