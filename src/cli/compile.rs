//! Compile query documents to SQL

use super::{CliError, DYNAMIC_CONTAINERS, parse_document};
use crate::{CompiledQuery, CompilerOptions, QueryCompiler};

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// JSON query document
    pub input: Option<String>,
    /// Only validate the document, don't compile
    pub validate_only: bool,
    /// Leave ordering operators out of the SQL
    pub no_order_by: bool,
    /// Separator replacing `.` in nested dynamic aliases
    pub dot_separator: Option<String>,
}

/// Result of a compile operation
#[derive(Debug)]
pub enum CompileOutput {
    /// The document describes a valid query chain
    Valid,
    /// SQL text and parameters
    Compiled(CompiledQuery),
}

/// Execute an esql compile operation
pub fn execute_compile(options: &CompileOptions) -> Result<CompileOutput, CliError> {
    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(input)?;
    let document = parse_document(&json)?;

    if options.validate_only {
        return Ok(CompileOutput::Valid);
    }

    let mut compiler_options = CompilerOptions::new()
        .dynamic_containers_named(DYNAMIC_CONTAINERS)
        .with_order_by(!options.no_order_by);
    if let Some(separator) = &options.dot_separator {
        compiler_options = compiler_options.with_dot_separator(separator.as_str());
    }

    let compiled = QueryCompiler::with_options(compiler_options)
        .compile_for(document.chain.expression(), &document.descriptor)?;
    Ok(CompileOutput::Compiled(compiled))
}
