//! CLI support for elastic-query
//!
//! Provides programmatic access to the `esql` commands so other tools can
//! compile query documents without shelling out.

mod compile;
mod convert;
mod docs;

pub use compile::{CompileOptions, CompileOutput, execute_compile};
pub use convert::{DYNAMIC_CONTAINERS, QueryDocument, parse_document};
pub use docs::{DocTopic, get_doc_topic, get_docs_overview};

use std::io;

use crate::CompileError;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Well-formed JSON that does not describe a query
    #[error("Invalid query document: {0}")]
    Document(String),

    #[error("No input provided. Pass a file or pipe a query document to stdin.")]
    NoInput,

    #[error("Unknown topic: '{0}'\nRun 'esql docs' to see available topics.")]
    UnknownTopic(String),
}

impl CliError {
    pub(crate) fn document(msg: impl Into<String>) -> Self {
        CliError::Document(msg.into())
    }
}
