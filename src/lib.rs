pub mod ast;
pub mod cli;
pub mod compiler;
pub mod dynamic;
pub mod error;
pub mod filter;
pub mod output;
pub mod path;
pub mod projection;
pub mod resolve;
pub mod value;

pub use ast::{
    BinOp, Lambda, MemberBinding, MemberRef, Parameter, Property, QueryChain, QueryDescriptor,
    QueryNode, RecordType, RowFn, ScalarType, TypeRef,
};
pub use compiler::{CompiledQuery, CompilerOptions, OrderKey, Projection, QueryCompiler};
pub use error::CompileError;
pub use filter::FilterCompiler;
pub use output::{from_json, to_json};
pub use projection::{Column, ProjectionCompiler};
pub use value::Value;
