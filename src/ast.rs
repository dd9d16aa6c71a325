//! # Query expression trees
//!
//! This module defines the node vocabulary consumed by the SQL compiler.
//! A query is a chain of operator calls rooted at a single constant that
//! carries the [`QueryDescriptor`] (dataset name + row type):
//!
//! ```text
//! Select(Where(Const(people: Person), x => x.Age > 30), x => new { x.Id, x.Name })
//! ```
//!
//! ## Submodules
//!
//! - **[node]** - [`QueryNode`], lambdas, bindings and the query descriptor
//! - **[operators]** - [`BinOp`]
//! - **[types]** - [`TypeRef`] and friends, the explicit replacement for
//!   runtime reflection
//! - **[builder]** - constructors and the fluent [`QueryChain`]
//!
//! ## Operators
//!
//! Operator calls are static-form [`QueryNode::MethodCall`]s declared on the
//! opaque `Queryable` type:
//!
//! - **Where** `(source, predicate)` - filter rows
//! - **Select** `(source, projection)` - shape the selected columns
//! - **OrderBy / OrderByDescending / ThenBy / ThenByDescending**
//!   `(source, key)` - ordering
//!
//! ## Built-ins
//!
//! - `String.Compare(member, value) <op> 0` compares strings
//! - `Contains(list, member)` tests list membership
pub mod builder;
pub mod node;
pub mod operators;
pub mod types;

pub use builder::QueryChain;
pub use node::{Lambda, MemberBinding, Parameter, QueryDescriptor, QueryNode, RowFn};
pub use operators::BinOp;
pub use types::{MemberRef, Property, RecordType, ScalarType, TypeRef};
