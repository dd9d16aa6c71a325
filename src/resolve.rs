//! Literal resolution and root-descriptor lookup.

use crate::{
    ast::{MemberRef, QueryDescriptor, QueryNode},
    error::{CompileError, Result},
    value::Value,
};

/// Resolve the literal a node denotes.
///
/// Returns `Ok(None)` when the node is not a literal (a column reference, a
/// parameter, a chain deeper than two captured levels) or when the literal is
/// null.
///
/// Handled shapes:
/// - `Constant(v)`
/// - `closure.member`
/// - `Type.member` (static)
/// - `closure.inner.member`
///
/// # Examples
///
/// ```
/// use elastic_query::{QueryNode, Value, resolve::resolve_value};
/// use std::collections::HashMap;
///
/// let mut closure = HashMap::new();
/// closure.insert("limit".to_string(), Value::Integer(10));
///
/// let node = QueryNode::captured(Value::Object(closure), "limit");
/// assert_eq!(resolve_value(&node).unwrap(), Some(Value::Integer(10)));
/// ```
pub fn resolve_value(node: &QueryNode) -> Result<Option<Value>> {
    let value = match node {
        QueryNode::Constant(value) => Some(value.clone()),
        QueryNode::MemberAccess { target, member } => match target.as_deref() {
            Some(QueryNode::Constant(instance)) => Some(read_member(instance, member)?),
            None => Some(read_static(member)?),
            Some(QueryNode::MemberAccess {
                target: Some(inner_target),
                member: inner_member,
            }) => match inner_target.as_ref() {
                QueryNode::Constant(instance) => {
                    let inner = read_member(instance, inner_member)?;
                    Some(read_member(&inner, member)?)
                }
                _ => None,
            },
            _ => None,
        },
        _ => None,
    };

    Ok(value.filter(|v| !v.is_null()))
}

fn read_member(instance: &Value, member: &MemberRef) -> Result<Value> {
    match instance {
        Value::Object(members) => members.get(&member.name).cloned().ok_or_else(|| {
            CompileError::member_read(&member.name, "no such member on the captured instance")
        }),
        Value::Null => Err(CompileError::member_read(
            &member.name,
            "the captured instance is null",
        )),
        other => Err(CompileError::member_read(
            &member.name,
            format!("cannot read a member off a {}", other.type_name()),
        )),
    }
}

fn read_static(member: &MemberRef) -> Result<Value> {
    member
        .declaring_type
        .as_record()
        .and_then(|record| record.static_member(&member.name))
        .cloned()
        .ok_or_else(|| {
            CompileError::member_read(
                &member.name,
                format!("no static member on {}", member.declaring_type),
            )
        })
}

/// First `Constant` of the tree in visiting order.
pub fn first_constant(node: &QueryNode) -> Option<&Value> {
    match node {
        QueryNode::Constant(value) => Some(value),
        other => other.children().into_iter().find_map(first_constant),
    }
}

/// Locate the query descriptor the chain is rooted in.
pub fn find_descriptor(node: &QueryNode) -> Result<&QueryDescriptor> {
    match first_constant(node) {
        Some(Value::Query(descriptor)) => Ok(descriptor),
        Some(other) => Err(CompileError::malformed(format!(
            "the root constant is a {}, not a query descriptor",
            other.type_name()
        ))),
        None => Err(CompileError::malformed("no root query descriptor found")),
    }
}
