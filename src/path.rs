use crate::ast::QueryNode;

/// Member names of a navigation chain, outermost container first.
///
/// `x.Info.Address.City` yields `["Info", "Address", "City"]`. Every member
/// access found under `node` is collected; the parameter at the bottom of the
/// chain contributes nothing.
///
/// # Examples
///
/// ```
/// use elastic_query::{QueryNode, TypeRef, path::nested_path};
///
/// let x = QueryNode::parameter("$it", TypeRef::opaque("Row"));
/// let city = QueryNode::member(QueryNode::member(x, "Info"), "City");
/// assert_eq!(nested_path(&city), vec!["Info", "City"]);
/// ```
pub fn nested_path(node: &QueryNode) -> Vec<&str> {
    let mut members = Vec::new();
    push_members(node, &mut members);

    let mut path = Vec::with_capacity(members.len());
    while let Some(name) = members.pop() {
        path.push(name);
    }
    path
}

fn push_members<'a>(node: &'a QueryNode, members: &mut Vec<&'a str>) {
    if let QueryNode::MemberAccess { member, .. } = node {
        members.push(&member.name);
    }
    for child in node.children() {
        push_members(child, members);
    }
}

/// Dotted form of [`nested_path`]; `None` when the node holds no member
/// access.
pub fn dotted_path(node: &QueryNode) -> Option<String> {
    let path = nested_path(node);
    if path.is_empty() {
        None
    } else {
        Some(path.join("."))
    }
}
