//! Decoding of dynamic `{Name, Value}` property containers.
//!
//! API-shaping layers select caller-chosen fields by building a chain of
//! name/value containers instead of a static record:
//!
//! ```text
//! new NamedPropertyWithNext0 {
//!     Name = "name", Value = $it.Name,
//!     Next0 = new NamedProperty { Name = "city", Value = IIF($it.Info == null, null, $it.Info.City) }
//! }
//! ```
//!
//! Each container found anywhere under the node yields at most one column.

use crate::{
    ast::{MemberBinding, QueryNode},
    compiler::CompilerOptions,
    error::{CompileError, Result},
    projection::Column,
};

/// Length of the lambda parameter prefix (`$it.`) stripped from the rendered
/// fallback path of a conditional value.
const PARAMETER_PREFIX_LEN: usize = 4;

pub struct DynamicBagDecoder<'a> {
    options: &'a CompilerOptions,
    columns: &'a mut Vec<Column>,
}

impl<'a> DynamicBagDecoder<'a> {
    pub fn new(options: &'a CompilerOptions, columns: &'a mut Vec<Column>) -> Self {
        DynamicBagDecoder { options, columns }
    }

    /// Decode every container under `node`, outermost first.
    pub fn decode(&mut self, node: &QueryNode) -> Result<()> {
        if let QueryNode::NewRecord { ty, bindings } = node
            && self.options.is_dynamic_container(ty)
        {
            self.decode_pair(bindings)?;
        }

        node.children().into_iter().try_for_each(|c| self.decode(c))
    }

    fn decode_pair(&mut self, bindings: &[MemberBinding]) -> Result<()> {
        let name = single_binding(bindings, "Name")?;
        let value = single_binding(bindings, "Value")?;

        let alias = match &name.expr {
            QueryNode::Constant(alias) if !alias.is_null() => alias.to_string(),
            _ => return Ok(()),
        };

        // first occurrence of a public alias wins
        if self.columns.iter().any(|c| c.alias == alias) {
            return Ok(());
        }

        let column = match &value.expr {
            QueryNode::MemberAccess { member, .. } => Column::identity(&member.name),
            QueryNode::Conditional { if_false, .. } if if_false.as_member().is_some() => {
                let path: String = if_false
                    .to_string()
                    .chars()
                    .skip(PARAMETER_PREFIX_LEN)
                    .collect();
                Column::new(path.replace('.', &self.options.dot_separator), path)
            }
            _ => Column::identity(&alias),
        };

        tracing::trace!(column = %column, public_alias = %alias, "decoded dynamic property");
        self.columns.push(column);
        Ok(())
    }
}

fn single_binding<'b>(bindings: &'b [MemberBinding], name: &str) -> Result<&'b MemberBinding> {
    let mut matching = bindings.iter().filter(|b| b.member.name == name);
    match (matching.next(), matching.next()) {
        (Some(binding), None) => Ok(binding),
        (None, _) => Err(CompileError::malformed(format!(
            "dynamic property container has no '{}' binding",
            name
        ))),
        (Some(_), Some(_)) => Err(CompileError::malformed(format!(
            "dynamic property container has more than one '{}' binding",
            name
        ))),
    }
}
