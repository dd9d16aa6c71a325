//! Predicate lambdas to boolean SQL text.
//!
//! Every binary node renders as its own parenthesised group, so the shape of
//! the tree is kept exactly. Literals become ` ? ` placeholders whose values
//! are appended to the parameter list in the order they are written.

use crate::{
    ast::{
        BinOp, QueryNode, TypeRef,
        builder::{COMPARE, CONTAINS},
    },
    error::{CompileError, Result},
    path::dotted_path,
    resolve::resolve_value,
    value::Value,
};

pub(crate) const NULL: &str = "NULL";
const PLACEHOLDER: &str = " ? ";

/// Compiles one predicate at a time against a fixed row type, appending
/// literal values to a shared parameter list.
pub struct FilterCompiler<'a> {
    row_type: &'a TypeRef,
    params: &'a mut Vec<Value>,
    sql: String,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(row_type: &'a TypeRef, params: &'a mut Vec<Value>) -> Self {
        FilterCompiler {
            row_type,
            params,
            sql: String::new(),
        }
    }

    /// Compile a predicate lambda.
    ///
    /// Returns `Ok(None)` when the lambda does not return a boolean; such
    /// filters are skipped rather than rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use elastic_query::{FilterCompiler, QueryNode, RecordType, ScalarType, TypeRef};
    ///
    /// let person = RecordType::new("Person")
    ///     .with_property("Age", TypeRef::scalar(ScalarType::Int))
    ///     .into_type();
    /// let x = QueryNode::parameter("x", person.clone());
    /// let predicate = QueryNode::predicate(
    ///     &x,
    ///     QueryNode::equal(QueryNode::member(x.clone(), "Age"), QueryNode::constant(30)),
    /// );
    ///
    /// let mut params = Vec::new();
    /// let sql = FilterCompiler::new(&person, &mut params).compile(&predicate).unwrap();
    /// assert_eq!(sql.as_deref(), Some("(Age =  ? )"));
    /// assert_eq!(params.len(), 1);
    /// ```
    pub fn compile(&mut self, predicate: &QueryNode) -> Result<Option<String>> {
        let lambda = predicate.as_lambda().ok_or_else(|| {
            CompileError::malformed(format!("filter argument is not a lambda: {}", predicate))
        })?;

        if !lambda.returns_bool() {
            tracing::debug!(
                return_type = %lambda.return_type,
                "skipping filter that does not return a boolean"
            );
            return Ok(None);
        }

        let start = self.params.len();
        self.sql.clear();
        if let Err(err) = self.visit(&lambda.body) {
            self.params.truncate(start);
            self.sql.clear();
            return Err(err);
        }

        let sql = std::mem::take(&mut self.sql);
        tracing::trace!(clause = %sql, "compiled filter clause");
        Ok(Some(sql))
    }

    fn visit(&mut self, node: &QueryNode) -> Result<()> {
        match node {
            QueryNode::MemberAccess { member, .. } if node.is_row_member(self.row_type) => {
                self.sql.push_str(&member.name);
                Ok(())
            }
            QueryNode::MemberAccess { .. } | QueryNode::Constant(_) => self.push_literal(node),
            QueryNode::Binary { op, left, right } => self.visit_binary(*op, left, right),
            QueryNode::MethodCall { method, args, .. } if method == CONTAINS => {
                self.visit_contains(args)
            }
            QueryNode::Lambda(lambda) => self.visit(&lambda.body),
            QueryNode::Parameter(_) => Ok(()),
            other => Err(CompileError::unsupported(format!(
                "cannot translate '{}' in a filter",
                other
            ))),
        }
    }

    fn visit_binary(&mut self, op: BinOp, left: &QueryNode, right: &QueryNode) -> Result<()> {
        self.sql.push('(');

        if let Some(args) = string_compare_args(left) {
            let column = args[0].as_member().ok_or_else(|| {
                CompileError::unsupported(format!(
                    "String.Compare expects a member as its first argument, got '{}'",
                    args[0]
                ))
            })?;
            self.sql.push_str(&column.name);
            self.push_operator(op, right)?;
            self.push_literal(&args[1])?;
        } else {
            match left {
                QueryNode::Conditional { if_false, .. } => {
                    let path = dotted_path(if_false).ok_or_else(|| {
                        CompileError::malformed(format!(
                            "conditional fallback '{}' is not a member chain",
                            if_false
                        ))
                    })?;
                    self.sql.push_str(&path);
                }
                QueryNode::MethodCall { method, args, .. } if method == CONTAINS => {
                    self.visit_contains(args)?;
                }
                _ => self.visit(left)?,
            }

            self.push_operator(op, right)?;
            self.visit(right)?;
        }

        self.sql.push(')');
        Ok(())
    }

    fn push_operator(&mut self, op: BinOp, right: &QueryNode) -> Result<()> {
        if op.is_equality() && self.is_absent(right)? {
            self.sql.push_str(if op == BinOp::Equal { " IS " } else { " IS NOT " });
            return Ok(());
        }

        let token = match op {
            BinOp::And => " & ",
            BinOp::AndAlso => " AND ",
            BinOp::Or => " | ",
            BinOp::OrElse => " OR ",
            BinOp::Equal => " = ",
            BinOp::NotEqual => " <> ",
            BinOp::LessThan => " < ",
            BinOp::LessThanOrEqual => " <= ",
            BinOp::GreaterThan => " > ",
            BinOp::GreaterThanOrEqual => " >= ",
            other => return Err(CompileError::UnsupportedOperator(other)),
        };
        self.sql.push_str(token);
        Ok(())
    }

    /// True when `node` renders as `NULL`: neither a column nor a literal.
    fn is_absent(&self, node: &QueryNode) -> Result<bool> {
        if node.is_row_member(self.row_type) {
            return Ok(false);
        }
        Ok(resolve_value(node)?.is_none())
    }

    /// `(Code = ? OR Code = ? OR Code = NULL)`, one clause per list element.
    fn visit_contains(&mut self, args: &[QueryNode]) -> Result<()> {
        let [list, item] = args else {
            return Err(CompileError::malformed(format!(
                "Contains expects two arguments, got {}",
                args.len()
            )));
        };

        let values = match resolve_value(list)? {
            Some(Value::Array(values)) => values,
            Some(other) => {
                return Err(CompileError::unsupported(format!(
                    "Contains over a {} is not supported",
                    other.type_name()
                )));
            }
            None => return Err(CompileError::unsupported("Contains over a null list")),
        };
        if values.is_empty() {
            return Err(CompileError::unsupported("Contains over an empty list"));
        }

        let column = item
            .as_member()
            .map(|m| m.name.as_str())
            .ok_or_else(|| {
                CompileError::unsupported(format!("Contains expects a member, got '{}'", item))
            })?;

        self.sql.push('(');
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(" OR ");
            }
            self.sql.push_str(column);
            if value.is_null() {
                self.sql.push_str(" = ");
                self.sql.push_str(NULL);
            } else {
                self.sql.push_str(" = ?");
                self.params.push(value);
            }
        }
        self.sql.push(')');
        Ok(())
    }

    fn push_literal(&mut self, node: &QueryNode) -> Result<()> {
        match resolve_value(node)? {
            Some(value) => {
                self.sql.push_str(PLACEHOLDER);
                self.params.push(value);
            }
            None => self.sql.push_str(NULL),
        }
        Ok(())
    }
}

fn string_compare_args(node: &QueryNode) -> Option<&[QueryNode]> {
    match node {
        QueryNode::MethodCall {
            declaring_type,
            method,
            args,
        } if method == COMPARE && declaring_type.is_string() && args.len() == 2 => {
            Some(args.as_slice())
        }
        _ => None,
    }
}
