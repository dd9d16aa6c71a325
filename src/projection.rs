//! Projection lambdas to an ordered column list.

use std::fmt;

use crate::{
    ast::{Lambda, MemberBinding, QueryNode, TypeRef},
    compiler::CompilerOptions,
    dynamic::DynamicBagDecoder,
    error::{CompileError, Result},
    filter::NULL,
    resolve::resolve_value,
    value::Value,
};

/// One selected column, rendered as `value AS alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub alias: String,
    /// Source column name, `?` for a bound literal, or `NULL`.
    pub value: String,
}

impl Column {
    pub fn new(alias: impl Into<String>, value: impl Into<String>) -> Self {
        Column {
            alias: alias.into(),
            value: value.into(),
        }
    }

    /// A source column selected under its own name.
    pub fn identity(name: &str) -> Self {
        Column::new(name, name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.value, self.alias)
    }
}

/// Walks a projection lambda and records one column per projected field.
pub struct ProjectionCompiler<'a> {
    row_type: &'a TypeRef,
    options: &'a CompilerOptions,
    columns: &'a mut Vec<Column>,
    params: &'a mut Vec<Value>,
}

impl<'a> ProjectionCompiler<'a> {
    pub fn new(
        row_type: &'a TypeRef,
        options: &'a CompilerOptions,
        columns: &'a mut Vec<Column>,
        params: &'a mut Vec<Value>,
    ) -> Self {
        ProjectionCompiler {
            row_type,
            options,
            columns,
            params,
        }
    }

    /// Compile a projection lambda, returning the lambda itself so the
    /// caller can shape fetched rows with it.
    pub fn compile(&mut self, projection: &QueryNode) -> Result<Lambda> {
        let lambda = projection.as_lambda().ok_or_else(|| {
            CompileError::malformed(format!("projection is not a lambda: {}", projection))
        })?;
        self.visit(&lambda.body)?;
        Ok(lambda.clone())
    }

    fn visit(&mut self, node: &QueryNode) -> Result<()> {
        match node {
            QueryNode::ConstructorCall {
                ty,
                args,
                param_names,
            } if !args.is_empty() => {
                if args.len() != param_names.len() {
                    return Err(CompileError::malformed(format!(
                        "constructor of {} has {} parameters but {} arguments",
                        ty,
                        param_names.len(),
                        args.len()
                    )));
                }
                for (name, arg) in param_names.iter().zip(args) {
                    self.column(arg, name)?;
                }
                Ok(())
            }
            QueryNode::NewRecord { ty, bindings } => {
                if self.options.is_dynamic_container(ty) {
                    DynamicBagDecoder::new(self.options, &mut *self.columns).decode(node)
                } else {
                    bindings.iter().try_for_each(|b| self.visit_binding(b))
                }
            }
            other => other.children().into_iter().try_for_each(|c| self.visit(c)),
        }
    }

    fn visit_binding(&mut self, binding: &MemberBinding) -> Result<()> {
        if !binding.member.ty.is_basic_type(true) {
            return self.visit(&binding.expr);
        }

        if self.options.is_dynamic_container(&binding.member.declaring_type) {
            if let Some(Value::String(alias)) = resolve_value(&binding.expr)?
                && !alias.trim().is_empty()
                && !self.columns.iter().any(|c| c.alias == alias)
            {
                self.columns.push(Column::identity(&alias));
            }
            return Ok(());
        }

        self.column(&binding.expr, &binding.member.name)
    }

    fn column(&mut self, expr: &QueryNode, alias: &str) -> Result<()> {
        let column = match expr.as_member() {
            Some(member) if expr.is_row_member(self.row_type) => {
                Column::new(alias, member.name.as_str())
            }
            _ => match resolve_value(expr)? {
                Some(value) => {
                    self.params.push(value);
                    Column::new(alias, "?")
                }
                None => Column::new(alias, NULL),
            },
        };

        tracing::trace!(column = %column, "projected column");
        self.columns.push(column);
        Ok(())
    }
}
