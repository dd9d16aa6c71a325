use std::{fmt, sync::Arc};

use crate::{
    ast::{
        Lambda, QueryDescriptor, QueryNode, TypeRef,
        builder::{ORDER_BY, ORDER_BY_DESCENDING, SELECT, THEN_BY, THEN_BY_DESCENDING, WHERE},
    },
    error::{CompileError, Result},
    filter::FilterCompiler,
    path::dotted_path,
    projection::{Column, ProjectionCompiler},
    resolve::find_descriptor,
    value::Value,
};

/// Default separator substituted for `.` in aliases of nested dynamic paths.
pub const DOT_SEPARATOR: &str = "_DOT_";

type ContainerPredicate = Arc<dyn Fn(&TypeRef) -> bool + Send + Sync>;

/// Compiler configuration.
#[derive(Clone)]
pub struct CompilerOptions {
    dynamic_container: ContainerPredicate,
    /// Replaces `.` in the aliases of nested dynamic paths.
    pub dot_separator: String,
    /// Emit an `ORDER BY` clause for ordering operators. When off, ordering
    /// operators are recognised and ignored.
    pub render_order_by: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            dynamic_container: Arc::new(|_| false),
            dot_separator: DOT_SEPARATOR.to_string(),
            render_order_by: true,
        }
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("dot_separator", &self.dot_separator)
            .field("render_order_by", &self.render_order_by)
            .finish_non_exhaustive()
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognise dynamic property containers with a custom predicate.
    pub fn with_dynamic_container(
        mut self,
        predicate: impl Fn(&TypeRef) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.dynamic_container = Arc::new(predicate);
        self
    }

    /// Recognise dynamic property containers by type name.
    pub fn dynamic_containers_named<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.with_dynamic_container(move |ty| names.iter().any(|n| *n == ty.name()))
    }

    pub fn with_dot_separator(mut self, separator: impl Into<String>) -> Self {
        self.dot_separator = separator.into();
        self
    }

    pub fn with_order_by(mut self, render: bool) -> Self {
        self.render_order_by = render;
        self
    }

    pub fn is_dynamic_container(&self, ty: &TypeRef) -> bool {
        (self.dynamic_container)(ty)
    }
}

/// One `ORDER BY` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub column: String,
    pub descending: bool,
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} DESC", self.column)
        } else {
            f.write_str(&self.column)
        }
    }
}

/// The projection function of a compiled query, applied to fetched rows.
#[derive(Debug, Clone)]
pub struct Projection {
    lambda: Lambda,
}

impl Projection {
    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    /// Apply the projection to fetched rows.
    pub fn shape(&self, rows: &[Value]) -> Result<Vec<Value>> {
        let func = self.lambda.func.as_ref().ok_or_else(|| {
            CompileError::unsupported(format!(
                "projection '{}' carries no row function",
                QueryNode::Lambda(self.lambda.clone())
            ))
        })?;
        Ok(rows.iter().map(|row| func.call(row)).collect())
    }
}

/// Result of a compilation: SQL text, positional parameters and the
/// projection to apply to fetched rows.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    /// Projection values followed by filter values, matching the `?`
    /// placeholders left to right.
    pub params: Vec<Value>,
    pub columns: Vec<Column>,
    pub dataset_name: String,
    projection: Option<Projection>,
}

impl CompiledQuery {
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }
}

/// Translates operator chains into SQL.
///
/// The compiler holds configuration only; every call to [`compile`] works on
/// fresh state, so one instance can be shared freely.
///
/// [`compile`]: QueryCompiler::compile
///
/// # Examples
///
/// ```
/// use elastic_query::{
///     QueryChain, QueryCompiler, QueryDescriptor, RecordType, ScalarType, TypeRef,
/// };
///
/// let person = RecordType::new("Person")
///     .with_property("Id", TypeRef::scalar(ScalarType::Int))
///     .with_property("Name", TypeRef::scalar(ScalarType::String))
///     .into_type();
/// let chain = QueryChain::from(QueryDescriptor::new("people", person));
///
/// let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
/// assert_eq!(compiled.sql, "SELECT Id AS Id, Name AS Name FROM people");
/// assert!(compiled.params.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    options: CompilerOptions,
}

impl QueryCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        QueryCompiler { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile an operator chain, locating its root descriptor first.
    pub fn compile(&self, expr: &QueryNode) -> Result<CompiledQuery> {
        let descriptor = find_descriptor(expr)?;
        self.compile_for(expr, descriptor)
    }

    /// Compile an operator chain against an already resolved descriptor.
    pub fn compile_for(
        &self,
        expr: &QueryNode,
        descriptor: &QueryDescriptor,
    ) -> Result<CompiledQuery> {
        let mut state = CompileState::new(&descriptor.element_type, &self.options);
        state.visit(expr)?;
        state.finish(&descriptor.dataset_name)
    }
}

/// Accumulators for a single compilation.
struct CompileState<'a> {
    row_type: &'a TypeRef,
    options: &'a CompilerOptions,
    columns: Vec<Column>,
    projection_params: Vec<Value>,
    projection: Option<Lambda>,
    filters: Vec<String>,
    filter_params: Vec<Value>,
    order: Vec<OrderKey>,
}

impl<'a> CompileState<'a> {
    fn new(row_type: &'a TypeRef, options: &'a CompilerOptions) -> Self {
        CompileState {
            row_type,
            options,
            columns: Vec::new(),
            projection_params: Vec::new(),
            projection: None,
            filters: Vec::new(),
            filter_params: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Operators are handled source first (innermost call first, not
    /// outermost first), so filter clauses and their parameters follow the
    /// order in which the operators were applied.
    fn visit(&mut self, node: &QueryNode) -> Result<()> {
        let QueryNode::MethodCall {
            declaring_type,
            method,
            args,
        } = node
        else {
            return Ok(());
        };

        if !declaring_type.is_queryable() {
            return Ok(());
        }

        let [source, argument] = args.as_slice() else {
            return Err(CompileError::malformed(format!(
                "operator {} expects a source and a lambda, got {} arguments",
                method,
                args.len()
            )));
        };
        self.visit(source)?;

        match method.as_str() {
            WHERE => self.filter(argument),
            SELECT => self.select(argument),
            ORDER_BY | ORDER_BY_DESCENDING => {
                self.order.clear();
                self.order_by(argument, method == ORDER_BY_DESCENDING)
            }
            THEN_BY | THEN_BY_DESCENDING => self.order_by(argument, method == THEN_BY_DESCENDING),
            other => Err(CompileError::unsupported(format!(
                "query operator '{}' is not supported",
                other
            ))),
        }
    }

    fn filter(&mut self, predicate: &QueryNode) -> Result<()> {
        let clause =
            FilterCompiler::new(self.row_type, &mut self.filter_params).compile(predicate)?;
        if let Some(clause) = clause {
            self.filters.push(clause);
        }
        Ok(())
    }

    fn select(&mut self, projection: &QueryNode) -> Result<()> {
        if self.projection.is_some() {
            return Err(CompileError::unsupported(
                "more than one Select in a single query",
            ));
        }
        let lambda = ProjectionCompiler::new(
            self.row_type,
            self.options,
            &mut self.columns,
            &mut self.projection_params,
        )
        .compile(projection)?;
        self.projection = Some(lambda);
        Ok(())
    }

    fn order_by(&mut self, key: &QueryNode, descending: bool) -> Result<()> {
        if !self.options.render_order_by {
            return Ok(());
        }
        let lambda = key.as_lambda().ok_or_else(|| {
            CompileError::malformed(format!("ordering key is not a lambda: {}", key))
        })?;
        let column = match lambda.body.as_ref() {
            QueryNode::MemberAccess { member, .. } if lambda.body.is_row_member(self.row_type) => {
                Some(member.name.clone())
            }
            // IIF($it.Info == null, null, $it.Info.City) orders by Info.City
            QueryNode::Conditional { if_false, .. } => dotted_path(if_false),
            _ => None,
        };
        match column {
            Some(column) => self.order.push(OrderKey { column, descending }),
            None => {
                tracing::debug!(key = %lambda.body, "skipping ordering key that is not a column")
            }
        }
        Ok(())
    }

    fn finish(self, dataset_name: &str) -> Result<CompiledQuery> {
        let mut columns = self.columns;
        if columns.is_empty() {
            columns = self
                .row_type
                .public_properties()
                .into_iter()
                .map(Column::identity)
                .collect();
        }
        if columns.is_empty() {
            return Err(CompileError::malformed(format!(
                "row type {} has no public properties to select",
                self.row_type
            )));
        }

        let select = columns
            .iter()
            .map(Column::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM {}", select, dataset_name);

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }

        if self.options.render_order_by && !self.order.is_empty() {
            let keys = self
                .order
                .iter()
                .map(OrderKey::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys);
        }

        let mut params = self.projection_params;
        params.extend(self.filter_params);

        tracing::debug!(sql = %sql, params = params.len(), "compiled query");

        Ok(CompiledQuery {
            sql,
            params,
            columns,
            dataset_name: dataset_name.to_string(),
            projection: self.projection.map(|lambda| Projection { lambda }),
        })
    }
}
