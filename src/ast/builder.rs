//! Constructors for query trees.
//!
//! These play the part of the query-building layer: they produce the same
//! shapes a LINQ-style provider hands to the compiler.

use crate::{
    ast::{
        BinOp, Lambda, MemberBinding, MemberRef, Parameter, QueryDescriptor, QueryNode, RowFn,
        ScalarType, TypeRef,
    },
    value::Value,
};

pub const WHERE: &str = "Where";
pub const SELECT: &str = "Select";
pub const ORDER_BY: &str = "OrderBy";
pub const ORDER_BY_DESCENDING: &str = "OrderByDescending";
pub const THEN_BY: &str = "ThenBy";
pub const THEN_BY_DESCENDING: &str = "ThenByDescending";
pub const COMPARE: &str = "Compare";
pub const CONTAINS: &str = "Contains";

/// Type name given to captured-variable holders.
pub const CLOSURE_TYPE: &str = "<>c__DisplayClass";

impl QueryNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        QueryNode::Constant(value.into())
    }

    pub fn parameter(name: impl Into<String>, ty: TypeRef) -> Self {
        QueryNode::Parameter(Parameter {
            name: name.into(),
            ty,
        })
    }

    /// `target.name`, with the member resolved against the target's type.
    pub fn member(target: QueryNode, name: &str) -> Self {
        let member = MemberRef::of(&target.type_of(), name);
        QueryNode::MemberAccess {
            target: Some(Box::new(target)),
            member,
        }
    }

    /// A captured variable: `name` read off the closure instance `closure`.
    pub fn captured(closure: Value, name: &str) -> Self {
        QueryNode::member(QueryNode::Constant(closure), name)
    }

    /// `Type.name` for a static member.
    pub fn static_member(declaring_type: &TypeRef, name: &str) -> Self {
        QueryNode::MemberAccess {
            target: None,
            member: MemberRef::new(name, declaring_type.clone(), TypeRef::opaque("object")),
        }
    }

    pub fn binary(op: BinOp, left: QueryNode, right: QueryNode) -> Self {
        QueryNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equal(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::binary(BinOp::Equal, left, right)
    }

    pub fn not_equal(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::binary(BinOp::NotEqual, left, right)
    }

    pub fn and_also(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::binary(BinOp::AndAlso, left, right)
    }

    pub fn or_else(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::binary(BinOp::OrElse, left, right)
    }

    /// `String.Compare(left, right)`
    pub fn string_compare(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::MethodCall {
            declaring_type: TypeRef::string(),
            method: COMPARE.to_string(),
            args: vec![left, right],
        }
    }

    /// `list.Contains(item)` in static form.
    pub fn contains(list: QueryNode, item: QueryNode) -> Self {
        QueryNode::MethodCall {
            declaring_type: TypeRef::opaque("Enumerable"),
            method: CONTAINS.to_string(),
            args: vec![list, item],
        }
    }

    pub fn lambda(parameter: &QueryNode, return_type: TypeRef, body: QueryNode) -> Self {
        let parameter = match parameter {
            QueryNode::Parameter(p) => p.clone(),
            other => Parameter {
                name: other.to_string(),
                ty: other.type_of(),
            },
        };
        QueryNode::Lambda(Lambda {
            parameter,
            return_type,
            body: Box::new(body),
            func: None,
        })
    }

    /// Boolean lambda over `parameter`.
    pub fn predicate(parameter: &QueryNode, body: QueryNode) -> Self {
        QueryNode::lambda(parameter, TypeRef::bool(), body)
    }

    /// Attach a row function to a lambda node. Other nodes are returned
    /// unchanged.
    pub fn with_func(self, func: RowFn) -> Self {
        match self {
            QueryNode::Lambda(mut lambda) => {
                lambda.func = Some(func);
                QueryNode::Lambda(lambda)
            }
            other => other,
        }
    }

    /// Anonymous-record construction: one positional argument per field.
    pub fn anonymous(ty: TypeRef, fields: Vec<(&str, QueryNode)>) -> Self {
        let (param_names, args) = fields
            .into_iter()
            .map(|(name, expr)| (name.to_string(), expr))
            .unzip();
        QueryNode::ConstructorCall {
            ty,
            args,
            param_names,
        }
    }

    /// `new ty { Name = expr, .. }` with members resolved against `ty`.
    pub fn new_record(ty: TypeRef, bindings: Vec<(&str, QueryNode)>) -> Self {
        let bindings = bindings
            .into_iter()
            .map(|(name, expr)| MemberBinding {
                member: MemberRef::of(&ty, name),
                expr,
            })
            .collect();
        QueryNode::NewRecord { ty, bindings }
    }

    pub fn conditional(test: QueryNode, if_true: QueryNode, if_false: QueryNode) -> Self {
        QueryNode::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    /// Best-effort static type of the node.
    pub fn type_of(&self) -> TypeRef {
        match self {
            QueryNode::Constant(value) => value.type_ref(),
            QueryNode::Parameter(p) => p.ty.clone(),
            QueryNode::MemberAccess { member, .. } => member.ty.clone(),
            QueryNode::Binary { op, left, .. } => match op {
                BinOp::Add
                | BinOp::Subtract
                | BinOp::Multiply
                | BinOp::Divide
                | BinOp::Modulo
                | BinOp::Coalesce => left.type_of(),
                _ => TypeRef::Scalar(ScalarType::Bool),
            },
            QueryNode::MethodCall { method, .. } if method == CONTAINS => TypeRef::bool(),
            QueryNode::MethodCall { method, .. } if method == COMPARE => {
                TypeRef::Scalar(ScalarType::Int)
            }
            QueryNode::MethodCall { .. } => TypeRef::opaque("object"),
            QueryNode::Lambda(lambda) => lambda.return_type.clone(),
            QueryNode::NewRecord { ty, .. } | QueryNode::ConstructorCall { ty, .. } => ty.clone(),
            QueryNode::Conditional { if_true, .. } => if_true.type_of(),
        }
    }
}

/// Fluent builder for an operator chain rooted at a query descriptor.
///
/// # Examples
///
/// ```
/// use elastic_query::{QueryChain, QueryDescriptor, QueryNode, RecordType, TypeRef};
///
/// let person = RecordType::new("Person")
///     .with_property("Age", TypeRef::scalar(elastic_query::ScalarType::Int))
///     .into_type();
/// let x = QueryNode::parameter("x", person.clone());
/// let chain = QueryChain::from(QueryDescriptor::new("people", person))
///     .filter(QueryNode::predicate(
///         &x,
///         QueryNode::equal(QueryNode::member(x.clone(), "Age"), QueryNode::constant(30)),
///     ));
/// assert!(matches!(chain.expression(), QueryNode::MethodCall { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct QueryChain {
    expr: QueryNode,
}

impl QueryChain {
    pub fn from(descriptor: QueryDescriptor) -> Self {
        QueryChain {
            expr: QueryNode::Constant(Value::Query(Box::new(descriptor))),
        }
    }

    fn push(self, method: &str, lambda: QueryNode) -> Self {
        QueryChain {
            expr: QueryNode::MethodCall {
                declaring_type: TypeRef::queryable(),
                method: method.to_string(),
                args: vec![self.expr, lambda],
            },
        }
    }

    pub fn filter(self, predicate: QueryNode) -> Self {
        self.push(WHERE, predicate)
    }

    pub fn select(self, projection: QueryNode) -> Self {
        self.push(SELECT, projection)
    }

    pub fn order_by(self, key: QueryNode) -> Self {
        self.push(ORDER_BY, key)
    }

    pub fn order_by_descending(self, key: QueryNode) -> Self {
        self.push(ORDER_BY_DESCENDING, key)
    }

    pub fn then_by(self, key: QueryNode) -> Self {
        self.push(THEN_BY, key)
    }

    pub fn then_by_descending(self, key: QueryNode) -> Self {
        self.push(THEN_BY_DESCENDING, key)
    }

    pub fn expression(&self) -> &QueryNode {
        &self.expr
    }

    pub fn into_expression(self) -> QueryNode {
        self.expr
    }
}
