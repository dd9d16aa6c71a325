use std::{fmt, sync::Arc};

use crate::{
    ast::{BinOp, MemberRef, TypeRef},
    value::Value,
};

/// Identifies what a compiled query targets: the remote dataset and the type
/// of its rows. Lives as the value of the root `Constant` of every operator
/// chain.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub dataset_name: String,
    pub element_type: TypeRef,
}

impl QueryDescriptor {
    pub fn new(dataset_name: impl Into<String>, element_type: TypeRef) -> Self {
        QueryDescriptor {
            dataset_name: dataset_name.into(),
            element_type,
        }
    }
}

/// A typed callable that shapes one fetched row, stored next to the
/// projection lambda it implements.
#[derive(Clone)]
pub struct RowFn(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl RowFn {
    pub fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        RowFn(Arc::new(f))
    }

    pub fn call(&self, row: &Value) -> Value {
        (self.0)(row)
    }
}

impl fmt::Debug for RowFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowFn(..)")
    }
}

impl PartialEq for RowFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Lambda parameter (`x` in `x => x.Age > 30`).
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
}

/// A predicate, projection or key-selector function.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameter: Parameter,
    pub return_type: TypeRef,
    pub body: Box<QueryNode>,
    /// Compiled form of the lambda, invoked when shaping fetched rows.
    pub func: Option<RowFn>,
}

impl Lambda {
    pub fn returns_bool(&self) -> bool {
        self.return_type.is_bool()
    }
}

/// One `Member = expr` assignment inside a record initialiser.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBinding {
    pub member: MemberRef,
    pub expr: QueryNode,
}

/// Node of a query expression tree.
///
/// Trees are built once by the query-building layer and only read by the
/// compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Literal or captured object instance.
    Constant(Value),

    /// Lambda parameter reference.
    Parameter(Parameter),

    /// Property or field read. `target` is `None` for static members.
    ///
    /// # Example
    /// ```text
    /// x.Info.Name
    /// closure.threshold
    /// DateTime.UtcNow
    /// ```
    MemberAccess {
        target: Option<Box<QueryNode>>,
        member: MemberRef,
    },

    Binary {
        op: BinOp,
        left: Box<QueryNode>,
        right: Box<QueryNode>,
    },

    /// Static-form method call: query operators (`Where(source, lambda)`) and
    /// supported built-ins (`String.Compare(a, b)`, `Contains(list, item)`).
    MethodCall {
        declaring_type: TypeRef,
        method: String,
        args: Vec<QueryNode>,
    },

    Lambda(Lambda),

    /// Record initialiser, `new T { A = .., B = .. }`.
    NewRecord {
        ty: TypeRef,
        bindings: Vec<MemberBinding>,
    },

    /// Positional constructor call, as produced for anonymous records.
    ConstructorCall {
        ty: TypeRef,
        args: Vec<QueryNode>,
        param_names: Vec<String>,
    },

    /// `test ? if_true : if_false`
    Conditional {
        test: Box<QueryNode>,
        if_true: Box<QueryNode>,
        if_false: Box<QueryNode>,
    },
}

impl QueryNode {
    /// Direct children in visiting order.
    pub fn children(&self) -> Vec<&QueryNode> {
        match self {
            QueryNode::Constant(_) | QueryNode::Parameter(_) => Vec::new(),
            QueryNode::MemberAccess { target, .. } => target.iter().map(|t| &**t).collect(),
            QueryNode::Binary { left, right, .. } => vec![&**left, &**right],
            QueryNode::MethodCall { args, .. } => args.iter().collect(),
            QueryNode::Lambda(lambda) => vec![&*lambda.body],
            QueryNode::NewRecord { bindings, .. } => bindings.iter().map(|b| &b.expr).collect(),
            QueryNode::ConstructorCall { args, .. } => args.iter().collect(),
            QueryNode::Conditional {
                test,
                if_true,
                if_false,
            } => vec![&**test, &**if_true, &**if_false],
        }
    }

    /// Member accessed by this node, if it is a member access.
    pub fn as_member(&self) -> Option<&MemberRef> {
        match self {
            QueryNode::MemberAccess { member, .. } => Some(member),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self {
            QueryNode::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    /// True when the node reads an instance member declared on `row_type`,
    /// i.e. a column of the queried dataset.
    pub fn is_row_member(&self, row_type: &TypeRef) -> bool {
        match self {
            QueryNode::MemberAccess {
                target: Some(_),
                member,
            } => member.declaring_type.same_type(row_type),
            _ => false,
        }
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Constant(value) => write!(f, "{}", value),
            QueryNode::Parameter(p) => f.write_str(&p.name),
            QueryNode::MemberAccess { target, member } => match target {
                Some(target) => write!(f, "{}.{}", target, member.name),
                None => write!(f, "{}.{}", member.declaring_type, member.name),
            },
            QueryNode::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            QueryNode::MethodCall {
                declaring_type,
                method,
                args,
            } => {
                write!(f, "{}.{}(", declaring_type, method)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            QueryNode::Lambda(lambda) => write!(f, "{} => {}", lambda.parameter.name, lambda.body),
            QueryNode::NewRecord { ty, bindings } => {
                write!(f, "new {} {{", ty)?;
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {} = {}", binding.member.name, binding.expr)?;
                }
                f.write_str(" }")
            }
            QueryNode::ConstructorCall { ty, args, param_names } => {
                write!(f, "new {}(", ty)?;
                for (i, (name, arg)) in param_names.iter().zip(args).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", name, arg)?;
                }
                f.write_str(")")
            }
            QueryNode::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "IIF({}, {}, {})", test, if_true, if_false),
        }
    }
}
