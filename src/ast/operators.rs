use std::fmt;

/// Binary operators that can appear in a query tree.
///
/// Only the comparison and logical operators are understood by the filter
/// compiler; the arithmetic ones exist so callers can describe any binary node
/// and get a precise "unsupported" error back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessThanOrEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterThanOrEqual,

    // Logical
    /// Bitwise AND (`&`)
    And,
    /// Bitwise OR (`|`)
    Or,
    /// Short-circuit AND (`&&`)
    AndAlso,
    /// Short-circuit OR (`||`)
    OrElse,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    /// Null-coalescing (`??`)
    Coalesce,
}

impl BinOp {
    /// True for `==` and `!=`, the operators that turn into `IS`/`IS NOT`
    /// when compared against an absent value.
    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Equal | BinOp::NotEqual)
    }

    /// Parse the operator spelling used in query documents.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "==" => BinOp::Equal,
            "!=" => BinOp::NotEqual,
            "<" => BinOp::LessThan,
            "<=" => BinOp::LessThanOrEqual,
            ">" => BinOp::GreaterThan,
            ">=" => BinOp::GreaterThanOrEqual,
            "&" => BinOp::And,
            "|" => BinOp::Or,
            "&&" => BinOp::AndAlso,
            "||" => BinOp::OrElse,
            "+" => BinOp::Add,
            "-" => BinOp::Subtract,
            "*" => BinOp::Multiply,
            "/" => BinOp::Divide,
            "%" => BinOp::Modulo,
            "??" => BinOp::Coalesce,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinOp::Equal => "Equal",
            BinOp::NotEqual => "NotEqual",
            BinOp::LessThan => "LessThan",
            BinOp::LessThanOrEqual => "LessThanOrEqual",
            BinOp::GreaterThan => "GreaterThan",
            BinOp::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinOp::And => "And",
            BinOp::Or => "Or",
            BinOp::AndAlso => "AndAlso",
            BinOp::OrElse => "OrElse",
            BinOp::Add => "Add",
            BinOp::Subtract => "Subtract",
            BinOp::Multiply => "Multiply",
            BinOp::Divide => "Divide",
            BinOp::Modulo => "Modulo",
            BinOp::Coalesce => "Coalesce",
        };
        f.write_str(name)
    }
}
