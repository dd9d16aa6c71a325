use crate::ast::BinOp;

/// Errors raised while compiling a query tree.
///
/// Every variant aborts the current `compile` call only; the compiler keeps
/// no state between calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// No root descriptor, or a tree of the wrong shape
    #[error("The expression is not setup correctly: {0}")]
    MalformedQuery(String),

    #[error("The binary operator '{0}' is not supported")]
    UnsupportedOperator(BinOp),

    /// Reading a captured member failed
    #[error("Cannot read member '{member}': {reason}")]
    MemberRead { member: String, reason: String },

    #[error("Unsupported expression: {0}")]
    Unsupported(String),
}

impl CompileError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CompileError::MalformedQuery(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        CompileError::Unsupported(msg.into())
    }

    pub(crate) fn member_read(member: &str, reason: impl Into<String>) -> Self {
        CompileError::MemberRead {
            member: member.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;
