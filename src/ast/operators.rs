use serde::{Deserialize, Serialize};

use crate::ast::TokenKind;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareOp {
    /// Equal (`=`, `is`)
    Eq,
    /// Not equal (`!=`)
    Neq,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Substring (`~=`)
    Contains,
}

impl CompareOp {
    pub fn from_token(kind: TokenKind) -> Option<CompareOp> {
        match kind {
            TokenKind::Eq => Some(CompareOp::Eq),
            TokenKind::Neq => Some(CompareOp::Neq),
            TokenKind::Gt => Some(CompareOp::Gt),
            TokenKind::Ge => Some(CompareOp::Ge),
            TokenKind::Lt => Some(CompareOp::Lt),
            TokenKind::Le => Some(CompareOp::Le),
            TokenKind::Contains => Some(CompareOp::Contains),
            _ => None,
        }
    }
}

/// Binary logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOp {
    /// Logical AND (`and`, any case)
    And,
    /// Logical OR (`or`, any case)
    Or,
}

/// Logical keywords a [`Policy`](crate::Policy) can allow or forbid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalKeyword {
    And,
    Or,
    Not,
}
