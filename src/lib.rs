//! Allure Query Language (AQL).
//!
//! A small boolean filter language for test-result records:
//!
//! ```text
//! status IN ["failed", "broken"] AND NOT metadata["flaky"] = true
//! ```
//!
//! The engine is split into a [lexer], a [parser] that builds an immutable
//! [`Node`] tree, and an [evaluator] that walks the tree against [`Value`]
//! records. Every failure surfaces as one [`AqlError`] with a stable
//! [`ErrorCode`].
//!
//! ```
//! use aql::{filter_by_aql, parse_aql, Value};
//!
//! let items = vec![
//!     Value::object([("status", Value::String("passed".into())), ("age", Value::Integer(30))]),
//!     Value::object([("status", Value::String("failed".into())), ("age", Value::Integer(20))]),
//! ];
//!
//! // Parse once, filter many times.
//! let query = parse_aql(r#"status = "passed" AND age > 25"#).unwrap();
//! let matched = filter_by_aql(&items, &query).unwrap();
//! assert_eq!(matched, vec![&items[0]]);
//! ```
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod policy;
pub mod value;

pub use ast::{
    Accessor, CompareOp, FieldPath, Literal, LogicalKeyword, LogicalOp, Node, Token, TokenKind,
    ValueType,
};
pub use convert::{json_to_value, value_to_json};
pub use error::{AqlError, ErrorCode, ErrorDetails, Phase, Result};
pub use evaluator::{
    AqlQuery, Context, Evaluator, evaluate, filter_by_aql, filter_by_aql_with_context,
};
pub use lexer::{Lexer, tokenize};
pub use parser::{ParseOutcome, Parser, parse_aql, parse_aql_with_policy, parse_tokens};
pub use policy::Policy;
pub use value::Value;
