//! # Allure Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) for AQL,
//! the boolean filter language used to select test results.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Positioned lexical tokens produced by the lexer
//! - **[operators]** - Comparison and logical operators
//! - **[expressions]** - AST nodes, field paths and literals
//!
//! ## Quick Start
//!
//! ```text
//! status = "failed" AND NOT flaky = true
//! ```
//!
//! This query keeps failed results that are not marked flaky.
//!
//! ## Core Concepts
//!
//! ### Precedence
//!
//! From loosest to tightest: `OR`, `AND`, `NOT`, then comparisons and
//! parenthesised groups. Both binary connectives are left-associative.
//!
//! ### Field Paths
//!
//! A field is an identifier made of ASCII letters and underscores, followed
//! by any number of bracket accessors:
//!
//! - **String keys** look up object properties: `labels["owner"]`
//! - **Integer keys** index arrays, or look up `"0"` on objects: `steps[0]`
//!
//! ### Keywords
//!
//! Keywords are case-insensitive. `is` is a synonym of `=` and `empty` a
//! synonym of `null`.
//!
//! ## Examples
//!
//! ### Membership
//!
//! ```text
//! status IN ["failed", "broken"]
//! ```
//!
//! ### Nested Field
//!
//! ```text
//! metadata["priority"] = "High" OR name ~= "login"
//! ```
//!
//! ### Context Function
//!
//! ```text
//! owner = current_user()
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Accessor, FieldPath, Literal, Node, ValueType};
pub use operators::{CompareOp, LogicalKeyword, LogicalOp};
pub use tokens::{Token, TokenKind};
