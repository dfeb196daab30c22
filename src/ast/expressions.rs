use serde::{Deserialize, Serialize};

use crate::ast::{CompareOp, LogicalOp};

/// Abstract Syntax Tree node produced by the parser.
///
/// Nodes are immutable once built and hold no reference back to the parser,
/// so one tree can be shared across threads and evaluated many times.
/// Parentheses only steer precedence and leave no node behind.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Field compared against a literal
    ///
    /// # Examples
    /// ```text
    /// status = "passed"
    /// metadata["priority"] is "High"
    /// duration >= 1000
    /// ```
    Comparison {
        path: FieldPath,
        op: CompareOp,
        value: Literal,
    },

    /// Membership test
    ///
    /// # Example
    /// ```text
    /// status in ["failed", "broken"]
    /// ```
    In { path: FieldPath, values: Vec<Literal> },

    /// `AND` / `OR`
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `NOT` operand
    Not(Box<Node>),

    /// Bare `true` / `false`
    Boolean(bool),
}

impl Node {
    pub fn and(left: Node, right: Node) -> Node {
        Node::Logical {
            op: LogicalOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Node, right: Node) -> Node {
        Node::Logical {
            op: LogicalOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(operand: Node) -> Node {
        Node::Not(Box::new(operand))
    }
}

/// Bracket accessor on a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `["key"]`
    Key(String),
    /// `[0]`; arrays index by it, objects look up its decimal text
    Index(i64),
    /// `[1.5]`; only ever matches an object key `"1.5"`
    Decimal(f64),
}

/// An identifier followed by zero or more bracket accessors.
///
/// # Examples
/// ```text
/// status                 // root: "status", accessors: []
/// metadata["priority"]   // root: "metadata", accessors: [Key("priority")]
/// steps[0]["name"]       // root: "steps", accessors: [Index(0), Key("name")]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    pub root: String,
    pub accessors: Vec<Accessor>,
}

impl FieldPath {
    pub fn new(root: impl Into<String>) -> Self {
        FieldPath {
            root: root.into(),
            accessors: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.accessors.push(Accessor::Key(key.into()));
        self
    }

    pub fn index(mut self, index: i64) -> Self {
        self.accessors.push(Accessor::Index(index));
        self
    }
}

/// Right-hand side of a comparison or an element of an `IN` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// `null` or `empty`
    Null,
    /// Context reference, stored with its parentheses (`now()`)
    Function(String),
}

impl Literal {
    pub fn value_type(&self) -> ValueType {
        match self {
            Literal::String(_) => ValueType::String,
            Literal::Integer(_) | Literal::Float(_) => ValueType::Number,
            Literal::Boolean(_) => ValueType::Boolean,
            Literal::Null => ValueType::Null,
            Literal::Function(_) => ValueType::Function,
        }
    }
}

/// Literal categories, used by [`Policy`](crate::Policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Null,
    Function,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
            ValueType::Function => "function",
        }
    }
}
