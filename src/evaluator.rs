use std::{borrow::Cow, cmp::Ordering, collections::HashMap};

use tracing::trace;

use crate::{
    ast::{CompareOp, FieldPath, Literal, LogicalOp, Node},
    error::Result,
    parser::{ParseOutcome, parse_aql},
    value::{Value, compare_numbers},
};

/// Values for context functions, keyed by their call form (`"now()"`).
pub type Context = HashMap<String, Value>;

/// A query given either as source text or as an already parsed tree.
///
/// Parsing once and reusing the tree is the cheap path when the same query
/// filters many collections.
#[derive(Debug, Clone, Copy)]
pub enum AqlQuery<'q> {
    Source(&'q str),
    /// `None` matches every record
    Expression(Option<&'q Node>),
}

impl<'q> From<&'q str> for AqlQuery<'q> {
    fn from(source: &'q str) -> Self {
        AqlQuery::Source(source)
    }
}

impl<'q> From<&'q String> for AqlQuery<'q> {
    fn from(source: &'q String) -> Self {
        AqlQuery::Source(source)
    }
}

impl<'q> From<&'q Node> for AqlQuery<'q> {
    fn from(node: &'q Node) -> Self {
        AqlQuery::Expression(Some(node))
    }
}

impl<'q> From<&'q ParseOutcome> for AqlQuery<'q> {
    fn from(outcome: &'q ParseOutcome) -> Self {
        AqlQuery::Expression(outcome.expression.as_ref())
    }
}

/// Tree-walking evaluator.
///
/// Evaluation is pure: neither the tree nor the record is modified, and a
/// missing field is a non-match rather than an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator<'c> {
    context: Option<&'c Context>,
}

impl Evaluator<'_> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'c> Evaluator<'c> {
    /// Creates an evaluator that resolves `name()` literals from `context`.
    pub fn with_context(context: &'c Context) -> Self {
        Evaluator {
            context: Some(context),
        }
    }

    /// Evaluates `node` against one record.
    ///
    /// # Examples
    ///
    /// ```
    /// use aql::{parse_aql, Evaluator, Value};
    ///
    /// let outcome = parse_aql(r#"status = "passed" AND duration < 500"#).unwrap();
    /// let node = outcome.expression.unwrap();
    ///
    /// let record = Value::object([
    ///     ("status", Value::String("passed".into())),
    ///     ("duration", Value::Integer(120)),
    /// ]);
    /// assert!(Evaluator::new().matches(&node, &record));
    /// ```
    pub fn matches(&self, node: &Node, record: &Value) -> bool {
        match node {
            Node::Logical {
                op: LogicalOp::And,
                left,
                right,
            } => self.matches(left, record) && self.matches(right, record),
            Node::Logical {
                op: LogicalOp::Or,
                left,
                right,
            } => self.matches(left, record) || self.matches(right, record),
            Node::Not(operand) => !self.matches(operand, record),
            Node::Boolean(b) => *b,
            Node::Comparison { path, op, value } => self.compare(path, *op, value, record),
            Node::In { path, values } => {
                let resolved = record.resolve(path);
                values
                    .iter()
                    .any(|literal| equals(resolved, self.literal_value(literal).as_deref()))
            }
        }
    }

    /// Keeps the records `expression` matches, in their original order.
    /// `None` keeps everything.
    pub fn filter<'v>(&self, items: &'v [Value], expression: Option<&Node>) -> Vec<&'v Value> {
        let matched: Vec<&Value> = match expression {
            None => items.iter().collect(),
            Some(node) => items.iter().filter(|item| self.matches(node, item)).collect(),
        };
        trace!(items = items.len(), matched = matched.len(), "filtered records");
        matched
    }

    fn compare(&self, path: &FieldPath, op: CompareOp, literal: &Literal, record: &Value) -> bool {
        let left = record.resolve(path);
        let right = self.literal_value(literal);
        let right = right.as_deref();

        match op {
            CompareOp::Eq => equals(left, right),
            CompareOp::Neq => !equals(left, right),
            CompareOp::Gt => ordered(left, right, |o| o == Ordering::Greater),
            CompareOp::Ge => ordered(left, right, |o| o != Ordering::Less),
            CompareOp::Lt => ordered(left, right, |o| o == Ordering::Less),
            CompareOp::Le => ordered(left, right, |o| o != Ordering::Greater),
            CompareOp::Contains => match (left, right) {
                (Some(Value::String(haystack)), Some(Value::String(needle))) => {
                    haystack.contains(needle.as_str())
                }
                _ => false,
            },
        }
    }

    /// Runtime value of a literal; `None` for an unknown context function.
    fn literal_value<'a>(&'a self, literal: &'a Literal) -> Option<Cow<'a, Value>> {
        let value = match literal {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Null => Value::Null,
            Literal::Function(name) => {
                return self.context.and_then(|c| c.get(name)).map(Cow::Borrowed);
            }
        };
        Some(Cow::Owned(value))
    }
}

/// Equality over possibly undefined operands. `null` on the right also
/// matches an undefined left side.
fn equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (None | Some(Value::Null), Some(Value::Null)) => true,
        (Some(a), Some(b)) => a.loose_eq(b),
        _ => false,
    }
}

fn ordered(left: Option<&Value>, right: Option<&Value>, accept: impl Fn(Ordering) -> bool) -> bool {
    match (left, right) {
        (Some(a), Some(b)) => compare_numbers(a, b).is_some_and(accept),
        _ => false,
    }
}

/// Evaluates `node` against `record`, resolving context functions from `context`.
pub fn evaluate(node: &Node, record: &Value, context: &Context) -> bool {
    Evaluator::with_context(context).matches(node, record)
}

/// Filters `items` with an AQL query.
///
/// A string query is parsed first and parse errors are returned unchanged.
/// An empty query keeps every item. The result borrows from `items` and keeps
/// their relative order.
///
/// # Examples
///
/// ```
/// use aql::{filter_by_aql, Value};
///
/// let items: Vec<Value> = ["passed", "failed", "passed"]
///     .into_iter()
///     .map(|s| Value::object([("status", Value::String(s.into()))]))
///     .collect();
///
/// let passed = filter_by_aql(&items, r#"status = "passed""#).unwrap();
/// assert_eq!(passed.len(), 2);
/// assert_eq!(filter_by_aql(&items, "").unwrap().len(), 3);
/// ```
pub fn filter_by_aql<'v, 'q>(
    items: &'v [Value],
    query: impl Into<AqlQuery<'q>>,
) -> Result<Vec<&'v Value>> {
    filter_with(Evaluator::new(), items, query.into())
}

/// [`filter_by_aql`] with values for context functions.
pub fn filter_by_aql_with_context<'v, 'q>(
    items: &'v [Value],
    query: impl Into<AqlQuery<'q>>,
    context: &Context,
) -> Result<Vec<&'v Value>> {
    filter_with(Evaluator::with_context(context), items, query.into())
}

fn filter_with<'v>(
    evaluator: Evaluator<'_>,
    items: &'v [Value],
    query: AqlQuery<'_>,
) -> Result<Vec<&'v Value>> {
    match query {
        AqlQuery::Source(source) => {
            let outcome = parse_aql(source)?;
            Ok(evaluator.filter(items, outcome.expression.as_ref()))
        }
        AqlQuery::Expression(expression) => Ok(evaluator.filter(items, expression)),
    }
}
