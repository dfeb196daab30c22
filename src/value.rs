use std::{cmp::Ordering, collections::HashMap};

use rust_decimal::Decimal;

use crate::ast::{Accessor, FieldPath};

/// A JSON-like record value that queries are evaluated against.
///
/// Integers and floats are kept apart so large integer fields survive
/// untouched, but they compare equal when they hold the same number.
///
/// # Examples
///
/// ```
/// use aql::Value;
/// use std::collections::HashMap;
///
/// let mut result = HashMap::new();
/// result.insert("status".to_string(), Value::String("passed".to_string()));
/// result.insert("duration".to_string(), Value::Integer(1200));
/// let record = Value::Object(result);
///
/// assert_eq!(record.get_key("status"), Some(&Value::String("passed".to_string())));
/// assert!(Value::Integer(3).loose_eq(&Value::Float(3.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

impl Value {
    /// Builds an object from key/value pairs.
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Object property lookup. Arrays accept non-negative numeric strings.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            Value::Array(arr) => key.parse::<usize>().ok().and_then(|i| arr.get(i)),
            _ => None,
        }
    }

    /// Applies one bracket accessor.
    ///
    /// - Integer keys index arrays (negative indices miss) and look up their
    ///   decimal text on objects: `[0]` → `"0"`
    /// - Float keys look up their shortest decimal text on objects
    ///   (`[1.5]` → `"1.5"`, `[1.0]` → `"1"`) and index arrays only when
    ///   integral
    pub fn get(&self, accessor: &Accessor) -> Option<&Value> {
        match (self, accessor) {
            (_, Accessor::Key(key)) => self.get_key(key),
            (Value::Array(arr), Accessor::Index(n)) => {
                usize::try_from(*n).ok().and_then(|i| arr.get(i))
            }
            (Value::Array(arr), Accessor::Decimal(n)) if n.fract() == 0.0 && *n >= 0.0 => {
                arr.get(*n as usize)
            }
            (Value::Object(map), Accessor::Index(n)) => map.get(&n.to_string()),
            (Value::Object(map), Accessor::Decimal(n)) => map.get(&n.to_string()),
            _ => None,
        }
    }

    /// Resolves a field path. `None` means the path is undefined.
    pub fn resolve(&self, path: &FieldPath) -> Option<&Value> {
        path.accessors
            .iter()
            .try_fold(self.get_key(&path.root)?, |current, accessor| {
                current.get(accessor)
            })
    }

    /// Deep equality where integers and floats compare by numeric value.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.loose_eq(other)))
            }
            (a, b) if a.as_float().is_some() && b.as_float().is_some() => {
                compare_numbers(a, b) == Some(Ordering::Equal)
            }
            (a, b) => a == b,
        }
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Some(Decimal::from(*n)),
        Value::Float(n) => Decimal::from_f64_retain(*n),
        _ => None,
    }
}

/// Orders two numeric values; `None` when either side is not a number.
///
/// Mixed integer/float comparisons go through `Decimal` so that large
/// integers are not rounded to the nearest `f64` first.
pub fn compare_numbers(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            match (to_decimal(left), to_decimal(right)) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => left.as_float()?.partial_cmp(&right.as_float()?),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_nested() {
        let record = Value::object([(
            "metadata",
            Value::object([("priority", Value::String("High".into()))]),
        )]);
        let path = FieldPath::new("metadata").key("priority");
        assert_eq!(record.resolve(&path), Some(&Value::String("High".into())));

        let missing = FieldPath::new("metadata").key("owner").key("name");
        assert_eq!(record.resolve(&missing), None);
    }

    #[test]
    fn test_resolve_array_index() {
        let record = Value::object([(
            "steps",
            Value::Array(vec![Value::String("open".into()), Value::String("close".into())]),
        )]);
        assert_eq!(
            record.resolve(&FieldPath::new("steps").index(1)),
            Some(&Value::String("close".into()))
        );
        assert_eq!(record.resolve(&FieldPath::new("steps").index(-1)), None);
        assert_eq!(
            record.resolve(&FieldPath::new("steps").key("0")),
            Some(&Value::String("open".into()))
        );
    }

    #[test]
    fn test_integer_key_on_object() {
        let record = Value::object([("codes", Value::object([("0", Value::Boolean(true))]))]);
        assert_eq!(
            record.resolve(&FieldPath::new("codes").index(0)),
            Some(&Value::Boolean(true))
        );
    }

    #[test]
    fn test_integral_float_key() {
        let items = Value::Array(vec![Value::Integer(7), Value::Integer(8)]);
        let record = Value::object([("a", items)]);
        let path = |n: f64| FieldPath {
            root: "a".to_string(),
            accessors: vec![Accessor::Decimal(n)],
        };
        assert_eq!(record.resolve(&path(1.0)), Some(&Value::Integer(8)));
        assert_eq!(record.resolve(&path(1.5)), None);
        assert_eq!(record.resolve(&path(-1.0)), None);

        let record = Value::object([("codes", Value::object([("1", Value::Boolean(true))]))]);
        let path = FieldPath {
            root: "codes".to_string(),
            accessors: vec![Accessor::Decimal(1.0)],
        };
        assert_eq!(record.resolve(&path), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_compare_large_integer_with_float() {
        let big = Value::Integer(9_007_199_254_740_993);
        let float = Value::Float(9_007_199_254_740_992.0);
        assert_eq!(compare_numbers(&big, &float), Some(Ordering::Greater));
        assert_eq!(compare_numbers(&Value::String("1".into()), &float), None);
    }

    #[test]
    fn test_loose_eq_nested() {
        let a = Value::Array(vec![Value::Integer(1), Value::Float(2.0)]);
        let b = Value::Array(vec![Value::Float(1.0), Value::Integer(2)]);
        assert!(a.loose_eq(&b));
        assert!(!Value::Null.loose_eq(&Value::Boolean(false)));
    }
}
