//! Parser policy: which parts of the language a caller exposes.
//!
//! An embedding application that accepts queries from untrusted users can
//! restrict AQL to a subset. The parser checks the policy at every relevant
//! grammar point and fails with the matching `FORBIDDEN_*` error instead of
//! silently dropping the construct.
//!
//! Policies deserialize from camelCase JSON; every field is optional and an
//! absent allowlist means "everything allowed".
//!
//! ```
//! use aql::{parse_aql_with_policy, CompareOp, ErrorCode, Policy};
//!
//! let json = r#"{ "operations": ["EQ"], "allowParentheses": false }"#;
//! let policy = Policy::from_json(json).unwrap();
//! assert!(parse_aql_with_policy(r#"status = "passed""#, &policy).is_ok());
//!
//! let err = parse_aql_with_policy("age > 3", &policy).unwrap_err();
//! assert_eq!(err.code(), ErrorCode::ForbiddenOperation);
//!
//! let policy = Policy::default().with_operations([CompareOp::Eq, CompareOp::Neq]);
//! assert!(policy.allows_operation(CompareOp::Neq));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ast::{CompareOp, LogicalKeyword, ValueType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    /// Allowed `AND` / `OR` / `NOT`; `None` allows all
    pub logical_operators: Option<HashSet<LogicalKeyword>>,
    /// Allowed comparison operators; `None` allows all
    pub operations: Option<HashSet<CompareOp>>,
    /// Whether `field IN [...]` is accepted
    pub allow_in: bool,
    /// Allowed root identifiers; `None` allows all
    pub identifiers: Option<HashSet<String>>,
    /// Root identifiers that are always rejected
    pub forbidden_identifiers: HashSet<String>,
    /// Allowed literal types; `None` allows all
    pub value_types: Option<HashSet<ValueType>>,
    pub allow_parentheses: bool,
    pub allow_bracket_access: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            logical_operators: None,
            operations: None,
            allow_in: true,
            identifiers: None,
            forbidden_identifiers: HashSet::new(),
            value_types: None,
            allow_parentheses: true,
            allow_bracket_access: true,
        }
    }
}

impl Policy {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_logical_operators(
        mut self,
        operators: impl IntoIterator<Item = LogicalKeyword>,
    ) -> Self {
        self.logical_operators = Some(operators.into_iter().collect());
        self
    }

    pub fn with_operations(mut self, operations: impl IntoIterator<Item = CompareOp>) -> Self {
        self.operations = Some(operations.into_iter().collect());
        self
    }

    pub fn with_identifiers<S: Into<String>>(
        mut self,
        identifiers: impl IntoIterator<Item = S>,
    ) -> Self {
        self.identifiers = Some(identifiers.into_iter().map(Into::into).collect());
        self
    }

    pub fn forbid_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.forbidden_identifiers.insert(identifier.into());
        self
    }

    pub fn with_value_types(mut self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.value_types = Some(types.into_iter().collect());
        self
    }

    pub fn allow_in(mut self, allow: bool) -> Self {
        self.allow_in = allow;
        self
    }

    pub fn allow_parentheses(mut self, allow: bool) -> Self {
        self.allow_parentheses = allow;
        self
    }

    pub fn allow_bracket_access(mut self, allow: bool) -> Self {
        self.allow_bracket_access = allow;
        self
    }

    pub fn allows_logical(&self, keyword: LogicalKeyword) -> bool {
        self.logical_operators
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&keyword))
    }

    pub fn allows_operation(&self, op: CompareOp) -> bool {
        self.operations
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&op))
    }

    pub fn allows_identifier(&self, name: &str) -> bool {
        !self.forbidden_identifiers.contains(name)
            && self
                .identifiers
                .as_ref()
                .is_none_or(|allowed| allowed.contains(name))
    }

    pub fn allows_value_type(&self, value_type: ValueType) -> bool {
        self.value_types
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&value_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_permissive() {
        let policy = Policy::from_json("{}").unwrap();
        assert_eq!(policy, Policy::default());
        assert!(policy.allow_in);
        assert!(policy.allows_identifier("anything"));
    }

    #[test]
    fn test_deny_list_wins_over_allow_list() {
        let policy = Policy::default()
            .with_identifiers(["status", "secret"])
            .forbid_identifier("secret");
        assert!(policy.allows_identifier("status"));
        assert!(!policy.allows_identifier("secret"));
        assert!(!policy.allows_identifier("name"));
    }

    #[test]
    fn test_json_field_names() {
        let policy = Policy::from_json(
            r#"{
                "logicalOperators": ["AND", "NOT"],
                "valueTypes": ["string", "null"],
                "allowIn": false,
                "allowBracketAccess": false
            }"#,
        )
        .unwrap();
        assert!(policy.allows_logical(LogicalKeyword::Not));
        assert!(!policy.allows_logical(LogicalKeyword::Or));
        assert!(policy.allows_value_type(ValueType::Null));
        assert!(!policy.allows_value_type(ValueType::Number));
        assert!(!policy.allow_in);
        assert!(policy.allow_parentheses);
        assert!(!policy.allow_bracket_access);
    }
}
