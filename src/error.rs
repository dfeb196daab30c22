//! Error taxonomy shared by the tokenizer and the parser.
//!
//! Every failure is reported through a single [`AqlError`]. The error carries
//! the [`Phase`] that raised it, a stable [`ErrorCode`], a human-readable
//! message and a structured [`ErrorDetails`] payload. Downstream UIs localize
//! messages through [`AqlError::translation_key`].
//!
//! ```
//! use aql::{parse_aql, ErrorCode, Phase};
//!
//! let err = parse_aql(r#"status @ "passed""#).unwrap_err();
//! assert_eq!(err.code(), ErrorCode::UnexpectedCharacter);
//! assert_eq!(err.phase(), Phase::Tokenizer);
//! assert_eq!(err.details().character.as_deref(), Some("@"));
//! assert_eq!(err.details().position, Some(7));
//! assert_eq!(err.translation_key(), "aql.errors.UNEXPECTED_CHARACTER");
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::ast::Token;

/// Result type for AQL operations.
pub type Result<T> = std::result::Result<T, AqlError>;

/// The engine stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Tokenizer,
    Parser,
}

/// Stable error codes.
///
/// The string form (see [`ErrorCode::as_str`]) never changes between
/// releases; it is what callers match on and what the translation key is
/// built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Tokenizer
    UnexpectedCharacter,
    UnterminatedString,
    InvalidUnicodeEscape,

    // Parser
    ExpectedToken,
    ExpectedOperation,
    ExpectedValue,
    ExpectedAccessor,
    InvalidSyntax,
    InvalidInput,
    InvalidIdentifier,

    // Policy violations
    ForbiddenLogicalOperator,
    ForbiddenOperation,
    ForbiddenArrayOperation,
    ForbiddenIdentifier,
    ForbiddenValueType,
    ForbiddenParentheses,
    ForbiddenBracketAccess,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "UNEXPECTED_CHARACTER",
            ErrorCode::UnterminatedString => "UNTERMINATED_STRING",
            ErrorCode::InvalidUnicodeEscape => "INVALID_UNICODE_ESCAPE",
            ErrorCode::ExpectedToken => "EXPECTED_TOKEN",
            ErrorCode::ExpectedOperation => "EXPECTED_OPERATION",
            ErrorCode::ExpectedValue => "EXPECTED_VALUE",
            ErrorCode::ExpectedAccessor => "EXPECTED_ACCESSOR",
            ErrorCode::InvalidSyntax => "INVALID_SYNTAX",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorCode::ForbiddenLogicalOperator => "FORBIDDEN_LOGICAL_OPERATOR",
            ErrorCode::ForbiddenOperation => "FORBIDDEN_OPERATION",
            ErrorCode::ForbiddenArrayOperation => "FORBIDDEN_ARRAY_OPERATION",
            ErrorCode::ForbiddenIdentifier => "FORBIDDEN_IDENTIFIER",
            ErrorCode::ForbiddenValueType => "FORBIDDEN_VALUE_TYPE",
            ErrorCode::ForbiddenParentheses => "FORBIDDEN_PARENTHESES",
            ErrorCode::ForbiddenBracketAccess => "FORBIDDEN_BRACKET_ACCESS",
        }
    }

    /// The phase a code belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            ErrorCode::UnexpectedCharacter
            | ErrorCode::UnterminatedString
            | ErrorCode::InvalidUnicodeEscape => Phase::Tokenizer,
            _ => Phase::Parser,
        }
    }

    /// Returns true for the `FORBIDDEN_*` policy codes.
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            ErrorCode::ForbiddenLogicalOperator
                | ErrorCode::ForbiddenOperation
                | ErrorCode::ForbiddenArrayOperation
                | ErrorCode::ForbiddenIdentifier
                | ErrorCode::ForbiddenValueType
                | ErrorCode::ForbiddenParentheses
                | ErrorCode::ForbiddenBracketAccess
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error payload. Absent fields are skipped when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub got: Option<String>,
    /// Source text surrounding `position`, when the source is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// Text of the offending token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// An error raised while tokenizing or parsing an AQL query.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AqlError {
    phase: Phase,
    code: ErrorCode,
    message: String,
    details: ErrorDetails,
}

impl AqlError {
    fn new(code: ErrorCode, message: String, details: ErrorDetails) -> Self {
        AqlError {
            phase: code.phase(),
            code,
            message,
            details,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    /// Character offset the error points at, if any.
    pub fn position(&self) -> Option<usize> {
        self.details.position
    }

    /// Details merged with the error code, as a JSON object.
    pub fn full_details(&self) -> serde_json::Value {
        let mut map = match serde_json::to_value(&self.details) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(
            "code".to_string(),
            serde_json::Value::String(self.code.as_str().to_string()),
        );
        serde_json::Value::Object(map)
    }

    /// Localization key, `aql.errors.<CODE>`.
    pub fn translation_key(&self) -> String {
        format!("aql.errors.{}", self.code.as_str())
    }

    /// Attaches the surrounding source text unless a context is already set.
    pub(crate) fn with_context(mut self, context: impl FnOnce(usize) -> String) -> Self {
        if self.details.context.is_none()
            && let Some(position) = self.details.position
        {
            self.details.context = Some(context(position));
        }
        self
    }

    // ========================================
    // Tokenizer errors
    // ========================================

    pub(crate) fn unexpected_character(character: char, position: usize) -> Self {
        Self::new(
            ErrorCode::UnexpectedCharacter,
            format!("Unexpected character '{}' at position {}", character, position),
            ErrorDetails {
                position: Some(position),
                character: Some(character.to_string()),
                ..Default::default()
            },
        )
    }

    pub(crate) fn unterminated_string(position: usize) -> Self {
        Self::new(
            ErrorCode::UnterminatedString,
            format!("Unterminated string starting at position {}", position),
            ErrorDetails {
                position: Some(position),
                ..Default::default()
            },
        )
    }

    pub(crate) fn invalid_unicode_escape(sequence: String, position: usize) -> Self {
        Self::new(
            ErrorCode::InvalidUnicodeEscape,
            format!(
                "Invalid unicode escape '{}' at position {}",
                sequence, position
            ),
            ErrorDetails {
                position: Some(position),
                token: Some(sequence),
                ..Default::default()
            },
        )
    }

    // ========================================
    // Parser errors
    // ========================================

    pub(crate) fn expected_token(expected: impl Into<String>, got: &Token) -> Self {
        let expected = expected.into();
        Self::new(
            ErrorCode::ExpectedToken,
            format!(
                "Expected {} but got {} at position {}",
                expected,
                got.describe(),
                got.position
            ),
            ErrorDetails {
                position: Some(got.position),
                expected: Some(expected),
                got: Some(got.kind.to_string()),
                token: Some(got.text()),
                ..Default::default()
            },
        )
    }

    pub(crate) fn expected_operation(got: &Token) -> Self {
        Self::new(
            ErrorCode::ExpectedOperation,
            format!(
                "Expected a comparison operator or IN after field, got {} at position {}",
                got.describe(),
                got.position
            ),
            ErrorDetails {
                position: Some(got.position),
                got: Some(got.kind.to_string()),
                token: Some(got.text()),
                ..Default::default()
            },
        )
    }

    pub(crate) fn expected_value(got: &Token) -> Self {
        Self::new(
            ErrorCode::ExpectedValue,
            format!(
                "Expected a value, got {} at position {}",
                got.describe(),
                got.position
            ),
            ErrorDetails {
                position: Some(got.position),
                got: Some(got.kind.to_string()),
                token: Some(got.text()),
                ..Default::default()
            },
        )
    }

    pub(crate) fn expected_accessor(got: &Token) -> Self {
        Self::new(
            ErrorCode::ExpectedAccessor,
            format!(
                "Expected a STRING or NUMBER accessor, got {} at position {}",
                got.describe(),
                got.position
            ),
            ErrorDetails {
                position: Some(got.position),
                expected: Some("STRING or NUMBER".to_string()),
                got: Some(got.kind.to_string()),
                token: Some(got.text()),
                ..Default::default()
            },
        )
    }

    pub(crate) fn invalid_syntax(got: &Token, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ErrorCode::InvalidSyntax,
            format!(
                "Invalid syntax at position {}: {} ({})",
                got.position,
                reason,
                got.describe()
            ),
            ErrorDetails {
                position: Some(got.position),
                got: Some(got.kind.to_string()),
                token: Some(got.text()),
                reason: Some(reason),
                ..Default::default()
            },
        )
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ErrorCode::InvalidInput,
            format!("Invalid input: {}", reason),
            ErrorDetails {
                reason: Some(reason),
                ..Default::default()
            },
        )
    }

    pub(crate) fn invalid_identifier(name: &str, position: usize) -> Self {
        Self::new(
            ErrorCode::InvalidIdentifier,
            format!("Invalid identifier '{}' at position {}", name, position),
            ErrorDetails {
                position: Some(position),
                token: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    /// A policy violation. `what` names the construct for the message.
    pub(crate) fn forbidden(code: ErrorCode, what: &str, token: &Token) -> Self {
        debug_assert!(code.is_policy_violation());
        let text = token.text();
        Self::new(
            code,
            format!(
                "{} '{}' is not allowed at position {}",
                what, text, token.position
            ),
            ErrorDetails {
                position: Some(token.position),
                token: Some(text),
                got: Some(token.kind.to_string()),
                ..Default::default()
            },
        )
    }
}
