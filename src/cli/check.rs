//! Run AQL queries against JSON input

use super::CliError;
use crate::{
    Context, Policy, Value, filter_by_aql_with_context, json_to_value, parse_aql_with_policy,
    tokenize, value_to_json,
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The AQL query to run
    pub query: String,
    /// JSON input string: an array of records or a single record
    pub input: Option<String>,
    /// JSON object with values for context functions
    pub context: Option<String>,
    /// Restrictions applied while parsing
    pub policy: Option<Policy>,
    /// Only validate syntax, don't filter
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Matching records, as a JSON array
    Success(serde_json::Value),
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn parse_records(json_str: &str) -> Result<Vec<Value>, CliError> {
    match serde_json::from_str(json_str)? {
        serde_json::Value::Array(items) => Ok(items.into_iter().map(json_to_value).collect()),
        object @ serde_json::Value::Object(_) => Ok(vec![json_to_value(object)]),
        other => Err(CliError::NotRecords(json_type(&other))),
    }
}

fn parse_context(json_str: Option<&str>) -> Result<Context, CliError> {
    let Some(json_str) = json_str else {
        return Ok(Context::new());
    };
    match serde_json::from_str(json_str)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, json_to_value(v)))
            .collect()),
        _ => Err(CliError::InvalidContext),
    }
}

/// Execute an AQL check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let policy = options.policy.clone().unwrap_or_default();
    let outcome = parse_aql_with_policy(&options.query, &policy)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = parse_records(json_str)?;
    let context = parse_context(options.context.as_deref())?;

    let matched = filter_by_aql_with_context(&records, &outcome, &context)?;
    let output = serde_json::Value::Array(matched.into_iter().map(value_to_json).collect());
    Ok(CheckResult::Success(output))
}

/// Tokenize a query and return the tokens as JSON
pub fn execute_tokens(query: &str) -> Result<serde_json::Value, CliError> {
    let tokens = tokenize(query)?;
    Ok(serde_json::to_value(tokens)?)
}
