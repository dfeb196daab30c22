//! Recursive-descent parser for AQL.
//!
//! The parser consumes the token list produced by the lexer once and builds a
//! [`Node`] tree. Precedence, loosest first: `OR`, `AND`, `NOT`, then
//! comparisons, bare booleans and parenthesised groups.
//!
//! ```
//! use aql::{parse_aql, Node};
//!
//! let outcome = parse_aql(r#"status = "passed" OR NOT flaky = true"#).unwrap();
//! assert!(matches!(outcome.expression, Some(Node::Logical { .. })));
//!
//! assert!(parse_aql("   ").unwrap().expression.is_none());
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    ast::{
        Accessor, CompareOp, FieldPath, Literal, LogicalKeyword, Node, Token, TokenKind,
    },
    error::{AqlError, ErrorCode, Result},
    lexer::tokenize,
    policy::Policy,
};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]+$").expect("identifier pattern is valid"));

/// Characters of source shown on each side of an error position.
const CONTEXT_RADIUS: usize = 10;

/// Deepest allowed nesting of `NOT` and parentheses.
pub const MAX_DEPTH: usize = 256;

/// Most `AND` / `OR` connectives allowed in one query. Chains build
/// left-deep trees, so this bounds the tree height together with
/// [`MAX_DEPTH`].
pub const MAX_CONNECTIVES: usize = 1024;

/// Result of a successful parse. `expression` is `None` for blank input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub expression: Option<Node>,
}

impl ParseOutcome {
    pub fn is_empty(&self) -> bool {
        self.expression.is_none()
    }
}

/// Parses a query string with no policy restrictions.
pub fn parse_aql(input: &str) -> Result<ParseOutcome> {
    parse_source(input, None)
}

/// Parses a query string, rejecting constructs `policy` does not allow.
pub fn parse_aql_with_policy(input: &str, policy: &Policy) -> Result<ParseOutcome> {
    parse_source(input, Some(policy))
}

/// Parses an already tokenized query.
pub fn parse_tokens(tokens: Vec<Token>, policy: Option<&Policy>) -> Result<ParseOutcome> {
    let mut parser = Parser::new(tokens);
    if let Some(policy) = policy {
        parser = parser.with_policy(policy);
    }
    parser.parse()
}

fn parse_source(input: &str, policy: Option<&Policy>) -> Result<ParseOutcome> {
    let result = tokenize(input).and_then(|tokens| {
        let token_count = tokens.len();
        let mut parser = Parser::new(tokens).with_source(input);
        if let Some(policy) = policy {
            parser = parser.with_policy(policy);
        }
        let outcome = parser.parse()?;
        debug!(
            tokens = token_count,
            empty = outcome.is_empty(),
            "parsed AQL query"
        );
        Ok(outcome)
    });

    result.map_err(|e| {
        let e = e.with_context(|position| context_window(input, position));
        debug!(code = %e.code(), position = ?e.position(), "failed to parse AQL query");
        e
    })
}

/// Source text around `position`, clamped to the input.
fn context_window(source: &str, position: usize) -> String {
    let start = position.saturating_sub(CONTEXT_RADIUS);
    source
        .chars()
        .skip(start)
        .take(position - start + CONTEXT_RADIUS)
        .collect()
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    connectives: usize,
    policy: Option<&'a Policy>,
    source: Option<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().filter(|t| !t.is(TokenKind::Ws)).collect(),
            index: 0,
            depth: 0,
            connectives: 0,
            policy: None,
            source: None,
        }
    }

    pub fn with_policy(mut self, policy: &'a Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Source text, used to fill the `context` of parse errors.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// Parses the whole token stream.
    pub fn parse(mut self) -> Result<ParseOutcome> {
        let result = self.parse_stream();
        match self.source {
            Some(source) => {
                result.map_err(|e| e.with_context(|position| context_window(source, position)))
            }
            None => result,
        }
    }

    fn parse_stream(&mut self) -> Result<ParseOutcome> {
        self.validate_stream()?;

        if self.check(TokenKind::Eol) {
            return Ok(ParseOutcome { expression: None });
        }

        let expression = self.parse_or()?;
        self.expect(TokenKind::Eol)?;
        Ok(ParseOutcome {
            expression: Some(expression),
        })
    }

    fn validate_stream(&self) -> Result<()> {
        match self.tokens.iter().position(|t| t.is(TokenKind::Eol)) {
            None if self.tokens.is_empty() => {
                Err(AqlError::invalid_input("token stream is empty"))
            }
            None => Err(AqlError::invalid_input("token stream must end with EOL")),
            Some(i) if i + 1 != self.tokens.len() => Err(AqlError::invalid_input(format!(
                "EOL token at index {} is not the last token",
                i
            ))),
            Some(_) => Ok(()),
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if !self.check(kind) {
            return Err(AqlError::expected_token(kind.as_str(), self.current()));
        }
        Ok(self.advance())
    }

    // ========================================
    // Policy checks
    // ========================================

    fn require(
        &self,
        allowed: impl Fn(&Policy) -> bool,
        code: ErrorCode,
        what: &str,
    ) -> Result<()> {
        match self.policy {
            Some(policy) if !allowed(policy) => {
                Err(AqlError::forbidden(code, what, self.current()))
            }
            _ => Ok(()),
        }
    }

    fn require_logical(&self, keyword: LogicalKeyword) -> Result<()> {
        self.require(
            |p| p.allows_logical(keyword),
            ErrorCode::ForbiddenLogicalOperator,
            "Logical operator",
        )
    }

    // ========================================
    // Limits
    // ========================================

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(AqlError::invalid_syntax(self.current(), "expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn count_connective(&mut self) -> Result<()> {
        if self.connectives >= MAX_CONNECTIVES {
            return Err(AqlError::invalid_syntax(self.current(), "too many logical operators"));
        }
        self.connectives += 1;
        Ok(())
    }

    // ========================================
    // Grammar
    // ========================================

    fn parse_or(&mut self) -> Result<Node> {
        let mut left = self.parse_and()?;

        while self.check(TokenKind::Or) {
            self.require_logical(LogicalKeyword::Or)?;
            self.count_connective()?;
            self.advance();
            let right = self.parse_and()?;
            left = Node::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;

        while self.check(TokenKind::And) {
            self.require_logical(LogicalKeyword::And)?;
            self.count_connective()?;
            self.advance();
            let right = self.parse_unary()?;
            left = Node::and(left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node> {
        if self.check(TokenKind::Not) {
            self.require_logical(LogicalKeyword::Not)?;
            self.enter()?;
            self.advance();
            let operand = self.parse_unary()?;
            self.leave();
            return Ok(Node::negate(operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node> {
        match self.current().kind {
            TokenKind::LParen => {
                self.require(
                    |p| p.allow_parentheses,
                    ErrorCode::ForbiddenParentheses,
                    "Parenthesis",
                )?;
                self.enter()?;
                self.advance();
                let expr = self.parse_or()?;
                self.expect(TokenKind::RParen)?;
                self.leave();
                Ok(expr)
            }
            TokenKind::Identifier => self.parse_comparison(),
            TokenKind::Boolean => {
                let token = self.advance();
                Ok(Node::Boolean(parse_boolean(&token)?))
            }
            TokenKind::Eol => Err(AqlError::expected_token(
                TokenKind::Identifier.as_str(),
                self.current(),
            )),
            TokenKind::String | TokenKind::Number | TokenKind::Null | TokenKind::Function => {
                Err(AqlError::invalid_syntax(
                    self.current(),
                    "a value must follow a field and an operator",
                ))
            }
            _ => Err(AqlError::invalid_syntax(
                self.current(),
                "expected a field, NOT or '('",
            )),
        }
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        let path = self.parse_field_path()?;

        let kind = self.current().kind;
        if let Some(op) = CompareOp::from_token(kind) {
            self.require(
                |p| p.allows_operation(op),
                ErrorCode::ForbiddenOperation,
                "Operator",
            )?;
            self.advance();
            let value = self.parse_literal()?;
            return Ok(Node::Comparison { path, op, value });
        }

        if kind == TokenKind::In {
            self.require(|p| p.allow_in, ErrorCode::ForbiddenArrayOperation, "Operator")?;
            self.advance();
            let values = self.parse_array_literal()?;
            return Ok(Node::In { path, values });
        }

        Err(AqlError::expected_operation(self.current()))
    }

    fn parse_field_path(&mut self) -> Result<FieldPath> {
        let token = self.current().clone();
        let name = token.value.clone().unwrap_or_default();

        if !IDENTIFIER.is_match(&name) {
            return Err(AqlError::invalid_identifier(&name, token.position));
        }
        self.require(
            |p| p.allows_identifier(&name),
            ErrorCode::ForbiddenIdentifier,
            "Identifier",
        )?;
        self.advance();

        let mut path = FieldPath::new(name);
        while self.check(TokenKind::LBracket) {
            self.require(
                |p| p.allow_bracket_access,
                ErrorCode::ForbiddenBracketAccess,
                "Bracket access",
            )?;
            self.advance();
            path.accessors.push(self.parse_accessor()?);
            self.expect(TokenKind::RBracket)?;
        }
        Ok(path)
    }

    fn parse_accessor(&mut self) -> Result<Accessor> {
        match self.current().kind {
            TokenKind::String => {
                let token = self.advance();
                Ok(Accessor::Key(string_content(&token)))
            }
            TokenKind::Number => {
                let token = self.advance();
                match parse_number(&token)? {
                    Literal::Integer(n) => Ok(Accessor::Index(n)),
                    Literal::Float(n) => Ok(Accessor::Decimal(n)),
                    _ => Err(AqlError::expected_accessor(&token)),
                }
            }
            _ => Err(AqlError::expected_accessor(self.current())),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let token = self.current().clone();
        let literal = match token.kind {
            TokenKind::String => Literal::String(string_content(&token)),
            TokenKind::Number => parse_number(&token)?,
            TokenKind::Boolean => Literal::Boolean(parse_boolean(&token)?),
            TokenKind::Null => Literal::Null,
            TokenKind::Function => Literal::Function(token.text()),
            _ => return Err(AqlError::expected_value(&token)),
        };

        let value_type = literal.value_type();
        self.require(
            |p| p.allows_value_type(value_type),
            ErrorCode::ForbiddenValueType,
            &format!("Value type {}", value_type.as_str()),
        )?;
        self.advance();
        Ok(literal)
    }

    fn parse_array_literal(&mut self) -> Result<Vec<Literal>> {
        self.expect(TokenKind::LBracket)?;

        let mut values = vec![];
        if self.check(TokenKind::RBracket) {
            self.advance();
            return Ok(values);
        }

        loop {
            values.push(self.parse_literal()?);

            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBracket => {
                    self.advance();
                    return Ok(values);
                }
                _ => return Err(AqlError::expected_token("COMMA or RBRACKET", self.current())),
            }
        }
    }
}

/// String token content without its surrounding quotes.
fn string_content(token: &Token) -> String {
    let raw = token.value.as_deref().unwrap_or_default();
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string()
}

fn parse_number(token: &Token) -> Result<Literal> {
    let raw = token.value.as_deref().unwrap_or_default();

    if !raw.contains('.')
        && let Ok(n) = raw.parse::<i64>()
    {
        return Ok(Literal::Integer(n));
    }

    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Literal::Float(n)),
        _ => Err(AqlError::invalid_syntax(token, "malformed number")),
    }
}

fn parse_boolean(token: &Token) -> Result<bool> {
    match token.value.as_deref().map(str::to_lowercase).as_deref() {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        _ => Err(AqlError::invalid_syntax(token, "malformed boolean")),
    }
}
