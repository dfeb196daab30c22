use std::fmt;

use serde::Serialize;

/// Lexical token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Comparison
    /// Greater than or equal (`>=`)
    Ge,
    /// Less than or equal (`<=`)
    Le,
    /// Not equal (`!=`)
    Neq,
    /// Substring match (`~=`)
    Contains,
    /// Greater than (`>`)
    Gt,
    /// Less than (`<`)
    Lt,
    /// Equal (`=` or the `is` keyword)
    Eq,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    // Literals
    /// Double-quoted string; the token value keeps its quotes
    ///
    /// # Examples
    /// ```text
    /// "passed"
    /// "line\nbreak"
    /// ```
    String,

    /// Integer or decimal number, optionally negative
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3.14
    /// ```
    Number,

    /// `true` or `false`, case-insensitive
    Boolean,

    /// `null` or `empty`, case-insensitive
    Null,

    // Names
    /// Field name, ASCII letters and underscores only
    Identifier,

    /// Context function reference, value is `name()`
    ///
    /// # Examples
    /// ```text
    /// now()
    /// current_user()
    /// ```
    Function,

    // Keywords
    And,
    Or,
    Not,
    In,

    /// Whitespace, never returned by the tokenizer
    Ws,

    /// End of input
    Eol,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Ge => "GE",
            TokenKind::Le => "LE",
            TokenKind::Neq => "NEQ",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::Eq => "EQ",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Null => "NULL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Function => "FUNCTION",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::In => "IN",
            TokenKind::Ws => "WS",
            TokenKind::Eol => "EOL",
        }
    }

    /// Source spelling for kinds that have exactly one.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            TokenKind::Ge => Some(">="),
            TokenKind::Le => Some("<="),
            TokenKind::Neq => Some("!="),
            TokenKind::Contains => Some("~="),
            TokenKind::Gt => Some(">"),
            TokenKind::Lt => Some("<"),
            TokenKind::LParen => Some("("),
            TokenKind::RParen => Some(")"),
            TokenKind::LBracket => Some("["),
            TokenKind::RBracket => Some("]"),
            TokenKind::Comma => Some(","),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, positioned lexical unit.
///
/// `position` is the zero-based character offset of the token's first
/// character. The trailing [`TokenKind::Eol`] token sits at the input length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: Option<String>, position: usize) -> Self {
        Token {
            kind,
            value,
            position,
        }
    }

    /// Token without a value, for punctuation and operators.
    pub fn bare(kind: TokenKind, position: usize) -> Self {
        Token::new(kind, None, position)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Text of the token as it would appear in the source.
    pub fn text(&self) -> String {
        match (&self.value, self.kind.symbol()) {
            (Some(value), _) => value.clone(),
            (None, Some(symbol)) => symbol.to_string(),
            (None, None) => match self.kind {
                TokenKind::Eq => "=".to_string(),
                TokenKind::Eol => String::new(),
                kind => kind.as_str().to_lowercase(),
            },
        }
    }

    /// Short description used in error messages, e.g. `STRING "x"` or `EOL`.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eol => "EOL".to_string(),
            kind => format!("{} '{}'", kind, self.text()),
        }
    }
}
