//! Tokenizer for AQL input.
//!
//! The lexer turns raw query text into a flat list of positioned [`Token`]s
//! terminated by a single [`TokenKind::Eol`]. It knows nothing about the
//! grammar. Positions are zero-based character offsets.

use crate::{
    ast::{Token, TokenKind},
    error::{AqlError, Result},
};

/// Tokenizes `input` in one pass.
///
/// ```
/// use aql::{tokenize, TokenKind};
///
/// let tokens = tokenize(r#"status = "passed""#).unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenKind::Identifier, TokenKind::Eq, TokenKind::String, TokenKind::Eol]);
/// assert_eq!(tokens[3].position, 17);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Consumes the whole input. Restarts from the beginning when called again.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        self.position = 0;
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::Ws => continue,
                TokenKind::Eol => {
                    tokens.push(token);
                    return Ok(tokens);
                }
                _ => tokens.push(token),
            }
        }
    }

    fn is_whitespace(ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{000C}')
    }

    fn is_identifier_char(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn read_whitespace(&mut self) -> Token {
        let start = self.position;
        while self.current_char().is_some_and(Self::is_whitespace) {
            self.advance();
        }
        Token::bare(TokenKind::Ws, start)
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_identifier_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_word(&mut self) -> Token {
        let start = self.position;
        let word = self.read_identifier();

        let kind = match word.to_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "is" => TokenKind::Eq,
            "true" | "false" => TokenKind::Boolean,
            "null" | "empty" => TokenKind::Null,
            _ if self.current_char() == Some('(') && self.peek_char(1) == Some(')') => {
                self.advance();
                self.advance();
                return Token::new(TokenKind::Function, Some(format!("{}()", word)), start);
            }
            _ => TokenKind::Identifier,
        };

        Token::new(kind, Some(word), start)
    }

    fn read_string(&mut self) -> Result<Token> {
        let start = self.position;
        let mut result = String::from('"');
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    result.push('"');
                    return Ok(Token::new(TokenKind::String, Some(result), start));
                }
                '\\' => {
                    let escape_start = self.position;
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('u') => {
                            self.advance();
                            let decoded = self.read_unicode_escape(escape_start)?;
                            result.push(decoded);
                            continue;
                        }
                        Some(other) => result.push(other),
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(AqlError::unterminated_string(start))
    }

    /// Reads the four hex digits after `\u`. The cursor sits on the first digit.
    fn read_hex_unit(&mut self, escape_start: usize) -> Result<u32> {
        let digits: String = (0..4).filter_map(|i| self.peek_char(i)).collect();
        let valid = digits.chars().count() == 4 && digits.chars().all(|c| c.is_ascii_hexdigit());

        if !valid {
            return Err(AqlError::invalid_unicode_escape(format!("\\u{}", digits), escape_start));
        }

        self.position += 4;
        u32::from_str_radix(&digits, 16)
            .map_err(|_| AqlError::invalid_unicode_escape(format!("\\u{}", digits), escape_start))
    }

    fn read_unicode_escape(&mut self, escape_start: usize) -> Result<char> {
        let unit = self.read_hex_unit(escape_start)?;

        match unit {
            0xD800..=0xDBFF => {
                // Pair with a directly following low surrogate escape.
                if self.current_char() == Some('\\') && self.peek_char(1) == Some('u') {
                    let low_start = self.position;
                    self.position += 2;
                    match self.read_hex_unit(low_start)? {
                        low @ 0xDC00..=0xDFFF => {
                            let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                            let decoded = char::from_u32(scalar);
                            return Ok(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
                        }
                        _ => self.position = low_start,
                    }
                }
                Ok(char::REPLACEMENT_CHARACTER)
            }
            _ => Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        let mut is_float = false;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::Number, Some(number), start)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let token = Token::bare(kind, self.position);
        self.advance();
        token
    }

    fn double(&mut self, kind: TokenKind) -> Token {
        let token = Token::bare(kind, self.position);
        self.advance();
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<Token> {
        let token = match self.current_char() {
            None => Token::bare(TokenKind::Eol, self.position),
            Some(ch) if Self::is_whitespace(ch) => self.read_whitespace(),
            Some('>') if self.peek_char(1) == Some('=') => self.double(TokenKind::Ge),
            Some('<') if self.peek_char(1) == Some('=') => self.double(TokenKind::Le),
            Some('!') if self.peek_char(1) == Some('=') => self.double(TokenKind::Neq),
            Some('~') if self.peek_char(1) == Some('=') => self.double(TokenKind::Contains),
            Some('>') => self.single(TokenKind::Gt),
            Some('<') => self.single(TokenKind::Lt),
            Some('=') => self.single(TokenKind::Eq),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some('[') => self.single(TokenKind::LBracket),
            Some(']') => self.single(TokenKind::RBracket),
            Some(',') => self.single(TokenKind::Comma),
            Some('"') => self.read_string()?,
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if Self::is_identifier_char(ch) => self.read_word(),
            Some(ch) => return Err(AqlError::unexpected_character(ch, self.position)),
        };
        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let tokens = tokenize("and OR Not in IS true FALSE null Empty").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::In,
            TokenKind::Eq,
            TokenKind::Boolean,
            TokenKind::Boolean,
            TokenKind::Null,
            TokenKind::Null,
            TokenKind::Eol,
        ]
    );
    assert_eq!(tokens[2].value.as_deref(), Some("Not"));
}

#[test]
fn test_comparison() {
    let tokens = tokenize("age>=25").unwrap();
    assert_eq!(tokens[0], Token::new(TokenKind::Identifier, Some("age".into()), 0));
    assert_eq!(tokens[1], Token::bare(TokenKind::Ge, 3));
    assert_eq!(tokens[2], Token::new(TokenKind::Number, Some("25".into()), 5));
    assert_eq!(tokens[3], Token::bare(TokenKind::Eol, 7));
}

#[test]
fn test_reuse_restarts() {
    let mut lexer = Lexer::new("a = 1");
    let first = lexer.tokenize().unwrap();
    let second = lexer.tokenize().unwrap();
    assert_eq!(first, second);
}
