// tests/lexer_tests.rs

use aql::ast::{Token, TokenKind};
use aql::lexer::{Lexer, tokenize};
use aql::{ErrorCode, Phase};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn single(input: &str) -> Token {
    let tokens = tokenize(input).unwrap();
    assert_eq!(tokens.len(), 2, "Expected one token plus EOL for: {}", input);
    tokens.into_iter().next().unwrap()
}

// ============================================================================
// Operators and punctuation
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        (">", TokenKind::Gt),
        ("<", TokenKind::Lt),
        ("=", TokenKind::Eq),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        (",", TokenKind::Comma),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.position, 0);
        assert_eq!(token.value, None);
    }
}

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        (">=", TokenKind::Ge),
        ("<=", TokenKind::Le),
        ("!=", TokenKind::Neq),
        ("~=", TokenKind::Contains),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input).kind, expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_two_char_vs_single_char() {
    assert_eq!(kinds("> ="), vec![TokenKind::Gt, TokenKind::Eq, TokenKind::Eol]);
    assert_eq!(kinds(">=="), vec![TokenKind::Ge, TokenKind::Eq, TokenKind::Eol]);
    assert_eq!(kinds("<<="), vec![TokenKind::Lt, TokenKind::Le, TokenKind::Eol]);
}

#[test]
fn test_lone_bang_and_tilde_are_invalid() {
    for input in ["!", "~", "a ! b"] {
        let err = tokenize(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnexpectedCharacter, "Failed for input: {}", input);
    }
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords_any_case() {
    let test_cases = vec![
        ("and", TokenKind::And),
        ("AND", TokenKind::And),
        ("Or", TokenKind::Or),
        ("nOt", TokenKind::Not),
        ("IN", TokenKind::In),
        ("is", TokenKind::Eq),
        ("IS", TokenKind::Eq),
        ("true", TokenKind::Boolean),
        ("False", TokenKind::Boolean),
        ("null", TokenKind::Null),
        ("EMPTY", TokenKind::Null),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.value.as_deref(), Some(input));
    }
}

#[test]
fn test_keywords_vs_identifiers() {
    // Keywords only match whole words
    let test_cases = vec![
        "android", "and_item", "_and", "or_gate", "order", "truth", "nullable", "isolated",
        "inner", "empty_set",
    ];

    for input in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Identifier, "Failed for input: {}", input);
        assert_eq!(token.value.as_deref(), Some(input));
    }
}

// ============================================================================
// Identifiers and functions
// ============================================================================

#[test]
fn test_identifiers() {
    for input in ["x", "status", "snake_case", "camelCase", "_private", "__dunder__"] {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.value.as_deref(), Some(input));
    }
}

#[test]
fn test_identifiers_stop_at_digits() {
    let tokens = tokenize("field1").unwrap();
    assert_eq!(tokens[0].value.as_deref(), Some("field"));
    assert_eq!(tokens[1].kind, TokenKind::Number);
    assert_eq!(tokens[1].value.as_deref(), Some("1"));
    assert_eq!(tokens[1].position, 5);
}

#[test]
fn test_non_ascii_letters_are_not_identifiers() {
    let err = tokenize("café = 1").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedCharacter);
    assert_eq!(err.details().character.as_deref(), Some("é"));
    assert_eq!(err.position(), Some(3));

    let err = tokenize("名前 = 1").unwrap_err();
    assert_eq!(err.position(), Some(0));
}

#[test]
fn test_function_tokens() {
    let token = single("now()");
    assert_eq!(token.kind, TokenKind::Function);
    assert_eq!(token.value.as_deref(), Some("now()"));

    // Whitespace breaks the call form
    assert_eq!(
        kinds("now ()"),
        vec![TokenKind::Identifier, TokenKind::LParen, TokenKind::RParen, TokenKind::Eol]
    );
    // Arguments are not part of the language
    assert_eq!(
        kinds("now(1)"),
        vec![
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::Eol
        ]
    );
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    let test_cases = vec!["0", "42", "123456", "3.14", "-1", "-3.14", "0.5"];

    for input in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Number, "Failed for input: {}", input);
        assert_eq!(token.value.as_deref(), Some(input));
    }
}

#[test]
fn test_lone_minus_is_invalid() {
    let err = tokenize("a = -").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedCharacter);
    assert_eq!(err.details().character.as_deref(), Some("-"));
    assert_eq!(err.position(), Some(4));

    assert!(tokenize("a = - 1").is_err());
}

#[test]
fn test_trailing_dot_is_not_part_of_number() {
    let err = tokenize("1.").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedCharacter);
    assert_eq!(err.position(), Some(1));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_keeps_quotes() {
    let token = single(r#""passed""#);
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.value.as_deref(), Some(r#""passed""#));
}

#[test]
fn test_string_escapes() {
    let test_cases = vec![
        (r#""a\nb""#, "\"a\nb\""),
        (r#""a\tb""#, "\"a\tb\""),
        (r#""a\rb""#, "\"a\rb\""),
        (r#""a\\b""#, "\"a\\b\""),
        (r#""a\"b""#, "\"a\"b\""),
        (r#""\q""#, "\"q\""),
        (r#""café""#, "\"café\""),
        (r#""😀""#, "\"😀\""),
        (r#""\uD83D!""#, "\"\u{FFFD}!\""),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input).value.as_deref(), Some(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_surrogate_pairs() {
    let test_cases = vec![
        (r#""\uD83D\uDE00""#, "\"😀\""),
        (r#""\uD83D\u0041""#, "\"\u{FFFD}A\""),
        (r#""\uDE00\uD83D""#, "\"\u{FFFD}\u{FFFD}\""),
        (r#""\u00e9""#, "\"é\""),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input).value.as_deref(), Some(expected), "Failed for input: {}", input);
    }

    // A malformed low half is an error at its own backslash
    let err = tokenize(r#""\uD83D\uZZ""#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidUnicodeEscape);
    assert_eq!(err.position(), Some(7));
}

#[test]
fn test_string_content_is_inert() {
    let token = single(r#""a AND (b] >= c, not in""#);
    assert_eq!(token.kind, TokenKind::String);
}

#[test]
fn test_string_accepts_any_unicode() {
    let tokens = tokenize(r#"name = "日本 ✓ émoji 🎉""#).unwrap();
    assert_eq!(tokens[2].value.as_deref(), Some(r#""日本 ✓ émoji 🎉""#));
}

#[test]
fn test_unterminated_string() {
    let err = tokenize(r#"status = "unterminated"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnterminatedString);
    assert_eq!(err.phase(), Phase::Tokenizer);
    assert_eq!(err.position(), Some(9));

    // A trailing backslash escapes nothing
    let err = tokenize(r#""abc\"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnterminatedString);
    assert_eq!(err.position(), Some(0));
}

#[test]
fn test_invalid_unicode_escape() {
    let test_cases = vec![(r#""\u12G4""#, 1), (r#""ab\u12""#, 3), (r#"x = "\u""#, 5)];

    for (input, position) in test_cases {
        let err = tokenize(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUnicodeEscape, "Failed for input: {}", input);
        assert_eq!(err.position(), Some(position), "Failed for input: {}", input);
    }
}

// ============================================================================
// Positions and whitespace
// ============================================================================

#[test]
fn test_positions() {
    let tokens = tokenize(r#"name = "日本" AND x = 1"#).unwrap();
    let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![0, 5, 7, 12, 16, 18, 20, 21]);
}

#[test]
fn test_whitespace_is_skipped() {
    assert_eq!(
        kinds(" \t\r\n\x0C a \n= 1 "),
        vec![TokenKind::Identifier, TokenKind::Eq, TokenKind::Number, TokenKind::Eol]
    );
    assert!(tokenize("a\u{00A0}= 1").is_err());
}

#[test]
fn test_empty_input() {
    assert_eq!(tokenize("").unwrap(), vec![Token::bare(TokenKind::Eol, 0)]);
    assert_eq!(tokenize("   ").unwrap(), vec![Token::bare(TokenKind::Eol, 3)]);
}

#[test]
fn test_unexpected_character() {
    let err = Lexer::new(r#"status @ "passed""#).tokenize().unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedCharacter);
    assert_eq!(err.details().character.as_deref(), Some("@"));
    assert_eq!(err.position(), Some(7));
    assert!(err.message().contains('@'));
    assert!(err.message().contains('7'));
}
