//! End-to-end tests for a small concrete grammar built on the toolkit
//!
//! The grammar knows integers, decimals, double-quoted strings, bare words and
//! single-character punctuation, with whitespace skipped between tokens.

use lexer_toolkit::{
    Lexer, ParseError, Parser, Result, Scanner, ScannerConfig, Token, TokenKind, TokenNameMap,
    TokenNameTable, Tokenizer, WHITESPACE,
};
use std::ops::{BitAnd, BitOr};

/// Token types of the test grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Kind(u16);

impl Kind {
    const INTEGER: Self = Self(1 << 0);
    const DECIMAL: Self = Self(1 << 1);
    const STRING: Self = Self(1 << 2);
    const WORD: Self = Self(1 << 3);
    const PUNCT: Self = Self(1 << 4);
    const EOF: Self = Self(1 << 5);

    const NUMBER: Self = Self(Self::INTEGER.0 | Self::DECIMAL.0);
}

impl BitAnd for Kind {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Kind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl TokenKind for Kind {
    const NONE: Self = Self(0);
    const ALL: Self = Self(u16::MAX);
}

const DELIMS: &[u8] = b" \t\n\r,;()";
const PUNCT: &[u8] = b",;()";

#[derive(Default)]
struct ConfigLexer {
    emitted: usize,
}

impl<'a> Lexer<'a> for ConfigLexer {
    type Kind = Kind;

    fn emit_token(&mut self, scanner: &mut Scanner<'a>) -> Result<Token<'a, Kind>> {
        self.emitted += 1;
        scanner.discard_while(WHITESPACE);
        let at = scanner.position();

        let Some(ch) = scanner.cur_char() else {
            return Ok(scanner.token(Kind::EOF, at.offset, at.offset, at));
        };
        if ch == b'"' {
            scanner.advance()?;
            let begin = scanner.current();
            let end = scanner.read_quoted_string(b'"', b")")?;
            return Ok(scanner.token(Kind::STRING, begin, end, at));
        }
        if PUNCT.contains(&ch) {
            scanner.advance()?;
            return Ok(scanner.token(Kind::PUNCT, at.offset, at.offset + 1, at));
        }
        if let Some(end) = scanner.read_integer(DELIMS) {
            return Ok(scanner.token(Kind::INTEGER, at.offset, end, at));
        }
        if let Some(end) = scanner.read_decimal(DELIMS) {
            return Ok(scanner.token(Kind::DECIMAL, at.offset, end, at));
        }
        let end = scanner.read_until(DELIMS);
        Ok(scanner.token(Kind::WORD, at.offset, end, at))
    }
}

struct ConfigNames;

impl TokenNameTable for ConfigNames {
    type Kind = Kind;

    fn token_names(&self) -> TokenNameMap<Kind> {
        [
            (Kind::INTEGER, "Integer"),
            (Kind::DECIMAL, "Decimal"),
            (Kind::STRING, "String"),
            (Kind::WORD, "Word"),
            (Kind::PUNCT, "Punctuation"),
            (Kind::EOF, "end of input"),
        ]
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect()
    }
}

fn tokenizer(input: &str) -> Tokenizer<'_, ConfigLexer> {
    Tokenizer::from_text(input, ScannerConfig::default(), ConfigLexer::default())
}

fn collect(input: &str) -> Vec<(Kind, String)> {
    let mut t = tokenizer(input);
    let mut out = Vec::new();
    loop {
        let tok = t.next_token().expect("input should tokenize");
        if tok.has_type(Kind::EOF) {
            return out;
        }
        out.push((tok.kind(), tok.data()));
    }
}

#[test]
fn test_integer_decimal_string_sequence() {
    let input = "42 3.14 \"hi\"";
    let mut t = tokenizer(input);

    let int = t.next_token().unwrap();
    assert_eq!(int.kind(), Kind::INTEGER);
    assert_eq!(int.data(), "42");
    assert_eq!(int.to_integer::<i32>(), Some(42));

    let dec = t.next_token().unwrap();
    assert_eq!(dec.kind(), Kind::DECIMAL);
    assert_eq!(dec.data(), "3.14");
    assert_eq!(dec.to_float::<f64>(), "3.14".parse().ok());

    let string = t.next_token().unwrap();
    assert_eq!(string.kind(), Kind::STRING);
    assert_eq!(string.data(), "hi");
    assert_eq!(string.begin(), 9);
    assert_eq!(string.end(), 11);
    assert_eq!(&input.as_bytes()[string.begin() - 1..string.end() + 1], b"\"hi\"");
    assert_eq!(string.column(), 9);

    assert!(t.next_token().unwrap().has_type(Kind::EOF));
}

#[test]
fn test_mixed_grammar() {
    let tokens = collect("size(-7, +2.5e3, .5) name;\n  path \"C:\\\")");
    let expected = vec![
        (Kind::WORD, "size".to_string()),
        (Kind::PUNCT, "(".to_string()),
        (Kind::INTEGER, "-7".to_string()),
        (Kind::PUNCT, ",".to_string()),
        (Kind::DECIMAL, "+2.5e3".to_string()),
        (Kind::PUNCT, ",".to_string()),
        (Kind::DECIMAL, ".5".to_string()),
        (Kind::PUNCT, ")".to_string()),
        (Kind::WORD, "name".to_string()),
        (Kind::PUNCT, ";".to_string()),
        (Kind::WORD, "path".to_string()),
        (Kind::STRING, "C:\\".to_string()),
        (Kind::PUNCT, ")".to_string()),
    ];
    assert_eq!(tokens, expected);
}

#[test]
fn test_rejected_numbers_fall_back_to_words() {
    let tokens = collect("12x 1.5.5 -x");
    assert_eq!(
        tokens,
        vec![
            (Kind::WORD, "12x".to_string()),
            (Kind::WORD, "1.5.5".to_string()),
            (Kind::WORD, "-x".to_string()),
        ]
    );
}

#[test]
fn test_lone_sign_and_dot_read_as_decimals() {
    let tokens = collect("- , . -.");
    assert_eq!(
        tokens,
        vec![
            (Kind::DECIMAL, "-".to_string()),
            (Kind::PUNCT, ",".to_string()),
            (Kind::DECIMAL, ".".to_string()),
            (Kind::DECIMAL, "-.".to_string()),
        ]
    );

    let mut t = tokenizer("-.");
    let dec = t.next_token().unwrap();
    assert_eq!(dec.kind(), Kind::DECIMAL);
    assert_eq!(dec.to_float::<f64>(), None);
}

#[test]
fn test_bare_exponent_marker_reads_as_decimal() {
    let tokens = collect("1e, 1ex");
    assert_eq!(
        tokens,
        vec![
            (Kind::DECIMAL, "1e".to_string()),
            (Kind::PUNCT, ",".to_string()),
            (Kind::WORD, "1ex".to_string()),
        ]
    );
}

#[test]
fn test_line_and_column_tracking() {
    let mut t = tokenizer("a\n  bb\n\n   ccc");
    let a = t.next_token().unwrap();
    assert_eq!((a.line(), a.column()), (1, 1));
    let b = t.next_token().unwrap();
    assert_eq!((b.line(), b.column()), (2, 3));
    let c = t.next_token().unwrap();
    assert_eq!((c.line(), c.column()), (4, 4));
    assert_eq!(c.position().offset, 11);
}

#[test]
fn test_unterminated_string_reports_position() {
    let mut t = tokenizer("key \"open\nstill open");
    t.next_token().unwrap();
    let err = t.next_token().unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEof { line: 2, column: 11 });
    assert_eq!(
        err.to_string(),
        "unexpected end of input [line 2, column 11]"
    );
}

#[test]
fn test_peek_then_next_matches_next_alone() {
    let input = "alpha 12 \"s\" 4.5 ; omega";
    let mut plain = tokenizer(input);
    let mut peeking = tokenizer(input);
    loop {
        let peeked = peeking.peek_token().unwrap();
        let a = peeking.next_token().unwrap();
        let b = plain.next_token().unwrap();
        assert_eq!(peeked, a);
        assert_eq!(a, b);
        if a.has_type(Kind::EOF) {
            break;
        }
    }
}

#[test]
fn test_peek_calls_lexer_but_keeps_state() {
    let mut t = tokenizer("one two");
    t.peek_token().unwrap();
    t.peek_token().unwrap();
    assert_eq!(t.lexer().emitted, 2);
    assert_eq!(t.next_token().unwrap().data(), "one");
}

#[test]
fn test_read_remainder_to_punctuation() {
    let mut t = tokenizer("echo hello   big world ; rest");
    t.next_token().unwrap();
    assert_eq!(t.read_remainder(Kind::PUNCT).unwrap(), "hello   big world");
    assert!(t.skip_token(Kind::PUNCT).unwrap());
    assert_eq!(t.read_remainder(Kind::PUNCT).unwrap(), "rest");
    assert_eq!(t.read_remainder(Kind::PUNCT).unwrap(), "");
}

#[test]
fn test_read_any_string_through_scanner() {
    let mut t = tokenizer("title  \"Hello, world\" width 80");
    t.next_token().unwrap();
    let title = t.scanner_mut().read_any_string(b" ").unwrap();
    assert_eq!(title, "Hello, world");
    t.next_token().unwrap();
    let width = t.scanner_mut().read_any_string(b" ").unwrap();
    assert_eq!(width, "80");
}

#[test]
fn test_speculative_rule_restores_on_mismatch() {
    let mut t = tokenizer("point 3 4 ; point 3 x");

    fn point(t: &mut Tokenizer<'_, ConfigLexer>) -> Result<Option<(i64, i64)>> {
        if !t.next_token()?.has_type(Kind::WORD) {
            return Ok(None);
        }
        let x = t.next_token()?;
        let y = t.next_token()?;
        if !x.has_type(Kind::INTEGER) || !y.has_type(Kind::INTEGER) {
            return Ok(None);
        }
        Ok(x.to_integer().zip(y.to_integer()))
    }

    assert_eq!(t.speculate(point).unwrap(), Some((3, 4)));
    assert!(t.skip_token(Kind::PUNCT).unwrap());

    let before = t.snapshot();
    assert_eq!(t.speculate(point).unwrap(), None);
    assert_eq!(t.snapshot(), before);
    assert_eq!(t.next_token().unwrap().data(), "point");
}

#[test]
fn test_parser_expect_with_grammar() {
    let parser = Parser::new(ConfigNames);
    let mut t = tokenizer("port = 8080");

    let key = parser.expect(Kind::WORD, t.next_token().unwrap()).unwrap();
    assert_eq!(key.data(), "port");

    let err = parser
        .expect(Kind::NUMBER, t.next_token().unwrap())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected Integer, Decimal, but got Word (raw data: '=') [line 1, column 6]"
    );

    let value = parser.expect(Kind::NUMBER, t.next_token().unwrap()).unwrap();
    assert_eq!(value.to_integer::<u16>(), Some(8080));
    assert!(parser.check(Kind::EOF, &t.next_token().unwrap()));
}

#[test]
fn test_parser_expect_names_integer_and_string() {
    let parser = Parser::new(ConfigNames);
    let mut t = tokenizer("(");
    let err = parser
        .expect(Kind::INTEGER | Kind::STRING, t.next_token().unwrap())
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Integer"));
    assert!(message.contains("String"));
    assert!(message.contains("Punctuation"));
}

#[test]
fn test_parser_expect_named_literal() {
    let parser = Parser::new(ConfigNames);
    let mut t = tokenizer("\n  42");
    let tok = t.next_token().unwrap();
    let err = parser.expect_named("identifier", &tok);
    assert_eq!(
        err.to_string(),
        "Expected identifier, but got Integer (raw data: '42') [line 2, column 3]"
    );
}

#[test]
fn test_custom_escape_configuration() {
    let config = ScannerConfig::new("\"%", b'%');
    let mut t = Tokenizer::from_text("\"100%\" done\" next", config, ConfigLexer::default());
    let string = t.next_token().unwrap();
    assert_eq!(string.data(), "100%\" done");
    assert_eq!(t.scanner().unescape(&string.data()), "100\" done");
}
