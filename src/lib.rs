//! # Lexer Toolkit
//!
//! Building blocks for hand-written lexers and recursive-descent parsers over a
//! byte buffer.
//!
//! ## Overview
//!
//! The crate does not know any grammar. It provides the scanning engine a
//! concrete lexer is written against, and a small helper a concrete parser uses
//! to validate tokens and report mismatches.
//!
//! - **Cursor**: position over an immutable buffer with line/column tracking,
//!   an escape toggle and cheap snapshot/restore
//! - **Scanner**: scanning primitives (read while/until, quoted strings,
//!   backtracking integer and decimal recognition, literal matching)
//! - **Tokenizer**: next/peek/skip token protocol driven by a pluggable
//!   [`Lexer`], with nested views sharing one cursor
//! - **Token**: bit-flag typed lexeme descriptors borrowing the buffer
//! - **Parser**: `check` / `expect` against type masks with named diagnostics
//!
//! The engine is byte oriented: every character is one `u8`.
//!
//! ## Writing a Lexer
//!
//! ```rust
//! use lexer_toolkit::{Lexer, Result, Scanner, ScannerConfig, Token, Tokenizer, WHITESPACE};
//!
//! const NUMBER: u8 = 1 << 0;
//! const WORD: u8 = 1 << 1;
//! const END: u8 = 1 << 2;
//!
//! struct Words;
//!
//! impl<'a> Lexer<'a> for Words {
//!     type Kind = u8;
//!
//!     fn emit_token(&mut self, scanner: &mut Scanner<'a>) -> Result<Token<'a, u8>> {
//!         scanner.discard_while(WHITESPACE);
//!         let at = scanner.position();
//!         if scanner.is_eof() {
//!             return Ok(scanner.token(END, at.offset, at.offset, at));
//!         }
//!         if let Some(end) = scanner.read_integer(WHITESPACE) {
//!             return Ok(scanner.token(NUMBER, at.offset, end, at));
//!         }
//!         let end = scanner.read_until(WHITESPACE);
//!         Ok(scanner.token(WORD, at.offset, end, at))
//!     }
//! }
//!
//! let mut tokens = Tokenizer::from_text("retry 3 times", ScannerConfig::default(), Words);
//! assert_eq!(tokens.next_token()?.data(), "retry");
//! assert!(tokens.peek_token()?.has_type(NUMBER));
//! assert_eq!(tokens.next_token()?.to_integer::<u32>(), Some(3));
//! assert!(tokens.skip_token(WORD)?);
//! assert!(tokens.next_token()?.has_type(END));
//! # Ok::<(), lexer_toolkit::ParseError>(())
//! ```
//!
//! ## Checking Tokens
//!
//! ```rust
//! use lexer_toolkit::{Parser, Position, Token, TokenNameMap, TokenNameTable};
//!
//! struct Names;
//!
//! impl TokenNameTable for Names {
//!     type Kind = u8;
//!
//!     fn token_names(&self) -> TokenNameMap<u8> {
//!         let mut names = TokenNameMap::new();
//!         names.insert(1, "Integer".to_string());
//!         names.insert(2, "String".to_string());
//!         names
//!     }
//! }
//!
//! let parser = Parser::new(Names);
//! let word = Token::new(4u8, b"oops", 0, 4, Position::new());
//! let err = parser.expect(1 | 2, word).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Expected Integer, String, but got unknown token type (raw data: 'oops') [line 1, column 1]"
//! );
//! ```
//!
//! ## Error Handling
//!
//! Running off the end of the buffer during a mandatory advance and token
//! mismatches are reported as [`ParseError`] with line and column. Failing to
//! recognize a numeric literal is not an error: the recognizers return `None`
//! and leave the cursor where the attempt started. Contract violations such as
//! an inverted token range panic.

pub mod config;
pub mod cursor;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod tokenizer;

// Re-export main types
pub use config::ScannerConfig;
pub use cursor::{Cursor, Snapshot, Speculation};
pub use error::{ParseError, Position, Result};
pub use parser::{Parser, TokenNameMap, TokenNameTable};
pub use scanner::{CursorHandle, Scanner, WHITESPACE};
pub use token::{FLOAT_STAGING_LEN, INTEGER_STAGING_LEN, Token, TokenKind};
pub use tokenizer::{Lexer, SavedState, Tokenizer};
