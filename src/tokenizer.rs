//! Token protocol on top of the scanning primitives
//!
//! A concrete lexer implements [`Lexer`]: given the [`Scanner`], classify and
//! consume the next lexeme and return it as a [`Token`]. [`Tokenizer`] pairs a
//! lexer with a scanner and adds peeking, skipping and remainder reading, all
//! built on cursor snapshots.

use crate::config::ScannerConfig;
use crate::cursor::Snapshot;
use crate::error::Result;
use crate::scanner::{CursorHandle, Scanner};
use crate::token::{Token, TokenKind};
use std::borrow::Cow;
use tracing::trace;

/// Grammar-specific token emission
pub trait Lexer<'a> {
    /// Bit-flag token type of the grammar
    type Kind: TokenKind;

    /// Consumes the next lexeme and returns it
    fn emit_token(&mut self, scanner: &mut Scanner<'a>) -> Result<Token<'a, Self::Kind>>;
}

impl<'a, L: Lexer<'a> + ?Sized> Lexer<'a> for &mut L {
    type Kind = L::Kind;

    fn emit_token(&mut self, scanner: &mut Scanner<'a>) -> Result<Token<'a, Self::Kind>> {
        (**self).emit_token(scanner)
    }
}

/// Restores a captured cursor state when dropped
///
/// Used for non-consuming lookahead and for speculative grammar rules. The
/// restore runs on every exit path, including `?` and unwinding, unless
/// [`SavedState::keep`] is called.
///
/// # Panics
///
/// Dropping an armed guard panics if the cursor is still borrowed at that
/// point.
#[must_use = "the state is restored as soon as the guard is dropped"]
pub struct SavedState<'a> {
    cursor: CursorHandle<'a>,
    snapshot: Snapshot,
    armed: bool,
}

impl<'a> SavedState<'a> {
    /// Captures the current state of `cursor`
    pub fn new(cursor: CursorHandle<'a>) -> Self {
        let snapshot = cursor.borrow().snapshot();
        Self {
            cursor,
            snapshot,
            armed: true,
        }
    }

    /// The captured state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Keeps the current state instead of restoring
    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for SavedState<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut cursor = self.cursor.borrow_mut();
        trace!(
            from = cursor.current(),
            to = self.snapshot.offset(),
            "restoring saved scan state"
        );
        cursor.restore(self.snapshot);
    }
}

/// Generic tokenizing engine driven by a [`Lexer`]
pub struct Tokenizer<'a, L> {
    scanner: Scanner<'a>,
    lexer: L,
}

impl<'a, L: Lexer<'a>> Tokenizer<'a, L> {
    /// Creates a tokenizer over `source`
    pub fn new(source: &'a [u8], config: ScannerConfig, lexer: L) -> Self {
        Self::with_scanner(Scanner::new(source, config), lexer)
    }

    /// Creates a tokenizer over UTF-8 text, scanned byte by byte
    pub fn from_text(source: &'a str, config: ScannerConfig, lexer: L) -> Self {
        Self::new(source.as_bytes(), config, lexer)
    }

    /// Drives `lexer` with an existing scanner
    pub fn with_scanner(scanner: Scanner<'a>, lexer: L) -> Self {
        Self { scanner, lexer }
    }

    /// Creates a tokenizer for a sub-grammar over the same cursor
    ///
    /// The returned tokenizer may use a different token type. Both share one
    /// scan position: consuming through either one advances the other.
    pub fn nested<M: Lexer<'a>>(&self, lexer: M) -> Tokenizer<'a, M> {
        trace!(offset = self.scanner.current(), "nested tokenizer view");
        Tokenizer {
            scanner: self.scanner.share(),
            lexer,
        }
    }

    /// Consumes and returns the next token
    pub fn next_token(&mut self) -> Result<Token<'a, L::Kind>> {
        self.lexer.emit_token(&mut self.scanner)
    }

    /// Returns the next token without consuming it
    ///
    /// The scan state after a peek is identical to the state before it, also
    /// when the lexer fails.
    pub fn peek_token(&mut self) -> Result<Token<'a, L::Kind>> {
        let _saved = SavedState::new(self.scanner.handle());
        self.next_token()
    }

    /// Consumes the next token if its type intersects `mask`
    ///
    /// Returns whether a token was consumed.
    pub fn skip_token(&mut self, mask: L::Kind) -> Result<bool> {
        if self.peek_token()?.has_type(mask) {
            self.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consumes the next token whatever its type
    pub fn skip_any_token(&mut self) -> Result<bool> {
        self.skip_token(L::Kind::ALL)
    }

    /// Reads raw text up to a delimiter token
    ///
    /// Consumes tokens until the upcoming token's type intersects `delimiter`
    /// or the buffer ends, and returns the text from the start of the first
    /// consumed token to the end of the last one. Returns an empty string at
    /// end of buffer.
    pub fn read_remainder(&mut self, delimiter: L::Kind) -> Result<Cow<'a, str>> {
        if self.is_eof() {
            return Ok(Cow::Borrowed(""));
        }

        let start = self.peek_token()?.begin();
        let mut end;
        loop {
            end = self.next_token()?.end();
            if self.is_eof() || self.peek_token()?.has_type(delimiter) {
                break;
            }
        }
        Ok(self.scanner.text(start, end.max(start)))
    }

    /// Runs a speculative grammar rule
    ///
    /// The rule's progress is kept only when it returns `Ok(Some(_))`. On
    /// `Ok(None)` or an error the scan state is restored to where the rule
    /// started.
    pub fn speculate<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let saved = SavedState::new(self.scanner.handle());
        let outcome = rule(self)?;
        if outcome.is_some() {
            saved.keep();
        }
        Ok(outcome)
    }
}

impl<'a, L> Tokenizer<'a, L> {
    pub fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut Scanner<'a> {
        &mut self.scanner
    }

    pub fn lexer(&self) -> &L {
        &self.lexer
    }

    pub fn lexer_mut(&mut self) -> &mut L {
        &mut self.lexer
    }

    /// Splits the tokenizer into its scanner and lexer
    pub fn into_parts(self) -> (Scanner<'a>, L) {
        (self.scanner, self.lexer)
    }

    /// Rewinds to the start of the buffer
    pub fn reset(&mut self) {
        self.scanner.reset();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.scanner.snapshot()
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.scanner.restore(snapshot);
    }

    pub fn is_eof(&self) -> bool {
        self.scanner.is_eof()
    }

    pub fn line(&self) -> usize {
        self.scanner.line()
    }

    pub fn column(&self) -> usize {
        self.scanner.column()
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.scanner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanner.is_empty()
    }

    /// Fraction of the buffer consumed so far
    pub fn progress(&self) -> f64 {
        self.scanner.progress()
    }
}
