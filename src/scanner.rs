//! Scanning primitives over a shared cursor
//!
//! A [`Scanner`] is a view onto a [`Cursor`] held behind a reference-counted
//! handle. Several scanners may share one handle (see [`Scanner::share`]);
//! advancing through any of them moves all of them.

use crate::config::ScannerConfig;
use crate::cursor::{Cursor, Snapshot, Speculation};
use crate::error::{Position, Result};
use crate::token::{Token, TokenKind};
use std::borrow::Cow;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::trace;

/// Whitespace skipped by [`Scanner::read_any_string`]
pub const WHITESPACE: &[u8] = b" \t\n\r";

/// Shared ownership handle to a cursor
pub type CursorHandle<'a> = Rc<RefCell<Cursor<'a>>>;

/// Generic scanning engine over a byte buffer
#[derive(Debug)]
pub struct Scanner<'a> {
    source: &'a [u8],
    cursor: CursorHandle<'a>,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner with a fresh cursor over `source`
    pub fn new(source: &'a [u8], config: ScannerConfig) -> Self {
        Self::from_cursor(Cursor::new(source, config))
    }

    /// Creates a scanner over UTF-8 text, scanned byte by byte
    pub fn from_text(source: &'a str, config: ScannerConfig) -> Self {
        Self::new(source.as_bytes(), config)
    }

    /// Wraps an existing cursor
    pub fn from_cursor(cursor: Cursor<'a>) -> Self {
        Self {
            source: cursor.source(),
            cursor: Rc::new(RefCell::new(cursor)),
        }
    }

    /// Creates a view onto an existing shared cursor
    pub fn from_handle(cursor: CursorHandle<'a>) -> Self {
        let source = cursor.borrow().source();
        Self { source, cursor }
    }

    /// Returns a second scanner over the same cursor
    ///
    /// Both views observe and mutate one scan position.
    pub fn share(&self) -> Self {
        Self {
            source: self.source,
            cursor: Rc::clone(&self.cursor),
        }
    }

    /// The shared cursor handle
    pub fn handle(&self) -> CursorHandle<'a> {
        Rc::clone(&self.cursor)
    }

    /// Borrows the cursor
    ///
    /// # Panics
    ///
    /// Panics if the cursor is currently mutably borrowed.
    pub fn cursor(&self) -> Ref<'_, Cursor<'a>> {
        self.cursor.borrow()
    }

    /// Mutably borrows the cursor
    ///
    /// # Panics
    ///
    /// Panics if the cursor is currently borrowed.
    pub fn cursor_mut(&mut self) -> RefMut<'_, Cursor<'a>> {
        self.cursor.borrow_mut()
    }

    /// The scanned buffer
    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Buffer length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.cursor.borrow().is_eof()
    }

    /// Current byte offset
    #[inline]
    pub fn current(&self) -> usize {
        self.cursor.borrow().current()
    }

    #[inline]
    pub fn line(&self) -> usize {
        self.cursor.borrow().line()
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.cursor.borrow().column()
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.cursor.borrow().position()
    }

    /// Distance of `pos` from the start of the buffer
    pub fn offset(&self, pos: usize) -> usize {
        self.cursor.borrow().offset(pos)
    }

    /// Byte under the cursor, `None` at end of buffer
    #[inline]
    pub fn cur_char(&self) -> Option<u8> {
        self.cursor.borrow().cur_char()
    }

    #[inline]
    pub fn look_ahead(&self, offset: usize) -> Option<u8> {
        self.cursor.borrow().look_ahead(offset)
    }

    /// Returns true if the byte under the cursor is escaped
    pub fn is_escaped(&self) -> bool {
        self.cursor.borrow().escaped()
    }

    pub fn advance(&mut self) -> Result<()> {
        self.cursor.borrow_mut().advance()
    }

    pub fn advance_by(&mut self, n: usize) -> Result<()> {
        self.cursor.borrow_mut().advance_by(n)
    }

    /// Fails with an end-of-input error at end of buffer
    pub fn error_if_eof(&self) -> Result<()> {
        self.cursor.borrow().error_if_eof()
    }

    /// Rewinds to the start of the buffer
    pub fn reset(&mut self) {
        self.cursor.borrow_mut().reset();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cursor.borrow().snapshot()
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.cursor.borrow_mut().restore(snapshot);
    }

    /// Fraction of the buffer consumed so far, `0.0` for an empty buffer
    pub fn progress(&self) -> f64 {
        if self.source.is_empty() {
            return 0.0;
        }
        self.current() as f64 / self.source.len() as f64
    }

    /// Raw text of `source[begin..end]`, borrowed when it is valid UTF-8
    pub fn text(&self, begin: usize, end: usize) -> Cow<'a, str> {
        String::from_utf8_lossy(&self.source[begin..end])
    }

    /// Builds a token over `source[begin..end]` reported at `at`
    pub fn token<K: TokenKind>(&self, kind: K, begin: usize, end: usize, at: Position) -> Token<'a, K> {
        Token::new(kind, self.source, begin, end, at)
    }

    #[inline]
    pub fn is_digit(ch: u8) -> bool {
        ch.is_ascii_digit()
    }

    #[inline]
    pub fn is_letter(ch: u8) -> bool {
        ch.is_ascii_alphabetic()
    }

    #[inline]
    pub fn is_whitespace(ch: u8) -> bool {
        Self::is_any_of(ch, WHITESPACE)
    }

    #[inline]
    pub fn is_any_of(ch: u8, set: &[u8]) -> bool {
        set.contains(&ch)
    }

    /// Consumes bytes until one in `delims` or end of buffer; returns the stop offset
    pub fn read_until(&mut self, delims: &[u8]) -> usize {
        self.cursor
            .borrow_mut()
            .advance_while(|ch| !delims.contains(&ch))
    }

    /// Consumes bytes while they are in `allowed`; returns the stop offset
    pub fn read_while(&mut self, allowed: &[u8]) -> usize {
        self.cursor
            .borrow_mut()
            .advance_while(|ch| allowed.contains(&ch))
    }

    /// Same as [`Scanner::read_until`], for text the caller does not keep
    pub fn discard_until(&mut self, delims: &[u8]) -> usize {
        self.read_until(delims)
    }

    /// Same as [`Scanner::read_while`], for text the caller does not keep
    pub fn discard_while(&mut self, allowed: &[u8]) -> usize {
        self.read_while(allowed)
    }

    /// Returns true if the upcoming bytes equal `pattern` and the cursor is
    /// not on an escaped byte
    pub fn matches_pattern(&self, pattern: &[u8]) -> bool {
        matches_at_cursor(&self.cursor.borrow(), pattern)
    }

    /// Advances until `pattern` matches or the buffer ends; returns the stop offset
    ///
    /// An empty pattern matches nowhere and does not advance.
    pub fn discard_until_pattern(&mut self, pattern: &[u8]) -> usize {
        let mut cursor = self.cursor.borrow_mut();
        if pattern.is_empty() {
            return cursor.current();
        }
        while !cursor.is_eof() && !matches_at_cursor(&cursor, pattern) {
            cursor.advance_if(|_| true);
        }
        cursor.current()
    }

    /// Advances past `literal` if the upcoming bytes equal it
    ///
    /// Returns the new offset, or `None` without advancing on mismatch.
    pub fn discard(&mut self, literal: &[u8]) -> Option<usize> {
        let mut cursor = self.cursor.borrow_mut();
        let matches = literal
            .iter()
            .enumerate()
            .all(|(i, &expected)| cursor.look_ahead(i) == Some(expected));
        if !matches {
            return None;
        }
        cursor.advance_by(literal.len()).ok()?;
        Some(cursor.current())
    }

    /// Attempts an integer literal: optional sign, then one or more digits
    ///
    /// The literal must be followed by end of buffer or a byte in `delims`.
    /// Returns the end offset on success. Otherwise the cursor is restored to
    /// where the attempt began and `None` is returned.
    pub fn read_integer(&mut self, delims: &[u8]) -> Option<usize> {
        let mut cursor = self.cursor.borrow_mut();
        if !cursor
            .cur_char()
            .is_some_and(|ch| is_sign(ch) || ch.is_ascii_digit())
        {
            return None;
        }

        let mut attempt = cursor.speculate();
        attempt.advance_if(is_sign);
        let digits_start = attempt.current();
        if attempt.advance_while(|ch| ch.is_ascii_digit()) == digits_start {
            trace!(offset = attempt.start().offset(), "integer literal has no digits");
            return None;
        }
        accept_literal(attempt, delims, "integer")
    }

    /// Attempts a decimal literal
    ///
    /// Grammar: optional sign and integer digits, optional `.` and fraction
    /// digits, optional `e` exponent with optional sign and digits. Every part
    /// is optional, so a lone sign or `.` before a delimiter is accepted; such
    /// lexemes do not convert with [`Token::to_float`]. Once an `e` is seen it
    /// is consumed even when no exponent digits follow, so `1e` followed by a
    /// delimiter is accepted. Termination and rollback behave as in
    /// [`Scanner::read_integer`].
    pub fn read_decimal(&mut self, delims: &[u8]) -> Option<usize> {
        let mut cursor = self.cursor.borrow_mut();
        if !cursor
            .cur_char()
            .is_some_and(|ch| is_sign(ch) || ch == b'.' || ch.is_ascii_digit())
        {
            return None;
        }

        let mut attempt = cursor.speculate();
        if attempt.cur_char() != Some(b'.') {
            attempt.advance_if(is_sign);
            read_digits(&mut attempt);
        }
        if attempt.advance_if(|ch| ch == b'.') {
            read_digits(&mut attempt);
        }
        if attempt.advance_if(|ch| ch == b'e')
            && attempt.advance_if(|ch| is_sign(ch) || ch.is_ascii_digit())
        {
            read_digits(&mut attempt);
        }
        accept_literal(attempt, delims, "decimal")
    }

    /// Scans to the closing `delim` of a quoted string
    ///
    /// The cursor must already be past the opening quote. Stops at the first
    /// `delim` that is not escaped, consumes it and returns the offset of the
    /// closing delimiter (the end of the content).
    ///
    /// When `hack_delims` is non-empty, an escaped `"` directly followed by
    /// one of `hack_delims` is taken as the closing quote. This keeps content
    /// such as a path ending in a backslash (`"C:\"`) from swallowing the
    /// structural delimiter after it.
    ///
    /// Running off the end of the buffer is an error.
    pub fn read_quoted_string(&mut self, delim: u8, hack_delims: &[u8]) -> Result<usize> {
        let mut cursor = self.cursor.borrow_mut();
        while let Some(ch) = cursor.cur_char() {
            if ch == delim && !cursor.escaped() {
                break;
            }
            if !hack_delims.is_empty()
                && ch == b'"'
                && cursor.escaped()
                && cursor
                    .look_ahead(1)
                    .is_some_and(|next| hack_delims.contains(&next))
            {
                trace!(offset = cursor.current(), "escaped quote closes string");
                cursor.reset_escaped();
                break;
            }
            cursor.advance()?;
        }
        cursor.error_if_eof()?;
        let end = cursor.current();
        cursor.advance()?;
        Ok(end)
    }

    /// Reads a quoted or bare string
    ///
    /// Leading whitespace is skipped. A string starting with `"` is read up to
    /// its closing quote and returned without the quotes; anything else runs
    /// until a byte in `delims` or end of buffer.
    pub fn read_any_string(&mut self, delims: &[u8]) -> Result<Cow<'a, str>> {
        self.discard_while(WHITESPACE);
        if self.cur_char() == Some(b'"') {
            self.advance()?;
            let start = self.current();
            let end = self.read_quoted_string(b'"', b"")?;
            return Ok(self.text(start, end));
        }
        let start = self.current();
        let end = self.read_until(delims);
        Ok(self.text(start, end))
    }

    /// Removes escape characters in front of escapable characters
    ///
    /// An escape in front of anything else, and a trailing escape, are kept.
    pub fn unescape(&self, text: &str) -> String {
        let cursor = self.cursor.borrow();
        let config = cursor.config();
        let mut out = Vec::with_capacity(text.len());
        let mut pending = false;
        for &ch in text.as_bytes() {
            if pending {
                if !config.is_escapable(ch) {
                    out.push(config.escape);
                }
                out.push(ch);
                pending = false;
            } else if ch == config.escape {
                pending = true;
            } else {
                out.push(ch);
            }
        }
        if pending {
            out.push(config.escape);
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

#[inline]
fn is_sign(ch: u8) -> bool {
    ch == b'+' || ch == b'-'
}

fn read_digits(cursor: &mut Cursor<'_>) {
    cursor.advance_while(|ch| ch.is_ascii_digit());
}

fn matches_at_cursor(cursor: &Cursor<'_>, pattern: &[u8]) -> bool {
    if pattern.is_empty() || cursor.escaped() {
        return false;
    }
    pattern
        .iter()
        .enumerate()
        .all(|(i, &expected)| cursor.look_ahead(i) == Some(expected))
}

/// Commits a numeric attempt if it ends at a delimiter or end of buffer
fn accept_literal(attempt: Speculation<'_, '_>, delims: &[u8], what: &str) -> Option<usize> {
    match attempt.cur_char() {
        Some(ch) if !delims.contains(&ch) => {
            trace!(
                offset = attempt.start().offset(),
                terminator = ch,
                "{what} literal rejected"
            );
            None
        }
        _ => {
            let end = attempt.current();
            attempt.commit();
            Some(end)
        }
    }
}
