//! Position-tracking cursor over an immutable byte buffer
//!
//! The cursor owns the scan position together with line/column bookkeeping and
//! the escape toggle. Everything is single-byte: a "character" is one `u8`.

use crate::config::ScannerConfig;
use crate::error::{ParseError, Position, Result};
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

/// Value copy of the mutable cursor state
///
/// Restorable onto any cursor built over the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot {
    current: usize,
    line: usize,
    column: usize,
    escaped: bool,
}

impl Snapshot {
    /// Byte offset captured by this snapshot
    pub fn offset(&self) -> usize {
        self.current
    }

    /// Line captured by this snapshot
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column captured by this snapshot
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Scan position over a borrowed buffer
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Input being scanned
    source: &'a [u8],
    /// Current byte offset, `0 <= current <= source.len()`
    current: usize,
    /// Current line number (1-based)
    line: usize,
    /// Current column number (1-based)
    column: usize,
    /// Set after an odd run of escape characters
    escaped: bool,
    config: ScannerConfig,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `source`
    pub fn new(source: &'a [u8], config: ScannerConfig) -> Self {
        Self {
            source,
            current: 0,
            line: 1,
            column: 1,
            escaped: false,
            config,
        }
    }

    /// Creates a cursor over UTF-8 text, scanned byte by byte
    pub fn from_text(source: &'a str, config: ScannerConfig) -> Self {
        Self::new(source.as_bytes(), config)
    }

    /// The scanned buffer
    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// The escape configuration of this session
    #[inline]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Buffer length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns true for an empty buffer
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Current byte offset
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the current position (inlined for performance)
    #[inline(always)]
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.current,
        }
    }

    /// Byte under the cursor, `None` at end of buffer
    #[inline(always)]
    pub fn cur_char(&self) -> Option<u8> {
        self.source.get(self.current).copied()
    }

    /// Byte `offset` positions ahead, `None` at or past end of buffer
    #[inline(always)]
    pub fn look_ahead(&self, offset: usize) -> Option<u8> {
        self.current
            .checked_add(offset)
            .and_then(|at| self.source.get(at))
            .copied()
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.is_eof_at(self.current)
    }

    /// Returns true if `offset` has reached or passed the end of the buffer
    #[inline(always)]
    pub fn is_eof_at(&self, offset: usize) -> bool {
        offset >= self.source.len()
    }

    /// Distance of `pos` from the start of the buffer
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies past the end of the buffer.
    pub fn offset(&self, pos: usize) -> usize {
        assert!(
            pos <= self.source.len(),
            "offset {pos} is outside the {}-byte buffer",
            self.source.len()
        );
        pos
    }

    /// Returns true if the byte under the cursor is escaped
    ///
    /// The toggle alone is not enough: the byte under the cursor must also be
    /// in the escapable set.
    pub fn escaped(&self) -> bool {
        self.escaped
            && self
                .cur_char()
                .is_some_and(|ch| self.config.is_escapable(ch))
    }

    /// Clears the escape toggle
    pub fn reset_escaped(&mut self) {
        self.escaped = false;
    }

    /// Fails with [`ParseError::UnexpectedEof`] at end of buffer
    pub fn error_if_eof(&self) -> Result<()> {
        if self.is_eof() {
            debug!(
                line = self.line,
                column = self.column,
                "advance past end of input"
            );
            return Err(ParseError::UnexpectedEof {
                line: self.line,
                column: self.column,
            });
        }
        Ok(())
    }

    /// Advances past the byte under the cursor
    ///
    /// A newline bumps the line, resets the column and clears the escape
    /// toggle. The escape character flips the toggle, so a doubled escape
    /// cancels out; any other byte clears it.
    pub fn advance(&mut self) -> Result<()> {
        self.error_if_eof()?;
        self.step(self.source[self.current]);
        Ok(())
    }

    /// Advances `n` bytes one at a time
    pub fn advance_by(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.advance()?;
        }
        Ok(())
    }

    /// Advances one byte if there is one and `pred` accepts it
    #[inline]
    pub fn advance_if(&mut self, pred: impl FnOnce(u8) -> bool) -> bool {
        match self.cur_char() {
            Some(ch) if pred(ch) => {
                self.step(ch);
                true
            }
            _ => false,
        }
    }

    /// Advances while `keep` accepts the byte under the cursor
    ///
    /// Stops at end of buffer without error and returns the stop offset.
    #[inline]
    pub fn advance_while(&mut self, mut keep: impl FnMut(u8) -> bool) -> usize {
        while let Some(ch) = self.cur_char() {
            if !keep(ch) {
                break;
            }
            self.step(ch);
        }
        self.current
    }

    /// Bookkeeping for consuming `ch`, the byte under the cursor
    #[inline(always)]
    fn step(&mut self, ch: u8) {
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
            self.escaped = false;
        } else {
            self.column += 1;
            if ch == self.config.escape {
                self.escaped = !self.escaped;
            } else {
                self.escaped = false;
            }
        }
        self.current += 1;
    }

    /// Rewinds to the start of the buffer
    pub fn reset(&mut self) {
        self.current = 0;
        self.line = 1;
        self.column = 1;
        self.escaped = false;
    }

    /// Captures the current state
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current: self.current,
            line: self.line,
            column: self.column,
            escaped: self.escaped,
        }
    }

    /// Restores a state captured by [`Cursor::snapshot`]
    ///
    /// # Panics
    ///
    /// Panics if the snapshot points past the end of this buffer.
    #[inline]
    pub fn restore(&mut self, snapshot: Snapshot) {
        assert!(
            snapshot.current <= self.source.len(),
            "snapshot offset {} is outside the {}-byte buffer",
            snapshot.current,
            self.source.len()
        );
        self.current = snapshot.current;
        self.line = snapshot.line;
        self.column = snapshot.column;
        self.escaped = snapshot.escaped;
    }

    /// Starts a speculative scan that rolls back unless committed
    pub fn speculate(&mut self) -> Speculation<'_, 'a> {
        let snapshot = self.snapshot();
        Speculation {
            cursor: self,
            snapshot,
            committed: false,
        }
    }
}

/// Guard for a speculative scan
///
/// Dereferences to the cursor. Dropping the guard without calling
/// [`Speculation::commit`] restores the state from when it was created,
/// on every exit path including `?` and unwinding.
pub struct Speculation<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
    snapshot: Snapshot,
    committed: bool,
}

impl Speculation<'_, '_> {
    /// Keeps everything consumed since the guard was created
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// State at the start of the speculation
    pub fn start(&self) -> Snapshot {
        self.snapshot
    }
}

impl<'a> Deref for Speculation<'_, 'a> {
    type Target = Cursor<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.cursor
    }
}

impl DerefMut for Speculation<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.cursor
    }
}

impl Drop for Speculation<'_, '_> {
    fn drop(&mut self) {
        if !self.committed {
            trace!(
                from = self.cursor.current,
                to = self.snapshot.current,
                "rolling back speculative scan"
            );
            self.cursor.restore(self.snapshot);
        }
    }
}
