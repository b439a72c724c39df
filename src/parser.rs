//! Grammar-agnostic helpers for recursive-descent parsers
//!
//! [`Parser`] validates token types against expected masks and renders
//! "Expected ..., but got ..." diagnostics using a name table supplied by the
//! concrete grammar.

use crate::error::{ParseError, Result};
use crate::token::{Token, TokenKind};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::cell::OnceCell;
use tracing::trace;

/// Display names keyed by token type
pub type TokenNameMap<K> = IndexMap<K, String>;

/// Name table of a concrete grammar
pub trait TokenNameTable {
    /// Bit-flag token type of the grammar
    type Kind: TokenKind;

    /// Maps each distinct token type to a display name
    fn token_names(&self) -> TokenNameMap<Self::Kind>;
}

/// Token checking helper for a concrete parser
///
/// The name table is requested once, on the first diagnostic that needs it,
/// and cached for the lifetime of the helper.
pub struct Parser<N: TokenNameTable> {
    table: N,
    names: OnceCell<TokenNameMap<N::Kind>>,
}

impl<N: TokenNameTable> Parser<N> {
    /// Creates a helper around a name table
    pub fn new(table: N) -> Self {
        Self {
            table,
            names: OnceCell::new(),
        }
    }

    /// The grammar's name table
    pub fn table(&self) -> &N {
        &self.table
    }

    /// Returns true if the token type intersects `mask`
    #[inline]
    pub fn check(&self, mask: N::Kind, token: &Token<'_, N::Kind>) -> bool {
        token.has_type(mask)
    }

    /// Returns the token if its type intersects `mask`
    ///
    /// Otherwise fails with an error at the token's line and column naming
    /// every expected type and the actual one.
    pub fn expect<'a>(&self, mask: N::Kind, token: Token<'a, N::Kind>) -> Result<Token<'a, N::Kind>> {
        if self.check(mask, &token) {
            return Ok(token);
        }
        Err(self.expect_named(&self.token_name(mask), &token))
    }

    /// Form of [`Parser::expect`] that names the expectation directly
    ///
    /// Performs no type check and always produces the mismatch error, so a
    /// caller that already knows the token is wrong writes
    /// `return Err(parser.expect_named("closing brace", &token))`.
    pub fn expect_named(&self, expected: &str, token: &Token<'_, N::Kind>) -> ParseError {
        ParseError::at(
            self.expect_message(expected, token),
            token.line(),
            token.column(),
        )
    }

    /// Lists the names of every registered type intersecting `mask`
    ///
    /// Names are joined with `", "` in ascending type order. Returns
    /// `"unknown token type"` when nothing matches.
    pub fn token_name(&self, mask: N::Kind) -> String {
        let names: SmallVec<[&str; 4]> = self
            .names()
            .iter()
            .filter(|(kind, _)| kind.intersects(mask))
            .map(|(_, name)| name.as_str())
            .collect();

        if names.is_empty() {
            return "unknown token type".to_string();
        }
        names.join(", ")
    }

    fn names(&self) -> &TokenNameMap<N::Kind> {
        self.names.get_or_init(|| {
            let mut names = self.table.token_names();
            names.sort_keys();
            trace!(count = names.len(), "built token name table");
            names
        })
    }

    fn expect_message(&self, expected: &str, token: &Token<'_, N::Kind>) -> String {
        let mut message = format!(
            "Expected {}, but got {}",
            expected,
            self.token_name(token.kind())
        );
        if !token.is_empty() {
            message.push_str(&format!(" (raw data: '{}')", token.text()));
        }
        message
    }
}
