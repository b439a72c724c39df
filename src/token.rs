//! Token descriptors and the bit-flag capability for token types
//!
//! A [`Token`] borrows the scanned buffer and records where its lexeme sits in
//! it. The token type is an arbitrary bit-flag value chosen by the concrete
//! grammar, so one mask can stand for "any of these types".

use crate::error::Position;
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::ops::BitAnd;
use std::str::FromStr;

/// Largest integer lexeme (exclusive) accepted by [`Token::to_integer`]
pub const INTEGER_STAGING_LEN: usize = 64;

/// Largest float lexeme (exclusive) accepted by [`Token::to_float`]
pub const FLOAT_STAGING_LEN: usize = 256;

/// Bit-flag capability required from a token type
///
/// Implemented for the unsigned integer primitives. Grammars that want a
/// named flag type implement it for their own newtype.
pub trait TokenKind: Copy + Eq + Ord + Hash + fmt::Debug + BitAnd<Output = Self> {
    /// The empty mask
    const NONE: Self;
    /// The mask with every bit set
    const ALL: Self;

    /// Checks if any of the bits in `mask` are set
    #[inline]
    fn intersects(self, mask: Self) -> bool {
        (self & mask) != Self::NONE
    }
}

macro_rules! impl_token_kind {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TokenKind for $ty {
                const NONE: Self = 0;
                const ALL: Self = !0;
            }
        )*
    };
}

impl_token_kind!(u8, u16, u32, u64, u128, usize);

/// A lexeme produced by a lexer
///
/// Tokens never own their text. `begin..end` is a byte range into the buffer
/// the token was scanned from, and `position` is where the lexer reports the
/// token to start (it may precede `begin`, e.g. at an opening quote that is
/// not part of the lexeme).
///
/// Two tokens are equal when they have the same type, range and position over
/// the very same buffer; the buffer contents are never compared.
#[derive(Clone, Copy)]
pub struct Token<'a, K> {
    kind: K,
    source: &'a [u8],
    begin: usize,
    end: usize,
    position: Position,
}

impl<'a, K: TokenKind> Token<'a, K> {
    /// Creates a token over `source[begin..end]`
    ///
    /// # Panics
    ///
    /// Panics if `end < begin` or if the range extends past the buffer.
    pub fn new(kind: K, source: &'a [u8], begin: usize, end: usize, position: Position) -> Self {
        assert!(end >= begin, "token range is inverted: {begin}..{end}");
        assert!(
            end <= source.len(),
            "token range {begin}..{end} exceeds buffer of {} bytes",
            source.len()
        );
        Self {
            kind,
            source,
            begin,
            end,
            position,
        }
    }

    /// Returns the token type
    #[inline]
    pub fn kind(&self) -> K {
        self.kind
    }

    /// Checks whether the token type intersects `mask`
    #[inline]
    pub fn has_type(&self, mask: K) -> bool {
        self.kind.intersects(mask)
    }
}

impl<'a, K> Token<'a, K> {
    /// Byte offset of the first lexeme byte
    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Byte offset one past the last lexeme byte
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length of the lexeme in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Returns true if the lexeme is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Reported start position of the token
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Line number (1-based)
    #[inline]
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// Column number (1-based)
    #[inline]
    pub fn column(&self) -> usize {
        self.position.column
    }

    /// The raw lexeme bytes, borrowed from the buffer
    #[inline]
    pub fn lexeme(&self) -> &'a [u8] {
        &self.source[self.begin..self.end]
    }

    /// The lexeme as text, borrowed when it is valid UTF-8
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.lexeme())
    }

    /// The lexeme as owned text
    pub fn data(&self) -> String {
        self.text().into_owned()
    }

    /// Parses the leading integer of the lexeme
    ///
    /// Leading ASCII whitespace is skipped and anything after the digits is
    /// ignored. Returns `None` when there are no digits or the value does not
    /// fit in `T`.
    ///
    /// # Panics
    ///
    /// Panics if the lexeme is [`INTEGER_STAGING_LEN`] bytes or longer.
    pub fn to_integer<T: FromStr>(&self) -> Option<T> {
        let mut staging = [0u8; INTEGER_STAGING_LEN];
        let staged = stage(self.lexeme(), &mut staging);
        parse_prefix(integer_prefix(staged))
    }

    /// Parses the leading decimal number of the lexeme
    ///
    /// Accepts an optional sign, digits with an optional fraction, and an
    /// exponent only when digits follow the marker. Trailing bytes are
    /// ignored, so `1e` reads as `1.0`.
    ///
    /// # Panics
    ///
    /// Panics if the lexeme is [`FLOAT_STAGING_LEN`] bytes or longer.
    pub fn to_float<T: FromStr>(&self) -> Option<T> {
        let mut staging = [0u8; FLOAT_STAGING_LEN];
        let staged = stage(self.lexeme(), &mut staging);
        parse_prefix(float_prefix(staged))
    }
}

impl<K: PartialEq> PartialEq for Token<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.begin == other.begin
            && self.end == other.end
            && self.position == other.position
            && std::ptr::eq(self.source, other.source)
    }
}

impl<K: Eq> Eq for Token<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for Token<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("text", &String::from_utf8_lossy(self.lexeme()))
            .field("range", &(self.begin..self.end))
            .field("position", &self.position)
            .finish()
    }
}

fn stage<'b, const N: usize>(lexeme: &[u8], staging: &'b mut [u8; N]) -> &'b [u8] {
    assert!(
        lexeme.len() < N,
        "lexeme of {} bytes does not fit the {}-byte numeric staging buffer",
        lexeme.len(),
        N
    );
    staging[..lexeme.len()].copy_from_slice(lexeme);
    &staging[..lexeme.len()]
}

fn parse_prefix<T: FromStr>(prefix: &[u8]) -> Option<T> {
    if prefix.is_empty() {
        return None;
    }
    std::str::from_utf8(prefix).ok()?.parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn skip_sign(bytes: &[u8], at: usize) -> usize {
    match bytes.get(at) {
        Some(b'+') | Some(b'-') => at + 1,
        _ => at,
    }
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn integer_prefix(bytes: &[u8]) -> &[u8] {
    let bytes = trim_leading_whitespace(bytes);
    let digits_start = skip_sign(bytes, 0);
    let digits = count_digits(&bytes[digits_start..]);
    if digits == 0 {
        return &[];
    }
    &bytes[..digits_start + digits]
}

fn float_prefix(bytes: &[u8]) -> &[u8] {
    let bytes = trim_leading_whitespace(bytes);
    let mut end = skip_sign(bytes, 0);
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return &[];
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_digits_start = skip_sign(bytes, end + 1);
        let exp_digits = count_digits(&bytes[exp_digits_start..]);
        if exp_digits > 0 {
            end = exp_digits_start + exp_digits;
        }
    }
    &bytes[..end]
}
