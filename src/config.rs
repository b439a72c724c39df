//! Escape configuration for a scanning session

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Configuration options for the scanner
///
/// Both values are fixed for the lifetime of a scanning session. The cursor
/// takes its own copy at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Characters that the escape character can escape
    pub escapable: SmallVec<[u8; 8]>,
    /// The escape character
    pub escape: u8,
}

impl ScannerConfig {
    /// Creates a configuration from an escapable set and an escape character
    pub fn new(escapable: impl AsRef<[u8]>, escape: u8) -> Self {
        Self {
            escapable: SmallVec::from_slice(escapable.as_ref()),
            escape,
        }
    }

    /// Replaces the escapable set
    pub fn with_escapable(mut self, escapable: impl AsRef<[u8]>) -> Self {
        self.escapable = SmallVec::from_slice(escapable.as_ref());
        self
    }

    /// Replaces the escape character
    pub fn with_escape(mut self, escape: u8) -> Self {
        self.escape = escape;
        self
    }

    /// Returns true if `ch` is in the escapable set
    #[inline]
    pub fn is_escapable(&self, ch: u8) -> bool {
        self.escapable.contains(&ch)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            escapable: SmallVec::from_slice(b"\"\\"),
            escape: b'\\',
        }
    }
}
