//! Alphabetic position labels: `A`..`Z`, `AA`..`AZ`, `BA`, ...
//!
//! Bijective base-26, so every 0-based index has exactly one label and the
//! sequence has no gaps.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PositionLabel(String);

impl PositionLabel {
    pub fn from_index(index: usize) -> Self {
        let mut n = index;
        let mut letters = Vec::new();
        loop {
            letters.push(b'A' + (n % 26) as u8);
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        letters.reverse();
        Self(letters.into_iter().map(char::from).collect())
    }

    /// Inverse of [`PositionLabel::from_index`]. Only uppercase ASCII letters
    /// are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_uppercase()) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// `None` when the label is too long to name a `usize` position.
    pub fn index(&self) -> Option<usize> {
        let ordinal = self.0.bytes().try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?.checked_add(usize::from(b - b'A') + 1)
        })?;
        ordinal.checked_sub(1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PositionLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
