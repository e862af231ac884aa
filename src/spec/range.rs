//! The `N` / `N;M` range micro-format used by level-difference colors.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RANGE_SEPARATOR: char = ';';

/// Inclusive rank-difference range attached to a level-difference color.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: i64,
    pub max: i64,
}

/// Why a range string was rejected; the codec wraps this into
/// [`crate::RankingError::MalformedRange`] with the entry name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RangeParseError(pub String);

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl LevelRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Parse `"N"` (min = max = N) or `"N;M"`; any other token count fails.
    pub fn parse(raw: &str) -> Result<Self, RangeParseError> {
        let tokens: Vec<&str> = raw.trim().split(RANGE_SEPARATOR).collect();
        match tokens.as_slice() {
            [single] => {
                let value = parse_bound(single)?;
                Ok(Self::new(value, value))
            }
            [min, max] => Ok(Self::new(parse_bound(min)?, parse_bound(max)?)),
            _ => Err(RangeParseError(format!(
                "expected one or two values separated by '{RANGE_SEPARATOR}', found {}",
                tokens.len()
            ))),
        }
    }
}

fn parse_bound(token: &str) -> Result<i64, RangeParseError> {
    let token = token.trim();
    token
        .parse::<i64>()
        .map_err(|_| RangeParseError(format!("'{token}' is not an integer")))
}

impl fmt::Display for LevelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}{RANGE_SEPARATOR}{}", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_pair() {
        assert_eq!(LevelRange::parse("0;0").unwrap(), LevelRange::new(0, 0));
        assert_eq!(LevelRange::parse("2").unwrap(), LevelRange::new(2, 2));
        assert_eq!(LevelRange::parse(" -99 ; -2 ").unwrap(), LevelRange::new(-99, -2));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(LevelRange::parse("1,2").is_err());
        assert!(LevelRange::parse("1;2;3").is_err());
        assert!(LevelRange::parse("").is_err());
        assert!(LevelRange::parse("low;high").is_err());
    }

    #[test]
    fn renders_collapsed_when_equal() {
        assert_eq!(LevelRange::new(-1, -1).to_string(), "-1");
        assert_eq!(LevelRange::new(0, 99).to_string(), "0;99");
        assert_eq!(LevelRange::parse("0;0").unwrap().to_string(), "0");
    }
}
