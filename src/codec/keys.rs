//! Reserved document keys, sentinels, and canonical ranges.

use crate::spec::{DifferenceBucket, LevelRange};

/// Optional wrapper around the sections.
pub const WRAPPER: &str = "PIRT";

pub const HEADERS: &str = "Headers";
pub const ADEQUACY_COLUMNS: &str = "Adequacy Columns";
pub const LEVELS: &str = "Levels";
pub const LEVEL_COLORS: &str = "Level Colors";
pub const GUIDELINES: &str = "Guidelines";

pub const SECTIONS: [&str; 5] = [HEADERS, ADEQUACY_COLUMNS, LEVELS, LEVEL_COLORS, GUIDELINES];

/// Payload key inside the headers, columns, levels, and colors sections.
pub const FIELDS: &str = "fields";
/// Payload key inside the guidelines section.
pub const GUIDELINE_ENTRIES: &str = "guidelines";

pub const COLUMN_TYPE: &str = "type";
pub const LEVEL_RANK: &str = "level";
pub const LEVEL_LABEL: &str = "label";
pub const COLOR_RGB: &str = "rgb";
pub const COLOR_EXPLANATION: &str = "explanation";
pub const COLOR_RANGE: &str = "range";
pub const GUIDELINE_DESCRIPTION: &str = "description";
pub const GUIDELINE_LEVELS: &str = "levels";

pub const POS_OR_ZERO: &str = "PosOrZero";
pub const ONE_LEVEL: &str = "OneLevel";
pub const TWO_LEVELS_OR_MORE: &str = "TwoLevelsOrMore";
/// Level keys that take a fixed color instead of a bucket.
pub const NOT_ADDRESSED: &str = "NotAddressed";
pub const NOT_APPLICABLE: &str = "NA";

pub const POS_OR_ZERO_RANGE: &str = "0;99";
pub const ONE_LEVEL_RANGE: &str = "-1";
pub const TWO_LEVELS_OR_MORE_RANGE: &str = "-99;-2";

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const DEFAULT_RGB: &str = "255,255,255";

pub fn bucket_name(bucket: DifferenceBucket) -> &'static str {
    match bucket {
        DifferenceBucket::NonNegativeOrZero => POS_OR_ZERO,
        DifferenceBucket::OneLevelBelow => ONE_LEVEL,
        DifferenceBucket::TwoOrMoreLevelsBelow => TWO_LEVELS_OR_MORE,
    }
}

pub fn canonical_range_text(bucket: DifferenceBucket) -> &'static str {
    match bucket {
        DifferenceBucket::NonNegativeOrZero => POS_OR_ZERO_RANGE,
        DifferenceBucket::OneLevelBelow => ONE_LEVEL_RANGE,
        DifferenceBucket::TwoOrMoreLevelsBelow => TWO_LEVELS_OR_MORE_RANGE,
    }
}

pub fn canonical_range(bucket: DifferenceBucket) -> LevelRange {
    let (min, max) = match bucket {
        DifferenceBucket::NonNegativeOrZero => (0, 99),
        DifferenceBucket::OneLevelBelow => (-1, -1),
        DifferenceBucket::TwoOrMoreLevelsBelow => (-99, -2),
    };
    LevelRange::new(min, max)
}

/// Reserved name whose canonical range string equals `range` rendered.
pub fn name_for_range(range: &LevelRange) -> Option<&'static str> {
    let rendered = range.to_string();
    DifferenceBucket::ALL
        .into_iter()
        .find(|bucket| canonical_range_text(*bucket) == rendered)
        .map(bucket_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ranges_agree_with_their_text() {
        for bucket in DifferenceBucket::ALL {
            let parsed = LevelRange::parse(canonical_range_text(bucket)).unwrap();
            assert_eq!(parsed, canonical_range(bucket));
            assert_eq!(name_for_range(&parsed), Some(bucket_name(bucket)));
        }
    }

    #[test]
    fn non_canonical_range_has_no_name() {
        assert_eq!(name_for_range(&LevelRange::new(0, 0)), None);
        assert_eq!(name_for_range(&LevelRange::new(-3, -2)), None);
    }
}
