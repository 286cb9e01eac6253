// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Title and timestamp-ordering checks shared by entities and contexts.
//!
//! On patch these run against the merged row, never the delta alone.
use crate::ident::Timestamp;

/// Default upper bound on title length, in Unicode scalar values.
pub const DEFAULT_MAX_TITLE_CHARS: usize = 256;

/// Which timestamp column a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    /// `createdTimestamp`.
    Created,
    /// `startedTimestamp`.
    Started,
    /// `finishedTimestamp`.
    Finished,
}

impl std::fmt::Display for TimestampField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Created => "createdTimestamp",
            Self::Started => "startedTimestamp",
            Self::Finished => "finishedTimestamp",
        })
    }
}

/// Rejection of a record's scalar fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title is empty.
    #[error("[INVALID_TITLE] title must not be empty")]
    EmptyTitle,
    /// Title exceeds the configured limit.
    #[error("[INVALID_TITLE] title has {len} characters, limit is {max}")]
    TitleTooLong {
        /// Observed length in characters.
        len: usize,
        /// Configured limit.
        max: usize,
    },
    /// `later` precedes `earlier`.
    #[error("[INVALID_TIMESTAMP_ORDER] {later} ({later_value}) is before {earlier} ({earlier_value})")]
    InvalidTimestampOrder {
        /// Field that must not come first.
        earlier: TimestampField,
        /// Its value.
        earlier_value: Timestamp,
        /// Field that came first.
        later: TimestampField,
        /// Its value.
        later_value: Timestamp,
    },
}

/// Check that `title` is non-empty and at most `max_chars` characters.
///
/// Whitespace counts as content; `"   "` is a valid title.
pub fn validate_title(title: &str, max_chars: usize) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > max_chars {
        return Err(ValidationError::TitleTooLong {
            len,
            max: max_chars,
        });
    }
    Ok(())
}

/// Check `created ≤ started ≤ finished` over whichever values are present.
///
/// With `started` absent, `finished` is compared against `created`.
pub fn validate_timestamps(
    created: Timestamp,
    started: Option<Timestamp>,
    finished: Option<Timestamp>,
) -> Result<(), ValidationError> {
    let order = |earlier: TimestampField,
                 earlier_value: Timestamp,
                 later: TimestampField,
                 later_value: Timestamp| {
        if later_value < earlier_value {
            Err(ValidationError::InvalidTimestampOrder {
                earlier,
                earlier_value,
                later,
                later_value,
            })
        } else {
            Ok(())
        }
    };

    if let Some(started) = started {
        order(TimestampField::Created, created, TimestampField::Started, started)?;
    }
    match (started, finished) {
        (Some(started), Some(finished)) => order(
            TimestampField::Started,
            started,
            TimestampField::Finished,
            finished,
        ),
        (None, Some(finished)) => order(
            TimestampField::Created,
            created,
            TimestampField::Finished,
            finished,
        ),
        (_, None) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bounds() {
        assert_eq!(validate_title("", 10), Err(ValidationError::EmptyTitle));
        assert!(validate_title("   ", 10).is_ok());
        assert!(validate_title(" ", 1).is_ok());
        assert!(validate_title("ok", 10).is_ok());
        assert!(validate_title(&"a".repeat(10), 10).is_ok());
        assert_eq!(
            validate_title(&"a".repeat(11), 10),
            Err(ValidationError::TitleTooLong { len: 11, max: 10 })
        );
    }

    #[test]
    fn title_length_counts_code_points() {
        // 256 multi-byte characters are within the default limit.
        let title = "é".repeat(DEFAULT_MAX_TITLE_CHARS);
        assert!(validate_title(&title, DEFAULT_MAX_TITLE_CHARS).is_ok());
    }

    #[test]
    fn ordered_timestamps_pass() {
        let t = Timestamp;
        assert!(validate_timestamps(t(1), None, None).is_ok());
        assert!(validate_timestamps(t(1), Some(t(1)), Some(t(1))).is_ok());
        assert!(validate_timestamps(t(1), Some(t(2)), Some(t(3))).is_ok());
        assert!(validate_timestamps(t(1), None, Some(t(3))).is_ok());
    }

    #[test]
    fn started_before_created_fails() {
        let err = validate_timestamps(Timestamp(5), Some(Timestamp(4)), None);
        assert_eq!(
            err,
            Err(ValidationError::InvalidTimestampOrder {
                earlier: TimestampField::Created,
                earlier_value: Timestamp(5),
                later: TimestampField::Started,
                later_value: Timestamp(4),
            })
        );
    }

    #[test]
    fn finished_before_started_fails() {
        let err = validate_timestamps(Timestamp(1), Some(Timestamp(5)), Some(Timestamp(4)));
        assert!(matches!(
            err,
            Err(ValidationError::InvalidTimestampOrder {
                earlier: TimestampField::Started,
                later: TimestampField::Finished,
                ..
            })
        ));
    }

    #[test]
    fn finished_before_created_without_start_fails() {
        let err = validate_timestamps(Timestamp(5), None, Some(Timestamp(4)));
        assert!(matches!(
            err,
            Err(ValidationError::InvalidTimestampOrder {
                earlier: TimestampField::Created,
                later: TimestampField::Finished,
                ..
            })
        ));
    }
}
