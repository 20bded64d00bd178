use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    reason: &'static str,
}

impl ParseIdError {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

// Backend document ids are opaque strings. Ids end up as url path segments,
// so the dot segments are refused as well.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new id, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns `ParseIdError` if the value is empty, whitespace-only, or
            /// a `.`/`..` path segment.
            pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                        reason: "cannot be empty",
                    });
                }
                if matches!(trimmed, "." | "..") {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                        reason: "cannot be a dot segment",
                    });
                }
                if trimmed.len() == id.len() {
                    Ok(Self(id))
                } else {
                    Ok(Self(trimmed.to_owned()))
                }
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Unique identifier for a Course
    CourseId
);
string_id!(
    /// Identifier for a Lesson, unique within its course
    LessonId
);
string_id!(
    /// Identifier for a Batch, unique within its course
    BatchId
);
string_id!(
    /// Unique identifier for a User (student or admin)
    UserId
);
string_id!(
    /// Unique identifier for an Enrollment
    EnrollmentId
);
string_id!(
    /// Unique identifier for an Assignment or Quiz
    MaterialId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn course_id_display() {
        let id = CourseId::new("65a1f0c2").unwrap();
        assert_eq!(id.to_string(), "65a1f0c2");
        assert_eq!(format!("{id:?}"), "CourseId(65a1f0c2)");
    }

    #[test]
    fn lesson_id_from_str_trims() {
        let id: LessonId = "  lesson-1 ".parse().unwrap();
        assert_eq!(id.as_str(), "lesson-1");
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = "   ".parse::<BatchId>().unwrap_err();
        assert_eq!(err.kind(), "BatchId");
        assert_eq!(err.to_string(), "BatchId cannot be empty");
    }

    #[test]
    fn dot_segments_are_rejected() {
        let err = CourseId::new("..").unwrap_err();
        assert_eq!(err.to_string(), "CourseId cannot be a dot segment");
        assert!(LessonId::new(" . ").is_err());
        assert!(LessonId::new("..lesson").is_ok());
    }

    #[test]
    fn ids_deserialize_from_plain_strings() {
        let id: UserId = serde_json::from_str("\"u-42\"").unwrap();
        assert_eq!(id.as_str(), "u-42");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }

    #[test]
    fn set_lookup_by_str() {
        let mut set = BTreeSet::new();
        set.insert(LessonId::new("l2").unwrap());
        assert!(set.contains("l2"));
        assert!(!set.contains("l1"));
    }
}
