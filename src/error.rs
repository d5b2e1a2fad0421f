//! Error types.
//!
//! Only malformed configuration is fatal. Everything that can go wrong
//! with a single semester is a [`SemesterFailure`], reported next to the
//! results of the other semesters.

use serde::Serialize;

/// Result alias for fatal errors.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Fatal errors, raised before any search begins.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimetableError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// A program cannot be divided into weeks.
    #[error("program '{program}' has zero duration weeks")]
    ZeroDurationWeeks {
        /// Program id.
        program: String,
    },
}

impl TimetableError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Semester-level failure: this semester yields no timetable, the others
/// are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum SemesterFailure {
    /// No program has this semester, or no class follows such a program.
    #[error("semester {0}: no programs or classes")]
    NoData(u32),
    /// No lecturer is qualified for any subject of the semester.
    #[error("semester {0}: no qualified lecturers")]
    NoLecturers(u32),
    /// The input has no rooms.
    #[error("semester {0}: no rooms")]
    NoRooms(u32),
    /// Subjects resolve to zero weekly lessons.
    #[error("semester {0}: no weekly lessons to schedule")]
    NoLessons(u32),
    /// A program semester lacks its start date.
    #[error("semester {semester}: program '{program}' has no start date")]
    MissingStartDate {
        /// Semester number.
        semester: u32,
        /// Program id.
        program: String,
    },
}
