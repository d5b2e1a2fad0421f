//! Subject model.
//!
//! A subject carries its total teaching load for one semester, split into
//! theory and practice hours. Each non-zero part becomes its own weekly
//! lesson requirement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of lesson, which also classifies the rooms that can host it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    /// Lecture-style lesson, hosted in theory rooms.
    Theory,
    /// Lab or workshop lesson, hosted in practice rooms.
    Practice,
}

impl LessonType {
    /// Both lesson types, theory first.
    pub const ALL: [LessonType; 2] = [LessonType::Theory, LessonType::Practice];

    /// Lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Theory => "theory",
            LessonType::Practice => "practice",
        }
    }
}

impl fmt::Display for LessonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subject taught within a program semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Total theory hours over the semester.
    #[serde(default)]
    pub theory_hours: f64,
    /// Total practice hours over the semester.
    #[serde(default)]
    pub practice_hours: f64,
}

impl Subject {
    /// Creates a subject with no hours.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            theory_hours: 0.0,
            practice_hours: 0.0,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the total theory hours.
    pub fn with_theory_hours(mut self, hours: f64) -> Self {
        self.theory_hours = hours;
        self
    }

    /// Sets the total practice hours.
    pub fn with_practice_hours(mut self, hours: f64) -> Self {
        self.practice_hours = hours;
        self
    }

    /// Total hours for one lesson type.
    pub fn hours(&self, lesson_type: LessonType) -> f64 {
        match lesson_type {
            LessonType::Theory => self.theory_hours,
            LessonType::Practice => self.practice_hours,
        }
    }
}
