//! Program, semester and class models.
//!
//! A program defines the subjects taught in each of its semesters and the
//! number of calendar weeks a semester lasts. Classes (student cohorts)
//! follow exactly one program.

use serde::{Deserialize, Serialize};

/// A study program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Unique program identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Number of calendar weeks in each semester.
    pub duration_weeks: u32,
    /// Semesters in teaching order.
    #[serde(default)]
    pub semesters: Vec<Semester>,
}

/// One semester of a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    /// Semester number (1-based), shared across programs.
    pub number: u32,
    /// First day of teaching, `YYYY-MM-DD`.
    ///
    /// Kept as raw text: a malformed value only invalidates the lessons
    /// of this semester during expansion, not the whole run.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Subject ids taught this semester.
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// A class (student cohort).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    /// Unique class identifier.
    pub id: String,
    /// Program this class follows.
    pub program_id: String,
    /// Number of enrolled students.
    pub size: u32,
}

impl Program {
    /// Creates a program with no semesters.
    pub fn new(id: impl Into<String>, duration_weeks: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            duration_weeks,
            semesters: Vec::new(),
        }
    }

    /// Sets the program name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a semester.
    pub fn with_semester(mut self, semester: Semester) -> Self {
        self.semesters.push(semester);
        self
    }

    /// Finds a semester by number.
    pub fn semester(&self, number: u32) -> Option<&Semester> {
        self.semesters.iter().find(|s| s.number == number)
    }
}

impl Semester {
    /// Creates a semester with no start date and no subjects.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            start_date: None,
            subjects: Vec::new(),
        }
    }

    /// Sets the start date text.
    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Adds a subject id.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.push(subject_id.into());
        self
    }
}

impl Class {
    /// Creates a class.
    pub fn new(id: impl Into<String>, program_id: impl Into<String>, size: u32) -> Self {
        Self {
            id: id.into(),
            program_id: program_id.into(),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_semester_lookup() {
        let p = Program::new("CS", 15)
            .with_name("Computer Science")
            .with_semester(Semester::new(1).with_subject("MATH1"))
            .with_semester(
                Semester::new(2)
                    .with_start_date("2025-02-03")
                    .with_subject("ALGO"),
            );

        assert_eq!(p.semester(2).unwrap().subjects, vec!["ALGO".to_string()]);
        assert_eq!(p.semester(2).unwrap().start_date.as_deref(), Some("2025-02-03"));
        assert!(p.semester(3).is_none());
    }

    #[test]
    fn test_program_deserialize() {
        let json = r#"{
            "id": "EE",
            "duration_weeks": 10,
            "semesters": [{"number": 1, "start_date": "2025-09-01", "subjects": ["CIRC"]}]
        }"#;
        let p: Program = serde_json::from_str(json).unwrap();
        assert_eq!(p.duration_weeks, 10);
        assert_eq!(p.semesters[0].subjects[0], "CIRC");
    }
}
