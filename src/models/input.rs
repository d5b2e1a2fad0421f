//! Raw input payload.

use serde::{Deserialize, Serialize};

use super::{Class, Lecturer, Program, Room, Subject, TimeSlot};

/// Everything the core needs to build timetables, as handed over by the
/// loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableInput {
    /// Student cohorts.
    #[serde(default)]
    pub classes: Vec<Class>,
    /// Study programs with their semesters.
    #[serde(default)]
    pub programs: Vec<Program>,
    /// Subjects with their hour totals.
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Lecturers with qualifications and busy slots.
    #[serde(default)]
    pub lecturers: Vec<Lecturer>,
    /// Rooms with type and capacity.
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Daily teaching periods.
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    /// Day names used for scheduling, in display order.
    #[serde(default)]
    pub days: Vec<String>,
}

impl TimetableInput {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct semester numbers across all programs, ascending.
    pub fn semester_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .programs
            .iter()
            .flat_map(|p| p.semesters.iter().map(|s| s.number))
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Semester;

    #[test]
    fn test_semester_numbers_dedup() {
        let mut input = TimetableInput::new();
        input.programs.push(
            Program::new("A", 10)
                .with_semester(Semester::new(2))
                .with_semester(Semester::new(1)),
        );
        input.programs.push(Program::new("B", 10).with_semester(Semester::new(1)));
        assert_eq!(input.semester_numbers(), vec![1, 2]);
    }

    #[test]
    fn test_deserialize_partial_payload() {
        let input: TimetableInput =
            serde_json::from_str(r#"{"days": ["Monday", "Tuesday"]}"#).unwrap();
        assert_eq!(input.days.len(), 2);
        assert!(input.classes.is_empty());
    }
}
