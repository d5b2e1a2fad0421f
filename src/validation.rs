//! Input validation for timetabling problems.
//!
//! Checks structural integrity of the input payload before scheduling.
//! Detects:
//! - Duplicate IDs per entity type
//! - Classes referencing unknown programs
//! - Semesters and lecturers referencing unknown subjects
//! - Busy slots referencing unknown days or time slots
//! - Duplicate time-slot ordinals
//! - Day names that are not calendar weekdays
//!
//! None of these is fatal: preprocessing drops dangling references, and a
//! day that is not a weekday can still be used in the weekly timetable but
//! never receives a date.

use std::collections::HashSet;

use crate::models::{Day, TimetableInput};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of one type share the same ID.
    DuplicateId,
    /// A class references a program that doesn't exist.
    UnknownProgram,
    /// A semester or lecturer references a subject that doesn't exist.
    UnknownSubject,
    /// A busy slot references a time slot that doesn't exist.
    UnknownTimeSlot,
    /// A busy slot references a day not listed in the input.
    UnknownDay,
    /// Two time slots share the same ordinal.
    DuplicateSlotOrder,
    /// A scheduling day is not a recognizable weekday.
    UnrecognizedWeekday,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn collect_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates a timetabling input.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &TimetableInput) -> ValidationResult {
    let mut errors = Vec::new();

    let subject_ids = collect_ids("subject", input.subjects.iter().map(|s| s.id.as_str()), &mut errors);
    let program_ids = collect_ids("program", input.programs.iter().map(|p| p.id.as_str()), &mut errors);
    collect_ids("class", input.classes.iter().map(|c| c.id.as_str()), &mut errors);
    collect_ids("lecturer", input.lecturers.iter().map(|l| l.id.as_str()), &mut errors);
    collect_ids("room", input.rooms.iter().map(|r| r.id.as_str()), &mut errors);
    let slot_ids = collect_ids("time slot", input.time_slots.iter().map(|t| t.id.as_str()), &mut errors);
    let day_names = collect_ids("day", input.days.iter().map(String::as_str), &mut errors);

    let mut orders = HashSet::new();
    for slot in &input.time_slots {
        if !orders.insert(slot.order) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSlotOrder,
                format!("Time slot '{}' repeats order {}", slot.id, slot.order),
            ));
        }
    }

    for name in &input.days {
        if Day::parse(name.as_str()).weekday.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnrecognizedWeekday,
                format!("Day '{name}' is not a weekday and will never be dated"),
            ));
        }
    }

    for class in &input.classes {
        if !program_ids.contains(class.program_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownProgram,
                format!("Class '{}' references unknown program '{}'", class.id, class.program_id),
            ));
        }
    }

    for program in &input.programs {
        for semester in &program.semesters {
            for subject in &semester.subjects {
                if !subject_ids.contains(subject.as_str()) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownSubject,
                        format!(
                            "Program '{}' semester {} references unknown subject '{}'",
                            program.id, semester.number, subject
                        ),
                    ));
                }
            }
        }
    }

    for lecturer in &input.lecturers {
        for subject in &lecturer.subjects {
            if !subject_ids.contains(subject.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Lecturer '{}' references unknown subject '{}'", lecturer.id, subject),
                ));
            }
        }
        for busy in &lecturer.busy_slots {
            if !day_names.contains(busy.day.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDay,
                    format!("Lecturer '{}' is busy on unknown day '{}'", lecturer.id, busy.day),
                ));
            }
            if !slot_ids.contains(busy.time_slot.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTimeSlot,
                    format!(
                        "Lecturer '{}' is busy in unknown time slot '{}'",
                        lecturer.id, busy.time_slot
                    ),
                ));
            }
        }
        for busy in &lecturer.semester_busy_slots {
            if !slot_ids.contains(busy.time_slot.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTimeSlot,
                    format!(
                        "Lecturer '{}' is busy on {} in unknown time slot '{}'",
                        lecturer.id, busy.date, busy.time_slot
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_input;
    use crate::models::{Class, Lecturer, Room, TimeSlot};
    use chrono::NaiveDate;

    fn kinds(input: &TimetableInput) -> Vec<ValidationErrorKind> {
        validate_input(input)
            .unwrap_err()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_input()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut input = sample_input();
        input.rooms.push(Room::theory("A1", 10));
        input.classes.push(Class::new("C1", "CS", 10));

        let errors = validate_input(&input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errors.iter().any(|e| e.message.contains("room")));
    }

    #[test]
    fn test_unknown_program() {
        let mut input = sample_input();
        input.classes.push(Class::new("C9", "NOPE", 10));
        assert_eq!(kinds(&input), vec![ValidationErrorKind::UnknownProgram]);
    }

    #[test]
    fn test_unknown_subjects() {
        let mut input = sample_input();
        input.programs[0].semesters[0].subjects.push("GHOST".into());
        input.lecturers.push(Lecturer::new("L9").with_subject("PHANTOM"));

        let errors = validate_input(&input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::UnknownSubject));
    }

    #[test]
    fn test_busy_slot_references() {
        let mut input = sample_input();
        input.lecturers.push(
            Lecturer::new("L9")
                .with_subject("MATH")
                .with_busy_slot("Caturday", "S1")
                .with_busy_slot("Monday", "S9")
                .with_dated_busy_slot(NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(), "S7"),
        );
        assert_eq!(
            kinds(&input),
            vec![
                ValidationErrorKind::UnknownDay,
                ValidationErrorKind::UnknownTimeSlot,
                ValidationErrorKind::UnknownTimeSlot,
            ]
        );
    }

    #[test]
    fn test_slot_order_and_weekday_names() {
        let mut input = sample_input();
        input.time_slots.push(TimeSlot::new("S4", 2));
        input.days.push("Day X".into());
        assert_eq!(
            kinds(&input),
            vec![
                ValidationErrorKind::DuplicateSlotOrder,
                ValidationErrorKind::UnrecognizedWeekday,
            ]
        );
    }

    #[test]
    fn test_empty_input_is_valid() {
        assert!(validate_input(&TimetableInput::default()).is_ok());
    }
}
