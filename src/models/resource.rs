//! Teaching resources: lecturers and rooms.
//!
//! Lecturers are qualified for a set of subjects and may be blocked on
//! recurring weekly slots (standing commitments) or on specific dated
//! slots within the semester (one-off absences). Rooms are typed by the
//! lesson kind they host and bounded by seat capacity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::LessonType;

/// A lecturer who can be assigned to lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecturer {
    /// Unique lecturer identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Subject ids this lecturer may teach.
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Recurring weekly unavailability.
    #[serde(default)]
    pub busy_slots: Vec<WeeklyBusySlot>,
    /// One-off unavailability on specific dates.
    #[serde(default)]
    pub semester_busy_slots: Vec<DatedBusySlot>,
}

/// A (day, slot) pair blocked every week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBusySlot {
    /// Day name, as listed in the input's scheduling days.
    pub day: String,
    /// Time slot id.
    pub time_slot: String,
}

/// A (date, slot) pair blocked once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedBusySlot {
    /// Calendar date.
    pub date: NaiveDate,
    /// Time slot id.
    pub time_slot: String,
}

/// A room that can host lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Kind of lesson this room hosts.
    pub room_type: LessonType,
    /// Seat count.
    pub capacity: u32,
}

impl Lecturer {
    /// Creates a lecturer with no qualifications and no busy slots.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subjects: Vec::new(),
            busy_slots: Vec::new(),
            semester_busy_slots: Vec::new(),
        }
    }

    /// Sets the lecturer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a subject qualification.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.push(subject_id.into());
        self
    }

    /// Adds a recurring weekly busy slot.
    pub fn with_busy_slot(mut self, day: impl Into<String>, time_slot: impl Into<String>) -> Self {
        self.busy_slots.push(WeeklyBusySlot {
            day: day.into(),
            time_slot: time_slot.into(),
        });
        self
    }

    /// Adds a one-off dated busy slot.
    pub fn with_dated_busy_slot(mut self, date: NaiveDate, time_slot: impl Into<String>) -> Self {
        self.semester_busy_slots.push(DatedBusySlot {
            date,
            time_slot: time_slot.into(),
        });
        self
    }

    /// Whether this lecturer may teach a subject.
    pub fn teaches(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|s| s == subject_id)
    }
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, room_type: LessonType, capacity: u32) -> Self {
        Self {
            id: id.into(),
            room_type,
            capacity,
        }
    }

    /// Creates a theory room.
    pub fn theory(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, LessonType::Theory, capacity)
    }

    /// Creates a practice room.
    pub fn practice(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, LessonType::Practice, capacity)
    }

    /// Whether this room can host a lesson of the given type and size.
    #[inline]
    pub fn suits(&self, lesson_type: LessonType, class_size: u32) -> bool {
        self.room_type == lesson_type && self.capacity >= class_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lecturer_builder() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let l = Lecturer::new("L1")
            .with_name("Dr. Tran")
            .with_subject("MATH1")
            .with_busy_slot("Monday", "S1")
            .with_dated_busy_slot(date, "S2");

        assert!(l.teaches("MATH1"));
        assert!(!l.teaches("PHY"));
        assert_eq!(l.busy_slots[0].day, "Monday");
        assert_eq!(l.semester_busy_slots[0].date, date);
    }

    #[test]
    fn test_room_suits() {
        let r = Room::theory("A101", 40);
        assert!(r.suits(LessonType::Theory, 40));
        assert!(!r.suits(LessonType::Theory, 41));
        assert!(!r.suits(LessonType::Practice, 10));
    }

    #[test]
    fn test_dated_busy_slot_deserialize() {
        let json = r#"{"id": "L2", "semester_busy_slots": [{"date": "2025-04-01", "time_slot": "S3"}]}"#;
        let l: Lecturer = serde_json::from_str(json).unwrap();
        assert_eq!(
            l.semester_busy_slots[0].date,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert!(l.busy_slots.is_empty());
    }
}
