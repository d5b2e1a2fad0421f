//! Weekly lesson requirements.
//!
//! A requirement is one (class, subject, lesson type) combination with a
//! non-zero teaching load. Its semester load is converted into slots, and
//! the slots are spread over the program's weeks. The weekly count is the
//! ceiling of that spread, so every week's timetable offers enough
//! instances for the busiest week.

use serde::Serialize;

use crate::models::LessonType;

/// Slots needed to cover `hours` when one slot stands for `hours_per_slot`.
///
/// Non-positive hours need no slots.
pub fn slot_count(hours: f64, hours_per_slot: f64) -> u32 {
    if !(hours > 0.0) || !(hours_per_slot > 0.0) {
        return 0;
    }
    // Tolerate float noise such as 30.0 / 0.1 = 300.00000000000006
    let slots = (hours / hours_per_slot - 1e-9).ceil();
    slots.max(0.0) as u32
}

/// Lesson instances per week needed to fit `total_slots` into `weeks`.
pub fn weekly_count(total_slots: u32, weeks: u32) -> u32 {
    if weeks == 0 {
        return 0;
    }
    total_slots.div_ceil(weeks)
}

/// Spreads `total` lessons over `weeks` as evenly as possible.
///
/// The first `total % weeks` weeks receive one extra lesson.
///
/// ```
/// use u_timetable::data::weekly_lesson_counts;
///
/// assert_eq!(weekly_lesson_counts(10, 6), vec![2, 2, 2, 2, 1, 1]);
/// ```
pub fn weekly_lesson_counts(total: u32, weeks: u32) -> Vec<u32> {
    if weeks == 0 {
        return Vec::new();
    }
    let base = total / weeks;
    let remainder = total % weeks;
    (0..weeks)
        .map(|w| if w < remainder { base + 1 } else { base })
        .collect()
}

/// One (class, subject, lesson type) teaching requirement for a semester.
#[derive(Debug, Clone, Serialize)]
pub struct RequiredLesson {
    /// Class index.
    pub class: usize,
    /// Subject index.
    pub subject: usize,
    /// Lesson type.
    pub lesson_type: LessonType,
    /// Program index (the class's program).
    pub program: usize,
    /// Semester number.
    pub semester: u32,
    /// Slots needed over the whole semester.
    pub total_slots: u32,
    /// Weeks the semester lasts.
    pub duration_weeks: u32,
    /// Lesson instances in the weekly timetable.
    pub weekly_count: u32,
}

impl RequiredLesson {
    /// How many instances each semester week actually holds.
    pub fn weekly_distribution(&self) -> Vec<u32> {
        weekly_lesson_counts(self.total_slots, self.duration_weeks)
    }
}

/// One weekly lesson instance: a single gene position.
///
/// Carries its candidate resources so operators never recompute them.
#[derive(Debug, Clone, Serialize)]
pub struct LessonUnit {
    /// Owning requirement index; genes of the same requirement form a group.
    pub requirement: usize,
    /// Position within the group (0-based).
    pub ordinal: u32,
    /// Class index.
    pub class: usize,
    /// Subject index.
    pub subject: usize,
    /// Lesson type.
    pub lesson_type: LessonType,
    /// Program index.
    pub program: usize,
    /// Class size, for capacity checks.
    pub class_size: u32,
    /// Lecturers qualified for the subject.
    pub lecturers: Vec<usize>,
    /// Rooms of the right type with enough seats.
    pub rooms: Vec<usize>,
}

impl LessonUnit {
    /// Group id shared by all instances of one requirement.
    #[inline]
    pub fn group(&self) -> usize {
        self.requirement
    }
}
