//! Expanded semester schedule.
//!
//! Committed lessons are immutable records addressed by index. Views for
//! export ([`LessonRecord`]) are fresh copies with external ids, so
//! grouping by lecturer or room never touches the committed lessons.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::resolver::Unavailability;
use crate::data::ScheduleData;
use crate::models::LessonType;

/// One committed, dated lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduledLesson {
    /// Lesson unit (gene position) this lesson recurs from.
    pub unit: usize,
    /// Class index.
    pub class: usize,
    /// Subject index.
    pub subject: usize,
    /// Lesson type.
    pub lesson_type: LessonType,
    /// Semester week (0-based).
    pub week: u32,
    /// Calendar date.
    pub date: NaiveDate,
    /// Day index.
    pub day: usize,
    /// Slot index.
    pub slot: usize,
    /// Lecturer index.
    pub lecturer: usize,
    /// Room index.
    pub room: usize,
    /// Whether the repair search moved it away from its weekly placement.
    pub relocated: bool,
}

/// Why a dated lesson could not be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnassignableReason {
    /// The repair search found nothing.
    #[error("no free slot, lecturer and room within {window} week(s)")]
    NoAlternative {
        /// Weeks searched.
        window: u32,
    },
    /// No qualified lecturer or no suitable room exists at all.
    #[error("no qualified lecturer or suitable room")]
    NoCandidates,
    /// The program semester has no start date.
    #[error("program '{program}' has no semester start date")]
    MissingStartDate {
        /// Program id.
        program: String,
    },
    /// The start date does not parse.
    #[error("invalid start date '{value}': {detail}")]
    InvalidStartDate {
        /// Raw text.
        value: String,
        /// Parser message.
        detail: String,
    },
    /// Date arithmetic left chrono's range.
    #[error("lesson date out of range")]
    DateOverflow,
    /// The gene's day has no calendar weekday.
    #[error("day '{day}' is not a calendar weekday")]
    UndefinedWeekday {
        /// Day name.
        day: String,
    },
    /// The gene's day is the rest day.
    #[error("day '{day}' is the rest day")]
    RestDay {
        /// Day name.
        day: String,
    },
}

/// A lesson recurrence that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnassignableLesson {
    /// Lesson unit.
    pub unit: usize,
    /// Class index.
    pub class: usize,
    /// Subject index.
    pub subject: usize,
    /// Lesson type.
    pub lesson_type: LessonType,
    /// Semester week the recurrence belongs to.
    pub week: u32,
    /// Intended date, if one was computed.
    pub date: Option<NaiveDate>,
    /// Intended slot, if the gene had one.
    pub slot: Option<usize>,
    /// Why it failed.
    pub reason: UnassignableReason,
}

impl UnassignableLesson {
    /// Creates a record for a unit's recurrence in `week`.
    pub fn new(data: &ScheduleData, unit: usize, week: u32, reason: UnassignableReason) -> Self {
        let u = data.unit(unit);
        Self {
            unit,
            class: u.class,
            subject: u.subject,
            lesson_type: u.lesson_type,
            week,
            date: None,
            slot: None,
            reason,
        }
    }

    /// Records the intended date and slot.
    pub fn at(mut self, date: Option<NaiveDate>, slot: Option<usize>) -> Self {
        self.date = date;
        self.slot = slot;
        self
    }

    /// Human-readable description.
    pub fn describe(&self, data: &ScheduleData) -> String {
        format!("{} week {}: {}", data.describe_unit(self.unit), self.week + 1, self.reason)
    }
}

/// Export view of a committed lesson, with external ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonRecord {
    /// Class id.
    pub class_id: String,
    /// Subject id.
    pub subject_id: String,
    /// Subject display name.
    pub subject_name: String,
    /// Lesson type.
    pub lesson_type: LessonType,
    /// Semester week (1-based, as displayed).
    pub week: u32,
    /// Calendar date.
    pub date: NaiveDate,
    /// Day name.
    pub day: String,
    /// Time slot id.
    pub time_slot: String,
    /// Slot start time.
    pub start: String,
    /// Slot end time.
    pub end: String,
    /// Lecturer id.
    pub lecturer_id: String,
    /// Room id.
    pub room_id: String,
    /// Moved by the repair search.
    pub relocated: bool,
}

impl LessonRecord {
    /// Builds the view of one committed lesson.
    pub fn new(data: &ScheduleData, lesson: &ScheduledLesson) -> Self {
        let subject = data.subject(lesson.subject);
        let slot = data.time_slot(lesson.slot);
        Self {
            class_id: data.class(lesson.class).id.clone(),
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            lesson_type: lesson.lesson_type,
            week: lesson.week + 1,
            date: lesson.date,
            day: data.day(lesson.day).name.clone(),
            time_slot: slot.id.clone(),
            start: slot.start.clone(),
            end: slot.end.clone(),
            lecturer_id: data.lecturer(lesson.lecturer).id.clone(),
            room_id: data.room(lesson.room).id.clone(),
            relocated: lesson.relocated,
        }
    }
}

/// Committed lessons per class, per week, plus everything that failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SemesterSchedule {
    /// Semester number, when scoped to one.
    pub semester: Option<u32>,
    lessons: BTreeMap<usize, BTreeMap<u32, Vec<ScheduledLesson>>>,
    /// Recurrences that could not be placed, in processing order.
    pub unassignable: Vec<UnassignableLesson>,
    /// Unavailability windows applied so far, in application order.
    pub constraints: Vec<Unavailability>,
}

impl SemesterSchedule {
    /// Creates an empty schedule.
    pub fn new(semester: Option<u32>) -> Self {
        Self {
            semester,
            ..Self::default()
        }
    }

    /// Adds a lesson, keeping each week ordered by (date, slot).
    pub fn insert(&mut self, lesson: ScheduledLesson) {
        let week = self
            .lessons
            .entry(lesson.class)
            .or_default()
            .entry(lesson.week)
            .or_default();
        let at = week.partition_point(|l| (l.date, l.slot) <= (lesson.date, lesson.slot));
        week.insert(at, lesson);
    }

    /// Removes one lesson equal to `lesson`. Returns whether it was present.
    pub fn remove(&mut self, lesson: &ScheduledLesson) -> bool {
        let Some(weeks) = self.lessons.get_mut(&lesson.class) else {
            return false;
        };
        let Some(week) = weeks.get_mut(&lesson.week) else {
            return false;
        };
        let Some(pos) = week.iter().position(|l| l == lesson) else {
            return false;
        };
        week.remove(pos);
        if week.is_empty() {
            weeks.remove(&lesson.week);
        }
        if weeks.is_empty() {
            self.lessons.remove(&lesson.class);
        }
        true
    }

    /// Weekly lesson lists of one class, ordered by week.
    pub fn class_weeks(&self, class: usize) -> Option<&BTreeMap<u32, Vec<ScheduledLesson>>> {
        self.lessons.get(&class)
    }

    /// Lessons of one class in one week.
    pub fn week(&self, class: usize, week: u32) -> &[ScheduledLesson] {
        self.lessons
            .get(&class)
            .and_then(|w| w.get(&week))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every committed lesson, by class then week then (date, slot).
    pub fn lessons(&self) -> impl Iterator<Item = &ScheduledLesson> + '_ {
        self.lessons.values().flat_map(|w| w.values().flatten())
    }

    /// Number of committed lessons.
    pub fn len(&self) -> usize {
        self.lessons().count()
    }

    /// Whether nothing was committed.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Number of committed lessons the repair search moved.
    pub fn relocated_count(&self) -> usize {
        self.lessons().filter(|l| l.relocated).count()
    }

    /// Export views of every committed lesson.
    pub fn records(&self, data: &ScheduleData) -> Vec<LessonRecord> {
        self.lessons().map(|l| LessonRecord::new(data, l)).collect()
    }

    /// Export views grouped by lecturer id, each ordered by (date, slot).
    pub fn by_lecturer(&self, data: &ScheduleData) -> BTreeMap<String, Vec<LessonRecord>> {
        self.grouped(data, |l| data.lecturer(l.lecturer).id.clone())
    }

    /// Export views grouped by room id, each ordered by (date, slot).
    pub fn by_room(&self, data: &ScheduleData) -> BTreeMap<String, Vec<LessonRecord>> {
        self.grouped(data, |l| data.room(l.room).id.clone())
    }

    fn grouped<F>(&self, data: &ScheduleData, key: F) -> BTreeMap<String, Vec<LessonRecord>>
    where
        F: Fn(&ScheduledLesson) -> String,
    {
        let mut lessons: Vec<&ScheduledLesson> = self.lessons().collect();
        lessons.sort_by_key(|l| (l.date, l.slot, l.class));
        let mut groups: BTreeMap<String, Vec<LessonRecord>> = BTreeMap::new();
        for lesson in lessons {
            groups
                .entry(key(lesson))
                .or_default()
                .push(LessonRecord::new(data, lesson));
        }
        groups
    }
}
