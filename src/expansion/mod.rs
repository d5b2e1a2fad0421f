//! Semester expansion and conflict resolution.
//!
//! Projects the best weekly chromosome onto every week of the semester and
//! commits the dated lessons one by one against an [`OccupancyMap`].
//! Lessons that clash with earlier commits or with date-specific
//! constraints go through a bounded repair search; lessons it cannot place
//! are reported, never dropped.
//!
//! # Algorithm
//!
//! 1. **Expand**: every gene recurs in the weeks its requirement's weekly
//!    distribution assigns to it, on the date of its weekday in that week.
//! 2. **Commit or repair**, in random order: commit if clear, otherwise
//!    search `repair_window_weeks` weeks from the lesson's own week for
//!    an alternative, same week first.
//!
//! The loop is sequential: every commit changes what the next clash check
//! sees.

mod expand;
mod occupancy;
mod repair;
mod resolver;
mod schedule;

pub use expand::{expand, recurrence_weeks, semester_start, Expansion, LessonInstance, Target};
pub use occupancy::{Cell, OccupancyMap};
pub use repair::{find_alternative, is_clear, RepairCandidate};
pub use resolver::{ConstraintUpdate, Reassignment, ResourceRef, SemesterResolver, Unavailability};
pub use schedule::{
    LessonRecord, ScheduledLesson, SemesterSchedule, UnassignableLesson, UnassignableReason,
};
