//! Timetabling domain models.
//!
//! Raw reference data as supplied by the loader. These types are plain
//! records keyed by opaque string ids; cross-references (class → program →
//! semester → subjects) are resolved once in [`crate::data`].
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | Class | Task owner |
//! | Required lesson | Activity |
//! | Lecturer / Room | Resource |
//! | Time slot × day | Time bucket |

mod calendar;
mod input;
mod program;
mod resource;
mod subject;

pub use calendar::{lesson_date, parse_date, week_of, Day, TimeSlot, DATE_FORMAT};
pub use input::TimetableInput;
pub use program::{Class, Program, Semester};
pub use resource::{DatedBusySlot, Lecturer, Room, WeeklyBusySlot};
pub use subject::{LessonType, Subject};
