//! Semester orchestration and schedule metrics.
//!
//! [`TimetableScheduler`] ties the pipeline together: preprocessing, the
//! weekly GA, semester expansion with repair, and [`ScheduleKpi`].
//!
//! # Failure model
//!
//! Malformed configuration fails in [`TimetableScheduler::new`]. Once
//! constructed, a semester either yields a [`SemesterOutcome`] or a
//! [`SemesterFailure`](crate::error::SemesterFailure); one failing semester
//! never affects the others.

mod kpi;
mod semester;

pub use kpi::ScheduleKpi;
pub use semester::{semester_seed, SemesterOutcome, TimetableScheduler};
