//! Semester schedule quality metrics (KPIs).
//!
//! Computes placement and resource indicators from an expanded semester
//! schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement Rate | committed / (committed + unassignable) |
//! | Relocated | Lessons moved by the repair search |
//! | Lecturer Load | Committed lessons per lecturer |
//! | Room Utilization | Room lessons / (teaching dates × slots per day) |
//!
//! Teaching dates are the distinct dates holding at least one committed
//! lesson.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::ScheduleData;
use crate::expansion::SemesterSchedule;

/// Semester schedule performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Committed lessons.
    pub committed: usize,
    /// Recurrences that could not be placed.
    pub unassignable: usize,
    /// Fraction of recurrences committed (0.0..1.0).
    pub placement_rate: f64,
    /// Committed lessons that were moved by the repair search.
    pub relocated: usize,
    /// Committed lessons per lecturer id (every lecturer listed).
    pub lessons_by_lecturer: BTreeMap<String, usize>,
    /// Per-room utilization (0.0..1.0).
    pub utilization_by_room: BTreeMap<String, f64>,
    /// Mean room utilization.
    pub avg_utilization: f64,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule over its semester data.
    pub fn calculate(schedule: &SemesterSchedule, data: &ScheduleData) -> Self {
        let committed = schedule.len();
        let unassignable = schedule.unassignable.len();
        let attempted = committed + unassignable;
        let placement_rate = if attempted == 0 {
            1.0
        } else {
            committed as f64 / attempted as f64
        };

        let mut lecturer_counts = vec![0usize; data.lecturers().len()];
        let mut room_counts = vec![0usize; data.rooms().len()];
        let mut dates = BTreeSet::new();
        for lesson in schedule.lessons() {
            lecturer_counts[lesson.lecturer] += 1;
            room_counts[lesson.room] += 1;
            dates.insert(lesson.date);
        }

        let lessons_by_lecturer = data
            .lecturers()
            .iter()
            .zip(&lecturer_counts)
            .map(|(l, &n)| (l.id.clone(), n))
            .collect();

        let capacity = dates.len() * data.time_slots().len();
        let utilization_by_room: BTreeMap<String, f64> = data
            .rooms()
            .iter()
            .zip(&room_counts)
            .map(|(r, &n)| {
                let u = if capacity == 0 {
                    0.0
                } else {
                    n as f64 / capacity as f64
                };
                (r.id.clone(), u)
            })
            .collect();
        let avg_utilization = if utilization_by_room.is_empty() {
            0.0
        } else {
            utilization_by_room.values().sum::<f64>() / utilization_by_room.len() as f64
        };

        Self {
            committed,
            unassignable,
            placement_rate,
            relocated: schedule.relocated_count(),
            lessons_by_lecturer,
            utilization_by_room,
            avg_utilization,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_placement_rate: f64, min_utilization: f64) -> bool {
        self.placement_rate >= min_placement_rate && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimetableConfig;
    use crate::data::fixtures::sample_input;
    use crate::expansion::{ScheduledLesson, UnassignableLesson, UnassignableReason};
    use crate::models::LessonType;
    use chrono::NaiveDate;

    fn lesson(day: u32, slot: usize, lecturer: usize, room: usize, relocated: bool) -> ScheduledLesson {
        ScheduledLesson {
            unit: 0,
            class: 0,
            subject: 0,
            lesson_type: LessonType::Theory,
            week: 0,
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            day: 0,
            slot,
            lecturer,
            room,
            relocated,
        }
    }

    fn data() -> ScheduleData {
        ScheduleData::for_semester(&sample_input(), 1, &TimetableConfig::default()).unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        let data = data();
        let mut schedule = SemesterSchedule::new(Some(1));
        schedule.insert(lesson(1, 0, 0, 0, false));
        schedule.insert(lesson(1, 1, 0, 0, true));
        schedule.insert(lesson(2, 0, 1, 1, false));
        schedule.unassignable.push(UnassignableLesson::new(
            &data,
            0,
            3,
            UnassignableReason::NoAlternative { window: 3 },
        ));

        let kpi = ScheduleKpi::calculate(&schedule, &data);
        assert_eq!(kpi.committed, 3);
        assert_eq!(kpi.unassignable, 1);
        assert!((kpi.placement_rate - 0.75).abs() < 1e-10);
        assert_eq!(kpi.relocated, 1);
        assert_eq!(kpi.lessons_by_lecturer["L1"], 2);
        assert_eq!(kpi.lessons_by_lecturer["L2"], 1);

        // 2 teaching dates × 3 slots = 6 cells
        assert!((kpi.utilization_by_room["A1"] - 2.0 / 6.0).abs() < 1e-10);
        assert!((kpi.utilization_by_room["A2"] - 1.0 / 6.0).abs() < 1e-10);
        assert_eq!(kpi.utilization_by_room["LAB"], 0.0);
        assert!((kpi.avg_utilization - 0.5 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let data = data();
        let kpi = ScheduleKpi::calculate(&SemesterSchedule::new(Some(1)), &data);
        assert_eq!(kpi.committed, 0);
        assert!((kpi.placement_rate - 1.0).abs() < 1e-10);
        assert_eq!(kpi.avg_utilization, 0.0);
        assert_eq!(kpi.lessons_by_lecturer.len(), 2);
    }

    #[test]
    fn test_meets_thresholds() {
        let data = data();
        let mut schedule = SemesterSchedule::new(Some(1));
        schedule.insert(lesson(1, 0, 0, 0, false));
        schedule.unassignable.push(UnassignableLesson::new(
            &data,
            0,
            1,
            UnassignableReason::NoCandidates,
        ));

        let kpi = ScheduleKpi::calculate(&schedule, &data);
        assert!(kpi.meets_thresholds(0.5, 0.0));
        assert!(!kpi.meets_thresholds(0.51, 0.0));
        assert!(!kpi.meets_thresholds(0.0, 1.5));
    }
}
