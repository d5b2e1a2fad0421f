//! Bounded repair search.
//!
//! # Algorithm
//!
//! For weeks `week .. min(week + window, duration)`: shuffle days, slots,
//! lecturers and rooms, and collect every (date, slot, lecturer, room)
//! tuple that passes [`is_clear`], stopping once `max_candidates` have been
//! collected. A random same-week candidate wins if any exist; otherwise a
//! random candidate from a later week.

use chrono::NaiveDate;
use log::trace;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::occupancy::OccupancyMap;
use crate::config::ExpansionConfig;
use crate::data::ScheduleData;
use crate::models::lesson_date;

/// A valid alternative for a conflicting lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairCandidate {
    /// Semester week.
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
}

/// Hard-constraint check shared by commit and repair: class, lecturer and
/// room not committed elsewhere, no external block, and the lecturer not
/// on a recurring busy slot.
#[allow(clippy::too_many_arguments)]
pub fn is_clear(
    data: &ScheduleData,
    occupancy: &OccupancyMap,
    class: usize,
    date: NaiveDate,
    day: usize,
    slot: usize,
    lecturer: usize,
    room: usize,
) -> bool {
    !occupancy.class_reserved(date, slot, class)
        && occupancy.lecturer_free(date, slot, lecturer)
        && occupancy.room_free(date, slot, room)
        && !data.is_weekly_busy(lecturer, day, slot)
        && !data.is_dated_busy(lecturer, date, slot)
}

/// Searches an alternative placement for `unit` starting at `week`.
///
/// Returns `None` when the window holds no valid tuple.
pub fn find_alternative<R: Rng>(
    data: &ScheduleData,
    occupancy: &OccupancyMap,
    config: &ExpansionConfig,
    unit: usize,
    start: NaiveDate,
    week: u32,
    rng: &mut R,
) -> Option<RepairCandidate> {
    let lesson = data.unit(unit);
    if lesson.lecturers.is_empty() || lesson.rooms.is_empty() {
        return None;
    }
    let duration = data.requirement(lesson.requirement).duration_weeks;
    let end = week.saturating_add(config.repair_window_weeks).min(duration);
    let cap = config.max_repair_candidates.max(1);

    let mut days = data.assignable_days().to_vec();
    let mut slots: Vec<usize> = (0..data.time_slots().len()).collect();
    let mut lecturers = lesson.lecturers.clone();
    let mut rooms = lesson.rooms.clone();
    let mut candidates: Vec<RepairCandidate> = Vec::new();

    'search: for w in week..end {
        days.shuffle(rng);
        for &day in &days {
            let Some(weekday) = data.day(day).weekday else {
                continue;
            };
            let Some(date) = lesson_date(start, w, weekday) else {
                continue;
            };
            slots.shuffle(rng);
            for &slot in &slots {
                if occupancy.class_reserved(date, slot, lesson.class) {
                    continue;
                }
                lecturers.shuffle(rng);
                rooms.shuffle(rng);
                for &lecturer in &lecturers {
                    for &room in &rooms {
                        if !is_clear(data, occupancy, lesson.class, date, day, slot, lecturer, room) {
                            continue;
                        }
                        candidates.push(RepairCandidate {
                            week: w,
                            date,
                            day,
                            slot,
                            lecturer,
                            room,
                        });
                        if candidates.len() >= cap {
                            break 'search;
                        }
                    }
                }
            }
        }
    }

    let same_week: Vec<&RepairCandidate> = candidates.iter().filter(|c| c.week == week).collect();
    let chosen = match same_week.choose(rng) {
        Some(&c) => Some(*c),
        None => candidates.choose(rng).copied(),
    };
    trace!(
        "repair {} from week {}: {} candidates, chose {:?}",
        data.describe_unit(unit),
        week,
        candidates.len(),
        chosen.map(|c| (c.date, c.slot))
    );
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimetableConfig;
    use crate::models::{Class, Lecturer, Program, Room, Semester, Subject, TimeSlot, TimetableInput};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn data(weeks: u32) -> ScheduleData {
        let input = TimetableInput {
            classes: vec![Class::new("C1", "P", 20)],
            programs: vec![Program::new("P", weeks)
                .with_semester(Semester::new(1).with_start_date("2025-09-01").with_subject("S"))],
            subjects: vec![Subject::new("S").with_theory_hours(f64::from(weeks))],
            lecturers: vec![
                Lecturer::new("L1").with_subject("S"),
                Lecturer::new("L2").with_subject("S").with_busy_slot("Tuesday", "T1"),
            ],
            rooms: vec![Room::theory("R1", 30), Room::theory("R2", 30)],
            time_slots: vec![TimeSlot::new("T1", 1), TimeSlot::new("T2", 2)],
            days: vec!["Monday".into(), "Tuesday".into()],
        };
        ScheduleData::for_semester(&input, 1, &TimetableConfig::default()).unwrap()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_candidate_is_clear() {
        let data = data(4);
        let config = ExpansionConfig::default();
        let mut occ = OccupancyMap::from_data(&data);
        // Fill most of week 1
        occ.reserve(start(), 0, 0, 0, 0);
        occ.block_lecturer(start(), 1, 1);
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let c = find_alternative(&data, &occ, &config, 0, start(), 0, &mut rng).unwrap();
            assert!(is_clear(&data, &occ, 0, c.date, c.day, c.slot, c.lecturer, c.room));
            assert_eq!(c.week, 0);
            assert_eq!(lesson_date(start(), c.week, data.day(c.day).weekday.unwrap()), Some(c.date));
        }
    }

    #[test]
    fn test_prefers_same_week() {
        let data = data(4);
        let config = ExpansionConfig::default();
        let occ = OccupancyMap::new();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            let c = find_alternative(&data, &occ, &config, 0, start(), 1, &mut rng).unwrap();
            assert_eq!(c.week, 1);
        }
    }

    #[test]
    fn test_falls_back_to_later_week() {
        let data = data(4);
        let config = ExpansionConfig::default();
        let mut occ = OccupancyMap::new();
        // Class busy in every cell of week 0
        for date in [start(), start().succ_opt().unwrap()] {
            for slot in 0..2 {
                occ.reserve(date, slot, 9, 9, 0);
            }
        }
        let mut rng = SmallRng::seed_from_u64(2);
        let c = find_alternative(&data, &occ, &config, 0, start(), 0, &mut rng).unwrap();
        assert!(c.week > 0 && c.week < 3);
    }

    #[test]
    fn test_window_exhausted() {
        let data = data(2);
        let config = ExpansionConfig::default();
        let mut occ = OccupancyMap::new();
        for week in 0..2 {
            for day in [start(), start().succ_opt().unwrap()] {
                let date = day + chrono::Days::new(7 * week);
                for slot in 0..2 {
                    occ.block_room(date, slot, 0);
                    occ.block_room(date, slot, 1);
                }
            }
        }
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(find_alternative(&data, &occ, &config, 0, start(), 0, &mut rng).is_none());
    }

    #[test]
    fn test_candidate_cap() {
        let data = data(4);
        let config = ExpansionConfig {
            repair_window_weeks: 3,
            max_repair_candidates: 1,
        };
        let occ = OccupancyMap::new();
        let mut rng = SmallRng::seed_from_u64(4);
        let c = find_alternative(&data, &occ, &config, 0, start(), 2, &mut rng).unwrap();
        assert_eq!(c.week, 2);
    }

    #[test]
    fn test_recurring_busy_slot_never_chosen() {
        let data = data(4);
        let config = ExpansionConfig::default();
        let occ = OccupancyMap::new();
        let tuesday = data.day_idx("Tuesday").unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let c = find_alternative(&data, &occ, &config, 0, start(), 0, &mut rng).unwrap();
            assert!(!(c.lecturer == 1 && c.day == tuesday && c.slot == 0));
        }
    }
}
