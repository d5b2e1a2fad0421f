//! Chromosome fitness evaluation.
//!
//! # Algorithm
//!
//! 1. Unassigned genes take the `unassigned` penalty and nothing else.
//! 2. Hard checks per assigned gene: lecturer/room/class double-booking
//!    (every gene beyond the first in a cell counts once), room type,
//!    room capacity, lecturer qualification, recurring lecturer busy slot,
//!    rest day.
//! 3. Soft checks over per-day slot-ordinal lists:
//!    - consecutive overrun, per excess slot, for lecturers and classes;
//!    - variance of a class's lessons per teaching day;
//!    - idle slots between a lecturer's lessons on one day.
//!
//! Fitness = −(total penalty); 0 is a perfect timetable. Evaluation is pure
//! and deterministic: ordered maps keep float accumulation order stable.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Chromosome;
use crate::config::TimetableConfig;
use crate::data::ScheduleData;

/// Violation category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Gene without placement.
    Unassigned,
    /// Lecturer double-booked.
    LecturerConflict,
    /// Room double-booked.
    RoomConflict,
    /// Class double-booked.
    ClassConflict,
    /// Room type differs from lesson type.
    RoomTypeMismatch,
    /// Room too small for the class.
    RoomCapacity,
    /// Lecturer not qualified for the subject.
    LecturerUnqualified,
    /// Lecturer on a recurring busy slot.
    LecturerBusy,
    /// Lesson on the rest day.
    RestDay,
    /// Lecturer teaching too many slots back to back.
    LecturerConsecutive,
    /// Class attending too many slots back to back.
    ClassConsecutive,
    /// Uneven spread of a class's lessons across days.
    DayDistribution,
    /// Idle slots between a lecturer's lessons.
    LecturerGap,
}

impl ViolationKind {
    /// Every category, hard ones first.
    pub const ALL: [ViolationKind; 13] = [
        ViolationKind::Unassigned,
        ViolationKind::LecturerConflict,
        ViolationKind::RoomConflict,
        ViolationKind::ClassConflict,
        ViolationKind::RoomTypeMismatch,
        ViolationKind::RoomCapacity,
        ViolationKind::LecturerUnqualified,
        ViolationKind::LecturerBusy,
        ViolationKind::RestDay,
        ViolationKind::LecturerConsecutive,
        ViolationKind::ClassConsecutive,
        ViolationKind::DayDistribution,
        ViolationKind::LecturerGap,
    ];

    /// Whether violating this makes a timetable infeasible.
    pub fn is_hard(&self) -> bool {
        !matches!(
            self,
            ViolationKind::LecturerConsecutive
                | ViolationKind::ClassConsecutive
                | ViolationKind::DayDistribution
                | ViolationKind::LecturerGap
        )
    }

    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Unassigned => "unassigned",
            ViolationKind::LecturerConflict => "lecturer_conflict",
            ViolationKind::RoomConflict => "room_conflict",
            ViolationKind::ClassConflict => "class_conflict",
            ViolationKind::RoomTypeMismatch => "room_type_mismatch",
            ViolationKind::RoomCapacity => "room_capacity",
            ViolationKind::LecturerUnqualified => "lecturer_unqualified",
            ViolationKind::LecturerBusy => "lecturer_busy",
            ViolationKind::RestDay => "rest_day",
            ViolationKind::LecturerConsecutive => "lecturer_consecutive",
            ViolationKind::ClassConsecutive => "class_consecutive",
            ViolationKind::DayDistribution => "day_distribution",
            ViolationKind::LecturerGap => "lecturer_gap",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one chromosome.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    /// Negated total penalty (0 = perfect).
    pub fitness: f64,
    /// Total penalty.
    pub penalty: f64,
    /// Occurrences per category (absent = 0).
    pub violations: BTreeMap<ViolationKind, usize>,
}

impl Evaluation {
    /// Occurrences of one category.
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.get(&kind).copied().unwrap_or(0)
    }

    /// Occurrences of all hard categories.
    pub fn hard_violations(&self) -> usize {
        self.violations
            .iter()
            .filter(|(k, _)| k.is_hard())
            .map(|(_, n)| n)
            .sum()
    }

    /// Whether no hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.hard_violations() == 0
    }

    fn add(&mut self, kind: ViolationKind, occurrences: usize, penalty: f64) {
        if occurrences == 0 && penalty == 0.0 {
            return;
        }
        *self.violations.entry(kind).or_insert(0) += occurrences;
        self.penalty += penalty;
    }
}

/// Scores chromosomes against hard and soft constraints.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator<'a> {
    data: &'a ScheduleData,
    config: &'a TimetableConfig,
}

impl<'a> FitnessEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(data: &'a ScheduleData, config: &'a TimetableConfig) -> Self {
        Self { data, config }
    }

    /// Evaluates a chromosome. Does not touch its fitness cache.
    pub fn evaluate(&self, chromosome: &Chromosome) -> Evaluation {
        let weights = &self.config.penalties;
        let mut eval = Evaluation::default();

        let mut lecturer_cells: HashMap<(usize, usize, usize), u32> = HashMap::new();
        let mut room_cells: HashMap<(usize, usize, usize), u32> = HashMap::new();
        let mut class_cells: HashMap<(usize, usize, usize), u32> = HashMap::new();
        let mut lecturer_days: BTreeMap<(usize, usize), Vec<u32>> = BTreeMap::new();
        let mut class_days: BTreeMap<(usize, usize), Vec<u32>> = BTreeMap::new();

        for gene in &chromosome.genes {
            let Some(p) = gene.placement() else {
                eval.add(ViolationKind::Unassigned, 1, weights.unassigned);
                continue;
            };
            let unit = self.data.unit(gene.unit);

            if seen_before(&mut lecturer_cells, (p.day, p.slot, p.lecturer)) {
                eval.add(ViolationKind::LecturerConflict, 1, weights.lecturer_conflict);
            }
            if seen_before(&mut room_cells, (p.day, p.slot, p.room)) {
                eval.add(ViolationKind::RoomConflict, 1, weights.room_conflict);
            }
            if seen_before(&mut class_cells, (p.day, p.slot, unit.class)) {
                eval.add(ViolationKind::ClassConflict, 1, weights.class_conflict);
            }

            let room = self.data.room(p.room);
            if room.room_type != unit.lesson_type {
                eval.add(ViolationKind::RoomTypeMismatch, 1, weights.room_type_mismatch);
            }
            if room.capacity < unit.class_size {
                eval.add(ViolationKind::RoomCapacity, 1, weights.room_capacity);
            }
            if !self.data.is_qualified(p.lecturer, unit.subject) {
                eval.add(ViolationKind::LecturerUnqualified, 1, weights.lecturer_unqualified);
            }
            if self.data.is_weekly_busy(p.lecturer, p.day, p.slot) {
                eval.add(ViolationKind::LecturerBusy, 1, weights.lecturer_busy);
            }
            if self.data.day(p.day).is_rest_day(self.config.rest_day) {
                eval.add(ViolationKind::RestDay, 1, weights.rest_day);
            }

            let order = self.data.slot_order(p.slot);
            lecturer_days.entry((p.lecturer, p.day)).or_default().push(order);
            class_days.entry((unit.class, p.day)).or_default().push(order);
        }

        let max_run = self.config.max_consecutive_slots;
        for orders in lecturer_days.values_mut() {
            orders.sort_unstable();
            let excess = consecutive_excess(orders, max_run);
            eval.add(
                ViolationKind::LecturerConsecutive,
                excess,
                weights.lecturer_consecutive * excess as f64,
            );
            let gaps = idle_gaps(orders);
            eval.add(ViolationKind::LecturerGap, gaps, weights.lecturer_gap * gaps as f64);
        }

        let mut per_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for ((class, _), orders) in class_days.iter_mut() {
            orders.sort_unstable();
            let excess = consecutive_excess(orders, max_run);
            eval.add(
                ViolationKind::ClassConsecutive,
                excess,
                weights.class_consecutive * excess as f64,
            );
            per_class.entry(*class).or_default().push(orders.len());
        }
        for counts in per_class.values() {
            let var = variance(counts);
            if var > 0.0 {
                eval.add(ViolationKind::DayDistribution, 1, weights.day_distribution * var);
            }
        }

        eval.fitness = if eval.penalty > 0.0 { -eval.penalty } else { 0.0 };
        eval
    }
}

/// Records a cell and reports whether another gene already held it.
fn seen_before(cells: &mut HashMap<(usize, usize, usize), u32>, key: (usize, usize, usize)) -> bool {
    let count = cells.entry(key).or_insert(0);
    *count += 1;
    *count > 1
}

/// Slots beyond `max_run` summed over maximal runs of contiguous ordinals.
///
/// `sorted` must be ascending. Ordinals are contiguous iff they differ by 1.
pub fn consecutive_excess(sorted: &[u32], max_run: usize) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    let mut excess = 0;
    let mut run: usize = 1;
    for pair in sorted.windows(2) {
        if pair[1] == pair[0] + 1 {
            run += 1;
        } else {
            excess += run.saturating_sub(max_run);
            run = 1;
        }
    }
    excess + run.saturating_sub(max_run)
}

/// Idle slots between consecutive entries of an ascending ordinal list.
pub fn idle_gaps(sorted: &[u32]) -> usize {
    sorted
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]).saturating_sub(1) as usize)
        .sum()
}

/// Population variance.
fn variance(values: &[usize]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
