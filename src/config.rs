//! Run configuration.
//!
//! A single immutable [`TimetableConfig`] is threaded into the data
//! builder, the GA operators, the fitness evaluator and the semester
//! resolver. Every field has a default, so a partial JSON/TOML document
//! deserializes into a usable configuration.
//!
//! ```
//! use u_timetable::config::TimetableConfig;
//!
//! let config = TimetableConfig::default()
//!     .with_population_size(60)
//!     .with_max_generations(150)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! ```

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};
use crate::ga::operators::{CrossoverType, SelectionType};
use crate::ga::ViolationKind;

/// Configuration for one timetabling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations to run (no early exit).
    pub max_generations: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Probability that a parent pair is recombined rather than cloned.
    pub crossover_rate: f64,
    /// Individuals carried unchanged into the next generation.
    pub elitism_count: usize,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    /// Parent selection strategy.
    pub selection: SelectionType,
    /// Crossover strategy.
    pub crossover: CrossoverType,
    /// Per-position swap probability for uniform crossover.
    pub uniform_swap_probability: f64,
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Teaching hours represented by one slot.
    pub hours_per_slot: f64,
    /// Longest run of back-to-back slots before the overrun penalty applies.
    pub max_consecutive_slots: usize,
    /// Day of the week on which no lesson may take place.
    pub rest_day: Weekday,
    /// Penalty weight per violation category.
    pub penalties: PenaltyWeights,
    /// Semester expansion settings.
    pub expansion: ExpansionConfig,
}

/// Penalty weight per violation category.
///
/// Hard-constraint weights should dominate the soft ones so that any
/// feasible timetable outranks any infeasible one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Gene without day, slot, lecturer or room.
    pub unassigned: f64,
    /// Lecturer teaching two lessons in the same cell.
    pub lecturer_conflict: f64,
    /// Room hosting two lessons in the same cell.
    pub room_conflict: f64,
    /// Class attending two lessons in the same cell.
    pub class_conflict: f64,
    /// Room type differs from the lesson type.
    pub room_type_mismatch: f64,
    /// Room smaller than the class.
    pub room_capacity: f64,
    /// Lecturer not qualified for the subject.
    pub lecturer_unqualified: f64,
    /// Lecturer placed on one of their recurring busy slots.
    pub lecturer_busy: f64,
    /// Lesson placed on the rest day.
    pub rest_day: f64,
    /// Per slot beyond the consecutive maximum, for lecturers.
    pub lecturer_consecutive: f64,
    /// Per slot beyond the consecutive maximum, for classes.
    pub class_consecutive: f64,
    /// Multiplied by the variance of a class's lessons per day.
    pub day_distribution: f64,
    /// Per idle slot between two lessons of a lecturer on one day.
    pub lecturer_gap: f64,
}

/// Semester expansion and repair settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Weeks searched by the repair, starting at the lesson's own week.
    pub repair_window_weeks: u32,
    /// Valid candidates collected before the repair stops searching.
    pub max_repair_candidates: usize,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 200,
            mutation_rate: 0.05,
            crossover_rate: 0.8,
            elitism_count: 2,
            tournament_size: 3,
            selection: SelectionType::Tournament,
            crossover: CrossoverType::SinglePoint,
            uniform_swap_probability: 0.5,
            seed: None,
            hours_per_slot: 1.0,
            max_consecutive_slots: 4,
            rest_day: Weekday::Sun,
            penalties: PenaltyWeights::default(),
            expansion: ExpansionConfig::default(),
        }
    }
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            unassigned: 1000.0,
            lecturer_conflict: 1000.0,
            room_conflict: 1000.0,
            class_conflict: 1000.0,
            room_type_mismatch: 500.0,
            room_capacity: 500.0,
            lecturer_unqualified: 1000.0,
            lecturer_busy: 800.0,
            rest_day: 1000.0,
            lecturer_consecutive: 10.0,
            class_consecutive: 10.0,
            day_distribution: 5.0,
            lecturer_gap: 2.0,
        }
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            repair_window_weeks: 3,
            max_repair_candidates: 1000,
        }
    }
}

impl PenaltyWeights {
    /// Weight of one occurrence of `kind`.
    pub fn weight(&self, kind: ViolationKind) -> f64 {
        match kind {
            ViolationKind::Unassigned => self.unassigned,
            ViolationKind::LecturerConflict => self.lecturer_conflict,
            ViolationKind::RoomConflict => self.room_conflict,
            ViolationKind::ClassConflict => self.class_conflict,
            ViolationKind::RoomTypeMismatch => self.room_type_mismatch,
            ViolationKind::RoomCapacity => self.room_capacity,
            ViolationKind::LecturerUnqualified => self.lecturer_unqualified,
            ViolationKind::LecturerBusy => self.lecturer_busy,
            ViolationKind::RestDay => self.rest_day,
            ViolationKind::LecturerConsecutive => self.lecturer_consecutive,
            ViolationKind::ClassConsecutive => self.class_consecutive,
            ViolationKind::DayDistribution => self.day_distribution,
            ViolationKind::LecturerGap => self.lecturer_gap,
        }
    }
}

impl TimetableConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elitism_count(mut self, count: usize) -> Self {
        self.elitism_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: SelectionType) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the crossover strategy.
    pub fn with_crossover(mut self, crossover: CrossoverType) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the hours represented by one slot.
    pub fn with_hours_per_slot(mut self, hours: f64) -> Self {
        self.hours_per_slot = hours;
        self
    }

    /// Sets the consecutive-slot maximum.
    pub fn with_max_consecutive_slots(mut self, slots: usize) -> Self {
        self.max_consecutive_slots = slots;
        self
    }

    /// Sets the rest day.
    pub fn with_rest_day(mut self, day: Weekday) -> Self {
        self.rest_day = day;
        self
    }

    /// Sets the penalty weights.
    pub fn with_penalties(mut self, penalties: PenaltyWeights) -> Self {
        self.penalties = penalties;
        self
    }

    /// Sets the expansion settings.
    pub fn with_expansion(mut self, expansion: ExpansionConfig) -> Self {
        self.expansion = expansion;
        self
    }

    /// Checks every value is usable; fails on the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(TimetableError::config("population_size", "must be at least 1"));
        }
        if self.elitism_count > self.population_size {
            return Err(TimetableError::config(
                "elitism_count",
                format!("{} exceeds population size {}", self.elitism_count, self.population_size),
            ));
        }
        if self.tournament_size == 0 {
            return Err(TimetableError::config("tournament_size", "must be at least 1"));
        }
        for (field, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("uniform_swap_probability", self.uniform_swap_probability),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(TimetableError::config(field, format!("{rate} is outside [0, 1]")));
            }
        }
        if !(self.hours_per_slot.is_finite() && self.hours_per_slot > 0.0) {
            return Err(TimetableError::config("hours_per_slot", "must be positive"));
        }
        if self.max_consecutive_slots == 0 {
            return Err(TimetableError::config("max_consecutive_slots", "must be at least 1"));
        }
        if self.expansion.repair_window_weeks == 0 {
            return Err(TimetableError::config(
                "expansion.repair_window_weeks",
                "must be at least 1",
            ));
        }
        if self.expansion.max_repair_candidates == 0 {
            return Err(TimetableError::config(
                "expansion.max_repair_candidates",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
