//! Configurable genetic operators for timetabling.
//!
//! Provides runtime-selectable selection and crossover strategies via
//! [`GeneticOperators`]. Mutation strategies are drawn per gene by
//! [`Mutator`](super::Mutator).
//!
//! # Usage
//!
//! ```
//! use u_timetable::config::TimetableConfig;
//! use u_timetable::ga::operators::{CrossoverType, GeneticOperators, SelectionType};
//!
//! let ops = GeneticOperators::from_config(&TimetableConfig::default());
//! assert_eq!(ops.selection_type, SelectionType::Tournament);
//! assert_eq!(ops.crossover_type, CrossoverType::SinglePoint);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{single_point_crossover, uniform_crossover, Chromosome};
use super::selection::{roulette_select, tournament_select};
use crate::config::TimetableConfig;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    /// Best of `tournament_size` distinct individuals.
    #[default]
    Tournament,
    /// Fitness-proportionate over shifted fitness.
    Roulette,
}

/// Crossover strategy. Both exchange whole genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// One cut in `[1, len - 1]`, tails exchanged.
    #[default]
    SinglePoint,
    /// Independent per-position swap.
    Uniform,
}

/// Mutation strategy applied to a single gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Move the lesson to another free (day, slot), keeping resources.
    DaySlot,
    /// Swap in another free, suitable room.
    Room,
    /// Swap in another free, qualified lecturer.
    Lecturer,
}

impl MutationType {
    /// All strategies, drawn uniformly.
    pub const ALL: [MutationType; 3] = [
        MutationType::DaySlot,
        MutationType::Room,
        MutationType::Lecturer,
    ];
}

/// Runtime-selectable selection and crossover for the timetabling GA.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Selection strategy.
    pub selection_type: SelectionType,
    /// Tournament size (ignored by roulette).
    pub tournament_size: usize,
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Per-position swap probability for uniform crossover.
    pub swap_probability: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::from_config(&TimetableConfig::default())
    }
}

impl GeneticOperators {
    /// Reads the strategies from the configuration.
    pub fn from_config(config: &TimetableConfig) -> Self {
        Self {
            selection_type: config.selection,
            tournament_size: config.tournament_size,
            crossover_type: config.crossover,
            swap_probability: config.uniform_swap_probability.clamp(0.0, 1.0),
        }
    }

    /// Selects one parent; `None` only for an empty population.
    pub fn select<'p, R: Rng>(
        &self,
        population: &'p [Chromosome],
        rng: &mut R,
    ) -> Option<&'p Chromosome> {
        match self.selection_type {
            SelectionType::Tournament => tournament_select(population, self.tournament_size, rng),
            SelectionType::Roulette => roulette_select(population, rng),
        }
    }

    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &Chromosome,
        p2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        match self.crossover_type {
            CrossoverType::SinglePoint => single_point_crossover(p1, p2, rng),
            CrossoverType::Uniform => uniform_crossover(p1, p2, self.swap_probability, rng),
        }
    }
}
