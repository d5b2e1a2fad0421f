//! Weekly timetable optimization with a genetic algorithm.
//!
//! # Encoding
//!
//! One gene per weekly lesson unit, in canonical unit order. A gene holds
//! either a full (day, slot, lecturer, room) placement or nothing; the
//! fitness evaluator penalizes the latter.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable selection and crossover strategies
//!
//! # Reference
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

mod chromosome;
mod fitness;
mod initializer;
mod mutation;
pub mod operators;
mod problem;
mod runner;
mod selection;

pub use chromosome::{
    single_point_crossover, single_point_crossover_at, uniform_crossover, Chromosome, Gene,
    GeneState, Placement, SlotUsage, UNEVALUATED,
};
pub use fitness::{consecutive_excess, idle_gaps, Evaluation, FitnessEvaluator, ViolationKind};
pub use initializer::PopulationInitializer;
pub use mutation::Mutator;
pub use problem::TimetableProblem;
pub use runner::{Evolution, GaResult, GaRunner, GenerationLog};
pub use selection::{roulette_select, tournament_select};
