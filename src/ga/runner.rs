//! Generational driver.
//!
//! # Algorithm
//!
//! 1. Build and evaluate the initial population.
//! 2. Each step: carry the top `elitism_count` individuals unchanged, breed
//!    the rest pair by pair from the read-only current population,
//!    evaluate the children, sort by fitness descending and update the
//!    best-ever individual.
//! 3. Stop after `max_generations` steps. There is no early exit; callers
//!    that want one drive [`Evolution::step`] themselves or return
//!    `ControlFlow::Break` from an observer.
//!
//! # Reproducibility
//!
//! A single run RNG is seeded from `TimetableConfig::seed`. Breeding is
//! parallel, but every child pair gets its own `SmallRng` seeded from a
//! value drawn sequentially from the run RNG, so a fixed seed gives the
//! same result regardless of thread scheduling.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use log::debug;
use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use super::chromosome::Chromosome;
use super::fitness::{Evaluation, ViolationKind};
use super::problem::TimetableProblem;
use crate::config::TimetableConfig;
use crate::data::ScheduleData;

/// Progress record for one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationLog {
    /// Generation index (1-based; 0 is the initial population).
    pub generation: usize,
    /// Best fitness in this generation's population.
    pub best_fitness: f64,
    /// Best fitness seen so far.
    pub best_ever_fitness: f64,
    /// Violation breakdown of this generation's best individual.
    pub violations: BTreeMap<ViolationKind, usize>,
}

/// Result of a GA run.
#[derive(Debug, Clone, Serialize)]
pub struct GaResult {
    /// Best individual found over all generations.
    pub best: Chromosome,
    /// Evaluation of `best`.
    pub evaluation: Evaluation,
    /// Generations completed.
    pub generations: usize,
    /// One record per completed generation.
    pub log: Vec<GenerationLog>,
}

impl GaResult {
    /// Best fitness found.
    pub fn best_fitness(&self) -> f64 {
        self.best.fitness
    }
}

fn sort_descending(population: &mut [Chromosome]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// One running evolution.
///
/// Owns the population and the run RNG. Call [`step`](Self::step) until
/// [`is_finished`](Self::is_finished), then [`into_result`](Self::into_result).
pub struct Evolution<'a> {
    problem: TimetableProblem<'a>,
    rng: StdRng,
    population: Vec<Chromosome>,
    best: Chromosome,
    generation: usize,
    log: Vec<GenerationLog>,
}

impl<'a> Evolution<'a> {
    /// Builds and evaluates the initial population.
    ///
    /// The configuration is expected to be validated.
    pub fn new(data: &'a ScheduleData, config: &'a TimetableConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let problem = TimetableProblem::new(data, config);

        let mut population: Vec<Chromosome> = (0..config.population_size.max(1))
            .map(|_| problem.create_individual(&mut rng))
            .collect();
        Self::evaluate_all(&problem, &mut population);
        sort_descending(&mut population);

        let best = population
            .first()
            .cloned()
            .unwrap_or_else(|| Chromosome::new(Vec::new()));
        debug!(
            "initial population of {}: best fitness {:.2}",
            population.len(),
            best.fitness
        );

        Self {
            problem,
            rng,
            population,
            best,
            generation: 0,
            log: Vec::new(),
        }
    }

    fn evaluate_all(problem: &TimetableProblem<'_>, population: &mut [Chromosome]) {
        population
            .par_iter_mut()
            .filter(|c| !c.is_evaluated())
            .for_each(|c| c.fitness = problem.evaluate(c).fitness);
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Whether `max_generations` steps have run.
    pub fn is_finished(&self) -> bool {
        self.generation >= self.problem.config().max_generations
    }

    /// Current population, sorted by fitness descending.
    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    /// Best individual seen so far.
    pub fn best(&self) -> &Chromosome {
        &self.best
    }

    /// Records of completed generations.
    pub fn log(&self) -> &[GenerationLog] {
        &self.log
    }

    /// Runs one generation. Returns `None` once finished.
    pub fn step(&mut self) -> Option<&GenerationLog> {
        if self.is_finished() {
            return None;
        }
        let config = self.problem.config();
        let size = self.population.len();
        let elites = config.elitism_count.min(size);

        let mut next: Vec<Chromosome> = Vec::with_capacity(size);
        next.extend_from_slice(&self.population[..elites]);

        let remaining = size - elites;
        let seeds: Vec<u64> = (0..remaining.div_ceil(2))
            .map(|_| self.rng.random::<u64>())
            .collect();
        let problem = &self.problem;
        let parents = &self.population;
        let pairs: Vec<Option<(Chromosome, Chromosome)>> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut pair = problem.breed(parents, &mut rng)?;
                pair.0.fitness = problem.evaluate(&pair.0).fitness;
                pair.1.fitness = problem.evaluate(&pair.1).fitness;
                Some(pair)
            })
            .collect();

        for (first, second) in pairs.into_iter().flatten() {
            next.push(first);
            if next.len() < size {
                next.push(second);
            }
        }
        sort_descending(&mut next);
        self.population = next;
        self.generation += 1;

        let head = self.population.first()?;
        if head.fitness > self.best.fitness {
            self.best = head.clone();
        }
        let evaluation = self.problem.evaluate(head);
        debug!(
            "generation {}: best {:.2}, best ever {:.2}, hard violations {}",
            self.generation,
            head.fitness,
            self.best.fitness,
            evaluation.hard_violations()
        );
        self.log.push(GenerationLog {
            generation: self.generation,
            best_fitness: head.fitness,
            best_ever_fitness: self.best.fitness,
            violations: evaluation.violations,
        });
        self.log.last()
    }

    /// Consumes the evolution and returns the best-ever individual.
    pub fn into_result(self) -> GaResult {
        let evaluation = self.problem.evaluate(&self.best);
        GaResult {
            best: self.best,
            evaluation,
            generations: self.generation,
            log: self.log,
        }
    }
}

/// Runs the timetabling GA to completion.
///
/// # Example
/// ```
/// use u_timetable::config::TimetableConfig;
/// use u_timetable::data::ScheduleData;
/// use u_timetable::ga::GaRunner;
/// use u_timetable::models::TimetableInput;
///
/// let config = TimetableConfig::default()
///     .with_population_size(4)
///     .with_max_generations(3)
///     .with_seed(1);
/// let data = ScheduleData::from_input(&TimetableInput::default(), &config);
/// let result = GaRunner::run(&data, &config);
/// assert_eq!(result.generations, 3);
/// assert_eq!(result.log.len(), 3);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs `max_generations` generations.
    pub fn run(data: &ScheduleData, config: &TimetableConfig) -> GaResult {
        Self::run_with_observer(data, config, |_| ControlFlow::Continue(()))
    }

    /// Runs the GA, handing every generation record to `observer`.
    ///
    /// The observer may stop the run between generations.
    pub fn run_with_observer<F>(
        data: &ScheduleData,
        config: &TimetableConfig,
        mut observer: F,
    ) -> GaResult
    where
        F: FnMut(&GenerationLog) -> ControlFlow<()>,
    {
        let mut evolution = Evolution::new(data, config);
        while let Some(record) = evolution.step() {
            if observer(record).is_break() {
                break;
            }
        }
        evolution.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_input;
    use crate::models::{Class, Lecturer, Program, Room, Semester, Subject, TimeSlot, TimetableInput};

    fn config(seed: u64) -> TimetableConfig {
        TimetableConfig::default()
            .with_population_size(20)
            .with_max_generations(15)
            .with_seed(seed)
    }

    #[test]
    fn test_elitism_monotonic() {
        let config = config(42);
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let result = GaRunner::run(&data, &config);

        assert_eq!(result.generations, 15);
        assert_eq!(result.log.len(), 15);
        for pair in result.log.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
            assert!(pair[1].best_ever_fitness >= pair[0].best_ever_fitness);
        }
        assert_eq!(result.best_fitness(), result.evaluation.fitness);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let config = config(7);
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let a = GaRunner::run(&data, &config);
        let b = GaRunner::run(&data, &config);
        assert_eq!(a.best.genes, b.best.genes);
        assert_eq!(a.log, b.log);
    }

    #[test]
    fn test_odd_population_size_kept() {
        let config = config(3).with_population_size(7).with_elitism_count(2);
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let mut evolution = Evolution::new(&data, &config);
        while evolution.step().is_some() {
            assert_eq!(evolution.population().len(), 7);
        }
        assert!(evolution.is_finished());
        assert_eq!(evolution.generation(), 15);
    }

    #[test]
    fn test_observer_can_stop() {
        let config = config(5);
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let mut seen = 0;
        let result = GaRunner::run_with_observer(&data, &config, |log| {
            seen += 1;
            if log.generation == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, 4);
        assert_eq!(result.generations, 4);
    }

    #[test]
    fn test_out_of_range_rates_are_clamped() {
        let mut config = config(11)
            .with_max_generations(5)
            .with_crossover_rate(1.5)
            .with_mutation_rate(-0.2)
            .with_crossover(crate::ga::operators::CrossoverType::Uniform);
        config.uniform_swap_probability = 2.0;
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();

        let result = GaRunner::run(&data, &config);
        assert_eq!(result.generations, 5);
        assert!(result.best.is_valid(&data));

        config.crossover_rate = -1.0;
        config.uniform_swap_probability = -3.0;
        let result = GaRunner::run(&data, &config);
        assert_eq!(result.generations, 5);
    }

    #[test]
    fn test_shared_resources_converge_to_zero() {
        // Two classes, one lecturer, one room, one weekly lesson each
        let input = TimetableInput {
            classes: vec![Class::new("A", "P", 20), Class::new("B", "P", 20)],
            programs: vec![Program::new("P", 10)
                .with_semester(Semester::new(1).with_start_date("2025-09-01").with_subject("S"))],
            subjects: vec![Subject::new("S").with_theory_hours(10.0)],
            lecturers: vec![Lecturer::new("L").with_subject("S")],
            rooms: vec![Room::theory("R", 30)],
            time_slots: vec![TimeSlot::new("T1", 1), TimeSlot::new("T2", 2)],
            days: vec!["Monday".into(), "Tuesday".into()],
        };
        let config = config(11).with_max_generations(30);
        let data = ScheduleData::for_semester(&input, 1, &config).unwrap();
        let result = GaRunner::run(&data, &config);

        assert_eq!(result.best_fitness(), 0.0);
        let p: Vec<_> = result.best.genes.iter().filter_map(|g| g.placement()).collect();
        assert_eq!(p.len(), 2);
        assert_ne!((p[0].day, p[0].slot), (p[1].day, p[1].slot));
    }
}
