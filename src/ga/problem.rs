//! Timetabling GA problem definition.
//!
//! Bundles the data, configuration and operators the evolutionary loop
//! needs. Every method takes the random source explicitly, and the
//! problem itself is immutable, so one instance is shared by all rayon
//! workers of a generation.

use rand::Rng;

use super::chromosome::Chromosome;
use super::fitness::{Evaluation, FitnessEvaluator};
use super::initializer::PopulationInitializer;
use super::mutation::Mutator;
use super::operators::GeneticOperators;
use crate::config::TimetableConfig;
use crate::data::ScheduleData;

/// GA problem definition for one semester's weekly timetable.
///
/// # Example
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_timetable::config::TimetableConfig;
/// use u_timetable::data::ScheduleData;
/// use u_timetable::ga::TimetableProblem;
/// use u_timetable::models::TimetableInput;
///
/// let config = TimetableConfig::default();
/// let data = ScheduleData::from_input(&TimetableInput::default(), &config);
/// let problem = TimetableProblem::new(&data, &config);
/// let mut rng = SmallRng::seed_from_u64(1);
/// let individual = problem.create_individual(&mut rng);
/// assert!(individual.is_empty());
/// assert_eq!(problem.evaluate(&individual).fitness, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableProblem<'a> {
    data: &'a ScheduleData,
    config: &'a TimetableConfig,
    initializer: PopulationInitializer<'a>,
    evaluator: FitnessEvaluator<'a>,
    mutator: Mutator<'a>,
    operators: GeneticOperators,
    crossover_rate: f64,
}

impl<'a> TimetableProblem<'a> {
    /// Creates a problem from semester data and configuration.
    pub fn new(data: &'a ScheduleData, config: &'a TimetableConfig) -> Self {
        Self {
            data,
            config,
            initializer: PopulationInitializer::new(data),
            evaluator: FitnessEvaluator::new(data, config),
            mutator: Mutator::new(data, config.mutation_rate),
            operators: GeneticOperators::from_config(config),
            crossover_rate: config.crossover_rate.clamp(0.0, 1.0),
        }
    }

    /// Semester data.
    pub fn data(&self) -> &'a ScheduleData {
        self.data
    }

    /// Run configuration.
    pub fn config(&self) -> &'a TimetableConfig {
        self.config
    }

    /// Creates a greedy-random individual.
    pub fn create_individual<R: Rng>(&self, rng: &mut R) -> Chromosome {
        self.initializer.build(rng)
    }

    /// Evaluates an individual without touching its fitness cache.
    pub fn evaluate(&self, individual: &Chromosome) -> Evaluation {
        self.evaluator.evaluate(individual)
    }

    /// Recombines two parents into two children.
    pub fn crossover<R: Rng>(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        self.operators.crossover(parent1, parent2, rng)
    }

    /// Mutates an individual in place; returns the number of changed genes.
    pub fn mutate<R: Rng>(&self, individual: &mut Chromosome, rng: &mut R) -> usize {
        self.mutator.mutate(individual, rng)
    }

    /// Produces one child pair from a read-only population.
    ///
    /// Two parents are selected, recombined with probability
    /// `crossover_rate` clamped to [0, 1] (cloned otherwise) and both
    /// children mutated. Children come back unevaluated. `None` for an empty population.
    pub fn breed<R: Rng>(
        &self,
        population: &[Chromosome],
        rng: &mut R,
    ) -> Option<(Chromosome, Chromosome)> {
        let parent1 = self.operators.select(population, rng)?;
        let parent2 = self.operators.select(population, rng)?;

        let (mut child1, mut child2) = if rng.random_bool(self.crossover_rate) {
            self.crossover(parent1, parent2, rng)
        } else {
            (parent1.clone(), parent2.clone())
        };
        self.mutate(&mut child1, rng);
        self.mutate(&mut child2, rng);
        child1.reset_fitness();
        child2.reset_fitness();
        Some((child1, child2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_input;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_create_and_evaluate() {
        let config = TimetableConfig::default();
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let problem = TimetableProblem::new(&data, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        let ch = problem.create_individual(&mut rng);
        assert_eq!(ch.len(), data.units().len());
        let eval = problem.evaluate(&ch);
        assert!(eval.fitness.is_finite());
        // C2's practice units have no room large enough
        assert!(eval.fitness <= -3.0 * config.penalties.unassigned);
    }

    #[test]
    fn test_breed_produces_unevaluated_children() {
        let config = TimetableConfig::default();
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let problem = TimetableProblem::new(&data, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        let population: Vec<Chromosome> = (0..4)
            .map(|_| {
                let mut c = problem.create_individual(&mut rng);
                c.fitness = problem.evaluate(&c).fitness;
                c
            })
            .collect();
        let (a, b) = problem.breed(&population, &mut rng).unwrap();
        assert!(a.is_valid(&data));
        assert!(b.is_valid(&data));
        assert!(!a.is_evaluated());
        assert!(!b.is_evaluated());
        assert!(problem.breed(&[], &mut rng).is_none());
    }

    #[test]
    fn test_crossover_and_mutation_keep_layout() {
        let config = TimetableConfig::default()
            .with_mutation_rate(0.5)
            .with_crossover(crate::ga::operators::CrossoverType::Uniform);
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let problem = TimetableProblem::new(&data, &config);
        let mut rng = SmallRng::seed_from_u64(8);

        let p1 = problem.create_individual(&mut rng);
        let p2 = problem.create_individual(&mut rng);
        let (mut child, _) = problem.crossover(&p1, &p2, &mut rng);
        problem.mutate(&mut child, &mut rng);
        assert!(child.is_valid(&data));
    }
}
