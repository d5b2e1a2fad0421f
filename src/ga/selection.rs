//! Parent selection.
//!
//! Both strategies read an evaluated population and never modify it, so a
//! generation's parents can be drawn concurrently from the same slice.

use rand::seq::index::sample;
use rand::Rng;

use super::Chromosome;

/// Added to every shifted fitness so the worst individual keeps a chance.
const ROULETTE_EPSILON: f64 = 1e-6;

/// Tournament selection: samples `k` distinct individuals and returns the
/// fittest. `k` is clamped to the population size.
///
/// Returns `None` for an empty population.
pub fn tournament_select<'a, R: Rng>(
    population: &'a [Chromosome],
    k: usize,
    rng: &mut R,
) -> Option<&'a Chromosome> {
    if population.is_empty() {
        return None;
    }
    let k = k.clamp(1, population.len());
    sample(rng, population.len(), k)
        .into_iter()
        .map(|i| &population[i])
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}

/// Roulette-wheel selection over fitness shifted so the minimum is ~0.
///
/// Falls back to a uniform pick when every individual has the same fitness
/// or the population holds non-finite values.
pub fn roulette_select<'a, R: Rng>(
    population: &'a [Chromosome],
    rng: &mut R,
) -> Option<&'a Chromosome> {
    if population.is_empty() {
        return None;
    }
    let min = population
        .iter()
        .map(|c| c.fitness)
        .fold(f64::INFINITY, f64::min);
    let weights: Vec<f64> = population
        .iter()
        .map(|c| c.fitness - min + ROULETTE_EPSILON)
        .collect();
    let total: f64 = weights.iter().sum();

    let spread = total - ROULETTE_EPSILON * population.len() as f64;
    if !total.is_finite() || spread <= ROULETTE_EPSILON {
        return Some(&population[rng.random_range(0..population.len())]);
    }

    let point = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (chromosome, weight) in population.iter().zip(&weights) {
        cumulative += weight;
        if cumulative > point {
            return Some(chromosome);
        }
    }
    population.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn population(fitness: &[f64]) -> Vec<Chromosome> {
        fitness
            .iter()
            .map(|&f| {
                let mut c = Chromosome::new(Vec::new());
                c.fitness = f;
                c
            })
            .collect()
    }

    #[test]
    fn test_empty_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(tournament_select(&[], 3, &mut rng).is_none());
        assert!(roulette_select(&[], &mut rng).is_none());
    }

    #[test]
    fn test_full_tournament_returns_best() {
        let pop = population(&[-30.0, -5.0, -12.0, -100.0]);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            // k >= len samples everyone
            let winner = tournament_select(&pop, 10, &mut rng).unwrap();
            assert_eq!(winner.fitness, -5.0);
        }
    }

    #[test]
    fn test_tournament_of_one_is_uniform() {
        let pop = population(&[-1.0, -2.0, -3.0]);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let f = tournament_select(&pop, 1, &mut rng).unwrap().fitness;
            seen[(-f) as usize - 1] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_roulette_favours_fitter() {
        let pop = population(&[-1000.0, 0.0]);
        let mut rng = SmallRng::seed_from_u64(42);
        let best = (0..500)
            .filter(|_| roulette_select(&pop, &mut rng).unwrap().fitness == 0.0)
            .count();
        assert!(best > 450);
    }

    #[test]
    fn test_roulette_identical_fitness_falls_back() {
        let pop = population(&[-7.0, -7.0, -7.0]);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            assert!(roulette_select(&pop, &mut rng).is_some());
        }
    }

    #[test]
    fn test_roulette_unevaluated_falls_back() {
        let pop = population(&[f64::NEG_INFINITY, -1.0]);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(roulette_select(&pop, &mut rng).is_some());
    }
}
