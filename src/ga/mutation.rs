//! Per-gene mutation.
//!
//! Each gene is mutated with probability `mutation_rate` using a strategy
//! drawn uniformly from [`MutationType::ALL`]. The gene is released from
//! the chromosome's [`SlotUsage`] first, so every query sees only the
//! *other* genes, and re-inserted afterwards with whatever placement won.
//!
//! An unassigned gene has no resources to keep, so any strategy attempts a
//! full placement for it instead.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::chromosome::{Chromosome, Gene, GeneState, Placement, SlotUsage};
use super::initializer::place_unit;
use super::operators::MutationType;
use crate::data::ScheduleData;

/// Applies per-gene mutation against the rest of the chromosome.
#[derive(Debug, Clone)]
pub struct Mutator<'a> {
    data: &'a ScheduleData,
    rate: f64,
    pairs: Vec<(usize, usize)>,
}

impl<'a> Mutator<'a> {
    /// Creates a mutator with the given per-gene rate (clamped to [0, 1]).
    pub fn new(data: &'a ScheduleData, rate: f64) -> Self {
        Self {
            data,
            rate: rate.clamp(0.0, 1.0),
            pairs: data.day_slot_pairs(),
        }
    }

    /// Mutates genes in place; returns how many changed.
    ///
    /// Resets the fitness cache when anything changed.
    pub fn mutate<R: Rng>(&self, chromosome: &mut Chromosome, rng: &mut R) -> usize {
        if self.rate <= 0.0 || chromosome.is_empty() {
            return 0;
        }
        let mut usage = SlotUsage::from_genes(&chromosome.genes, self.data);
        let mut changed = 0;

        for i in 0..chromosome.genes.len() {
            if !rng.random_bool(self.rate) {
                continue;
            }
            let Some(&strategy) = MutationType::ALL.choose(rng) else {
                continue;
            };
            if self.mutate_gene(&mut chromosome.genes[i], strategy, &mut usage, rng) {
                changed += 1;
            }
        }

        if changed > 0 {
            chromosome.reset_fitness();
        }
        changed
    }

    /// Applies one strategy to one gene. Returns whether the gene changed.
    pub fn mutate_gene<R: Rng>(
        &self,
        gene: &mut Gene,
        strategy: MutationType,
        usage: &mut SlotUsage,
        rng: &mut R,
    ) -> bool {
        let class = self.data.unit(gene.unit).class;
        let current = match gene.state {
            GeneState::Assigned(p) => p,
            GeneState::Unassigned => {
                let mut pairs = self.pairs.clone();
                pairs.shuffle(rng);
                return match place_unit(gene.unit, self.data, usage, &pairs, rng) {
                    Some(p) => {
                        usage.insert(class, &p);
                        *gene = Gene::assigned(gene.unit, p);
                        true
                    }
                    None => false,
                };
            }
        };

        usage.remove(class, &current);
        let next = match strategy {
            MutationType::DaySlot => self.move_day_slot(gene.unit, &current, usage, rng),
            MutationType::Room => self.swap_room(gene.unit, &current, usage, rng),
            MutationType::Lecturer => self.swap_lecturer(gene.unit, &current, usage, rng),
        }
        .unwrap_or(current);
        usage.insert(class, &next);

        if next == current {
            return false;
        }
        gene.state = GeneState::Assigned(next);
        true
    }

    fn move_day_slot<R: Rng>(
        &self,
        unit: usize,
        p: &Placement,
        usage: &SlotUsage,
        rng: &mut R,
    ) -> Option<Placement> {
        let class = self.data.unit(unit).class;
        let mut pairs = self.pairs.clone();
        pairs.shuffle(rng);
        pairs
            .into_iter()
            .find(|&(day, slot)| {
                !usage.class_busy(day, slot, class)
                    && !usage.lecturer_busy(day, slot, p.lecturer)
                    && !usage.room_busy(day, slot, p.room)
                    && !self.data.is_weekly_busy(p.lecturer, day, slot)
            })
            .map(|(day, slot)| Placement { day, slot, ..*p })
    }

    fn swap_room<R: Rng>(
        &self,
        unit: usize,
        p: &Placement,
        usage: &SlotUsage,
        rng: &mut R,
    ) -> Option<Placement> {
        let free: Vec<usize> = self
            .data
            .unit(unit)
            .rooms
            .iter()
            .copied()
            .filter(|&r| !usage.room_busy(p.day, p.slot, r))
            .collect();
        free.choose(rng).map(|&room| Placement { room, ..*p })
    }

    fn swap_lecturer<R: Rng>(
        &self,
        unit: usize,
        p: &Placement,
        usage: &SlotUsage,
        rng: &mut R,
    ) -> Option<Placement> {
        let free: Vec<usize> = self
            .data
            .unit(unit)
            .lecturers
            .iter()
            .copied()
            .filter(|&l| {
                !usage.lecturer_busy(p.day, p.slot, l) && !self.data.is_weekly_busy(l, p.day, p.slot)
            })
            .collect();
        free.choose(rng).map(|&lecturer| Placement { lecturer, ..*p })
    }
}
