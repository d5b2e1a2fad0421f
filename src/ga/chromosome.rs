//! Weekly timetable chromosome.
//!
//! # Encoding
//!
//! One gene per weekly lesson unit, stored in canonical unit order: gene
//! `i` always schedules `ScheduleData::unit(i)`. Randomization only
//! changes the *processing* order of operators, never the layout, so
//! positional crossover always exchanges the same lesson between parents.
//!
//! A gene is either [`GeneState::Assigned`] with a full
//! (day, slot, lecturer, room) placement or [`GeneState::Unassigned`].
//!
//! Higher fitness = better (fitness is the negated penalty).

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;

use crate::data::ScheduleData;

/// Fitness of a chromosome that has not been evaluated yet.
pub const UNEVALUATED: f64 = f64::NEG_INFINITY;

/// A concrete weekly placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Placement {
    /// Day index.
    pub day: usize,
    /// Slot index.
    pub slot: usize,
    /// Lecturer index.
    pub lecturer: usize,
    /// Room index.
    pub room: usize,
}

/// Whether a gene found resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneState {
    /// Fully placed.
    Assigned(Placement),
    /// No valid combination was found; penalized by fitness.
    Unassigned,
}

/// One scheduled weekly lesson instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gene {
    /// Lesson unit index (class, subject, type, program, group).
    pub unit: usize,
    /// Placement state.
    pub state: GeneState,
}

impl Gene {
    /// Creates an unassigned gene.
    pub fn unassigned(unit: usize) -> Self {
        Self {
            unit,
            state: GeneState::Unassigned,
        }
    }

    /// Creates an assigned gene.
    pub fn assigned(unit: usize, placement: Placement) -> Self {
        Self {
            unit,
            state: GeneState::Assigned(placement),
        }
    }

    /// Placement, if assigned.
    #[inline]
    pub fn placement(&self) -> Option<&Placement> {
        match &self.state {
            GeneState::Assigned(p) => Some(p),
            GeneState::Unassigned => None,
        }
    }

    /// Whether the gene is assigned.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        matches!(self.state, GeneState::Assigned(_))
    }
}

/// A full-week candidate timetable for one semester.
#[derive(Debug, Clone, Serialize)]
pub struct Chromosome {
    /// Genes in canonical unit order.
    pub genes: Vec<Gene>,
    /// Cached fitness ([`UNEVALUATED`] until evaluated).
    pub fitness: f64,
}

impl Chromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: UNEVALUATED,
        }
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether there are no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether the fitness cache holds a value.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness != UNEVALUATED
    }

    /// Invalidates the fitness cache.
    #[inline]
    pub fn reset_fitness(&mut self) {
        self.fitness = UNEVALUATED;
    }

    /// Number of unassigned genes.
    pub fn unassigned_count(&self) -> usize {
        self.genes.iter().filter(|g| !g.is_assigned()).count()
    }

    /// Whether the gene layout matches the data's lesson units.
    pub fn is_valid(&self, data: &ScheduleData) -> bool {
        self.genes.len() == data.units().len()
            && self.genes.iter().enumerate().all(|(i, g)| g.unit == i)
    }
}

type CellKey = (usize, usize, usize);

/// Per-chromosome occupancy of weekly cells.
///
/// Counts how many genes hold each (day, slot, lecturer), (day, slot, room)
/// and (day, slot, class). Operators remove a gene before querying so that
/// "busy" means busy with *another* gene.
#[derive(Debug, Clone, Default)]
pub struct SlotUsage {
    lecturers: HashMap<CellKey, u32>,
    rooms: HashMap<CellKey, u32>,
    classes: HashMap<CellKey, u32>,
}

fn bump(map: &mut HashMap<CellKey, u32>, key: CellKey) {
    *map.entry(key).or_insert(0) += 1;
}

fn drop_one(map: &mut HashMap<CellKey, u32>, key: CellKey) {
    if let Some(count) = map.get_mut(&key) {
        *count -= 1;
        if *count == 0 {
            map.remove(&key);
        }
    }
}

impl SlotUsage {
    /// Creates an empty usage index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every assigned gene.
    pub fn from_genes(genes: &[Gene], data: &ScheduleData) -> Self {
        let mut usage = Self::new();
        for gene in genes {
            if let Some(p) = gene.placement() {
                usage.insert(data.unit(gene.unit).class, p);
            }
        }
        usage
    }

    /// Reserves a placement for a class.
    pub fn insert(&mut self, class: usize, p: &Placement) {
        bump(&mut self.lecturers, (p.day, p.slot, p.lecturer));
        bump(&mut self.rooms, (p.day, p.slot, p.room));
        bump(&mut self.classes, (p.day, p.slot, class));
    }

    /// Releases a placement previously inserted.
    pub fn remove(&mut self, class: usize, p: &Placement) {
        drop_one(&mut self.lecturers, (p.day, p.slot, p.lecturer));
        drop_one(&mut self.rooms, (p.day, p.slot, p.room));
        drop_one(&mut self.classes, (p.day, p.slot, class));
    }

    /// Whether the lecturer holds the cell.
    #[inline]
    pub fn lecturer_busy(&self, day: usize, slot: usize, lecturer: usize) -> bool {
        self.lecturers.contains_key(&(day, slot, lecturer))
    }

    /// Whether the room holds the cell.
    #[inline]
    pub fn room_busy(&self, day: usize, slot: usize, room: usize) -> bool {
        self.rooms.contains_key(&(day, slot, room))
    }

    /// Whether the class holds the cell.
    #[inline]
    pub fn class_busy(&self, day: usize, slot: usize, class: usize) -> bool {
        self.classes.contains_key(&(day, slot, class))
    }
}

// ======================== Crossover operators ========================

/// Single-point crossover at a fixed cut.
///
/// Child A = `p1[..cut] + p2[cut..]`, child B = `p2[..cut] + p1[cut..]`.
/// Parents of different length are returned unchanged.
pub fn single_point_crossover_at(
    p1: &Chromosome,
    p2: &Chromosome,
    cut: usize,
) -> (Chromosome, Chromosome) {
    if p1.len() != p2.len() || cut > p1.len() {
        return (p1.clone(), p2.clone());
    }
    let mut a = Vec::with_capacity(p1.len());
    a.extend_from_slice(&p1.genes[..cut]);
    a.extend_from_slice(&p2.genes[cut..]);
    let mut b = Vec::with_capacity(p2.len());
    b.extend_from_slice(&p2.genes[..cut]);
    b.extend_from_slice(&p1.genes[cut..]);
    (Chromosome::new(a), Chromosome::new(b))
}

/// Single-point crossover with the cut drawn uniformly in `[1, len - 1]`.
///
/// Genes are exchanged whole; a child may inherit clashes neither parent had.
pub fn single_point_crossover<R: Rng>(
    p1: &Chromosome,
    p2: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    if p1.len() != p2.len() || p1.len() < 2 {
        return (p1.clone(), p2.clone());
    }
    let cut = rng.random_range(1..p1.len());
    single_point_crossover_at(p1, p2, cut)
}

/// Uniform crossover: each position is swapped with `swap_probability`
/// (clamped to [0, 1]).
pub fn uniform_crossover<R: Rng>(
    p1: &Chromosome,
    p2: &Chromosome,
    swap_probability: f64,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    if p1.len() != p2.len() {
        return (p1.clone(), p2.clone());
    }
    let swap_probability = swap_probability.clamp(0.0, 1.0);
    let mut a = p1.genes.clone();
    let mut b = p2.genes.clone();
    for (ga, gb) in a.iter_mut().zip(b.iter_mut()) {
        if rng.random_bool(swap_probability) {
            std::mem::swap(ga, gb);
        }
    }
    (Chromosome::new(a), Chromosome::new(b))
}
