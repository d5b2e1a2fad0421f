//! Greedy-random population initialization.

use log::trace;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::chromosome::{Chromosome, Gene, Placement, SlotUsage};
use crate::data::ScheduleData;

/// Scans `pairs` in the given order for the first (day, slot) where the
/// unit's class is free and at least one lecturer and one room are
/// available, then picks one of each uniformly.
///
/// A lecturer is available if not held by another gene and not on a
/// recurring busy slot; a room if not held by another gene. The caller
/// shuffles `pairs`.
pub(crate) fn place_unit<R: Rng>(
    unit: usize,
    data: &ScheduleData,
    usage: &SlotUsage,
    pairs: &[(usize, usize)],
    rng: &mut R,
) -> Option<Placement> {
    let lesson = data.unit(unit);
    if lesson.lecturers.is_empty() || lesson.rooms.is_empty() {
        return None;
    }
    let mut lecturers = Vec::with_capacity(lesson.lecturers.len());
    let mut rooms = Vec::with_capacity(lesson.rooms.len());

    for &(day, slot) in pairs {
        if usage.class_busy(day, slot, lesson.class) {
            continue;
        }
        lecturers.clear();
        lecturers.extend(lesson.lecturers.iter().copied().filter(|&l| {
            !usage.lecturer_busy(day, slot, l) && !data.is_weekly_busy(l, day, slot)
        }));
        if lecturers.is_empty() {
            continue;
        }
        rooms.clear();
        rooms.extend(
            lesson
                .rooms
                .iter()
                .copied()
                .filter(|&r| !usage.room_busy(day, slot, r)),
        );
        let (Some(&lecturer), Some(&room)) = (lecturers.choose(rng), rooms.choose(rng)) else {
            continue;
        };
        return Some(Placement {
            day,
            slot,
            lecturer,
            room,
        });
    }
    None
}

/// Builds initial chromosomes.
///
/// Units are processed in a shuffled order and each scans a freshly
/// shuffled copy of the weekly grid. Units that find nothing stay
/// unassigned; construction never fails.
#[derive(Debug, Clone)]
pub struct PopulationInitializer<'a> {
    data: &'a ScheduleData,
    pairs: Vec<(usize, usize)>,
}

impl<'a> PopulationInitializer<'a> {
    /// Creates an initializer over the data's assignable grid.
    pub fn new(data: &'a ScheduleData) -> Self {
        Self {
            data,
            pairs: data.day_slot_pairs(),
        }
    }

    /// Builds one chromosome with genes in canonical unit order.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Chromosome {
        let n = self.data.units().len();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut genes: Vec<Gene> = (0..n).map(Gene::unassigned).collect();
        let mut usage = SlotUsage::new();
        let mut pairs = self.pairs.clone();

        for unit in order {
            pairs.shuffle(rng);
            match place_unit(unit, self.data, &usage, &pairs, rng) {
                Some(placement) => {
                    usage.insert(self.data.unit(unit).class, &placement);
                    genes[unit] = Gene::assigned(unit, placement);
                }
                None => trace!("initializer: {} left unassigned", self.data.describe_unit(unit)),
            }
        }

        Chromosome::new(genes)
    }

    /// Builds `size` chromosomes.
    pub fn population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Chromosome> {
        (0..size).map(|_| self.build(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimetableConfig;
    use crate::data::fixtures::sample_input;
    use crate::ga::FitnessEvaluator;
    use crate::models::{
        Class, LessonType, Lecturer, Program, Room, Semester, Subject, TimeSlot, TimetableInput,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// One class, one lecturer, one room, two lessons per week.
    fn single_class() -> ScheduleData {
        let input = TimetableInput {
            classes: vec![Class::new("C1", "P", 20)],
            programs: vec![Program::new("P", 10)
                .with_semester(Semester::new(1).with_start_date("2025-09-01").with_subject("S"))],
            subjects: vec![Subject::new("S").with_theory_hours(20.0)],
            lecturers: vec![Lecturer::new("L1").with_subject("S")],
            rooms: vec![Room::theory("R1", 30)],
            time_slots: vec![TimeSlot::new("T1", 1), TimeSlot::new("T2", 2)],
            days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        };
        ScheduleData::for_semester(&input, 1, &TimetableConfig::default()).unwrap()
    }

    fn semester_one() -> ScheduleData {
        ScheduleData::for_semester(&sample_input(), 1, &TimetableConfig::default()).unwrap()
    }

    #[test]
    fn test_build_complete_and_canonical() {
        let data = semester_one();
        let init = PopulationInitializer::new(&data);
        let mut rng = SmallRng::seed_from_u64(42);

        for ch in init.population(10, &mut rng) {
            assert!(ch.is_valid(&data));
            assert!(!ch.is_evaluated());
        }
    }

    #[test]
    fn test_placements_are_clash_free() {
        let data = semester_one();
        let init = PopulationInitializer::new(&data);
        let mut rng = SmallRng::seed_from_u64(7);
        let ch = init.build(&mut rng);

        let placed: Vec<(usize, &Placement)> = ch
            .genes
            .iter()
            .filter_map(|g| g.placement().map(|p| (g.unit, p)))
            .collect();
        for (i, (u1, p1)) in placed.iter().enumerate() {
            let unit = data.unit(*u1);
            assert!(unit.lecturers.contains(&p1.lecturer));
            assert!(unit.rooms.contains(&p1.room));
            assert!(!data.is_weekly_busy(p1.lecturer, p1.day, p1.slot));
            assert!(!data.day(p1.day).is_rest_day(data.rest_day()));
            for (u2, p2) in &placed[i + 1..] {
                if (p1.day, p1.slot) != (p2.day, p2.slot) {
                    continue;
                }
                assert_ne!(p1.lecturer, p2.lecturer);
                assert_ne!(p1.room, p2.room);
                assert_ne!(unit.class, data.unit(*u2).class);
            }
        }
    }

    #[test]
    fn test_units_without_rooms_stay_unassigned() {
        let data = semester_one();
        let init = PopulationInitializer::new(&data);
        let mut rng = SmallRng::seed_from_u64(1);
        let ch = init.build(&mut rng);

        // C2 (60 students) has no practice room big enough: 3 weekly units
        let c2 = data.class_idx("C2").unwrap();
        for gene in &ch.genes {
            let unit = data.unit(gene.unit);
            if unit.class == c2 && unit.lesson_type == LessonType::Practice {
                assert!(!gene.is_assigned());
            }
        }
        assert_eq!(ch.unassigned_count(), 3);
    }

    #[test]
    fn test_same_seed_same_population() {
        let data = semester_one();
        let init = PopulationInitializer::new(&data);
        let a = init.population(5, &mut SmallRng::seed_from_u64(9));
        let b = init.population(5, &mut SmallRng::seed_from_u64(9));
        let genes = |p: &[Chromosome]| p.iter().map(|c| c.genes.clone()).collect::<Vec<_>>();
        assert_eq!(genes(&a), genes(&b));
    }

    #[test]
    fn test_single_class_builds_are_always_perfect() {
        let data = single_class();
        let config = TimetableConfig::default();
        let evaluator = FitnessEvaluator::new(&data, &config);
        let init = PopulationInitializer::new(&data);
        let mut rng = SmallRng::seed_from_u64(13);

        assert_eq!(data.units().len(), 2);
        for _ in 0..50 {
            let ch = init.build(&mut rng);
            assert_eq!(ch.len(), 2);
            assert_eq!(ch.unassigned_count(), 0);
            assert_eq!(evaluator.evaluate(&ch).fitness, 0.0);
        }
    }
}
