//! Per-semester orchestration.
//!
//! # Algorithm
//!
//! For each semester:
//! 1. Scope the input to the semester ([`ScheduleData::for_semester`]) and
//!    check there is something to schedule.
//! 2. Evolve a weekly timetable with [`GaRunner`].
//! 3. Expand the best chromosome over the semester weeks and repair clashes
//!    with [`SemesterResolver`].
//! 4. Compute [`ScheduleKpi`].
//!
//! Semesters share no state and run concurrently in [`TimetableScheduler::run_all`].

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use super::kpi::ScheduleKpi;
use crate::config::{ExpansionConfig, TimetableConfig};
use crate::data::ScheduleData;
use crate::error::{Result, SemesterFailure, TimetableError};
use crate::expansion::{
    ConstraintUpdate, LessonRecord, SemesterResolver, SemesterSchedule, Unavailability,
};
use crate::ga::{Chromosome, Evaluation, GaRunner, GenerationLog};
use crate::models::TimetableInput;
use crate::validation::validate_input;

/// Seed of one semester, derived from the run seed.
///
/// Distinct semesters get distinct streams; the same (seed, semester) pair
/// always gives the same stream.
pub fn semester_seed(seed: u64, semester: u32) -> u64 {
    seed ^ u64::from(semester).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Everything produced for one semester.
#[derive(Debug, Clone, Serialize)]
pub struct SemesterOutcome {
    /// Semester number.
    pub semester: u32,
    /// Best weekly chromosome.
    pub best: Chromosome,
    /// Violation breakdown of `best`.
    pub evaluation: Evaluation,
    /// One record per generation.
    pub log: Vec<GenerationLog>,
    /// Dated lessons and unassignable recurrences.
    pub schedule: SemesterSchedule,
    /// Schedule metrics.
    pub kpi: ScheduleKpi,
    #[serde(skip)]
    data: ScheduleData,
}

impl SemesterOutcome {
    /// Lookup tables the indices in `best` and `schedule` refer to.
    pub fn data(&self) -> &ScheduleData {
        &self.data
    }

    /// Committed lessons with external ids.
    pub fn records(&self) -> Vec<LessonRecord> {
        self.schedule.records(&self.data)
    }

    /// Applies new unavailability windows to the committed schedule.
    ///
    /// Colliding lessons are relocated with the repair search; KPIs are
    /// recomputed afterwards. Windows from earlier calls stay blocked.
    pub fn apply_constraints<R: Rng>(
        &mut self,
        constraints: &[Unavailability],
        config: &ExpansionConfig,
        rng: &mut R,
    ) -> ConstraintUpdate {
        let mut resolver = SemesterResolver::from_schedule(&self.data, config, &self.schedule);
        let update = resolver.apply_constraints(&mut self.schedule, constraints, rng);
        self.kpi = ScheduleKpi::calculate(&self.schedule, &self.data);
        update
    }
}

/// Builds semester timetables from one input and one configuration.
///
/// # Example
///
/// ```
/// use u_timetable::config::TimetableConfig;
/// use u_timetable::models::{Class, Lecturer, Program, Room, Semester, Subject, TimeSlot, TimetableInput};
/// use u_timetable::scheduler::TimetableScheduler;
///
/// let input = TimetableInput {
///     classes: vec![Class::new("C1", "CS", 25)],
///     programs: vec![Program::new("CS", 4).with_semester(
///         Semester::new(1).with_start_date("2025-09-01").with_subject("MATH"),
///     )],
///     subjects: vec![Subject::new("MATH").with_theory_hours(8.0)],
///     lecturers: vec![Lecturer::new("L1").with_subject("MATH")],
///     rooms: vec![Room::theory("R1", 30)],
///     time_slots: vec![TimeSlot::new("S1", 1), TimeSlot::new("S2", 2)],
///     days: vec!["Monday".into(), "Tuesday".into()],
/// };
/// let config = TimetableConfig::default()
///     .with_population_size(10)
///     .with_max_generations(5)
///     .with_seed(1);
///
/// let scheduler = TimetableScheduler::new(input, config).unwrap();
/// let outcome = scheduler.run_semester(1).unwrap();
/// assert_eq!(outcome.kpi.committed + outcome.kpi.unassignable, 8);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableScheduler {
    input: TimetableInput,
    config: TimetableConfig,
}

impl TimetableScheduler {
    /// Checks the configuration and the program durations.
    ///
    /// Input inconsistencies are logged and left to preprocessing, which
    /// drops dangling references.
    pub fn new(input: TimetableInput, config: TimetableConfig) -> Result<Self> {
        config.validate()?;
        if let Some(p) = input.programs.iter().find(|p| p.duration_weeks == 0) {
            return Err(TimetableError::ZeroDurationWeeks {
                program: p.id.clone(),
            });
        }
        if let Err(errors) = validate_input(&input) {
            for e in &errors {
                warn!("input: {}", e.message);
            }
        }
        Ok(Self { input, config })
    }

    /// Input being scheduled.
    pub fn input(&self) -> &TimetableInput {
        &self.input
    }

    /// Run configuration.
    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    /// Scopes the input to `semester` and checks it can be scheduled.
    pub fn prepare(&self, semester: u32) -> std::result::Result<ScheduleData, SemesterFailure> {
        let data = ScheduleData::for_semester(&self.input, semester, &self.config)
            .ok_or(SemesterFailure::NoData(semester))?;
        if data.lecturers().is_empty() {
            return Err(SemesterFailure::NoLecturers(semester));
        }
        if data.rooms().is_empty() {
            return Err(SemesterFailure::NoRooms(semester));
        }
        if data.units().is_empty() {
            return Err(SemesterFailure::NoLessons(semester));
        }

        let programs: BTreeSet<usize> = data.requirements().iter().map(|r| r.program).collect();
        if let Some(&p) = programs
            .iter()
            .find(|&&p| data.semester_start(p, semester).is_none())
        {
            return Err(SemesterFailure::MissingStartDate {
                semester,
                program: data.program(p).id.clone(),
            });
        }
        Ok(data)
    }

    /// Optimizes and expands one semester.
    pub fn run_semester(
        &self,
        semester: u32,
    ) -> std::result::Result<SemesterOutcome, SemesterFailure> {
        let data = self.prepare(semester).inspect_err(|e| warn!("{e}"))?;
        info!(
            "semester {}: {} classes, {} weekly lessons",
            semester,
            data.classes().len(),
            data.units().len()
        );

        let mut config = self.config.clone();
        config.seed = self.config.seed.map(|s| semester_seed(s, semester));
        let result = GaRunner::run(&data, &config);
        info!(
            "semester {}: best fitness {:.2} after {} generations",
            semester,
            result.best_fitness(),
            result.generations
        );

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        let schedule = SemesterResolver::new(&data, &config.expansion).resolve(&result.best, &mut rng);
        let kpi = ScheduleKpi::calculate(&schedule, &data);
        info!(
            "semester {}: {} lessons committed, {} relocated, {} unassignable",
            semester, kpi.committed, kpi.relocated, kpi.unassignable
        );

        Ok(SemesterOutcome {
            semester,
            best: result.best,
            evaluation: result.evaluation,
            log: result.log,
            schedule,
            kpi,
            data,
        })
    }

    /// Runs every semester present in the input, concurrently.
    pub fn run_all(&self) -> BTreeMap<u32, std::result::Result<SemesterOutcome, SemesterFailure>> {
        self.input
            .semester_numbers()
            .into_par_iter()
            .map(|s| (s, self.run_semester(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_input;
    use crate::models::{Class, Lecturer, Program, Room, Semester, Subject, TimeSlot};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn small_config(seed: u64) -> TimetableConfig {
        TimetableConfig::default()
            .with_population_size(20)
            .with_max_generations(20)
            .with_seed(seed)
    }

    fn single_class_input() -> TimetableInput {
        TimetableInput {
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
        }
    }

    #[test]
    fn test_single_class_reaches_zero_penalty() {
        init_logger();
        let scheduler = TimetableScheduler::new(single_class_input(), small_config(3)).unwrap();
        let outcome = scheduler.run_semester(1).unwrap();

        assert_eq!(outcome.best.len(), 2);
        assert_eq!(outcome.best.unassigned_count(), 0);
        assert_eq!(outcome.evaluation.fitness, 0.0);
        assert!(outcome.evaluation.is_feasible());
        assert_eq!(outcome.kpi.committed, 20);
        assert_eq!(outcome.kpi.unassignable, 0);
        assert_eq!(outcome.kpi.relocated, 0);
        assert_eq!(outcome.records().len(), 20);
        assert_eq!(outcome.log.len(), 20);
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        init_logger();
        let a = TimetableScheduler::new(sample_input(), small_config(9))
            .unwrap()
            .run_semester(1)
            .unwrap();
        let b = TimetableScheduler::new(sample_input(), small_config(9))
            .unwrap()
            .run_semester(1)
            .unwrap();
        assert_eq!(a.best.genes, b.best.genes);
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        init_logger();
        let err = TimetableScheduler::new(sample_input(), small_config(1).with_population_size(0))
            .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidConfig { .. }));
    }

    #[test]
    fn test_zero_duration_program_rejected() {
        init_logger();
        let mut input = sample_input();
        input.programs.push(Program::new("BAD", 0));
        let err = TimetableScheduler::new(input, small_config(1)).unwrap_err();
        assert_eq!(
            err,
            TimetableError::ZeroDurationWeeks {
                program: "BAD".into()
            }
        );
    }

    #[test]
    fn test_semester_failures() {
        init_logger();
        let scheduler = TimetableScheduler::new(sample_input(), small_config(1)).unwrap();
        assert_eq!(scheduler.run_semester(7).unwrap_err(), SemesterFailure::NoData(7));
        // EE has semester 3 but no class follows it
        assert_eq!(scheduler.run_semester(3).unwrap_err(), SemesterFailure::NoData(3));

        let mut input = single_class_input();
        input.lecturers.clear();
        let s = TimetableScheduler::new(input, small_config(1)).unwrap();
        assert_eq!(s.run_semester(1).unwrap_err(), SemesterFailure::NoLecturers(1));

        let mut input = single_class_input();
        input.rooms.clear();
        let s = TimetableScheduler::new(input, small_config(1)).unwrap();
        assert_eq!(s.run_semester(1).unwrap_err(), SemesterFailure::NoRooms(1));

        let mut input = single_class_input();
        input.subjects[0] = Subject::new("S");
        let s = TimetableScheduler::new(input, small_config(1)).unwrap();
        assert_eq!(s.run_semester(1).unwrap_err(), SemesterFailure::NoLessons(1));

        let mut input = single_class_input();
        input.programs[0].semesters[0].start_date = None;
        let s = TimetableScheduler::new(input, small_config(1)).unwrap();
        assert_eq!(
            s.run_semester(1).unwrap_err(),
            SemesterFailure::MissingStartDate {
                semester: 1,
                program: "P".into()
            }
        );
    }

    #[test]
    fn test_run_all_reports_each_semester() {
        init_logger();
        let scheduler = TimetableScheduler::new(sample_input(), small_config(5)).unwrap();
        let results = scheduler.run_all();

        assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(results[&1].is_ok());
        assert!(results[&2].is_ok());
        assert_eq!(results[&3].as_ref().unwrap_err(), &SemesterFailure::NoData(3));

        let s2 = results[&2].as_ref().unwrap();
        assert_eq!(s2.semester, 2);
        assert_eq!(s2.schedule.semester, Some(2));
    }

    #[test]
    fn test_outcome_constraint_update() {
        init_logger();
        let scheduler = TimetableScheduler::new(single_class_input(), small_config(4)).unwrap();
        let mut outcome = scheduler.run_semester(1).unwrap();
        let first = *outcome.schedule.lessons().next().unwrap();
        let date = first.date;
        let slot_id = outcome.data().time_slot(first.slot).id.clone();

        let window = Unavailability::lecturer("L1", date, date).with_time_slot(slot_id);
        let mut rng = StdRng::seed_from_u64(0);
        let update = outcome.apply_constraints(&[window], &ExpansionConfig::default(), &mut rng);

        assert_eq!(update.conflicts, vec![first]);
        assert!(outcome
            .schedule
            .lessons()
            .all(|l| !(l.date == date && l.slot == first.slot)));
        assert_eq!(outcome.kpi.committed + outcome.kpi.unassignable, 20);
        assert_eq!(outcome.kpi.relocated, update.reassignments.len());
    }
}
