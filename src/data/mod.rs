//! Preprocessed, index-addressed view of the input.
//!
//! [`ScheduleData`] owns every entity in a `Vec` and addresses it by
//! position. String ids are resolved once, here; everything downstream
//! (chromosomes, occupancy maps, repair) works on indices. Lookups that
//! may miss return `Option`.
//!
//! Built once per semester and read-only afterwards, so it is shared by
//! reference across rayon workers.

mod requirements;

pub use requirements::{
    slot_count, weekly_count, weekly_lesson_counts, LessonUnit, RequiredLesson,
};

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Weekday};
use log::{debug, warn};

use crate::config::TimetableConfig;
use crate::models::{
    Class, Day, LessonType, Lecturer, Program, Room, Subject, TimeSlot, TimetableInput,
};

/// Lookup tables, busy-slot indices and weekly lesson requirements.
#[derive(Debug, Clone)]
pub struct ScheduleData {
    semester: Option<u32>,
    rest_day: Weekday,
    subjects: Vec<Subject>,
    programs: Vec<Program>,
    classes: Vec<Class>,
    lecturers: Vec<Lecturer>,
    rooms: Vec<Room>,
    /// Sorted by slot ordinal.
    time_slots: Vec<TimeSlot>,
    days: Vec<Day>,
    subject_index: HashMap<String, usize>,
    program_index: HashMap<String, usize>,
    class_index: HashMap<String, usize>,
    lecturer_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,
    slot_index: HashMap<String, usize>,
    day_index: HashMap<String, usize>,
    lecturer_subjects: Vec<HashSet<usize>>,
    weekly_busy: Vec<HashSet<(usize, usize)>>,
    dated_busy: Vec<HashSet<(NaiveDate, usize)>>,
    assignable_days: Vec<usize>,
    requirements: Vec<RequiredLesson>,
    units: Vec<LessonUnit>,
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        // First occurrence wins; duplicates are reported by validation
        index.entry(id(item).to_string()).or_insert(i);
    }
    index
}

impl ScheduleData {
    /// Builds the tables for every semester in the input.
    pub fn from_input(input: &TimetableInput, config: &TimetableConfig) -> Self {
        let mut time_slots = input.time_slots.clone();
        time_slots.sort_by_key(|t| t.order);
        let days: Vec<Day> = input.days.iter().map(Day::parse).collect();

        let subject_index = index_by_id(&input.subjects, |s| s.id.as_str());
        let program_index = index_by_id(&input.programs, |p| p.id.as_str());
        let class_index = index_by_id(&input.classes, |c| c.id.as_str());
        let lecturer_index = index_by_id(&input.lecturers, |l| l.id.as_str());
        let room_index = index_by_id(&input.rooms, |r| r.id.as_str());
        let slot_index = index_by_id(&time_slots, |t| t.id.as_str());
        let day_index = index_by_id(&days, |d| d.name.as_str());

        let lecturer_subjects: Vec<HashSet<usize>> = input
            .lecturers
            .iter()
            .map(|l| {
                l.subjects
                    .iter()
                    .filter_map(|s| subject_index.get(s).copied())
                    .collect()
            })
            .collect();

        let weekly_busy: Vec<HashSet<(usize, usize)>> = input
            .lecturers
            .iter()
            .map(|l| {
                l.busy_slots
                    .iter()
                    .filter_map(|b| {
                        let day = day_index.get(&b.day).copied();
                        let slot = slot_index.get(&b.time_slot).copied();
                        if day.is_none() || slot.is_none() {
                            debug!("lecturer {}: ignoring busy slot {} {}", l.id, b.day, b.time_slot);
                        }
                        Some((day?, slot?))
                    })
                    .collect()
            })
            .collect();

        let dated_busy: Vec<HashSet<(NaiveDate, usize)>> = input
            .lecturers
            .iter()
            .map(|l| {
                l.semester_busy_slots
                    .iter()
                    .filter_map(|b| slot_index.get(&b.time_slot).map(|&s| (b.date, s)))
                    .collect()
            })
            .collect();

        let assignable_days: Vec<usize> = days
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_rest_day(config.rest_day))
            .map(|(i, _)| i)
            .collect();

        let mut data = Self {
            semester: None,
            rest_day: config.rest_day,
            subjects: input.subjects.clone(),
            programs: input.programs.clone(),
            classes: input.classes.clone(),
            lecturers: input.lecturers.clone(),
            rooms: input.rooms.clone(),
            time_slots,
            days,
            subject_index,
            program_index,
            class_index,
            lecturer_index,
            room_index,
            slot_index,
            day_index,
            lecturer_subjects,
            weekly_busy,
            dated_busy,
            assignable_days,
            requirements: Vec::new(),
            units: Vec::new(),
        };
        data.build_requirements(config.hours_per_slot);
        data
    }

    /// Builds the tables restricted to one semester.
    ///
    /// Keeps programs having that semester, their classes, the semester's
    /// subjects and the lecturers qualified for at least one of them.
    /// Returns `None` if no class takes part in the semester.
    pub fn for_semester(
        input: &TimetableInput,
        semester: u32,
        config: &TimetableConfig,
    ) -> Option<Self> {
        let programs: Vec<Program> = input
            .programs
            .iter()
            .filter_map(|p| {
                let sem = p.semester(semester)?.clone();
                let mut scoped = p.clone();
                scoped.semesters = vec![sem];
                Some(scoped)
            })
            .collect();
        if programs.is_empty() {
            return None;
        }

        let program_ids: HashSet<&str> = programs.iter().map(|p| p.id.as_str()).collect();
        let classes: Vec<Class> = input
            .classes
            .iter()
            .filter(|c| program_ids.contains(c.program_id.as_str()))
            .cloned()
            .collect();
        if classes.is_empty() {
            return None;
        }

        let subject_ids: HashSet<&str> = programs
            .iter()
            .flat_map(|p| p.semesters.iter().flat_map(|s| s.subjects.iter()))
            .map(String::as_str)
            .collect();
        let subjects: Vec<Subject> = input
            .subjects
            .iter()
            .filter(|s| subject_ids.contains(s.id.as_str()))
            .cloned()
            .collect();
        let lecturers: Vec<Lecturer> = input
            .lecturers
            .iter()
            .filter(|l| l.subjects.iter().any(|s| subject_ids.contains(s.as_str())))
            .map(|l| {
                let mut scoped = l.clone();
                scoped.subjects.retain(|s| subject_ids.contains(s.as_str()));
                scoped
            })
            .collect();

        let scoped = TimetableInput {
            classes,
            programs,
            subjects,
            lecturers,
            rooms: input.rooms.clone(),
            time_slots: input.time_slots.clone(),
            days: input.days.clone(),
        };
        let mut data = Self::from_input(&scoped, config);
        data.semester = Some(semester);
        Some(data)
    }

    fn build_requirements(&mut self, hours_per_slot: f64) {
        let mut requirements = Vec::new();
        let mut units = Vec::new();

        for (class_idx, class) in self.classes.iter().enumerate() {
            let Some(&program_idx) = self.program_index.get(&class.program_id) else {
                warn!("class {}: unknown program {}", class.id, class.program_id);
                continue;
            };
            let program = &self.programs[program_idx];
            if program.duration_weeks == 0 {
                warn!("program {}: zero duration weeks, skipping class {}", program.id, class.id);
                continue;
            }

            for semester in &program.semesters {
                for subject_id in &semester.subjects {
                    let Some(&subject_idx) = self.subject_index.get(subject_id) else {
                        debug!("program {}: unknown subject {}", program.id, subject_id);
                        continue;
                    };
                    let subject = &self.subjects[subject_idx];

                    for lesson_type in LessonType::ALL {
                        let total_slots = slot_count(subject.hours(lesson_type), hours_per_slot);
                        let weekly = weekly_count(total_slots, program.duration_weeks);
                        if weekly == 0 {
                            continue;
                        }

                        let requirement = requirements.len();
                        requirements.push(RequiredLesson {
                            class: class_idx,
                            subject: subject_idx,
                            lesson_type,
                            program: program_idx,
                            semester: semester.number,
                            total_slots,
                            duration_weeks: program.duration_weeks,
                            weekly_count: weekly,
                        });

                        let lecturers: Vec<usize> = (0..self.lecturers.len())
                            .filter(|&l| self.lecturer_subjects[l].contains(&subject_idx))
                            .collect();
                        let rooms: Vec<usize> = (0..self.rooms.len())
                            .filter(|&r| self.rooms[r].suits(lesson_type, class.size))
                            .collect();

                        for ordinal in 0..weekly {
                            units.push(LessonUnit {
                                requirement,
                                ordinal,
                                class: class_idx,
                                subject: subject_idx,
                                lesson_type,
                                program: program_idx,
                                class_size: class.size,
                                lecturers: lecturers.clone(),
                                rooms: rooms.clone(),
                            });
                        }
                    }
                }
            }
        }

        self.requirements = requirements;
        self.units = units;
    }

    /// Semester this data is scoped to, if any.
    pub fn semester(&self) -> Option<u32> {
        self.semester
    }

    /// Configured rest day.
    pub fn rest_day(&self) -> Weekday {
        self.rest_day
    }

    /// Subject by index.
    pub fn subject(&self, idx: usize) -> &Subject {
        &self.subjects[idx]
    }

    /// Program by index.
    pub fn program(&self, idx: usize) -> &Program {
        &self.programs[idx]
    }

    /// Class by index.
    pub fn class(&self, idx: usize) -> &Class {
        &self.classes[idx]
    }

    /// Lecturer by index.
    pub fn lecturer(&self, idx: usize) -> &Lecturer {
        &self.lecturers[idx]
    }

    /// Room by index.
    pub fn room(&self, idx: usize) -> &Room {
        &self.rooms[idx]
    }

    /// Time slot by index (slots are sorted by ordinal).
    pub fn time_slot(&self, idx: usize) -> &TimeSlot {
        &self.time_slots[idx]
    }

    /// Day by index.
    pub fn day(&self, idx: usize) -> &Day {
        &self.days[idx]
    }

    /// All programs.
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// All classes.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// All lecturers.
    pub fn lecturers(&self) -> &[Lecturer] {
        &self.lecturers
    }

    /// All rooms.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// All time slots, by ordinal.
    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    /// All scheduling days.
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Index of a subject id.
    pub fn subject_idx(&self, id: &str) -> Option<usize> {
        self.subject_index.get(id).copied()
    }

    /// Index of a program id.
    pub fn program_idx(&self, id: &str) -> Option<usize> {
        self.program_index.get(id).copied()
    }

    /// Index of a class id.
    pub fn class_idx(&self, id: &str) -> Option<usize> {
        self.class_index.get(id).copied()
    }

    /// Index of a lecturer id.
    pub fn lecturer_idx(&self, id: &str) -> Option<usize> {
        self.lecturer_index.get(id).copied()
    }

    /// Index of a room id.
    pub fn room_idx(&self, id: &str) -> Option<usize> {
        self.room_index.get(id).copied()
    }

    /// Index of a time slot id.
    pub fn slot_idx(&self, id: &str) -> Option<usize> {
        self.slot_index.get(id).copied()
    }

    /// Index of a day name.
    pub fn day_idx(&self, name: &str) -> Option<usize> {
        self.day_index.get(name).copied()
    }

    /// Ordinal of a slot within the day.
    #[inline]
    pub fn slot_order(&self, slot: usize) -> u32 {
        self.time_slots[slot].order
    }

    /// Days lessons may be placed on (rest day excluded).
    pub fn assignable_days(&self) -> &[usize] {
        &self.assignable_days
    }

    /// Every assignable (day, slot) cell of the weekly grid.
    pub fn day_slot_pairs(&self) -> Vec<(usize, usize)> {
        self.assignable_days
            .iter()
            .flat_map(|&d| (0..self.time_slots.len()).map(move |s| (d, s)))
            .collect()
    }

    /// Whether `lecturer` may teach `subject`.
    #[inline]
    pub fn is_qualified(&self, lecturer: usize, subject: usize) -> bool {
        self.lecturer_subjects[lecturer].contains(&subject)
    }

    /// Whether `lecturer` is blocked on (day, slot) every week.
    #[inline]
    pub fn is_weekly_busy(&self, lecturer: usize, day: usize, slot: usize) -> bool {
        self.weekly_busy[lecturer].contains(&(day, slot))
    }

    /// Whether `lecturer` is blocked on (date, slot) once.
    #[inline]
    pub fn is_dated_busy(&self, lecturer: usize, date: NaiveDate, slot: usize) -> bool {
        self.dated_busy[lecturer].contains(&(date, slot))
    }

    /// One-off busy slots of a lecturer.
    pub fn dated_busy(&self, lecturer: usize) -> impl Iterator<Item = (NaiveDate, usize)> + '_ {
        self.dated_busy[lecturer].iter().copied()
    }

    /// Raw start date text of a program's semester.
    pub fn semester_start(&self, program: usize, semester: u32) -> Option<&str> {
        self.programs[program]
            .semester(semester)
            .and_then(|s| s.start_date.as_deref())
    }

    /// Weekly requirements.
    pub fn requirements(&self) -> &[RequiredLesson] {
        &self.requirements
    }

    /// Requirement by index.
    pub fn requirement(&self, idx: usize) -> &RequiredLesson {
        &self.requirements[idx]
    }

    /// Weekly lesson units in canonical gene order.
    pub fn units(&self) -> &[LessonUnit] {
        &self.units
    }

    /// Lesson unit by index.
    pub fn unit(&self, idx: usize) -> &LessonUnit {
        &self.units[idx]
    }

    /// Short description of a lesson unit for logs and reasons.
    pub fn describe_unit(&self, idx: usize) -> String {
        let unit = &self.units[idx];
        format!(
            "{}/{}/{}#{}",
            self.classes[unit.class].id,
            self.subjects[unit.subject].id,
            unit.lesson_type,
            unit.ordinal
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::Semester;

    /// Two classes of one program sharing a lecturer pool; Monday to Saturday
    /// plus Sunday, three slots.
    pub fn sample_input() -> TimetableInput {
        TimetableInput {
            classes: vec![Class::new("C1", "CS", 30), Class::new("C2", "CS", 60)],
            programs: vec![
                Program::new("CS", 10)
                    .with_semester(
                        Semester::new(1)
                            .with_start_date("2025-09-01")
                            .with_subject("MATH")
                            .with_subject("PROG"),
                    )
                    .with_semester(
                        Semester::new(2)
                            .with_start_date("2026-02-02")
                            .with_subject("ALGO"),
                    ),
                Program::new("EE", 12).with_semester(
                    Semester::new(3)
                        .with_start_date("2025-09-01")
                        .with_subject("CIRC"),
                ),
            ],
            subjects: vec![
                Subject::new("MATH").with_theory_hours(20.0),
                Subject::new("PROG")
                    .with_theory_hours(10.0)
                    .with_practice_hours(25.0),
                Subject::new("ALGO").with_theory_hours(30.0),
                Subject::new("CIRC").with_theory_hours(12.0),
            ],
            lecturers: vec![
                Lecturer::new("L1")
                    .with_subject("MATH")
                    .with_subject("ALGO")
                    .with_busy_slot("Monday", "S1"),
                Lecturer::new("L2").with_subject("PROG"),
                Lecturer::new("L3").with_subject("CIRC"),
            ],
            rooms: vec![
                Room::theory("A1", 40),
                Room::theory("A2", 80),
                Room::practice("LAB", 35),
            ],
            time_slots: vec![
                TimeSlot::new("S3", 3),
                TimeSlot::new("S1", 1),
                TimeSlot::new("S2", 2),
            ],
            days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_input;
    use super::*;

    #[test]
    fn test_slots_sorted_by_order() {
        let data = ScheduleData::from_input(&sample_input(), &TimetableConfig::default());
        let ids: Vec<&str> = data.time_slots().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);
        assert_eq!(data.slot_order(data.slot_idx("S3").unwrap()), 3);
    }

    #[test]
    fn test_rest_day_excluded_from_grid() {
        let data = ScheduleData::from_input(&sample_input(), &TimetableConfig::default());
        assert_eq!(data.assignable_days().len(), 6);
        assert_eq!(data.day_slot_pairs().len(), 18);
        let sunday = data.day_idx("Sunday").unwrap();
        assert!(!data.assignable_days().contains(&sunday));
    }

    #[test]
    fn test_semester_subset() {
        let input = sample_input();
        let config = TimetableConfig::default();
        let data = ScheduleData::for_semester(&input, 1, &config).unwrap();

        assert_eq!(data.semester(), Some(1));
        assert_eq!(data.programs().len(), 1);
        assert_eq!(data.classes().len(), 2);
        // L3 teaches only CIRC, L1 keeps MATH but loses ALGO
        assert_eq!(data.lecturers().len(), 2);
        assert_eq!(data.lecturer(data.lecturer_idx("L1").unwrap()).subjects, vec!["MATH"]);
        // Original input untouched
        assert_eq!(input.lecturers[0].subjects.len(), 2);
    }

    #[test]
    fn test_semester_without_classes_is_none() {
        let config = TimetableConfig::default();
        // Semester 3 only exists in EE, which has no class
        assert!(ScheduleData::for_semester(&sample_input(), 3, &config).is_none());
        assert!(ScheduleData::for_semester(&sample_input(), 9, &config).is_none());
    }

    #[test]
    fn test_requirements_and_units() {
        let config = TimetableConfig::default();
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();

        // Per class: MATH theory, PROG theory, PROG practice
        assert_eq!(data.requirements().len(), 6);
        let math = &data.requirements()[0];
        assert_eq!(math.total_slots, 20);
        assert_eq!(math.weekly_count, 2);
        let prog_practice = &data.requirements()[2];
        assert_eq!(prog_practice.lesson_type, LessonType::Practice);
        assert_eq!(prog_practice.total_slots, 25);
        assert_eq!(prog_practice.weekly_count, 3);

        // 2 + 1 + 3 units per class
        assert_eq!(data.units().len(), 12);
        assert!(data.units().iter().all(|u| u.requirement < data.requirements().len()));
    }

    #[test]
    fn test_unit_candidates() {
        let config = TimetableConfig::default();
        let data = ScheduleData::for_semester(&sample_input(), 1, &config).unwrap();
        let c2 = data.class_idx("C2").unwrap();
        let l1 = data.lecturer_idx("L1").unwrap();
        let a2 = data.room_idx("A2").unwrap();

        let math_c2 = data
            .units()
            .iter()
            .find(|u| u.class == c2 && data.subject(u.subject).id == "MATH")
            .unwrap();
        assert_eq!(math_c2.lecturers, vec![l1]);
        // 60 students only fit A2
        assert_eq!(math_c2.rooms, vec![a2]);

        let lab_c2 = data
            .units()
            .iter()
            .find(|u| u.class == c2 && u.lesson_type == LessonType::Practice)
            .unwrap();
        assert!(lab_c2.rooms.is_empty());
    }

    #[test]
    fn test_busy_slot_lookup() {
        let data = ScheduleData::from_input(&sample_input(), &TimetableConfig::default());
        let l1 = data.lecturer_idx("L1").unwrap();
        let monday = data.day_idx("Monday").unwrap();
        let s1 = data.slot_idx("S1").unwrap();
        let s2 = data.slot_idx("S2").unwrap();
        assert!(data.is_weekly_busy(l1, monday, s1));
        assert!(!data.is_weekly_busy(l1, monday, s2));
    }

    #[test]
    fn test_semester_start_lookup() {
        let config = TimetableConfig::default();
        let data = ScheduleData::for_semester(&sample_input(), 2, &config).unwrap();
        let cs = data.program_idx("CS").unwrap();
        assert_eq!(data.semester_start(cs, 2), Some("2026-02-02"));
        assert_eq!(data.semester_start(cs, 1), None);
    }
}
