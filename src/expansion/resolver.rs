//! Commit-or-repair over a whole semester, and later constraint updates.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{debug, trace, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::expand::{expand, semester_start, LessonInstance, Target};
use super::occupancy::OccupancyMap;
use super::repair::{find_alternative, is_clear, RepairCandidate};
use super::schedule::{ScheduledLesson, SemesterSchedule, UnassignableLesson, UnassignableReason};
use crate::config::ExpansionConfig;
use crate::data::ScheduleData;
use crate::ga::Chromosome;
use crate::models::week_of;

/// Resource an unavailability window applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ResourceRef {
    /// Lecturer id.
    Lecturer(String),
    /// Room id.
    Room(String),
}

/// A lecturer or room unavailable on an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailability {
    /// Affected resource.
    pub resource: ResourceRef,
    /// First day (inclusive).
    pub from: NaiveDate,
    /// Last day (inclusive).
    pub to: NaiveDate,
    /// Affected time slot ids; `None` blocks the whole day.
    #[serde(default)]
    pub time_slots: Option<Vec<String>>,
}

impl Unavailability {
    /// Lecturer unavailable on a date range, all day.
    pub fn lecturer(id: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            resource: ResourceRef::Lecturer(id.into()),
            from,
            to,
            time_slots: None,
        }
    }

    /// Room unavailable on a date range, all day.
    pub fn room(id: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            resource: ResourceRef::Room(id.into()),
            from,
            to,
            time_slots: None,
        }
    }

    /// Restricts the window to some slots.
    pub fn with_time_slot(mut self, id: impl Into<String>) -> Self {
        self.time_slots.get_or_insert_with(Vec::new).push(id.into());
        self
    }
}

/// (resource index, date, slot) cells covered by unavailability windows.
type WindowCells = HashSet<(usize, NaiveDate, usize)>;

/// A committed lesson moved by a constraint update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    /// Lesson as committed before.
    pub before: ScheduledLesson,
    /// Lesson as committed now.
    pub after: ScheduledLesson,
}

/// Outcome of [`SemesterResolver::apply_constraints`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConstraintUpdate {
    /// Committed lessons that collided with the new windows.
    pub conflicts: Vec<ScheduledLesson>,
    /// Conflicting lessons that found a new place.
    pub reassignments: Vec<Reassignment>,
    /// Conflicting lessons that were removed from the schedule.
    pub unassignable: Vec<UnassignableLesson>,
}

/// Semester expansion and conflict resolution over one occupancy map.
///
/// The map starts with every lecturer's one-off busy slots blocked and
/// from then on mirrors exactly what the resolver committed.
#[derive(Debug, Clone)]
pub struct SemesterResolver<'a> {
    data: &'a ScheduleData,
    config: &'a ExpansionConfig,
    occupancy: OccupancyMap,
}

impl<'a> SemesterResolver<'a> {
    /// Creates a resolver with a fresh occupancy map.
    pub fn new(data: &'a ScheduleData, config: &'a ExpansionConfig) -> Self {
        Self {
            data,
            config,
            occupancy: OccupancyMap::from_data(data),
        }
    }

    /// Rebuilds the occupancy map from an existing committed schedule,
    /// including every window applied to it so far.
    pub fn from_schedule(
        data: &'a ScheduleData,
        config: &'a ExpansionConfig,
        schedule: &SemesterSchedule,
    ) -> Self {
        let mut resolver = Self::new(data, config);
        for lesson in schedule.lessons() {
            resolver.reserve(lesson);
        }
        resolver.block_windows(&schedule.constraints);
        resolver
    }

    /// Current occupancy.
    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    fn reserve(&mut self, l: &ScheduledLesson) {
        self.occupancy.reserve(l.date, l.slot, l.lecturer, l.room, l.class);
    }

    fn release(&mut self, l: &ScheduledLesson) {
        self.occupancy.release(l.date, l.slot, l.lecturer, l.room, l.class);
    }

    fn lesson(&self, unit: usize, candidate: &RepairCandidate, relocated: bool) -> ScheduledLesson {
        let u = self.data.unit(unit);
        ScheduledLesson {
            unit,
            class: u.class,
            subject: u.subject,
            lesson_type: u.lesson_type,
            week: candidate.week,
            date: candidate.date,
            day: candidate.day,
            slot: candidate.slot,
            lecturer: candidate.lecturer,
            room: candidate.room,
            relocated,
        }
    }

    fn repair<R: Rng>(
        &self,
        unit: usize,
        start: NaiveDate,
        week: u32,
        rng: &mut R,
    ) -> Result<RepairCandidate, UnassignableReason> {
        let u = self.data.unit(unit);
        if u.lecturers.is_empty() || u.rooms.is_empty() {
            return Err(UnassignableReason::NoCandidates);
        }
        find_alternative(self.data, &self.occupancy, self.config, unit, start, week, rng).ok_or(
            UnassignableReason::NoAlternative {
                window: self.config.repair_window_weeks,
            },
        )
    }

    /// Expands the weekly chromosome over the semester and commits every
    /// recurrence, repairing clashes.
    ///
    /// Recurrences are processed in a random order. Anything that cannot
    /// be placed ends up in [`SemesterSchedule::unassignable`].
    pub fn resolve<R: Rng>(&mut self, chromosome: &Chromosome, rng: &mut R) -> SemesterSchedule {
        let mut schedule = SemesterSchedule::new(self.data.semester());
        let expansion = expand(chromosome, self.data);
        schedule.unassignable.extend(expansion.skipped);

        let mut instances = expansion.instances;
        instances.shuffle(rng);
        for instance in &instances {
            match self.place(instance, rng) {
                Ok(lesson) => {
                    self.reserve(&lesson);
                    schedule.insert(lesson);
                }
                Err(unassignable) => {
                    warn!("unassignable: {}", unassignable.describe(self.data));
                    schedule.unassignable.push(unassignable);
                }
            }
        }

        debug!(
            "expanded {} recurrences: {} committed, {} relocated, {} unassignable",
            instances.len(),
            schedule.len(),
            schedule.relocated_count(),
            schedule.unassignable.len()
        );
        schedule
    }

    fn place<R: Rng>(
        &self,
        instance: &LessonInstance,
        rng: &mut R,
    ) -> Result<ScheduledLesson, UnassignableLesson> {
        let class = self.data.unit(instance.unit).class;
        let (date, slot) = match instance.target {
            Target::Dated { date, placement: p } => {
                if is_clear(self.data, &self.occupancy, class, date, p.day, p.slot, p.lecturer, p.room) {
                    let kept = RepairCandidate {
                        week: instance.week,
                        date,
                        day: p.day,
                        slot: p.slot,
                        lecturer: p.lecturer,
                        room: p.room,
                    };
                    return Ok(self.lesson(instance.unit, &kept, false));
                }
                trace!("clash: {} on {} slot {}", self.data.describe_unit(instance.unit), date, p.slot);
                (Some(date), Some(p.slot))
            }
            Target::Unplaced => (None, None),
        };

        match self.repair(instance.unit, instance.start, instance.week, rng) {
            Ok(candidate) => Ok(self.lesson(instance.unit, &candidate, true)),
            Err(reason) => Err(
                UnassignableLesson::new(self.data, instance.unit, instance.week, reason).at(date, slot),
            ),
        }
    }

    /// Blocks every (resource, date, slot) cell the windows cover and
    /// returns the lecturer and room cells.
    fn block_windows(&mut self, windows: &[Unavailability]) -> (WindowCells, WindowCells) {
        let mut lecturer_cells = WindowCells::new();
        let mut room_cells = WindowCells::new();

        for window in windows {
            let Some(slots) = self.window_slots(window) else {
                continue;
            };
            let (target, idx) = match &window.resource {
                ResourceRef::Lecturer(id) => (&mut lecturer_cells, self.data.lecturer_idx(id)),
                ResourceRef::Room(id) => (&mut room_cells, self.data.room_idx(id)),
            };
            let Some(idx) = idx else {
                warn!("unavailability for unknown resource {:?}", window.resource);
                continue;
            };
            for date in window.from.iter_days().take_while(|d| *d <= window.to) {
                for &slot in &slots {
                    target.insert((idx, date, slot));
                }
            }
        }
        for &(l, date, slot) in &lecturer_cells {
            self.occupancy.block_lecturer(date, slot, l);
        }
        for &(r, date, slot) in &room_cells {
            self.occupancy.block_room(date, slot, r);
        }
        (lecturer_cells, room_cells)
    }

    /// Blocks the given windows, then relocates every committed lesson that
    /// collides with them.
    ///
    /// Lessons outside the windows are untouched. Windows naming unknown
    /// resources or slots are skipped with a warning. The windows are
    /// recorded on the schedule so a resolver rebuilt with
    /// [`SemesterResolver::from_schedule`] keeps them blocked.
    pub fn apply_constraints<R: Rng>(
        &mut self,
        schedule: &mut SemesterSchedule,
        constraints: &[Unavailability],
        rng: &mut R,
    ) -> ConstraintUpdate {
        let (lecturer_cells, room_cells) = self.block_windows(constraints);
        schedule.constraints.extend_from_slice(constraints);

        let mut update = ConstraintUpdate {
            conflicts: schedule
                .lessons()
                .filter(|l| {
                    lecturer_cells.contains(&(l.lecturer, l.date, l.slot))
                        || room_cells.contains(&(l.room, l.date, l.slot))
                })
                .copied()
                .collect(),
            ..ConstraintUpdate::default()
        };
        debug!(
            "{} constraint window(s): {} conflicting lesson(s)",
            constraints.len(),
            update.conflicts.len()
        );

        let mut order = update.conflicts.clone();
        order.shuffle(rng);
        for before in order {
            self.release(&before);
            schedule.remove(&before);

            let u = self.data.unit(before.unit);
            let semester = self.data.requirement(u.requirement).semester;
            let result = semester_start(self.data, u.program, semester).and_then(|start| {
                let week = week_of(start, before.date).unwrap_or(before.week);
                self.repair(before.unit, start, week, rng)
            });
            match result {
                Ok(candidate) => {
                    let after = self.lesson(before.unit, &candidate, true);
                    self.reserve(&after);
                    schedule.insert(after);
                    trace!(
                        "moved {} from {} to {}",
                        self.data.describe_unit(before.unit),
                        before.date,
                        after.date
                    );
                    update.reassignments.push(Reassignment { before, after });
                }
                Err(reason) => {
                    let lost = UnassignableLesson::new(self.data, before.unit, before.week, reason)
                        .at(Some(before.date), Some(before.slot));
                    warn!("unassignable after update: {}", lost.describe(self.data));
                    schedule.unassignable.push(lost.clone());
                    update.unassignable.push(lost);
                }
            }
        }
        update
    }

    fn window_slots(&self, window: &Unavailability) -> Option<Vec<usize>> {
        let Some(ids) = &window.time_slots else {
            return Some((0..self.data.time_slots().len()).collect());
        };
        let mut slots = Vec::with_capacity(ids.len());
        for id in ids {
            match self.data.slot_idx(id) {
                Some(s) => slots.push(s),
                None => {
                    warn!("unavailability names unknown time slot {id}");
                    return None;
                }
            }
        }
        Some(slots)
    }
}
