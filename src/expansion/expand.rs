//! Projection of a weekly chromosome onto semester dates.
//!
//! Gene `k` of a requirement recurs in week `w` iff the requirement's
//! weekly distribution gives week `w` more than `k` lessons, so each week
//! holds exactly its share and the first weeks absorb the remainder.

use chrono::NaiveDate;

use super::schedule::{UnassignableLesson, UnassignableReason};
use crate::data::ScheduleData;
use crate::ga::{Chromosome, GeneState, Placement};
use crate::models::{lesson_date, parse_date};

/// Where a recurrence wants to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The weekly placement mapped onto a date.
    Dated {
        /// Calendar date.
        date: NaiveDate,
        /// Weekly placement.
        placement: Placement,
    },
    /// The gene was never placed; only the week is known.
    Unplaced,
}

/// One recurrence of a gene in one semester week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonInstance {
    /// Lesson unit.
    pub unit: usize,
    /// Semester week (0-based).
    pub week: u32,
    /// Semester start of the unit's program.
    pub start: NaiveDate,
    /// Intended placement.
    pub target: Target,
}

/// Output of the expansion phase.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Recurrences to commit or repair.
    pub instances: Vec<LessonInstance>,
    /// Recurrences that cannot be dated at all.
    pub skipped: Vec<UnassignableLesson>,
}

/// Parsed semester start of a program.
pub fn semester_start(
    data: &ScheduleData,
    program: usize,
    semester: u32,
) -> Result<NaiveDate, UnassignableReason> {
    let Some(text) = data.semester_start(program, semester) else {
        return Err(UnassignableReason::MissingStartDate {
            program: data.program(program).id.clone(),
        });
    };
    parse_date(text).map_err(|e| UnassignableReason::InvalidStartDate {
        value: text.to_string(),
        detail: e.to_string(),
    })
}

/// Weeks in which the unit's gene recurs.
pub fn recurrence_weeks(data: &ScheduleData, unit: usize) -> Vec<u32> {
    let lesson = data.unit(unit);
    data.requirement(lesson.requirement)
        .weekly_distribution()
        .into_iter()
        .enumerate()
        .filter(|&(_, count)| count > lesson.ordinal)
        .map(|(week, _)| week as u32)
        .collect()
}

/// Expands every gene into dated recurrences.
///
/// Recurrences whose date cannot be computed (missing or malformed start
/// date, non-calendar day, rest day, overflow) are reported as skipped
/// rather than dropped.
pub fn expand(chromosome: &Chromosome, data: &ScheduleData) -> Expansion {
    let mut out = Expansion::default();

    for gene in &chromosome.genes {
        let lesson = data.unit(gene.unit);
        let semester = data.requirement(lesson.requirement).semester;
        let weeks = recurrence_weeks(data, gene.unit);

        let start = match semester_start(data, lesson.program, semester) {
            Ok(start) => start,
            Err(reason) => {
                out.skipped.extend(
                    weeks
                        .iter()
                        .map(|&w| UnassignableLesson::new(data, gene.unit, w, reason.clone())),
                );
                continue;
            }
        };

        let placement = match gene.state {
            GeneState::Assigned(p) => p,
            GeneState::Unassigned => {
                out.instances.extend(weeks.iter().map(|&week| LessonInstance {
                    unit: gene.unit,
                    week,
                    start,
                    target: Target::Unplaced,
                }));
                continue;
            }
        };

        let day = data.day(placement.day);
        let weekday = match day.weekday {
            Some(w) if w == data.rest_day() => Err(UnassignableReason::RestDay {
                day: day.name.clone(),
            }),
            Some(w) => Ok(w),
            None => Err(UnassignableReason::UndefinedWeekday {
                day: day.name.clone(),
            }),
        };

        for week in weeks {
            let dated = weekday
                .clone()
                .and_then(|w| lesson_date(start, week, w).ok_or(UnassignableReason::DateOverflow));
            match dated {
                Ok(date) => out.instances.push(LessonInstance {
                    unit: gene.unit,
                    week,
                    start,
                    target: Target::Dated { date, placement },
                }),
                Err(reason) => out.skipped.push(
                    UnassignableLesson::new(data, gene.unit, week, reason)
                        .at(None, Some(placement.slot)),
                ),
            }
        }
    }

    out
}
