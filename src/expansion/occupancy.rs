//! Dated resource occupancy.
//!
//! Keyed by (date, slot index). Each cell keeps two independent records:
//!
//! - **committed**: lecturers, rooms and classes of lessons placed so far;
//! - **blocked**: lecturers and rooms made unavailable from outside
//!   (one-off busy slots, unavailability windows).
//!
//! Releasing a lesson only touches the committed record, so a constraint
//! never disappears because the lesson it displaced moved away.
//!
//! Cells are created with an explicit get-or-insert on write. Reads of a
//! missing cell see empty sets, and cells whose sets become empty are
//! dropped again.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::data::ScheduleData;

/// (date, slot index).
pub type Cell = (NaiveDate, usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Committed {
    lecturers: HashSet<usize>,
    rooms: HashSet<usize>,
    classes: HashSet<usize>,
}

impl Committed {
    fn is_empty(&self) -> bool {
        self.lecturers.is_empty() && self.rooms.is_empty() && self.classes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Blocked {
    lecturers: HashSet<usize>,
    rooms: HashSet<usize>,
}

/// Authoritative record of who is where during semester expansion.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    committed: HashMap<Cell, Committed>,
    blocked: HashMap<Cell, Blocked>,
}

impl OccupancyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map pre-blocked with every lecturer's one-off busy slots.
    pub fn from_data(data: &ScheduleData) -> Self {
        let mut map = Self::new();
        for lecturer in 0..data.lecturers().len() {
            for (date, slot) in data.dated_busy(lecturer) {
                map.block_lecturer(date, slot, lecturer);
            }
        }
        map
    }

    fn committed_mut(&mut self, cell: Cell) -> &mut Committed {
        self.committed.entry(cell).or_default()
    }

    fn blocked_mut(&mut self, cell: Cell) -> &mut Blocked {
        self.blocked.entry(cell).or_default()
    }

    /// Reserves lecturer, room and class at (date, slot).
    pub fn reserve(&mut self, date: NaiveDate, slot: usize, lecturer: usize, room: usize, class: usize) {
        let cell = self.committed_mut((date, slot));
        cell.lecturers.insert(lecturer);
        cell.rooms.insert(room);
        cell.classes.insert(class);
    }

    /// Releases a reservation made by [`reserve`](Self::reserve).
    pub fn release(&mut self, date: NaiveDate, slot: usize, lecturer: usize, room: usize, class: usize) {
        let key = (date, slot);
        let Some(cell) = self.committed.get_mut(&key) else {
            return;
        };
        cell.lecturers.remove(&lecturer);
        cell.rooms.remove(&room);
        cell.classes.remove(&class);
        if cell.is_empty() {
            self.committed.remove(&key);
        }
    }

    /// Marks a lecturer unavailable at (date, slot).
    pub fn block_lecturer(&mut self, date: NaiveDate, slot: usize, lecturer: usize) {
        self.blocked_mut((date, slot)).lecturers.insert(lecturer);
    }

    /// Marks a room unavailable at (date, slot).
    pub fn block_room(&mut self, date: NaiveDate, slot: usize, room: usize) {
        self.blocked_mut((date, slot)).rooms.insert(room);
    }

    /// Whether a committed lesson holds the lecturer.
    pub fn lecturer_reserved(&self, date: NaiveDate, slot: usize, lecturer: usize) -> bool {
        self.committed
            .get(&(date, slot))
            .is_some_and(|c| c.lecturers.contains(&lecturer))
    }

    /// Whether a committed lesson holds the room.
    pub fn room_reserved(&self, date: NaiveDate, slot: usize, room: usize) -> bool {
        self.committed
            .get(&(date, slot))
            .is_some_and(|c| c.rooms.contains(&room))
    }

    /// Whether a committed lesson holds the class.
    pub fn class_reserved(&self, date: NaiveDate, slot: usize, class: usize) -> bool {
        self.committed
            .get(&(date, slot))
            .is_some_and(|c| c.classes.contains(&class))
    }

    /// Whether the lecturer is blocked by an external constraint.
    pub fn lecturer_blocked(&self, date: NaiveDate, slot: usize, lecturer: usize) -> bool {
        self.blocked
            .get(&(date, slot))
            .is_some_and(|b| b.lecturers.contains(&lecturer))
    }

    /// Whether the room is blocked by an external constraint.
    pub fn room_blocked(&self, date: NaiveDate, slot: usize, room: usize) -> bool {
        self.blocked
            .get(&(date, slot))
            .is_some_and(|b| b.rooms.contains(&room))
    }

    /// Neither reserved nor blocked.
    #[inline]
    pub fn lecturer_free(&self, date: NaiveDate, slot: usize, lecturer: usize) -> bool {
        !self.lecturer_reserved(date, slot, lecturer) && !self.lecturer_blocked(date, slot, lecturer)
    }

    /// Neither reserved nor blocked.
    #[inline]
    pub fn room_free(&self, date: NaiveDate, slot: usize, room: usize) -> bool {
        !self.room_reserved(date, slot, room) && !self.room_blocked(date, slot, room)
    }

    /// Number of cells with at least one committed lesson.
    pub fn reserved_cells(&self) -> usize {
        self.committed.len()
    }

    /// Number of cells with at least one external block.
    pub fn blocked_cells(&self) -> usize {
        self.blocked.len()
    }
}
