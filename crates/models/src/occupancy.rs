//! In-memory index of who occupies which slot.
//!
//! The lesson engine loads the lessons sharing a slot into an [`Occupancy`]
//! and asks it the three exclusivity questions: is the room free, is the
//! teacher free, and are the students free. The audit loads every lesson and
//! reports whatever [`Occupancy::from_bookings`] had to reject.

use crate::{scope::LessonScope, slot::Slot};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use uuid::Uuid;

/// The scheduling-relevant part of a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub lesson_id: Uuid,
    pub slot: Slot,
    pub room_id: Uuid,
    pub teacher_id: Uuid,
    pub class_id: Uuid,
    pub scope: LessonScope,
}

/// What a class is doing during one slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Empty,
    /// The whole class attends the lesson
    WholeClass(Uuid),
    /// Group id to lesson id; at most one lesson per group
    Groups(BTreeMap<Uuid, Uuid>),
}

impl CellState {
    /// The lesson that would share students with a lesson of `scope`
    pub fn conflict(&self, scope: LessonScope) -> Option<Uuid> {
        match self {
            Self::Empty => None,
            Self::WholeClass(lesson) => Some(*lesson),
            Self::Groups(groups) => groups
                .iter()
                .find(|(group, _)| LessonScope::Group(**group).overlaps(scope))
                .map(|(_, lesson)| *lesson),
        }
    }
}

/// The resource a booking could not take, with the lesson already holding it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Collision {
    #[error("room is taken by lesson {0}")]
    Room(Uuid),
    #[error("teacher is busy with lesson {0}")]
    Teacher(Uuid),
    #[error("class already has lesson {0}")]
    Class(Uuid),
}

impl Collision {
    pub fn lesson_id(self) -> Uuid {
        match self {
            Self::Room(id) | Self::Teacher(id) | Self::Class(id) => id,
        }
    }
}

#[derive(Debug, Default)]
pub struct Occupancy {
    rooms: HashMap<(Slot, Uuid), Uuid>,
    teachers: HashMap<(Slot, Uuid), Uuid>,
    classes: HashMap<(Uuid, Slot), CellState>,
    bookings: HashMap<Uuid, Booking>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from stored lessons, keeping the first booking of every
    /// collision and returning the ones that had to be left out
    pub fn from_bookings(
        bookings: impl IntoIterator<Item = Booking>,
    ) -> (Self, Vec<(Booking, Collision)>) {
        let mut occupancy = Self::new();
        let mut rejected = Vec::new();

        for booking in bookings {
            if let Err(collision) = occupancy.insert(booking) {
                rejected.push((booking, collision));
            }
        }

        (occupancy, rejected)
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn get(&self, lesson_id: Uuid) -> Option<&Booking> {
        self.bookings.get(&lesson_id)
    }

    pub fn room_conflict(&self, slot: Slot, room_id: Uuid) -> Option<Uuid> {
        self.rooms.get(&(slot, room_id)).copied()
    }

    pub fn teacher_conflict(&self, slot: Slot, teacher_id: Uuid) -> Option<Uuid> {
        self.teachers.get(&(slot, teacher_id)).copied()
    }

    pub fn class_conflict(&self, class_id: Uuid, slot: Slot, scope: LessonScope) -> Option<Uuid> {
        self.classes
            .get(&(class_id, slot))
            .and_then(|cell| cell.conflict(scope))
    }

    /// Checks every exclusivity rule for `booking`, classes first
    pub fn check(&self, booking: &Booking) -> Result<(), Collision> {
        if let Some(lesson) = self.class_conflict(booking.class_id, booking.slot, booking.scope) {
            return Err(Collision::Class(lesson));
        }
        if let Some(lesson) = self.room_conflict(booking.slot, booking.room_id) {
            return Err(Collision::Room(lesson));
        }
        if let Some(lesson) = self.teacher_conflict(booking.slot, booking.teacher_id) {
            return Err(Collision::Teacher(lesson));
        }
        Ok(())
    }

    /// Adds a booking if it collides with nothing already indexed
    pub fn insert(&mut self, booking: Booking) -> Result<(), Collision> {
        self.check(&booking)?;

        let id = booking.lesson_id;
        self.rooms.insert((booking.slot, booking.room_id), id);
        self.teachers.insert((booking.slot, booking.teacher_id), id);

        let cell = self
            .classes
            .entry((booking.class_id, booking.slot))
            .or_default();
        match booking.scope {
            LessonScope::WholeClass => *cell = CellState::WholeClass(id),
            LessonScope::Group(group) => match cell {
                CellState::Groups(groups) => {
                    groups.insert(group, id);
                }
                _ => *cell = CellState::Groups(BTreeMap::from([(group, id)])),
            },
        }

        self.bookings.insert(id, booking);
        Ok(())
    }

    pub fn remove(&mut self, lesson_id: Uuid) -> Option<Booking> {
        let booking = self.bookings.remove(&lesson_id)?;

        self.rooms.remove(&(booking.slot, booking.room_id));
        self.teachers.remove(&(booking.slot, booking.teacher_id));

        let key = (booking.class_id, booking.slot);
        let now_empty = match self.classes.get_mut(&key) {
            Some(CellState::Groups(groups)) => {
                groups.retain(|_, lesson| *lesson != lesson_id);
                groups.is_empty()
            }
            Some(CellState::WholeClass(_)) => true,
            _ => false,
        };
        if now_empty {
            self.classes.remove(&key);
        }

        Some(booking)
    }

    /// Lessons of `class_id` at `slot` whose scope is exactly `scope`
    pub fn same_scope(&self, class_id: Uuid, slot: Slot, scope: LessonScope) -> Vec<Uuid> {
        self.bookings
            .values()
            .filter(|b| b.class_id == class_id && b.slot == slot && b.scope == scope)
            .map(|b| b.lesson_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{days::DayOfWeek, hours::LessonHour};

    fn slot(day: i64, hour: i64) -> Slot {
        Slot::new(
            DayOfWeek::from_number(day).unwrap(),
            LessonHour::new(hour).unwrap(),
        )
    }

    fn booking(slot: Slot, class_id: Uuid, scope: LessonScope) -> Booking {
        Booking {
            lesson_id: Uuid::new_v4(),
            slot,
            room_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            class_id,
            scope,
        }
    }

    #[test]
    fn test_room_and_teacher_are_exclusive() {
        let mut occ = Occupancy::new();
        let first = booking(slot(1, 0), Uuid::new_v4(), LessonScope::WholeClass);
        occ.insert(first).unwrap();

        let same_room = Booking {
            room_id: first.room_id,
            ..booking(slot(1, 0), Uuid::new_v4(), LessonScope::WholeClass)
        };
        assert_eq!(occ.insert(same_room), Err(Collision::Room(first.lesson_id)));

        let same_teacher = Booking {
            teacher_id: first.teacher_id,
            ..booking(slot(1, 0), Uuid::new_v4(), LessonScope::WholeClass)
        };
        assert_eq!(
            occ.insert(same_teacher),
            Err(Collision::Teacher(first.lesson_id))
        );

        let next_hour = Booking {
            room_id: first.room_id,
            teacher_id: first.teacher_id,
            ..booking(slot(1, 1), Uuid::new_v4(), LessonScope::WholeClass)
        };
        assert!(occ.insert(next_hour).is_ok());
        assert_eq!(occ.len(), 2);
    }

    #[test]
    fn test_groups_share_a_slot_but_not_with_whole_class() {
        let class = Uuid::new_v4();
        let (g1, g2) = (Uuid::new_v4(), Uuid::new_v4());
        let at = slot(2, 4);

        let mut occ = Occupancy::new();
        let first = booking(at, class, LessonScope::Group(g1));
        let second = booking(at, class, LessonScope::Group(g2));
        occ.insert(first).unwrap();
        occ.insert(second).unwrap();

        assert_eq!(
            occ.insert(booking(at, class, LessonScope::Group(g1))),
            Err(Collision::Class(first.lesson_id))
        );
        assert!(matches!(
            occ.insert(booking(at, class, LessonScope::WholeClass)),
            Err(Collision::Class(_))
        ));
        assert_eq!(
            occ.class_conflict(class, at, LessonScope::Group(g2)),
            Some(second.lesson_id)
        );

        // a different class is unaffected
        assert!(occ
            .insert(booking(at, Uuid::new_v4(), LessonScope::WholeClass))
            .is_ok());
    }

    #[test]
    fn test_split_cell_conflicts() {
        let (g1, g2) = (Uuid::new_v4(), Uuid::new_v4());
        let lesson = Uuid::new_v4();
        let cell = CellState::Groups(BTreeMap::from([(g1, lesson)]));

        assert_eq!(cell.conflict(LessonScope::Group(g1)), Some(lesson));
        assert_eq!(cell.conflict(LessonScope::Group(g2)), None);
        assert_eq!(cell.conflict(LessonScope::WholeClass), Some(lesson));
        assert_eq!(CellState::Empty.conflict(LessonScope::WholeClass), None);
    }

    #[test]
    fn test_whole_class_blocks_groups() {
        let class = Uuid::new_v4();
        let at = slot(3, 2);
        let mut occ = Occupancy::new();
        let whole = booking(at, class, LessonScope::WholeClass);
        occ.insert(whole).unwrap();

        assert_eq!(
            occ.class_conflict(class, at, LessonScope::Group(Uuid::new_v4())),
            Some(whole.lesson_id)
        );
    }

    #[test]
    fn test_remove_frees_every_resource() {
        let class = Uuid::new_v4();
        let group = Uuid::new_v4();
        let at = slot(5, 14);
        let mut occ = Occupancy::new();
        let b = booking(at, class, LessonScope::Group(group));
        occ.insert(b).unwrap();

        assert_eq!(occ.remove(b.lesson_id), Some(b));
        assert!(occ.is_empty());
        assert_eq!(occ.room_conflict(at, b.room_id), None);
        assert_eq!(occ.teacher_conflict(at, b.teacher_id), None);
        assert_eq!(occ.class_conflict(class, at, LessonScope::WholeClass), None);
        assert_eq!(occ.remove(b.lesson_id), None);
    }

    #[test]
    fn test_from_bookings_reports_rejects() {
        let class = Uuid::new_v4();
        let at = slot(4, 7);
        let first = booking(at, class, LessonScope::WholeClass);
        let clash = booking(at, class, LessonScope::WholeClass);

        let (occ, rejected) = Occupancy::from_bookings([first, clash]);
        assert_eq!(occ.len(), 1);
        assert_eq!(rejected, vec![(clash, Collision::Class(first.lesson_id))]);
    }

    #[test]
    fn test_same_scope() {
        let class = Uuid::new_v4();
        let group = Uuid::new_v4();
        let at = slot(1, 5);
        let mut occ = Occupancy::new();
        let b = booking(at, class, LessonScope::Group(group));
        occ.insert(b).unwrap();

        assert_eq!(occ.same_scope(class, at, LessonScope::Group(group)), vec![b.lesson_id]);
        assert!(occ.same_scope(class, at, LessonScope::WholeClass).is_empty());
    }
}
