//! Whole-store check of the scheduling invariants.

use crate::{
    entities::{classes, groups, lessons, rooms},
    services::{ServiceError, capacity::headcounts},
};
use models::{
    occupancy::{Collision, Occupancy},
    slot::Slot,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
};
use uuid::Uuid;

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two lessons share a room in one slot
    RoomDoubleBooked { slot: Slot, lessons: [Uuid; 2] },
    /// Two lessons share a teacher in one slot
    TeacherDoubleBooked { slot: Slot, lessons: [Uuid; 2] },
    /// Two lessons need the same students in one slot
    ClassDoubleBooked { slot: Slot, lessons: [Uuid; 2] },
    RoomOverCapacity {
        lesson_id: Uuid,
        room_id: Uuid,
        capacity: i32,
        attending: i32,
    },
    InvalidGroupCount { class_id: Uuid, count: usize },
    GroupSumMismatch {
        class_id: Uuid,
        expected: i32,
        actual: i32,
    },
}

impl Violation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomDoubleBooked { .. } => "RoomDoubleBooked",
            Self::TeacherDoubleBooked { .. } => "TeacherDoubleBooked",
            Self::ClassDoubleBooked { .. } => "ClassDoubleBooked",
            Self::RoomOverCapacity { .. } => "RoomOverCapacity",
            Self::InvalidGroupCount { .. } => "InvalidGroupCount",
            Self::GroupSumMismatch { .. } => "GroupSumMismatch",
        }
    }

    /// Lessons involved, if the violation is about lessons
    pub fn lessons(&self) -> Vec<Uuid> {
        match self {
            Self::RoomDoubleBooked { lessons, .. }
            | Self::TeacherDoubleBooked { lessons, .. }
            | Self::ClassDoubleBooked { lessons, .. } => lessons.to_vec(),
            Self::RoomOverCapacity { lesson_id, .. } => vec![*lesson_id],
            Self::InvalidGroupCount { .. } | Self::GroupSumMismatch { .. } => Vec::new(),
        }
    }

    pub fn class_id(&self) -> Option<Uuid> {
        match self {
            Self::InvalidGroupCount { class_id, .. } | Self::GroupSumMismatch { class_id, .. } => {
                Some(*class_id)
            }
            _ => None,
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::RoomDoubleBooked { slot, .. } => write!(f, "room booked twice on {slot}"),
            Self::TeacherDoubleBooked { slot, .. } => write!(f, "teacher booked twice on {slot}"),
            Self::ClassDoubleBooked { slot, .. } => {
                write!(f, "students booked into two lessons on {slot}")
            }
            Self::RoomOverCapacity {
                capacity, attending, ..
            } => write!(f, "{attending} students in a room for {capacity}"),
            Self::InvalidGroupCount { count, .. } => write!(f, "class has {count} groups"),
            Self::GroupSumMismatch {
                expected, actual, ..
            } => write!(f, "groups add up to {actual} students, class has {expected}"),
        }
    }
}

pub struct AuditService;

impl AuditService {
    /// Every violation found in the store, empty when it is healthy
    pub async fn run(db: &DatabaseConnection) -> Result<Vec<Violation>, ServiceError> {
        let lessons = lessons::Entity::find()
            .order_by_asc(lessons::Column::CreatedAt)
            .all(db)
            .await?;

        let (_, clashes) = Occupancy::from_bookings(lessons.iter().map(|l| l.booking()));
        let mut violations: Vec<Violation> = clashes
            .into_iter()
            .map(|(booking, collision)| {
                let pair = [collision.lesson_id(), booking.lesson_id];
                match collision {
                    Collision::Room(_) => Violation::RoomDoubleBooked {
                        slot: booking.slot,
                        lessons: pair,
                    },
                    Collision::Teacher(_) => Violation::TeacherDoubleBooked {
                        slot: booking.slot,
                        lessons: pair,
                    },
                    Collision::Class(_) => Violation::ClassDoubleBooked {
                        slot: booking.slot,
                        lessons: pair,
                    },
                }
            })
            .collect();

        let rooms: HashMap<Uuid, rooms::Model> = rooms::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|room| (room.id, room))
            .collect();
        let attending = headcounts(db, &lessons).await?;
        for lesson in &lessons {
            if let (Some(room), Some(attending)) =
                (rooms.get(&lesson.room_id), attending.get(&lesson.id))
                && room.capacity < *attending
            {
                violations.push(Violation::RoomOverCapacity {
                    lesson_id: lesson.id,
                    room_id: room.id,
                    capacity: room.capacity,
                    attending: *attending,
                });
            }
        }

        let mut groups_by_class: HashMap<Uuid, Vec<groups::Model>> = HashMap::new();
        for group in groups::Entity::find().all(db).await? {
            groups_by_class.entry(group.class_id).or_default().push(group);
        }
        for class in classes::Entity::find()
            .order_by_asc(classes::Column::Name)
            .all(db)
            .await?
        {
            let groups = groups_by_class.remove(&class.id).unwrap_or_default();
            match groups.len() {
                0 => {}
                2 => {
                    let actual = groups.iter().map(|g| g.amount_of_students).sum();
                    if actual != class.amount_of_students {
                        violations.push(Violation::GroupSumMismatch {
                            class_id: class.id,
                            expected: class.amount_of_students,
                            actual,
                        });
                    }
                }
                count => violations.push(Violation::InvalidGroupCount {
                    class_id: class.id,
                    count,
                }),
            }
        }

        Ok(violations)
    }
}
