//! Lesson placement.
//!
//! Every placement runs in one transaction: resolve the referenced records,
//! index the lessons already booked in the target slot, run the exclusivity
//! and capacity checks, and only then write. The first failing check wins
//! and nothing is committed.

use crate::{
    entities::{classes, groups, lessons},
    services::{
        ServiceError, classes::ClassService, rooms::RoomService, split::bump_revision,
        subjects::SubjectService, teachers::TeacherService,
    },
};
use chrono::Utc;
use log::{debug, info, warn};
use models::{
    input::LessonCandidate,
    occupancy::{Booking, Occupancy},
    scope::LessonScope,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QueryTrait, TransactionTrait,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Book a new lesson; any lesson of the same class scope in the slot
    /// is a conflict
    Create,
    /// Move or edit an existing lesson, overwriting a lesson of the identical
    /// class scope at the target slot
    Update(Uuid),
    /// Book a new lesson into a grid cell, overwriting whatever the same
    /// class scope has there
    Replace,
}

impl PlacementMode {
    fn displaces(self) -> bool {
        !matches!(self, Self::Create)
    }
}

/// Optional filters for listing lessons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonFilter {
    pub class_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
}

fn rejected(err: ServiceError) -> ServiceError {
    debug!("Lesson placement rejected: {err}");
    err
}

pub struct LessonService;

impl LessonService {
    pub async fn list(
        db: &DatabaseConnection,
        filter: LessonFilter,
    ) -> Result<Vec<lessons::Model>, ServiceError> {
        Ok(lessons::Entity::find()
            .apply_if(filter.class_id, |q, id| {
                q.filter(lessons::Column::ClassId.eq(id))
            })
            .apply_if(filter.teacher_id, |q, id| {
                q.filter(lessons::Column::TeacherId.eq(id))
            })
            .apply_if(filter.room_id, |q, id| {
                q.filter(lessons::Column::RoomId.eq(id))
            })
            .order_by_asc(lessons::Column::DayOfWeek)
            .order_by_asc(lessons::Column::LessonHour)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<lessons::Model, ServiceError> {
        Self::find(db, id).await
    }

    async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<lessons::Model, ServiceError> {
        lessons::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(ServiceError::LessonNotFound(id))
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        let lesson = Self::find(&txn, id).await?;
        bump_revision(&txn, lesson.class_id).await?;

        lessons::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!("Deleted lesson {id}");
        Ok(())
    }

    /// Accepts or rejects a placement and applies it atomically
    pub async fn place_lesson(
        db: &DatabaseConnection,
        candidate: LessonCandidate,
        mode: PlacementMode,
    ) -> Result<lessons::Model, ServiceError> {
        let txn = db.begin().await?;

        let existing = match mode {
            PlacementMode::Update(id) => Some(Self::find(&txn, id).await?),
            PlacementMode::Create | PlacementMode::Replace => None,
        };

        let class = ClassService::find(&txn, candidate.class_id).await?;
        let room = RoomService::find(&txn, candidate.room_id).await?;
        TeacherService::find(&txn, candidate.teacher_id).await?;
        SubjectService::find(&txn, candidate.subject_id).await?;
        let group = match candidate.scope {
            LessonScope::WholeClass => None,
            LessonScope::Group(group_id) => Some(
                groups::Entity::find_by_id(group_id)
                    .filter(groups::Column::ClassId.eq(class.id))
                    .one(&txn)
                    .await?
                    .ok_or(ServiceError::GroupNotFound(group_id))?,
            ),
        };

        bump_revision(&txn, class.id).await?;
        if let Some(existing) = &existing
            && existing.class_id != class.id
        {
            bump_revision(&txn, existing.class_id).await?;
        }

        let slot = candidate.slot;
        let booked = lessons::Entity::find()
            .filter(lessons::Column::DayOfWeek.eq(slot.day_of_week))
            .filter(lessons::Column::LessonHour.eq(slot.lesson_hour))
            .all(&txn)
            .await?;
        let (mut occupancy, clashes) = Occupancy::from_bookings(booked.iter().map(|l| l.booking()));
        if !clashes.is_empty() {
            warn!("{} colliding lessons already stored at {slot}", clashes.len());
        }

        if let Some(existing) = &existing {
            occupancy.remove(existing.id);
        }
        let displaced = if mode.displaces() {
            occupancy.same_scope(class.id, slot, candidate.scope)
        } else {
            Vec::new()
        };
        for id in &displaced {
            occupancy.remove(*id);
        }

        if let Some(lesson_id) = occupancy.class_conflict(class.id, slot, candidate.scope) {
            return Err(rejected(ServiceError::ClassHasLessonAtThisTime { slot, lesson_id }));
        }

        let required = group
            .as_ref()
            .map_or(class.amount_of_students, |g| g.amount_of_students);
        if room.capacity < required {
            return Err(rejected(ServiceError::RoomTooSmall {
                room: room.name,
                capacity: room.capacity,
                required,
            }));
        }

        if let Some(lesson_id) = occupancy.room_conflict(slot, room.id) {
            let class_name = Self::class_name(&txn, &occupancy, lesson_id, &class).await?;
            return Err(rejected(ServiceError::RoomAlreadyTaken {
                slot,
                lesson_id,
                class_name,
            }));
        }

        if let Some(lesson_id) = occupancy.teacher_conflict(slot, candidate.teacher_id) {
            let class_name = Self::class_name(&txn, &occupancy, lesson_id, &class).await?;
            return Err(rejected(ServiceError::TeacherAlreadyBusy {
                slot,
                lesson_id,
                class_name,
            }));
        }

        if let Some(existing) = &existing
            && Self::unchanged(existing, &candidate)
        {
            return Err(ServiceError::NoChangesDetected);
        }

        if !displaced.is_empty() {
            lessons::Entity::delete_many()
                .filter(lessons::Column::Id.is_in(displaced.clone()))
                .exec(&txn)
                .await?;
            info!("Lessons {displaced:?} displaced from {slot}");
        }

        let now = Utc::now().naive_utc();
        let lesson = match existing {
            Some(existing) => {
                let mut lesson: lessons::ActiveModel = existing.into();
                lesson.day_of_week = Set(slot.day_of_week);
                lesson.lesson_hour = Set(slot.lesson_hour);
                lesson.room_id = Set(candidate.room_id);
                lesson.teacher_id = Set(candidate.teacher_id);
                lesson.subject_id = Set(candidate.subject_id);
                lesson.class_id = Set(candidate.class_id);
                lesson.group_id = Set(candidate.scope.group_id());
                lesson.updated_at = Set(now);
                lesson.update(&txn).await?
            }
            None => {
                lessons::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    day_of_week: Set(slot.day_of_week),
                    lesson_hour: Set(slot.lesson_hour),
                    room_id: Set(candidate.room_id),
                    teacher_id: Set(candidate.teacher_id),
                    subject_id: Set(candidate.subject_id),
                    class_id: Set(candidate.class_id),
                    group_id: Set(candidate.scope.group_id()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;
        info!("Placed lesson {} for class {} at {slot}", lesson.id, class.id);
        Ok(lesson)
    }

    fn unchanged(existing: &lessons::Model, candidate: &LessonCandidate) -> bool {
        let proposed = Booking {
            lesson_id: existing.id,
            slot: candidate.slot,
            room_id: candidate.room_id,
            teacher_id: candidate.teacher_id,
            class_id: candidate.class_id,
            scope: candidate.scope,
        };

        existing.booking() == proposed && existing.subject_id == candidate.subject_id
    }

    /// Name of the class holding `lesson_id`, for conflict messages
    async fn class_name<C: ConnectionTrait>(
        conn: &C,
        occupancy: &Occupancy,
        lesson_id: Uuid,
        current: &classes::Model,
    ) -> Result<String, ServiceError> {
        let Some(booking) = occupancy.get(lesson_id) else {
            return Ok(String::new());
        };
        if booking.class_id == current.id {
            return Ok(current.name.clone());
        }

        Ok(classes::Entity::find_by_id(booking.class_id)
            .one(conn)
            .await?
            .map(|class| class.name)
            .unwrap_or_default())
    }
}
