//! Weekly timetables of a class, a teacher or a room.

use crate::{
    entities::{classes, groups, lessons, rooms, subjects, teachers},
    services::{
        ServiceError, classes::ClassService, rooms::RoomService, teachers::TeacherService,
    },
};
use models::days::DayOfWeek;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, sea_query::IntoCondition,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A lesson joined with everything a timetable cell shows
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableEntry {
    pub lesson: lessons::Model,
    pub subject: subjects::Model,
    pub teacher: teachers::Model,
    pub room: rooms::Model,
    pub class: classes::Model,
    pub group: Option<groups::Model>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimetableDay {
    pub day_of_week: DayOfWeek,
    /// Ordered by lesson hour, groups of one hour by group position
    pub entries: Vec<TimetableEntry>,
}

/// Monday through Friday, days without lessons included
#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    pub days: Vec<TimetableDay>,
}

impl Timetable {
    pub fn lesson_count(&self) -> usize {
        self.days.iter().map(|day| day.entries.len()).sum()
    }
}

pub struct TimetableService;

impl TimetableService {
    pub async fn for_class(db: &DatabaseConnection, id: Uuid) -> Result<Timetable, ServiceError> {
        ClassService::find(db, id).await?;
        Self::build(db, lessons::Column::ClassId.eq(id)).await
    }

    pub async fn for_teacher(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Timetable, ServiceError> {
        TeacherService::find(db, id).await?;
        Self::build(db, lessons::Column::TeacherId.eq(id)).await
    }

    pub async fn for_room(db: &DatabaseConnection, id: Uuid) -> Result<Timetable, ServiceError> {
        RoomService::find(db, id).await?;
        Self::build(db, lessons::Column::RoomId.eq(id)).await
    }

    async fn build(
        db: &DatabaseConnection,
        condition: impl IntoCondition,
    ) -> Result<Timetable, ServiceError> {
        let lessons = lessons::Entity::find()
            .filter(condition)
            .order_by_asc(lessons::Column::DayOfWeek)
            .order_by_asc(lessons::Column::LessonHour)
            .all(db)
            .await?;

        let subjects = by_id(
            subjects::Entity::find()
                .filter(subjects::Column::Id.is_in(lessons.iter().map(|l| l.subject_id)))
                .all(db)
                .await?,
            |s| s.id,
        );
        let teachers = by_id(
            teachers::Entity::find()
                .filter(teachers::Column::Id.is_in(lessons.iter().map(|l| l.teacher_id)))
                .all(db)
                .await?,
            |t| t.id,
        );
        let rooms = by_id(
            rooms::Entity::find()
                .filter(rooms::Column::Id.is_in(lessons.iter().map(|l| l.room_id)))
                .all(db)
                .await?,
            |r| r.id,
        );
        let classes = by_id(
            classes::Entity::find()
                .filter(classes::Column::Id.is_in(lessons.iter().map(|l| l.class_id)))
                .all(db)
                .await?,
            |c| c.id,
        );
        let groups = by_id(
            groups::Entity::find()
                .filter(groups::Column::Id.is_in(lessons.iter().filter_map(|l| l.group_id)))
                .all(db)
                .await?,
            |g| g.id,
        );

        let mut days: Vec<TimetableDay> = DayOfWeek::week()
            .map(|day_of_week| TimetableDay {
                day_of_week,
                entries: Vec::new(),
            })
            .collect();

        for lesson in lessons {
            let (Some(subject), Some(teacher), Some(room), Some(class)) = (
                subjects.get(&lesson.subject_id),
                teachers.get(&lesson.teacher_id),
                rooms.get(&lesson.room_id),
                classes.get(&lesson.class_id),
            ) else {
                continue;
            };
            let group = lesson.group_id.and_then(|id| groups.get(&id)).cloned();

            if let Some(day) = days
                .iter_mut()
                .find(|day| day.day_of_week == lesson.day_of_week)
            {
                day.entries.push(TimetableEntry {
                    subject: subject.clone(),
                    teacher: teacher.clone(),
                    room: room.clone(),
                    class: class.clone(),
                    group,
                    lesson,
                });
            }
        }

        for day in &mut days {
            day.entries.sort_by_key(|entry| {
                (
                    entry.lesson.lesson_hour,
                    entry.group.as_ref().map(|g| g.position),
                )
            });
        }

        Ok(Timetable { days })
    }
}

fn by_id<T>(records: Vec<T>, id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, T> {
    records.into_iter().map(|record| (id(&record), record)).collect()
}
