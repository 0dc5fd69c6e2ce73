#![allow(dead_code)]

use database::{
    entities::{groups, rooms, subjects, teachers},
    services::{
        classes::{ClassDetails, ClassService},
        rooms::RoomService,
        subjects::SubjectService,
        teachers::TeacherService,
    },
};
use migration::{Migrator, MigratorTrait};
use models::{
    days::DayOfWeek,
    hours::LessonHour,
    input::{
        ClassDraft, GroupDraft, LessonCandidate, RoomDraft, SubjectDraft, TeacherDraft,
    },
    scope::LessonScope,
    slot::Slot,
    validation::RawNumber,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// A fresh, migrated in-memory database
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn slot(day: DayOfWeek, hour: i64) -> Slot {
    Slot::new(day, LessonHour::new(hour).unwrap())
}

pub async fn teacher(db: &DatabaseConnection, name: &str, surname: &str) -> teachers::Model {
    TeacherService::create(
        db,
        &TeacherDraft {
            name: Some(name.into()),
            surname: Some(surname.into()),
        },
    )
    .await
    .unwrap()
}

pub async fn room(db: &DatabaseConnection, name: &str, capacity: i64) -> rooms::Model {
    RoomService::create(
        db,
        &RoomDraft {
            name: Some(name.into()),
            capacity: Some(RawNumber::Integer(capacity)),
        },
    )
    .await
    .unwrap()
}

pub async fn subject(db: &DatabaseConnection, name: &str) -> subjects::Model {
    SubjectService::create(
        db,
        &SubjectDraft {
            name: Some(name.into()),
        },
    )
    .await
    .unwrap()
}

pub fn group_draft(name: &str, amount: i64) -> GroupDraft {
    GroupDraft {
        name: Some(name.into()),
        amount_of_students: Some(RawNumber::Integer(amount)),
    }
}

pub fn class_draft(name: &str, amount: i64, groups: Vec<GroupDraft>) -> ClassDraft {
    ClassDraft {
        name: Some(name.into()),
        main_teacher_id: None,
        amount_of_students: Some(RawNumber::Integer(amount)),
        groups: Some(groups),
    }
}

pub async fn class(db: &DatabaseConnection, name: &str, amount: i64) -> ClassDetails {
    ClassService::create(db, &class_draft(name, amount, Vec::new()))
        .await
        .unwrap()
}

pub async fn split_class(
    db: &DatabaseConnection,
    name: &str,
    groups: [(&str, i64); 2],
) -> ClassDetails {
    let total = groups[0].1 + groups[1].1;
    let drafts = groups
        .iter()
        .map(|(name, amount)| group_draft(name, *amount))
        .collect();

    ClassService::create(db, &class_draft(name, total, drafts))
        .await
        .unwrap()
}

/// Rooms, teachers and a subject enough for most placement scenarios
pub struct School {
    pub rooms: Vec<rooms::Model>,
    pub teachers: Vec<teachers::Model>,
    pub subject: subjects::Model,
}

impl School {
    pub async fn new(db: &DatabaseConnection) -> Self {
        let rooms = vec![
            room(db, "101", 30).await,
            room(db, "102", 30).await,
            room(db, "103", 30).await,
        ];
        let teachers = vec![
            teacher(db, "Jan", "Kowalski").await,
            teacher(db, "Anna", "Nowak").await,
            teacher(db, "Piotr", "Wisniewski").await,
        ];
        let subject = subject(db, "Mathematics").await;

        Self {
            rooms,
            teachers,
            subject,
        }
    }

    /// A whole-class lesson using room `room` and teacher `teacher`
    pub fn lesson(&self, class_id: Uuid, at: Slot, room: usize, teacher: usize) -> LessonCandidate {
        LessonCandidate {
            slot: at,
            room_id: self.rooms[room].id,
            teacher_id: self.teachers[teacher].id,
            subject_id: self.subject.id,
            class_id,
            scope: LessonScope::WholeClass,
        }
    }

    pub fn group_lesson(
        &self,
        group: &groups::Model,
        at: Slot,
        room: usize,
        teacher: usize,
    ) -> LessonCandidate {
        LessonCandidate {
            scope: LessonScope::Group(group.id),
            ..self.lesson(group.class_id, at, room, teacher)
        }
    }
}
