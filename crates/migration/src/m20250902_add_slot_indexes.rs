use sea_orm_migration::prelude::*;

use crate::m20250901_create_timetable_tables::{
    Classes, Groups, Lessons, Rooms, Subjects, Teachers,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

const UNIQUE_INDEXES: [&str; 9] = [
    "idx_teachers_name_surname",
    "idx_rooms_name",
    "idx_subjects_name",
    "idx_classes_name",
    "idx_classes_main_teacher_id",
    "idx_groups_class_id_name",
    "idx_groups_class_id_position",
    "idx_lessons_slot_room",
    "idx_lessons_slot_teacher",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_teachers_name_surname")
                    .table(Teachers::Table)
                    .col(Teachers::Name)
                    .col(Teachers::Surname)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_name")
                    .table(Rooms::Table)
                    .col(Rooms::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subjects_name")
                    .table(Subjects::Table)
                    .col(Subjects::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_classes_name")
                    .table(Classes::Table)
                    .col(Classes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A teacher leads at most one class; classes without one hold NULL,
        // which never collides
        manager
            .create_index(
                Index::create()
                    .name("idx_classes_main_teacher_id")
                    .table(Classes::Table)
                    .col(Classes::MainTeacherId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_groups_class_id_name")
                    .table(Groups::Table)
                    .col(Groups::ClassId)
                    .col(Groups::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_groups_class_id_position")
                    .table(Groups::Table)
                    .col(Groups::ClassId)
                    .col(Groups::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One lesson per room and per teacher in every slot
        manager
            .create_index(
                Index::create()
                    .name("idx_lessons_slot_room")
                    .table(Lessons::Table)
                    .col(Lessons::DayOfWeek)
                    .col(Lessons::LessonHour)
                    .col(Lessons::RoomId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lessons_slot_teacher")
                    .table(Lessons::Table)
                    .col(Lessons::DayOfWeek)
                    .col(Lessons::LessonHour)
                    .col(Lessons::TeacherId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Timetable and self-collision lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_lessons_class_slot")
                    .table(Lessons::Table)
                    .col(Lessons::ClassId)
                    .col(Lessons::DayOfWeek)
                    .col(Lessons::LessonHour)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_lessons_class_slot").to_owned())
            .await?;

        for name in UNIQUE_INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).to_owned())
                .await?;
        }

        Ok(())
    }
}
