use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teachers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teachers::Name).string_len(15).not_null())
                    .col(ColumnDef::new(Teachers::Surname).string_len(40).not_null())
                    .col(ColumnDef::new(Teachers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Teachers::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rooms::Name).string_len(10).not_null())
                    .col(ColumnDef::new(Rooms::Capacity).integer().not_null())
                    .col(ColumnDef::new(Rooms::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Rooms::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subjects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Subjects::Name).string_len(30).not_null())
                    .col(ColumnDef::new(Subjects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Subjects::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // revision is bumped by every placement touching the class, so two
        // concurrent placements for one class serialize on the row
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Classes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Classes::Name).string_len(10).not_null())
                    .col(ColumnDef::new(Classes::MainTeacherId).uuid())
                    .col(ColumnDef::new(Classes::AmountOfStudents).integer().not_null())
                    .col(
                        ColumnDef::new(Classes::Revision)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Classes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Classes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-classes-main_teacher_id")
                            .from(Classes::Table, Classes::MainTeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Groups::ClassId).uuid().not_null())
                    .col(ColumnDef::new(Groups::Name).string_len(20).not_null())
                    .col(ColumnDef::new(Groups::AmountOfStudents).integer().not_null())
                    .col(ColumnDef::new(Groups::Position).small_integer().not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Groups::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-groups-class_id")
                            .from(Groups::Table, Groups::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lessons::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Lessons::DayOfWeek).small_integer().not_null())
                    .col(ColumnDef::new(Lessons::LessonHour).small_integer().not_null())
                    .col(ColumnDef::new(Lessons::RoomId).uuid().not_null())
                    .col(ColumnDef::new(Lessons::TeacherId).uuid().not_null())
                    .col(ColumnDef::new(Lessons::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(Lessons::ClassId).uuid().not_null())
                    .col(ColumnDef::new(Lessons::GroupId).uuid())
                    .col(ColumnDef::new(Lessons::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Lessons::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lessons-room_id")
                            .from(Lessons::Table, Lessons::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lessons-teacher_id")
                            .from(Lessons::Table, Lessons::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lessons-subject_id")
                            .from(Lessons::Table, Lessons::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lessons-class_id")
                            .from(Lessons::Table, Lessons::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lessons-group_id")
                            .from(Lessons::Table, Lessons::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Teachers {
    Table,
    Id,
    Name,
    Surname,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Rooms {
    Table,
    Id,
    Name,
    Capacity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Subjects {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Classes {
    Table,
    Id,
    Name,
    MainTeacherId,
    AmountOfStudents,
    Revision,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Groups {
    Table,
    Id,
    ClassId,
    Name,
    AmountOfStudents,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Lessons {
    Table,
    Id,
    DayOfWeek,
    LessonHour,
    RoomId,
    TeacherId,
    SubjectId,
    ClassId,
    GroupId,
    CreatedAt,
    UpdatedAt,
}
