use models::{slot::Slot, validation::ValidationErrors};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// How a caller should treat a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A referenced record does not exist
    NotFound,
    /// The payload is malformed; nothing was attempted
    Validation,
    /// A business rule rejected the operation
    Conflict,
    /// The operation would not change anything
    NoOp,
    /// The store failed
    Unexpected,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("class {0} not found")]
    ClassNotFound(Uuid),
    #[error("room {0} not found")]
    RoomNotFound(Uuid),
    #[error("teacher {0} not found")]
    TeacherNotFound(Uuid),
    #[error("subject {0} not found")]
    SubjectNotFound(Uuid),
    #[error("group {0} not found in this class")]
    GroupNotFound(Uuid),
    #[error("lesson {0} not found")]
    LessonNotFound(Uuid),
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),
    #[error("{entity} \"{name}\" already exists")]
    AlreadyExists {
        entity: &'static str,
        field: &'static str,
        name: String,
    },
    #[error("the class already has a lesson on {slot}")]
    ClassHasLessonAtThisTime { slot: Slot, lesson_id: Uuid },
    #[error("room {room} holds {capacity} students but {required} attend")]
    RoomTooSmall {
        room: String,
        capacity: i32,
        required: i32,
    },
    #[error("the room is already taken by class {class_name} on {slot}")]
    RoomAlreadyTaken {
        slot: Slot,
        lesson_id: Uuid,
        class_name: String,
    },
    #[error("the teacher already teaches class {class_name} on {slot}")]
    TeacherAlreadyBusy {
        slot: Slot,
        lesson_id: Uuid,
        class_name: String,
    },
    #[error("the teacher already leads class {class_name}")]
    TeacherAlreadyAssigned { teacher_id: Uuid, class_name: String },
    #[error("a class is split into exactly 2 groups, got {0}")]
    InvalidGroupCount(usize),
    #[error("both groups need a name and a number of students")]
    GroupStudentsRequired,
    #[error("the groups add up to {actual} students but the class has {expected}")]
    InvalidGroupStudentsSum { expected: i32, actual: i32 },
    #[error("no changes detected")]
    NoChangesDetected,
    #[error("the record was changed by another request, please retry")]
    ConcurrentModification,
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        // a unique slot or name index caught a write that raced our checks
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ConcurrentModification,
            _ => Self::Database(err),
        }
    }
}

impl ServiceError {
    /// Stable identifier of the failure, returned to clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClassNotFound(_) => "ClassNotFound",
            Self::RoomNotFound(_) => "RoomNotFound",
            Self::TeacherNotFound(_) => "TeacherNotFound",
            Self::SubjectNotFound(_) => "SubjectNotFound",
            Self::GroupNotFound(_) => "GroupNotFound",
            Self::LessonNotFound(_) => "LessonNotFound",
            Self::ValidationFailed(_) => "ValidationFailed",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::ClassHasLessonAtThisTime { .. } => "ClassHasLessonAtThisTime",
            Self::RoomTooSmall { .. } => "RoomTooSmall",
            Self::RoomAlreadyTaken { .. } => "RoomAlreadyTaken",
            Self::TeacherAlreadyBusy { .. } => "TeacherAlreadyBusy",
            Self::TeacherAlreadyAssigned { .. } => "TeacherAlreadyAssigned",
            Self::InvalidGroupCount(_) => "InvalidGroupCount",
            Self::GroupStudentsRequired => "GroupStudentsRequired",
            Self::InvalidGroupStudentsSum { .. } => "InvalidGroupStudentsSum",
            Self::NoChangesDetected => "NoChangesDetected",
            Self::ConcurrentModification => "ConcurrentModification",
            Self::Database(_) => "Database",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ClassNotFound(_)
            | Self::RoomNotFound(_)
            | Self::TeacherNotFound(_)
            | Self::SubjectNotFound(_)
            | Self::GroupNotFound(_)
            | Self::LessonNotFound(_) => ErrorCategory::NotFound,
            Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::NoChangesDetected => ErrorCategory::NoOp,
            Self::Database(_) => ErrorCategory::Unexpected,
            _ => ErrorCategory::Conflict,
        }
    }

    /// The input field a client should highlight
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ClassNotFound(_) => Some("classId"),
            Self::RoomNotFound(_) | Self::RoomTooSmall { .. } | Self::RoomAlreadyTaken { .. } => {
                Some("roomId")
            }
            Self::TeacherNotFound(_) | Self::TeacherAlreadyBusy { .. } => Some("teacherId"),
            Self::SubjectNotFound(_) => Some("subjectId"),
            Self::GroupNotFound(_) => Some("groupId"),
            Self::ValidationFailed(errors) => errors.first_field(),
            Self::AlreadyExists { field, .. } => Some(*field),
            Self::ClassHasLessonAtThisTime { .. } => Some("lessonHour"),
            Self::TeacherAlreadyAssigned { .. } => Some("mainTeacherId"),
            Self::InvalidGroupCount(_)
            | Self::GroupStudentsRequired
            | Self::InvalidGroupStudentsSum { .. } => Some("groups"),
            _ => None,
        }
    }

    /// Display name of the record standing in the way, if any
    pub fn conflicting_entity(&self) -> Option<&str> {
        match self {
            Self::RoomAlreadyTaken { class_name, .. }
            | Self::TeacherAlreadyBusy { class_name, .. }
            | Self::TeacherAlreadyAssigned { class_name, .. } => Some(class_name),
            Self::AlreadyExists { name, .. } => Some(name),
            Self::RoomTooSmall { room, .. } => Some(room),
            _ => None,
        }
    }
}
