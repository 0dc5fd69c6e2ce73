//! Raw payloads as submitted by the administration forms, and the normalised
//! records they validate into.

use crate::{
    days::DayOfWeek,
    hours::LessonHour,
    scope::LessonScope,
    slot::Slot,
    validation::{RawNumber, ValidationErrors, Validator},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TEACHER_NAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=15;
pub const TEACHER_SURNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=40;
pub const ROOM_NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=10;
pub const CLASS_NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=10;
pub const SUBJECT_NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=30;
pub const GROUP_NAME_LENGTH: std::ops::RangeInclusive<usize> = 1..=20;
pub const HEADCOUNT_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TeacherDraft {
    pub name: Option<String>,
    pub surname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherInput {
    pub name: String,
    pub surname: String,
}

impl TeacherDraft {
    pub fn validate(&self) -> Result<TeacherInput, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.text("name", "Teacher name", self.name.as_deref(), TEACHER_NAME_LENGTH);
        let surname = v.text(
            "surname",
            "Teacher surname",
            self.surname.as_deref(),
            TEACHER_SURNAME_LENGTH,
        );

        match (name, surname) {
            (Some(name), Some(surname)) if v.is_valid() => Ok(TeacherInput { name, surname }),
            _ => Err(v.into_errors()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RoomDraft {
    pub name: Option<String>,
    pub capacity: Option<RawNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInput {
    pub name: String,
    pub capacity: i32,
}

impl RoomDraft {
    pub fn validate(&self) -> Result<RoomInput, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.text("name", "Room name", self.name.as_deref(), ROOM_NAME_LENGTH);
        let capacity = v.number(
            "capacity",
            "Room capacity",
            self.capacity.as_ref(),
            HEADCOUNT_RANGE,
        );

        match (name, capacity) {
            (Some(name), Some(capacity)) if v.is_valid() => Ok(RoomInput {
                name,
                capacity: capacity as i32,
            }),
            _ => Err(v.into_errors()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SubjectDraft {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectInput {
    pub name: String,
}

impl SubjectDraft {
    pub fn validate(&self) -> Result<SubjectInput, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.text("name", "Subject name", self.name.as_deref(), SUBJECT_NAME_LENGTH);

        match name {
            Some(name) if v.is_valid() => Ok(SubjectInput { name }),
            _ => Err(v.into_errors()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub name: Option<String>,
    pub amount_of_students: Option<RawNumber>,
}

/// A group as requested for a split.
///
/// Both fields stay optional after validation: whether they are required
/// depends on the split being requested, which is decided when the split is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInput {
    pub name: Option<String>,
    pub amount_of_students: Option<i32>,
}

impl GroupInput {
    pub fn new(name: impl Into<String>, amount_of_students: i32) -> Self {
        Self {
            name: Some(name.into()),
            amount_of_students: Some(amount_of_students),
        }
    }
}

fn validate_groups(v: &mut Validator, groups: &[GroupDraft]) -> Vec<GroupInput> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| GroupInput {
            name: v.optional_text(
                &format!("groups[{i}].name"),
                "Group name",
                group.name.as_deref(),
                GROUP_NAME_LENGTH,
            ),
            amount_of_students: v
                .optional_number(
                    &format!("groups[{i}].amountOfStudents"),
                    "Number of students in the group",
                    group.amount_of_students.as_ref(),
                    HEADCOUNT_RANGE,
                )
                .map(|n| n as i32),
        })
        .collect()
}

/// Validates the groups of a standalone split request
pub fn validate_split(groups: &[GroupDraft]) -> Result<Vec<GroupInput>, ValidationErrors> {
    let mut v = Validator::new();
    let groups = validate_groups(&mut v, groups);

    if v.is_valid() {
        Ok(groups)
    } else {
        Err(v.into_errors())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ClassDraft {
    pub name: Option<String>,
    pub main_teacher_id: Option<String>,
    pub amount_of_students: Option<RawNumber>,
    /// Two groups split the class and an empty list unsplits it. Left out,
    /// the current split is kept.
    pub groups: Option<Vec<GroupDraft>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInput {
    pub name: String,
    pub main_teacher_id: Option<Uuid>,
    pub amount_of_students: i32,
    pub groups: Option<Vec<GroupInput>>,
}

impl ClassDraft {
    pub fn validate(&self) -> Result<ClassInput, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.text("name", "Class name", self.name.as_deref(), CLASS_NAME_LENGTH);
        let main_teacher_id =
            v.optional_id("mainTeacherId", "Main teacher", self.main_teacher_id.as_deref());
        let amount_of_students = v.number(
            "amountOfStudents",
            "Number of students in the class",
            self.amount_of_students.as_ref(),
            HEADCOUNT_RANGE,
        );
        let groups = self
            .groups
            .as_deref()
            .map(|groups| validate_groups(&mut v, groups));

        match (name, amount_of_students) {
            (Some(name), Some(amount_of_students)) if v.is_valid() => Ok(ClassInput {
                name,
                main_teacher_id,
                amount_of_students: amount_of_students as i32,
                groups,
            }),
            _ => Err(v.into_errors()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub day_of_week: Option<RawNumber>,
    pub lesson_hour: Option<RawNumber>,
    pub room_id: Option<String>,
    pub teacher_id: Option<String>,
    pub subject_id: Option<String>,
    pub class_id: Option<String>,
    pub group_id: Option<String>,
}

/// A lesson placement that passed structural validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCandidate {
    pub slot: Slot,
    pub room_id: Uuid,
    pub teacher_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Uuid,
    pub scope: LessonScope,
}

impl LessonDraft {
    pub fn validate(&self) -> Result<LessonCandidate, ValidationErrors> {
        let mut v = Validator::new();
        let day = v.number(
            "dayOfWeek",
            "Day of week",
            self.day_of_week.as_ref(),
            DayOfWeek::MIN..=DayOfWeek::MAX,
        );
        let hour = v.number(
            "lessonHour",
            "Lesson hour",
            self.lesson_hour.as_ref(),
            LessonHour::MIN..=LessonHour::MAX,
        );
        let room_id = v.id("roomId", "Room", self.room_id.as_deref());
        let teacher_id = v.id("teacherId", "Teacher", self.teacher_id.as_deref());
        let subject_id = v.id("subjectId", "Subject", self.subject_id.as_deref());
        let class_id = v.id("classId", "Class", self.class_id.as_deref());
        let group_id = v.optional_id("groupId", "Group", self.group_id.as_deref());

        let slot = match (day, hour) {
            (Some(day), Some(hour)) => DayOfWeek::from_number(day)
                .ok()
                .zip(LessonHour::new(hour).ok())
                .map(|(day, hour)| Slot::new(day, hour)),
            _ => None,
        };

        match (slot, room_id, teacher_id, subject_id, class_id) {
            (Some(slot), Some(room_id), Some(teacher_id), Some(subject_id), Some(class_id))
                if v.is_valid() =>
            {
                Ok(LessonCandidate {
                    slot,
                    room_id,
                    teacher_id,
                    subject_id,
                    class_id,
                    scope: LessonScope::from(group_id),
                })
            }
            _ => Err(v.into_errors()),
        }
    }
}
