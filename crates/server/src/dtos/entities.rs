use chrono::NaiveDateTime;
use database::{
    entities::{groups, rooms, subjects, teachers},
    services::classes::ClassDetails,
};
use models::input::GroupDraft;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<teachers::Model> for TeacherResponse {
    fn from(teacher: teachers::Model) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            surname: teacher.surname,
            created_at: teacher.created_at,
            updated_at: teacher.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<rooms::Model> for RoomResponse {
    fn from(room: rooms::Model) -> Self {
        Self {
            id: room.id,
            name: room.name,
            capacity: room.capacity,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<subjects::Model> for SubjectResponse {
    fn from(subject: subjects::Model) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            created_at: subject.created_at,
            updated_at: subject.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub amount_of_students: i32,
}

impl From<groups::Model> for GroupResponse {
    fn from(group: groups::Model) -> Self {
        Self {
            id: group.id,
            name: group.name,
            amount_of_students: group.amount_of_students,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: Uuid,
    pub name: String,
    pub main_teacher_id: Option<Uuid>,
    pub amount_of_students: i32,
    pub split_groups: bool,
    pub groups: Vec<GroupResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ClassDetails> for ClassResponse {
    fn from(details: ClassDetails) -> Self {
        let split_groups = details.split_groups();
        let class = details.class;

        Self {
            id: class.id,
            name: class.name,
            main_teacher_id: class.main_teacher_id,
            amount_of_students: class.amount_of_students,
            split_groups,
            groups: details.groups.into_iter().map(GroupResponse::from).collect(),
            created_at: class.created_at,
            updated_at: class.updated_at,
        }
    }
}

/// Groups for `PUT /classes/{id}/groups`; an empty list unsplits the class
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SplitRequest {
    #[serde(default)]
    pub groups: Vec<GroupDraft>,
}
