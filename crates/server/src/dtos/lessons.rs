use chrono::NaiveDateTime;
use database::{entities::lessons, services::lessons::LessonFilter};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: Uuid,
    /// 1 (Monday) through 5 (Friday)
    pub day_of_week: i16,
    /// 0 through 14
    pub lesson_hour: i16,
    pub room_id: Uuid,
    pub teacher_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Uuid,
    /// Absent for whole-class lessons
    pub group_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<lessons::Model> for LessonResponse {
    fn from(lesson: lessons::Model) -> Self {
        Self {
            id: lesson.id,
            day_of_week: lesson.day_of_week.into(),
            lesson_hour: lesson.lesson_hour.into(),
            room_id: lesson.room_id,
            teacher_id: lesson.teacher_id,
            subject_id: lesson.subject_id,
            class_id: lesson.class_id,
            group_id: lesson.group_id,
            created_at: lesson.created_at,
            updated_at: lesson.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LessonQueryParams {
    pub class_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
}

impl From<LessonQueryParams> for LessonFilter {
    fn from(params: LessonQueryParams) -> Self {
        Self {
            class_id: params.class_id,
            teacher_id: params.teacher_id,
            room_id: params.room_id,
        }
    }
}
