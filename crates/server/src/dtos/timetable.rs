use database::services::timetable::{Timetable, TimetableDay, TimetableEntry};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableLessonResponse {
    pub id: Uuid,
    pub lesson_hour: i16,
    /// Bell time, `HH:MM`
    pub starts_at: String,
    pub ends_at: String,
    pub subject: NamedRef,
    pub teacher: NamedRef,
    pub room: NamedRef,
    pub class: NamedRef,
    pub group: Option<NamedRef>,
}

impl From<TimetableEntry> for TimetableLessonResponse {
    fn from(entry: TimetableEntry) -> Self {
        let hour = entry.lesson.lesson_hour;

        Self {
            id: entry.lesson.id,
            lesson_hour: hour.into(),
            starts_at: hour.start().format("%H:%M").to_string(),
            ends_at: hour.end().format("%H:%M").to_string(),
            subject: NamedRef {
                id: entry.subject.id,
                name: entry.subject.name,
            },
            teacher: NamedRef {
                id: entry.teacher.id,
                name: entry.teacher.full_name(),
            },
            room: NamedRef {
                id: entry.room.id,
                name: entry.room.name,
            },
            class: NamedRef {
                id: entry.class.id,
                name: entry.class.name,
            },
            group: entry.group.map(|group| NamedRef {
                id: group.id,
                name: group.name,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableDayResponse {
    pub day_of_week: i16,
    pub day_name: String,
    pub lessons: Vec<TimetableLessonResponse>,
}

impl From<TimetableDay> for TimetableDayResponse {
    fn from(day: TimetableDay) -> Self {
        Self {
            day_of_week: day.day_of_week.into(),
            day_name: day.day_of_week.to_string(),
            lessons: day.entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimetableResponse {
    pub days: Vec<TimetableDayResponse>,
}

impl From<Timetable> for TimetableResponse {
    fn from(timetable: Timetable) -> Self {
        Self {
            days: timetable.days.into_iter().map(Into::into).collect(),
        }
    }
}
