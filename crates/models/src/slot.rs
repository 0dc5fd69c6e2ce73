use crate::{days::DayOfWeek, hours::LessonHour};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A (day, period) coordinate of the weekly 5 x 15 timetable grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub day_of_week: DayOfWeek,
    pub lesson_hour: LessonHour,
}

impl Slot {
    pub fn new(day_of_week: DayOfWeek, lesson_hour: LessonHour) -> Self {
        Self {
            day_of_week,
            lesson_hour,
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}, hour {}", self.day_of_week, self.lesson_hour)
    }
}
