use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

/// Start and end (hour, minute) of each period of the school day
const BELL_SCHEDULE: [((u32, u32), (u32, u32)); LessonHour::COUNT] = [
    ((7, 10), (7, 55)),
    ((8, 0), (8, 45)),
    ((8, 55), (9, 40)),
    ((9, 50), (10, 35)),
    ((10, 50), (11, 35)),
    ((11, 45), (12, 30)),
    ((12, 40), (13, 25)),
    ((13, 40), (14, 25)),
    ((14, 35), (15, 20)),
    ((15, 30), (16, 15)),
    ((16, 25), (17, 10)),
    ((17, 20), (18, 5)),
    ((18, 15), (19, 0)),
    ((19, 5), (19, 50)),
    ((19, 55), (20, 40)),
];

/// Index of a period in the fixed 15-period school day (0 through 14)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct LessonHour(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lesson hour must be between 0 and 14, got {0}")]
pub struct InvalidLessonHour(pub i64);

impl LessonHour {
    pub const COUNT: usize = 15;
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 14;

    pub fn new(index: i64) -> Result<Self, InvalidLessonHour> {
        if (Self::MIN..=Self::MAX).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(InvalidLessonHour(index))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    pub fn start(self) -> NaiveTime {
        let (hour, minute) = BELL_SCHEDULE[self.0 as usize].0;
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
    }

    pub fn end(self) -> NaiveTime {
        let (hour, minute) = BELL_SCHEDULE[self.0 as usize].1;
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
    }
}

impl TryFrom<i16> for LessonHour {
    type Error = InvalidLessonHour;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value.into())
    }
}

impl From<LessonHour> for i16 {
    fn from(hour: LessonHour) -> Self {
        hour.0 as i16
    }
}

impl Display for LessonHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} ({}-{})",
            self.0,
            self.start().format("%H:%M"),
            self.end().format("%H:%M")
        )
    }
}

#[cfg(feature = "database")]
crate::small_int_column!(LessonHour, "LessonHour");
