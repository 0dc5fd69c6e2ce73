use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

/// A school day of the weekly timetable.
///
/// Days are numbered from Monday = 1 to Friday = 5 at every boundary: in JSON
/// payloads, in the database and in this type. Conversions only ever go through
/// [`DayOfWeek::try_from`] and [`DayOfWeek::number`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum DayOfWeek {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("day of week must be between 1 and 5, got {0}")]
pub struct InvalidDay(pub i64);

impl DayOfWeek {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn number(self) -> i16 {
        self as i16
    }

    /// All school days, Monday first
    pub fn week() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn from_number(number: i64) -> Result<Self, InvalidDay> {
        match number {
            1 => Ok(Self::Monday),
            2 => Ok(Self::Tuesday),
            3 => Ok(Self::Wednesday),
            4 => Ok(Self::Thursday),
            5 => Ok(Self::Friday),
            other => Err(InvalidDay(other)),
        }
    }
}

impl TryFrom<i16> for DayOfWeek {
    type Error = InvalidDay;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::from_number(value.into())
    }
}

impl From<DayOfWeek> for i16 {
    fn from(day: DayOfWeek) -> Self {
        day.number()
    }
}

impl Display for DayOfWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        };

        write!(f, "{name}")
    }
}

#[cfg(feature = "database")]
crate::small_int_column!(DayOfWeek, "DayOfWeek");
