mod column;
pub mod days;
pub mod hours;
pub mod input;
pub mod occupancy;
pub mod scope;
pub mod slot;
pub mod validation;

pub use days::DayOfWeek;
pub use hours::LessonHour;
pub use scope::LessonScope;
pub use slot::Slot;
