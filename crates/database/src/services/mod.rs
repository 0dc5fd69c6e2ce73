pub mod audit;
mod capacity;
pub mod classes;
pub mod error;
pub mod lessons;
pub mod rooms;
pub mod split;
pub mod subjects;
pub mod teachers;
pub mod timetable;

pub use error::{ErrorCategory, ServiceError};
