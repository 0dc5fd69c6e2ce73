pub mod audit;
pub mod entities;
pub mod lessons;
pub mod timetable;
