pub mod classes;
pub mod groups;
pub mod lessons;
pub mod rooms;
pub mod subjects;
pub mod teachers;
