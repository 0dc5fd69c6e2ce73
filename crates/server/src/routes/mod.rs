pub mod audit;
pub mod classes;
pub mod health;
pub mod lessons;
pub mod me;
pub mod rooms;
pub mod root;
pub mod subjects;
pub mod teachers;
