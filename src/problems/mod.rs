pub mod problem;
pub mod feedback;
