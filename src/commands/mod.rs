pub mod analyze;
pub mod instruments;
