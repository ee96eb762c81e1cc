pub mod appointments;
pub mod reports;
