// Appointments module

pub mod models;
pub mod repositories;

pub use models::{AppointmentRecord, AppointmentStatus, ConsumedItem, TreatmentRef};
pub use repositories::AppointmentRepository;
