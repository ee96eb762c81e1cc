pub mod appointment_repository;

pub use appointment_repository::{
    attach_consumed_items, records_from_rows, AppointmentRepository, MySqlAppointmentRepository,
};
