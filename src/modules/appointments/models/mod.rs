pub mod appointment;

pub use appointment::{
    AppointmentRecord, AppointmentRow, AppointmentStatus, ConsumedItem, ConsumedItemRow,
    RowRejection, TreatmentRef,
};
