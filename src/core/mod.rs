pub mod currency;
pub mod error;

pub use currency::{Currency, DisplayFormat, Locale};
pub use error::{AppError, Result};
