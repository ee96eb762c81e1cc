//! Clinicflow reporting library
//!
//! Profitability and cost reporting for the clinic-management application:
//! appointment queries, the profitability aggregation, cost-variance records
//! and the HTTP endpoints that serve them.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::appointments;
pub use modules::reports;
