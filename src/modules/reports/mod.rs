pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ProfitabilityReport, ReportPeriod};
pub use repositories::CostAnalysisRepository;
pub use services::{ProfitabilityAggregator, ProfitabilityDashboard, ReportService};
