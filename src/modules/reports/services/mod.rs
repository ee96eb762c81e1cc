pub mod dashboard;
pub mod profitability_aggregator;
pub mod report_service;

pub use dashboard::{DashboardSnapshot, ProfitabilityDashboard, ReportState};
pub use profitability_aggregator::{ProfitabilityAggregator, ESTIMATED_COST_RATIO};
pub use report_service::{ReportService, MAX_COST_ANALYSIS_LIMIT};
