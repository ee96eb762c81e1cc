pub mod cost_analysis;
pub mod period;
pub mod profitability;

pub use cost_analysis::{
    parse_suggestions, CostAnalysisRecord, CostAnalysisRow, CostSuggestion, VarianceAlert,
};
pub use period::{DateRange, ReportPeriod};
pub use profitability::{
    ratio_percent, MonthlyRollup, PeriodTotals, ProfitabilityReport, TreatmentProfitability,
    UNKNOWN_TREATMENT_NAME,
};
