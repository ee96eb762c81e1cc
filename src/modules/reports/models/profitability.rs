use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::period::ReportPeriod;

/// Display name of the bucket collecting appointments without a treatment
pub const UNKNOWN_TREATMENT_NAME: &str = "Unknown treatment";

/// `part / whole × 100`, or zero when `whole` is not positive
pub fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        part / whole * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Revenue, estimated cost and margin of one treatment over the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentProfitability {
    /// `None` for the unknown-treatment bucket
    pub treatment_id: Option<Uuid>,
    pub treatment_name: String,
    pub session_count: u64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    /// Percentage, zero when `total_revenue` is zero
    pub profit_margin: Decimal,
    /// Zero when `session_count` is zero
    pub average_session_cost: Decimal,
}

impl TreatmentProfitability {
    /// Derives profit, margin and average cost from the accumulated sums
    pub fn from_totals(
        treatment_id: Option<Uuid>,
        treatment_name: String,
        session_count: u64,
        total_revenue: Decimal,
        total_cost: Decimal,
    ) -> Self {
        let profit = total_revenue - total_cost;
        let average_session_cost = if session_count > 0 {
            total_cost / Decimal::from(session_count)
        } else {
            Decimal::ZERO
        };

        Self {
            treatment_id,
            treatment_name,
            session_count,
            total_revenue,
            total_cost,
            profit,
            profit_margin: ratio_percent(profit, total_revenue),
            average_session_cost,
        }
    }
}

/// Revenue and estimated cost of every session held in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    /// Zero-padded `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub session_count: u64,
}

impl MonthlyRollup {
    pub fn from_totals(month: String, session_count: u64, revenue: Decimal, cost: Decimal) -> Self {
        Self {
            month,
            revenue,
            cost,
            profit: revenue - cost,
            session_count,
        }
    }
}

/// Grand totals across the selected period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub session_count: u64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub profit_margin: Decimal,
}

impl PeriodTotals {
    /// Sums the per-treatment buckets
    pub fn from_treatments(treatments: &[TreatmentProfitability]) -> Self {
        let (session_count, total_revenue, total_cost) = treatments.iter().fold(
            (0u64, Decimal::ZERO, Decimal::ZERO),
            |(sessions, revenue, cost), t| {
                (
                    sessions + t.session_count,
                    revenue + t.total_revenue,
                    cost + t.total_cost,
                )
            },
        );
        let total_profit = total_revenue - total_cost;

        Self {
            session_count,
            total_revenue,
            total_cost,
            total_profit,
            profit_margin: ratio_percent(total_profit, total_revenue),
        }
    }
}

/// Profitability report for one period selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityReport {
    pub period: ReportPeriod,
    /// Start of the reporting window (inclusive)
    pub start_date: NaiveDate,
    /// End of the reporting window (inclusive)
    pub end_date: NaiveDate,
    /// Ordered by profit, highest first
    pub treatments: Vec<TreatmentProfitability>,
    /// Ordered by month, oldest first
    pub monthly: Vec<MonthlyRollup>,
    pub totals: PeriodTotals,
}

impl ProfitabilityReport {
    pub fn is_empty(&self) -> bool {
        self.treatments.is_empty()
    }
}
