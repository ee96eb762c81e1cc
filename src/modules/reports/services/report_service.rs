use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::core::{AppError, Result};
use crate::modules::appointments::models::{AppointmentRecord, AppointmentStatus};
use crate::modules::appointments::repositories::AppointmentRepository;
use crate::modules::reports::models::{
    CostAnalysisRecord, DateRange, ProfitabilityReport, ReportPeriod,
};
use crate::modules::reports::repositories::CostAnalysisRepository;
use crate::modules::reports::services::ProfitabilityAggregator;

/// Upper bound on cost analyses returned in one request
pub const MAX_COST_ANALYSIS_LIMIT: u32 = 100;

/// Service for generating clinic reports
pub struct ReportService {
    appointment_repo: Arc<dyn AppointmentRepository>,
    cost_analysis_repo: Arc<dyn CostAnalysisRepository>,
}

impl ReportService {
    /// Create a new report service
    pub fn new(
        appointment_repo: Arc<dyn AppointmentRepository>,
        cost_analysis_repo: Arc<dyn CostAnalysisRepository>,
    ) -> Self {
        Self {
            appointment_repo,
            cost_analysis_repo,
        }
    }

    /// Generate the profitability report for `period` ending on `today`
    ///
    /// Fetches completed appointments inside the resolved window, then runs
    /// the aggregation. A fetch failure is returned as-is and nothing is
    /// aggregated.
    ///
    /// # Errors
    /// Returns error if the appointment query fails
    pub async fn generate_profitability_report(
        &self,
        period: ReportPeriod,
        today: NaiveDate,
    ) -> Result<ProfitabilityReport> {
        let range = period.resolve(today);

        info!(
            "Generating profitability report: period={}, start={}, end={}",
            period, range.start, range.end
        );

        let records = self
            .appointment_repo
            .find_in_range(range.start, range.end, AppointmentStatus::Completed)
            .await
            .map_err(|e| {
                error!("Failed to fetch appointments for period {}: {}", period, e);
                e
            })?;

        let records = Self::retain_reportable(records, range);
        let report = ProfitabilityAggregator::aggregate(period, range, &records);

        if report.is_empty() {
            warn!(
                "Empty profitability report generated for period {} to {}",
                range.start, range.end
            );
        } else {
            info!(
                "Profitability report generated: {} treatments, {} months, {} sessions",
                report.treatments.len(),
                report.monthly.len(),
                report.totals.session_count
            );
        }

        Ok(report)
    }

    /// Drops records the data source should not have returned
    fn retain_reportable(records: Vec<AppointmentRecord>, range: DateRange) -> Vec<AppointmentRecord> {
        let fetched = records.len();
        let kept: Vec<AppointmentRecord> = records
            .into_iter()
            .filter(|r| r.is_completed() && range.contains(r.date))
            .collect();

        if kept.len() < fetched {
            warn!(
                "Discarded {} appointments outside the completed/date filter",
                fetched - kept.len()
            );
        }
        kept
    }

    /// Most recent cost analyses whose period starts on or after `since`
    ///
    /// # Errors
    /// Returns a validation error when `limit` is 0 or above
    /// [`MAX_COST_ANALYSIS_LIMIT`], or the query error if the fetch fails
    pub async fn recent_cost_analyses(
        &self,
        since: NaiveDate,
        limit: u32,
    ) -> Result<Vec<CostAnalysisRecord>> {
        if limit == 0 || limit > MAX_COST_ANALYSIS_LIMIT {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_COST_ANALYSIS_LIMIT, limit
            )));
        }

        let mut analyses = self
            .cost_analysis_repo
            .find_recent(since, limit)
            .await
            .map_err(|e| {
                error!("Failed to fetch cost analyses since {}: {}", since, e);
                e
            })?;

        // Newest first, whatever order the source used
        analyses.sort_by(|a, b| b.period_start.cmp(&a.period_start));
        analyses.truncate(limit as usize);

        info!("Loaded {} cost analyses since {}", analyses.len(), since);
        Ok(analyses)
    }
}
