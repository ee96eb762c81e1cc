use actix_web::{web, HttpResponse, ResponseError};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::ReportsConfig;
use crate::core::{AppError, DisplayFormat, Result};
use crate::modules::reports::models::{
    CostAnalysisRecord, CostSuggestion, MonthlyRollup, PeriodTotals, ProfitabilityReport,
    ReportPeriod, TreatmentProfitability, VarianceAlert,
};
use crate::modules::reports::services::{
    DashboardSnapshot, ProfitabilityDashboard, ReportService, ReportState,
};

/// Query parameters for the profitability endpoint
#[derive(Debug, Deserialize)]
pub struct ProfitabilityQuery {
    /// One of `1m`, `3m`, `6m`, `1y`; the current selection when omitted
    #[serde(default)]
    pub period: Option<String>,
}

/// Query parameters for the cost-analysis endpoint
#[derive(Debug, Deserialize)]
pub struct CostAnalysisQuery {
    /// Earliest period start (inclusive, format: YYYY-MM-DD); one year back when omitted
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Dashboard state as returned by `GET /api/reports/profitability`
#[derive(Debug, Serialize)]
pub struct ProfitabilityResponse {
    pub selected_period: ReportPeriod,
    /// `ready`, `not_computed` or `fetch_failed`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Current report, or the one retained across a failed fetch
    pub report: Option<ProfitabilityReportResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProfitabilityReportResponse {
    pub period: ReportPeriod,
    pub start_date: String, // Format: YYYY-MM-DD
    pub end_date: String,   // Format: YYYY-MM-DD
    pub treatments: Vec<TreatmentResponse>,
    pub monthly: Vec<MonthlyResponse>,
    pub totals: TotalsResponse,
}

/// Amount as a decimal string plus its localized rendering
#[derive(Debug, Serialize)]
pub struct Money {
    pub amount: String,
    pub display: String,
}

/// Percentage rounded to two places plus its localized rendering
#[derive(Debug, Serialize)]
pub struct Percent {
    pub value: String,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct TreatmentResponse {
    pub treatment_id: Option<String>,
    pub treatment_name: String,
    pub session_count: u64,
    pub total_revenue: Money,
    pub total_cost: Money,
    pub profit: Money,
    pub profit_margin: Percent,
    pub average_session_cost: Money,
}

#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    pub month: String,
    pub session_count: u64,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub session_count: u64,
    pub total_revenue: Money,
    pub total_cost: Money,
    pub total_profit: Money,
    pub profit_margin: Percent,
}

#[derive(Debug, Serialize)]
pub struct CostAnalysisResponse {
    pub id: String,
    pub period_start: String,
    pub period_end: String,
    pub expected_cost: Money,
    pub actual_cost: Money,
    pub variance: Money,
    /// Signed, e.g. `+12.5%`
    pub variance_percentage: Percent,
    pub alert: VarianceAlert,
    pub suggestions: Vec<CostSuggestion>,
}

fn money(amount: Decimal, format: &DisplayFormat) -> Money {
    Money {
        amount: amount.to_string(),
        display: format.money(amount),
    }
}

fn percent(value: Decimal, format: &DisplayFormat) -> Percent {
    Percent {
        value: value.round_dp(2).to_string(),
        display: format.percent(value),
    }
}

impl TreatmentResponse {
    fn render(t: &TreatmentProfitability, format: &DisplayFormat) -> Self {
        Self {
            treatment_id: t.treatment_id.map(|id| id.to_string()),
            treatment_name: t.treatment_name.clone(),
            session_count: t.session_count,
            total_revenue: money(t.total_revenue, format),
            total_cost: money(t.total_cost, format),
            profit: money(t.profit, format),
            profit_margin: percent(t.profit_margin, format),
            average_session_cost: money(t.average_session_cost, format),
        }
    }
}

impl MonthlyResponse {
    fn render(m: &MonthlyRollup, format: &DisplayFormat) -> Self {
        Self {
            month: m.month.clone(),
            session_count: m.session_count,
            revenue: money(m.revenue, format),
            cost: money(m.cost, format),
            profit: money(m.profit, format),
        }
    }
}

impl TotalsResponse {
    fn render(t: &PeriodTotals, format: &DisplayFormat) -> Self {
        Self {
            session_count: t.session_count,
            total_revenue: money(t.total_revenue, format),
            total_cost: money(t.total_cost, format),
            total_profit: money(t.total_profit, format),
            profit_margin: percent(t.profit_margin, format),
        }
    }
}

impl ProfitabilityReportResponse {
    pub fn render(report: &ProfitabilityReport, format: &DisplayFormat) -> Self {
        Self {
            period: report.period,
            start_date: report.start_date.format("%Y-%m-%d").to_string(),
            end_date: report.end_date.format("%Y-%m-%d").to_string(),
            treatments: report
                .treatments
                .iter()
                .map(|t| TreatmentResponse::render(t, format))
                .collect(),
            monthly: report
                .monthly
                .iter()
                .map(|m| MonthlyResponse::render(m, format))
                .collect(),
            totals: TotalsResponse::render(&report.totals, format),
        }
    }
}

impl ProfitabilityResponse {
    pub fn render(snapshot: &DashboardSnapshot, format: &DisplayFormat) -> Self {
        let (status, error) = match &snapshot.state {
            ReportState::NotComputed => ("not_computed", None),
            ReportState::Ready { .. } => ("ready", None),
            ReportState::FetchFailed { message, .. } => ("fetch_failed", Some(message.clone())),
        };

        Self {
            selected_period: snapshot.selected_period,
            status,
            error,
            report: snapshot
                .state
                .report()
                .map(|r| ProfitabilityReportResponse::render(r, format)),
        }
    }
}

impl CostAnalysisResponse {
    pub fn render(record: &CostAnalysisRecord, format: &DisplayFormat) -> Self {
        Self {
            id: record.id.to_string(),
            period_start: record.period_start.format("%Y-%m-%d").to_string(),
            period_end: record.period_end.format("%Y-%m-%d").to_string(),
            expected_cost: money(record.expected_cost, format),
            actual_cost: money(record.actual_cost, format),
            variance: money(record.variance, format),
            variance_percentage: Percent {
                value: record.variance_percentage.round_dp(2).to_string(),
                display: format.percent_delta(record.variance_percentage),
            },
            alert: record.alert,
            suggestions: record.suggestions.clone(),
        }
    }
}

/// GET /api/reports/profitability
///
/// Selects the requested period, recomputes the report and returns the
/// dashboard state. A failed fetch answers 503 with the previous report.
pub async fn get_profitability(
    dashboard: web::Data<ProfitabilityDashboard>,
    format: web::Data<DisplayFormat>,
    query: web::Query<ProfitabilityQuery>,
) -> HttpResponse {
    let period = match query.period.as_deref() {
        Some(raw) => match raw.parse::<ReportPeriod>() {
            Ok(period) => period,
            Err(message) => return AppError::validation(message).error_response(),
        },
        None => dashboard.selected_period().await,
    };

    let snapshot = dashboard.select_period(period).await;
    let body = ProfitabilityResponse::render(&snapshot, &format);

    if snapshot.state.is_fetch_failed() {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

/// GET /api/reports/cost-analysis
pub async fn get_cost_analyses(
    service: web::Data<ReportService>,
    format: web::Data<DisplayFormat>,
    reports_config: web::Data<ReportsConfig>,
    query: web::Query<CostAnalysisQuery>,
) -> HttpResponse {
    match handle_get_cost_analyses(&service, &format, &reports_config, &query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("Failed to load cost analyses: {}", e);
            e.error_response()
        }
    }
}

async fn handle_get_cost_analyses(
    service: &ReportService,
    format: &DisplayFormat,
    reports_config: &ReportsConfig,
    query: &CostAnalysisQuery,
) -> Result<Vec<CostAnalysisResponse>> {
    let since = match query.since.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::validation(format!(
                "Invalid since format: '{}'. Expected YYYY-MM-DD",
                raw
            ))
        })?,
        None => ReportPeriod::OneYear.resolve(Utc::now().date_naive()).start,
    };
    let limit = query.limit.unwrap_or(reports_config.cost_analysis_limit);

    let analyses = service.recent_cost_analyses(since, limit).await?;

    Ok(analyses
        .iter()
        .map(|a| CostAnalysisResponse::render(a, format))
        .collect())
}

/// Configure routes for reports module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/reports")
            .route("/profitability", web::get().to(get_profitability))
            .route("/cost-analysis", web::get().to(get_cost_analyses)),
    );
}
