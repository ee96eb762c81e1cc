use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::modules::reports::models::{ProfitabilityReport, ReportPeriod};
use crate::modules::reports::services::ReportService;

/// What the dashboard currently has to show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportState {
    /// No refresh has completed yet
    NotComputed,
    Ready { report: ProfitabilityReport },
    /// The last fetch failed; `previous` is the report shown before it, if any
    FetchFailed {
        message: String,
        previous: Option<ProfitabilityReport>,
    },
}

impl ReportState {
    /// Report to display, including the one retained across a failed fetch
    pub fn report(&self) -> Option<&ProfitabilityReport> {
        match self {
            ReportState::NotComputed => None,
            ReportState::Ready { report } => Some(report),
            ReportState::FetchFailed { previous, .. } => previous.as_ref(),
        }
    }

    pub fn is_fetch_failed(&self) -> bool {
        matches!(self, ReportState::FetchFailed { .. })
    }
}

/// Point-in-time copy of the dashboard state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub selected_period: ReportPeriod,
    pub state: ReportState,
}

#[derive(Debug)]
struct DashboardState {
    selected_period: ReportPeriod,
    state: ReportState,
}

/// Owns the period selection and the last report of the profitability view
///
/// Every refresh takes a ticket; a result is only published to the shared
/// state when no newer refresh has started in the meantime (last request
/// wins). Each caller still gets back the report it asked for.
pub struct ProfitabilityDashboard {
    service: Arc<ReportService>,
    generation: AtomicU64,
    inner: RwLock<DashboardState>,
}

impl ProfitabilityDashboard {
    pub fn new(service: Arc<ReportService>, initial_period: ReportPeriod) -> Self {
        Self {
            service,
            generation: AtomicU64::new(0),
            inner: RwLock::new(DashboardState {
                selected_period: initial_period,
                state: ReportState::NotComputed,
            }),
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let inner = self.inner.read().await;
        DashboardSnapshot {
            selected_period: inner.selected_period,
            state: inner.state.clone(),
        }
    }

    pub async fn selected_period(&self) -> ReportPeriod {
        self.inner.read().await.selected_period
    }

    /// Select `period` and recompute the report as of today (UTC)
    pub async fn select_period(&self, period: ReportPeriod) -> DashboardSnapshot {
        self.refresh_as_of(period, Utc::now().date_naive()).await
    }

    /// Select `period` and recompute the report for the window ending on `today`
    ///
    /// The returned snapshot always describes `period` and its own outcome.
    /// The shared state only takes that outcome when no newer refresh has
    /// started meanwhile.
    pub async fn refresh_as_of(&self, period: ReportPeriod, today: NaiveDate) -> DashboardSnapshot {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.inner.write().await;
            if self.generation.load(Ordering::SeqCst) == ticket {
                inner.selected_period = period;
            }
        }

        let outcome = self.service.generate_profitability_report(period, today).await;

        let mut inner = self.inner.write().await;
        let state = match outcome {
            Ok(report) => ReportState::Ready { report },
            Err(e) => {
                error!("Profitability report not computed: {}", e);
                ReportState::FetchFailed {
                    message: e.to_string(),
                    previous: inner.state.report().cloned(),
                }
            }
        };

        if self.generation.load(Ordering::SeqCst) == ticket {
            inner.state = state.clone();
        } else {
            debug!("Not publishing superseded {} report (ticket {})", period, ticket);
        }

        DashboardSnapshot {
            selected_period: period,
            state,
        }
    }
}
