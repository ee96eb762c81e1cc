//! Integration tests for the profitability dashboard state
//!
//! Covers the not-computed state, successful refreshes, retention of the
//! previous report across a failed fetch, and overlapping period selections:
//! the newest one is kept while each caller gets its own report.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use clinicflow::modules::reports::models::ReportPeriod;
use clinicflow::modules::reports::services::{ProfitabilityDashboard, ReportState};

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::*;

fn dashboard(appointments: Arc<InMemoryAppointmentRepository>) -> ProfitabilityDashboard {
    let service = report_service(appointments, Arc::new(InMemoryCostAnalysisRepository::default()));
    ProfitabilityDashboard::new(service, ReportPeriod::ThreeMonths)
}

#[tokio::test]
async fn test_initial_state_is_not_computed() {
    let dashboard = dashboard(Arc::new(InMemoryAppointmentRepository::default()));

    let snapshot = dashboard.snapshot().await;
    assert_eq!(snapshot.selected_period, ReportPeriod::ThreeMonths);
    assert_eq!(snapshot.state, ReportState::NotComputed);
    assert!(snapshot.state.report().is_none());
}

#[tokio::test]
async fn test_refresh_publishes_report_and_selection() {
    let botox = treatment("Botox", dec!(300));
    let appointments = Arc::new(InMemoryAppointmentRepository::with_records(vec![
        completed(date(2025, 2, 14), &botox),
    ]));
    let dashboard = dashboard(appointments);

    let snapshot = dashboard
        .refresh_as_of(ReportPeriod::SixMonths, date(2025, 6, 10))
        .await;

    assert_eq!(snapshot.selected_period, ReportPeriod::SixMonths);
    let report = snapshot.state.report().unwrap();
    assert_eq!(report.period, ReportPeriod::SixMonths);
    assert_eq!(report.totals.total_revenue, dec!(300));
    assert_eq!(dashboard.selected_period().await, ReportPeriod::SixMonths);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_report() {
    let botox = treatment("Botox", dec!(300));
    let appointments = Arc::new(InMemoryAppointmentRepository::with_records(vec![
        completed(date(2025, 6, 1), &botox),
    ]));
    let dashboard = dashboard(appointments.clone());

    let first = dashboard
        .refresh_as_of(ReportPeriod::OneMonth, date(2025, 6, 10))
        .await;
    let first_report = first.state.report().cloned().unwrap();

    appointments.set_failing(true);
    let second = dashboard
        .refresh_as_of(ReportPeriod::OneYear, date(2025, 6, 10))
        .await;

    assert!(second.state.is_fetch_failed());
    assert_eq!(second.selected_period, ReportPeriod::OneYear);
    match &second.state {
        ReportState::FetchFailed { message, previous } => {
            assert!(message.contains("connection refused"));
            assert_eq!(previous.as_ref(), Some(&first_report));
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }

    // A second failure still shows the last good report
    let third = dashboard
        .refresh_as_of(ReportPeriod::OneYear, date(2025, 6, 10))
        .await;
    assert_eq!(third.state.report(), Some(&first_report));

    appointments.set_failing(false);
    let recovered = dashboard
        .refresh_as_of(ReportPeriod::OneYear, date(2025, 6, 10))
        .await;
    assert!(matches!(recovered.state, ReportState::Ready { .. }));
}

#[tokio::test]
async fn test_failure_without_previous_report() {
    let appointments = Arc::new(InMemoryAppointmentRepository::default());
    appointments.set_failing(true);
    let dashboard = dashboard(appointments);

    let snapshot = dashboard
        .refresh_as_of(ReportPeriod::OneMonth, date(2025, 6, 10))
        .await;

    assert!(snapshot.state.is_fetch_failed());
    assert!(snapshot.state.report().is_none());
}

#[tokio::test]
async fn test_overlapping_selections_each_get_their_own_report() {
    let filler = treatment("Filler", dec!(500));
    let appointments = Arc::new(InMemoryAppointmentRepository::with_records(vec![
        completed(date(2024, 9, 1), &filler),
        completed(date(2025, 6, 5), &filler),
    ]));
    // The first (one year) fetch is slow, the second (one month) is immediate
    appointments.push_delay(Duration::from_millis(200));
    let dashboard = dashboard(appointments.clone());

    let (slow, fast) = tokio::join!(
        dashboard.refresh_as_of(ReportPeriod::OneYear, date(2025, 6, 10)),
        dashboard.refresh_as_of(ReportPeriod::OneMonth, date(2025, 6, 10)),
    );

    assert_eq!(appointments.calls(), 2);
    assert_eq!(fast.selected_period, ReportPeriod::OneMonth);
    assert_eq!(fast.state.report().unwrap().period, ReportPeriod::OneMonth);

    // Each caller gets the report for the period it asked for
    assert_eq!(slow.selected_period, ReportPeriod::OneYear);
    let slow_report = slow.state.report().unwrap();
    assert_eq!(slow_report.period, ReportPeriod::OneYear);
    assert_eq!(slow_report.totals.session_count, 2);

    // The shared state keeps the newest selection
    let current = dashboard.snapshot().await;
    assert_eq!(current.selected_period, ReportPeriod::OneMonth);
    let report = current.state.report().unwrap();
    assert_eq!(report.period, ReportPeriod::OneMonth);
    assert_eq!(report.totals.session_count, 1);
}
