// Property-based tests for the profitability aggregation
//
// For arbitrary sets of completed appointments:
// - profit == revenue - cost in every bucket and in the totals
// - margins are zero whenever revenue is zero
// - grouping by treatment is a partition of the input
// - treatment and monthly groupings agree on grand totals
// - treatments are ordered by profit (descending), months ascending
// - estimated cost is exactly 30% of revenue

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use clinicflow::modules::appointments::models::{
    AppointmentRecord, AppointmentStatus, TreatmentRef,
};
use clinicflow::modules::reports::models::{DateRange, ReportPeriod};
use clinicflow::modules::reports::services::{ProfitabilityAggregator, ESTIMATED_COST_RATIO};

const TREATMENT_COUNT: usize = 5;

fn treatments() -> Vec<TreatmentRef> {
    // Fixed ids so the same index always lands in the same bucket
    (0..TREATMENT_COUNT)
        .map(|i| TreatmentRef {
            id: Uuid::from_u128(i as u128 + 1),
            name: format!("Treatment {}", i),
            price: Decimal::ZERO,
        })
        .collect()
}

/// (treatment index or None, price in cents, day offset from 2024-01-01)
fn records_strategy() -> impl Strategy<Value = Vec<(Option<usize>, u32, u64)>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.9, 0..TREATMENT_COUNT),
            0u32..5_000_000u32,
            0u64..730u64,
        ),
        0..60,
    )
}

fn build_records(specs: &[(Option<usize>, u32, u64)]) -> Vec<AppointmentRecord> {
    let pool = treatments();
    let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    specs
        .iter()
        .map(|(index, cents, offset)| {
            let treatment = index.map(|i| TreatmentRef {
                price: Decimal::new(*cents as i64, 2),
                ..pool[i].clone()
            });
            AppointmentRecord::new(
                Uuid::new_v4(),
                origin + Days::new(*offset),
                AppointmentStatus::Completed,
                treatment,
            )
        })
        .collect()
}

fn full_range() -> DateRange {
    DateRange {
        start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    }
}

proptest! {
    #[test]
    fn test_profit_identity_holds_everywhere(specs in records_strategy()) {
        let records = build_records(&specs);
        let report = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);

        for t in &report.treatments {
            prop_assert_eq!(t.profit, t.total_revenue - t.total_cost);
        }
        for m in &report.monthly {
            prop_assert_eq!(m.profit, m.revenue - m.cost);
        }
        prop_assert_eq!(
            report.totals.total_profit,
            report.totals.total_revenue - report.totals.total_cost
        );
    }

    #[test]
    fn test_zero_revenue_means_zero_margin(specs in records_strategy()) {
        let records = build_records(&specs);
        let report = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);

        for t in &report.treatments {
            if t.total_revenue == Decimal::ZERO {
                prop_assert_eq!(t.profit_margin, Decimal::ZERO);
            } else {
                // Cost is a fixed share of revenue, so the margin is too
                prop_assert_eq!(t.profit_margin, dec!(70));
            }
        }
        if report.totals.total_revenue == Decimal::ZERO {
            prop_assert_eq!(report.totals.profit_margin, Decimal::ZERO);
        }
    }

    #[test]
    fn test_grouping_is_a_partition(specs in records_strategy()) {
        let records = build_records(&specs);
        let report = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);

        let treatment_sessions: u64 = report.treatments.iter().map(|t| t.session_count).sum();
        let monthly_sessions: u64 = report.monthly.iter().map(|m| m.session_count).sum();

        prop_assert_eq!(treatment_sessions, records.len() as u64);
        prop_assert_eq!(monthly_sessions, records.len() as u64);
        prop_assert_eq!(report.totals.session_count, records.len() as u64);
        prop_assert!(report.treatments.iter().all(|t| t.session_count > 0));
    }

    #[test]
    fn test_monthly_and_treatment_totals_agree(specs in records_strategy()) {
        let records = build_records(&specs);
        let report = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);

        let revenue: Decimal = report.monthly.iter().map(|m| m.revenue).sum();
        let cost: Decimal = report.monthly.iter().map(|m| m.cost).sum();
        let profit: Decimal = report.monthly.iter().map(|m| m.profit).sum();

        prop_assert_eq!(revenue, report.totals.total_revenue);
        prop_assert_eq!(cost, report.totals.total_cost);
        prop_assert_eq!(profit, report.totals.total_profit);
    }

    #[test]
    fn test_sequences_are_ordered(specs in records_strategy()) {
        let records = build_records(&specs);
        let report = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);

        for pair in report.treatments.windows(2) {
            prop_assert!(pair[0].profit >= pair[1].profit);
        }
        for pair in report.monthly.windows(2) {
            prop_assert!(pair[0].month < pair[1].month);
        }
    }

    #[test]
    fn test_cost_is_thirty_percent_of_revenue(specs in records_strategy()) {
        let records = build_records(&specs);
        let treatments = ProfitabilityAggregator::by_treatment(&records);

        for t in &treatments {
            prop_assert_eq!(t.total_cost, t.total_revenue * ESTIMATED_COST_RATIO);
        }
    }

    #[test]
    fn test_aggregation_is_deterministic(specs in records_strategy()) {
        let records = build_records(&specs);
        let first = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);
        let second = ProfitabilityAggregator::aggregate(ReportPeriod::OneYear, full_range(), &records);

        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_equal_profits_keep_first_appearance_order() {
    let pool = treatments();
    let origin = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let priced = |i: usize, price: Decimal| TreatmentRef {
        price,
        ..pool[i].clone()
    };

    let records = vec![
        AppointmentRecord::new(Uuid::new_v4(), origin, AppointmentStatus::Completed, Some(priced(3, dec!(100)))),
        AppointmentRecord::new(Uuid::new_v4(), origin, AppointmentStatus::Completed, Some(priced(1, dec!(100)))),
        AppointmentRecord::new(Uuid::new_v4(), origin, AppointmentStatus::Completed, Some(priced(2, dec!(100)))),
    ];

    let names: Vec<String> = ProfitabilityAggregator::by_treatment(&records)
        .into_iter()
        .map(|t| t.treatment_name)
        .collect();
    assert_eq!(names, vec!["Treatment 3", "Treatment 1", "Treatment 2"]);
}
