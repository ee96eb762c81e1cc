use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::modules::appointments::models::AppointmentRecord;
use crate::modules::reports::models::{
    DateRange, MonthlyRollup, PeriodTotals, ProfitabilityReport, ReportPeriod,
    TreatmentProfitability, UNKNOWN_TREATMENT_NAME,
};

/// Share of the treatment price booked as the cost of one session (0.30)
///
/// Placeholder until consumed products are costed from inventory.
pub const ESTIMATED_COST_RATIO: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

#[derive(Default)]
struct Bucket {
    sessions: u64,
    revenue: Decimal,
    cost: Decimal,
}

impl Bucket {
    fn add(&mut self, revenue: Decimal, cost: Decimal) {
        self.sessions += 1;
        self.revenue += revenue;
        self.cost += cost;
    }
}

/// Rolls completed appointments up into treatment, month and period totals
///
/// Pure: the output depends only on the arguments. Callers hand in records
/// already filtered to completed appointments inside the window.
pub struct ProfitabilityAggregator;

impl ProfitabilityAggregator {
    /// Estimated cost of one session of a treatment sold at `price`
    pub fn estimated_session_cost(price: Decimal) -> Decimal {
        price * ESTIMATED_COST_RATIO
    }

    /// Builds the full report for `period` over `range`
    pub fn aggregate(
        period: ReportPeriod,
        range: DateRange,
        records: &[AppointmentRecord],
    ) -> ProfitabilityReport {
        let treatments = Self::by_treatment(records);
        let monthly = Self::by_month(records);
        let totals = PeriodTotals::from_treatments(&treatments);

        debug!(
            "Aggregated {} appointments into {} treatments and {} months",
            records.len(),
            treatments.len(),
            monthly.len()
        );

        ProfitabilityReport {
            period,
            start_date: range.start,
            end_date: range.end,
            treatments,
            monthly,
            totals,
        }
    }

    /// Per-treatment totals, highest profit first
    ///
    /// Equal profits keep the order in which the treatments first appeared.
    /// Appointments without a treatment share one unknown bucket.
    pub fn by_treatment(records: &[AppointmentRecord]) -> Vec<TreatmentProfitability> {
        let mut index: HashMap<Option<Uuid>, usize> = HashMap::new();
        let mut groups: Vec<(Option<Uuid>, String, Bucket)> = Vec::new();

        for record in records {
            let key = record.treatment.as_ref().map(|t| t.id);
            let slot = *index.entry(key).or_insert_with(|| {
                let name = record
                    .treatment
                    .as_ref()
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| UNKNOWN_TREATMENT_NAME.to_string());
                groups.push((key, name, Bucket::default()));
                groups.len() - 1
            });

            let price = record.treatment_price();
            groups[slot].2.add(price, Self::estimated_session_cost(price));
        }

        let mut treatments: Vec<TreatmentProfitability> = groups
            .into_iter()
            .map(|(id, name, bucket)| {
                TreatmentProfitability::from_totals(id, name, bucket.sessions, bucket.revenue, bucket.cost)
            })
            .collect();

        // sort_by is stable
        treatments.sort_by(|a, b| b.profit.cmp(&a.profit));
        treatments
    }

    /// Per-month totals keyed `YYYY-MM`, oldest month first
    pub fn by_month(records: &[AppointmentRecord]) -> Vec<MonthlyRollup> {
        let mut months: BTreeMap<String, Bucket> = BTreeMap::new();

        for record in records {
            let price = record.treatment_price();
            months
                .entry(record.date.format("%Y-%m").to_string())
                .or_default()
                .add(price, Self::estimated_session_cost(price));
        }

        months
            .into_iter()
            .map(|(month, bucket)| {
                MonthlyRollup::from_totals(month, bucket.sessions, bucket.revenue, bucket.cost)
            })
            .collect()
    }
}
