// Test data factory for appointments and cost analyses

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use clinicflow::modules::appointments::models::{
    AppointmentRecord, AppointmentStatus, ConsumedItem, TreatmentRef,
};
use clinicflow::modules::reports::models::{CostAnalysisRecord, CostSuggestion};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn treatment(name: &str, price: Decimal) -> TreatmentRef {
    TreatmentRef {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
    }
}

pub fn appointment(
    status: AppointmentStatus,
    on: NaiveDate,
    treatment: Option<&TreatmentRef>,
) -> AppointmentRecord {
    AppointmentRecord::new(Uuid::new_v4(), on, status, treatment.cloned())
}

pub fn completed(on: NaiveDate, treatment: &TreatmentRef) -> AppointmentRecord {
    appointment(AppointmentStatus::Completed, on, Some(treatment)).with_consumed_items(vec![
        ConsumedItem {
            product_id: Uuid::new_v4(),
            product_name: "Gloves".to_string(),
            quantity: Decimal::from(2),
        },
    ])
}

pub fn cost_analysis(
    period_start: NaiveDate,
    expected_cost: Decimal,
    actual_cost: Decimal,
) -> CostAnalysisRecord {
    CostAnalysisRecord::new(
        Uuid::new_v4(),
        period_start,
        period_start + chrono::Days::new(29),
        expected_cost,
        actual_cost,
        vec![CostSuggestion {
            product: None,
            message: "Review supplier prices".to_string(),
        }],
    )
}
