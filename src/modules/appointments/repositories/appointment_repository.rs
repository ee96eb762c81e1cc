// AppointmentRepository
// Read-only queries over appointments joined with their treatment and the
// products consumed during the session.
//
// Rows are validated here; the rest of the crate only sees AppointmentRecord.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::Result;
use crate::modules::appointments::models::{
    AppointmentRecord, AppointmentRow, AppointmentStatus, ConsumedItem, ConsumedItemRow,
};

/// Query capability over appointments
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointments with `status` whose date falls in `[start, end]` (inclusive), in no particular order
    async fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentRecord>>;
}

/// Converts raw rows, dropping and logging the ones that cannot be typed
pub fn records_from_rows(rows: Vec<AppointmentRow>) -> Vec<AppointmentRecord> {
    let total = rows.len();
    let records: Vec<AppointmentRecord> = rows
        .into_iter()
        .filter_map(|row| match AppointmentRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(rejection) => {
                warn!("Skipping appointment row: {}", rejection);
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            "Rejected {} of {} appointment rows at the boundary",
            total - records.len(),
            total
        );
    }
    records
}

/// Completed-appointment rows joined with their treatment
const APPOINTMENTS_QUERY: &str = r#"
    SELECT
        a.id, a.date, a.status,
        t.id AS treatment_id, t.name AS treatment_name, t.price AS treatment_price
    FROM appointments a
    LEFT JOIN treatments t ON t.id = a.treatment_id
    WHERE a.status = ? AND a.date >= ? AND a.date <= ?
"#;

/// Products consumed by the appointments matching the same filter; the bind
/// count stays fixed whatever the number of appointments
const CONSUMED_ITEMS_QUERY: &str = r#"
    SELECT
        ap.appointment_id, ap.product_id, p.name AS product_name, ap.quantity
    FROM appointment_products ap
    JOIN appointments a ON a.id = ap.appointment_id
    LEFT JOIN products p ON p.id = ap.product_id
    WHERE a.status = ? AND a.date >= ? AND a.date <= ?
"#;

/// Attaches consumed items to their appointment; items of unknown appointments are dropped
pub fn attach_consumed_items(
    records: Vec<AppointmentRecord>,
    item_rows: Vec<ConsumedItemRow>,
) -> Vec<AppointmentRecord> {
    let mut consumed: HashMap<Uuid, Vec<ConsumedItem>> = HashMap::new();
    for row in item_rows {
        if let Some((appointment_id, item)) = row.into_item() {
            consumed.entry(appointment_id).or_default().push(item);
        }
    }

    records
        .into_iter()
        .map(|record| {
            let items = consumed.remove(&record.id).unwrap_or_default();
            record.with_consumed_items(items)
        })
        .collect()
}

/// Repository backed by the clinic MySQL database
pub struct MySqlAppointmentRepository {
    pool: MySqlPool,
}

impl MySqlAppointmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for MySqlAppointmentRepository {
    async fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentRecord>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(APPOINTMENTS_QUERY)
            .bind(status.as_str())
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "Fetched {} {} appointments between {} and {}",
            rows.len(),
            status,
            start,
            end
        );

        let records = records_from_rows(rows);
        if records.is_empty() {
            return Ok(records);
        }

        let item_rows: Vec<ConsumedItemRow> = sqlx::query_as(CONSUMED_ITEMS_QUERY)
            .bind(status.as_str())
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(attach_consumed_items(records, item_rows))
    }
}
