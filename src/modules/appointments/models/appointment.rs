use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

/// Billable treatment referenced by an appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentRef {
    pub id: Uuid,
    pub name: String,
    /// Non-negative list price of one session
    pub price: Decimal,
}

/// Product consumed during an appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumedItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
}

/// A fetched appointment, validated at the data-source boundary
///
/// Records are immutable once built and owned by the aggregation pass that
/// consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub status: AppointmentStatus,
    /// `None` when the treatment join came back empty
    pub treatment: Option<TreatmentRef>,
    pub consumed_items: Vec<ConsumedItem>,
}

impl AppointmentRecord {
    pub fn new(
        id: Uuid,
        date: NaiveDate,
        status: AppointmentStatus,
        treatment: Option<TreatmentRef>,
    ) -> Self {
        Self {
            id,
            date,
            status,
            treatment,
            consumed_items: Vec::new(),
        }
    }

    pub fn with_consumed_items(mut self, items: Vec<ConsumedItem>) -> Self {
        self.consumed_items = items;
        self
    }

    /// Session price; zero when the treatment is unknown
    pub fn treatment_price(&self) -> Decimal {
        self.treatment
            .as_ref()
            .map(|t| t.price)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Completed
    }
}

/// Raw appointment row as returned by the data source (treatment left-joined)
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct AppointmentRow {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub treatment_id: Option<String>,
    pub treatment_name: Option<String>,
    pub treatment_price: Option<Decimal>,
}

/// Reason a raw row could not become an [`AppointmentRecord`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowRejection {
    #[error("appointment id '{0}' is not a valid UUID")]
    InvalidId(String),
    #[error("appointment {0} has no date")]
    MissingDate(Uuid),
    #[error("appointment {id} has unknown status '{status}'")]
    InvalidStatus { id: Uuid, status: String },
}

impl TryFrom<AppointmentRow> for AppointmentRecord {
    type Error = RowRejection;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(row.id.trim()).map_err(|_| RowRejection::InvalidId(row.id.clone()))?;
        let date = row.date.ok_or(RowRejection::MissingDate(id))?;

        let status_raw = row.status.unwrap_or_default();
        let status = status_raw
            .parse::<AppointmentStatus>()
            .map_err(|_| RowRejection::InvalidStatus {
                id,
                status: status_raw.clone(),
            })?;

        Ok(AppointmentRecord::new(
            id,
            date,
            status,
            treatment_from_row(id, row.treatment_id, row.treatment_name, row.treatment_price),
        ))
    }
}

/// A missing or negative price contributes zero; a missing or malformed
/// treatment id lands the appointment in the unknown-treatment bucket.
fn treatment_from_row(
    appointment_id: Uuid,
    treatment_id: Option<String>,
    name: Option<String>,
    price: Option<Decimal>,
) -> Option<TreatmentRef> {
    let raw_id = treatment_id?;
    let id = match Uuid::parse_str(raw_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            warn!(
                appointment_id = %appointment_id,
                treatment_id = %raw_id,
                "Malformed treatment id, attributing to unknown treatment"
            );
            return None;
        }
    };

    let price = match price {
        Some(p) if p >= Decimal::ZERO => p,
        Some(p) => {
            warn!(appointment_id = %appointment_id, price = %p, "Negative treatment price, using zero");
            Decimal::ZERO
        }
        None => {
            warn!(appointment_id = %appointment_id, "Treatment price missing, using zero");
            Decimal::ZERO
        }
    };

    Some(TreatmentRef {
        id,
        name: name.unwrap_or_default(),
        price,
    })
}

/// Raw consumed-item row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConsumedItemRow {
    pub appointment_id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: Option<Decimal>,
}

impl ConsumedItemRow {
    /// Converts into the owning appointment id and the typed item, or `None` when ids are malformed
    pub fn into_item(self) -> Option<(Uuid, ConsumedItem)> {
        let appointment_id = Uuid::parse_str(self.appointment_id.trim()).ok()?;
        let product_id = Uuid::parse_str(self.product_id.trim()).ok()?;
        Some((
            appointment_id,
            ConsumedItem {
                product_id,
                product_name: self.product_name.unwrap_or_default(),
                quantity: self.quantity.unwrap_or(Decimal::ZERO),
            },
        ))
    }
}
