use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::profitability::ratio_percent;

/// Variance percentage above which a period is flagged for review
pub const VARIANCE_WARNING_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
/// Variance percentage above which a period is flagged as critical
pub const VARIANCE_CRITICAL_PERCENT: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Severity of a cost overrun
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceAlert {
    Normal,
    Warning,
    Critical,
}

impl VarianceAlert {
    /// Only overruns raise an alert; spending under plan is always normal
    pub fn for_percentage(variance_percentage: Decimal) -> Self {
        if variance_percentage > VARIANCE_CRITICAL_PERCENT {
            VarianceAlert::Critical
        } else if variance_percentage > VARIANCE_WARNING_PERCENT {
            VarianceAlert::Warning
        } else {
            VarianceAlert::Normal
        }
    }
}

/// One optimisation hint attached to a cost analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSuggestion {
    pub product: Option<String>,
    pub message: String,
}

/// Shapes the suggestions column has been seen to hold
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSuggestion {
    Text(String),
    Object {
        #[serde(default, alias = "product_name")]
        product: Option<String>,
        #[serde(alias = "text", alias = "suggestion")]
        message: String,
    },
}

impl From<RawSuggestion> for CostSuggestion {
    fn from(raw: RawSuggestion) -> Self {
        match raw {
            RawSuggestion::Text(message) => CostSuggestion {
                product: None,
                message,
            },
            RawSuggestion::Object { product, message } => CostSuggestion { product, message },
        }
    }
}

/// Parses the loose JSON suggestions column, skipping entries of unknown shape
pub fn parse_suggestions(raw: Option<&str>) -> Vec<CostSuggestion> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(single @ (Value::String(_) | Value::Object(_))) => vec![single],
        Ok(Value::Null) => return Vec::new(),
        Ok(other) => {
            warn!("Ignoring suggestions of unexpected JSON type: {}", other);
            return Vec::new();
        }
        Err(e) => {
            warn!("Ignoring unparsable suggestions column: {}", e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawSuggestion>(entry) {
            Ok(raw) => Some(raw.into()),
            Err(e) => {
                warn!("Skipping malformed cost suggestion: {}", e);
                None
            }
        })
        .collect()
}

/// Pre-computed cost analysis for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysisRecord {
    pub id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub expected_cost: Decimal,
    pub actual_cost: Decimal,
    /// `actual_cost - expected_cost`
    pub variance: Decimal,
    /// Variance relative to the expected cost, zero when nothing was expected
    pub variance_percentage: Decimal,
    pub alert: VarianceAlert,
    pub suggestions: Vec<CostSuggestion>,
}

impl CostAnalysisRecord {
    pub fn new(
        id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
        expected_cost: Decimal,
        actual_cost: Decimal,
        suggestions: Vec<CostSuggestion>,
    ) -> Self {
        let variance = actual_cost - expected_cost;
        let variance_percentage = ratio_percent(variance, expected_cost);

        Self {
            id,
            period_start,
            period_end,
            expected_cost,
            actual_cost,
            variance,
            variance_percentage,
            alert: VarianceAlert::for_percentage(variance_percentage),
            suggestions,
        }
    }
}

/// Raw cost-analysis row; `suggestions` is the JSON column cast to text
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct CostAnalysisRow {
    pub id: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub expected_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub suggestions: Option<String>,
}

impl CostAnalysisRow {
    /// Types the row; rows without a valid id or period start are dropped
    pub fn into_record(self) -> Option<CostAnalysisRecord> {
        let id = match Uuid::parse_str(self.id.trim()) {
            Ok(id) => id,
            Err(_) => {
                warn!(id = %self.id, "Skipping cost analysis with malformed id");
                return None;
            }
        };
        let Some(period_start) = self.period_start else {
            warn!(id = %id, "Skipping cost analysis without period start");
            return None;
        };

        Some(CostAnalysisRecord::new(
            id,
            period_start,
            self.period_end.unwrap_or(period_start),
            self.expected_cost.unwrap_or(Decimal::ZERO),
            self.actual_cost.unwrap_or(Decimal::ZERO),
            parse_suggestions(self.suggestions.as_deref()),
        ))
    }
}
