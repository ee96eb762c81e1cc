use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting window, always ending on the current date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportPeriod {
    #[default]
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 4] = [
        ReportPeriod::OneMonth,
        ReportPeriod::ThreeMonths,
        ReportPeriod::SixMonths,
        ReportPeriod::OneYear,
    ];

    pub fn months(&self) -> u32 {
        match self {
            ReportPeriod::OneMonth => 1,
            ReportPeriod::ThreeMonths => 3,
            ReportPeriod::SixMonths => 6,
            ReportPeriod::OneYear => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::OneMonth => "1m",
            ReportPeriod::ThreeMonths => "3m",
            ReportPeriod::SixMonths => "6m",
            ReportPeriod::OneYear => "1y",
        }
    }

    /// Resolves the inclusive `[start, end]` window ending on `today`
    ///
    /// Month subtraction clamps to the last day of a shorter month
    /// (31 March minus one month is 28 or 29 February).
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let start = today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN);
        DateRange { start, end: today }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "1month" => Ok(ReportPeriod::OneMonth),
            "3m" | "3months" => Ok(ReportPeriod::ThreeMonths),
            "6m" | "6months" => Ok(ReportPeriod::SixMonths),
            "1y" | "12m" | "1year" => Ok(ReportPeriod::OneYear),
            _ => Err(format!(
                "Invalid period '{}'. Expected one of 1m, 3m, 6m, 1y",
                s
            )),
        }
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
