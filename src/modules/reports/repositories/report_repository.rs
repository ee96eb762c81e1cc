use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::debug;

use crate::core::Result;
use crate::modules::reports::models::{CostAnalysisRecord, CostAnalysisRow};

/// Query capability over pre-computed cost analyses
#[async_trait]
pub trait CostAnalysisRepository: Send + Sync {
    /// Analyses whose period starts on or after `since`, newest period first, at most `limit`
    async fn find_recent(&self, since: NaiveDate, limit: u32) -> Result<Vec<CostAnalysisRecord>>;
}

pub struct MySqlCostAnalysisRepository {
    pool: MySqlPool,
}

impl MySqlCostAnalysisRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CostAnalysisRepository for MySqlCostAnalysisRepository {
    async fn find_recent(&self, since: NaiveDate, limit: u32) -> Result<Vec<CostAnalysisRecord>> {
        let rows: Vec<CostAnalysisRow> = sqlx::query_as(
            r#"
            SELECT
                id, period_start, period_end, expected_cost, actual_cost,
                CAST(suggestions AS CHAR) AS suggestions
            FROM cost_analyses
            WHERE period_start >= ?
            ORDER BY period_start DESC
            LIMIT ?
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} cost analyses since {}", rows.len(), since);

        Ok(rows
            .into_iter()
            .filter_map(CostAnalysisRow::into_record)
            .collect())
    }
}
