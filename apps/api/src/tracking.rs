//! LLM usage tracking. One record per pipeline invocation, written on
//! success and on failure alike; a sink failure is logged and swallowed so
//! it can never shadow the pipeline's own result.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Result text prefix marking a failed invocation.
pub const ERROR_MARKER: &str = "ERROR: ";

#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub user_id: String,
    pub request_id: Uuid,
    pub model: String,
    pub endpoint: String,
    pub latency_ms: i64,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn record(&self, record: UsageRecord) -> anyhow::Result<()>;
}

/// Postgres-backed sink writing to the `llm_usage` table.
pub struct PgUsageSink {
    pool: PgPool,
}

impl PgUsageSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageSink for PgUsageSink {
    async fn record(&self, record: UsageRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO llm_usage (user_id, request_id, model, endpoint, latency_ms, result, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.user_id)
        .bind(record.request_id)
        .bind(&record.model)
        .bind(&record.endpoint)
        .bind(record.latency_ms)
        .bind(&record.result)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemoryUsageSink {
    records: Mutex<Vec<UsageRecord>>,
}

impl MemoryUsageSink {
    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().expect("usage sink lock poisoned").clone()
    }
}

#[async_trait]
impl UsageSink for MemoryUsageSink {
    async fn record(&self, record: UsageRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .expect("usage sink lock poisoned")
            .push(record);
        Ok(())
    }
}

/// Tracks one LLM-backed request: request id plus wall-clock latency from
/// the moment tracking starts.
pub struct UsageTracker {
    request_id: Uuid,
    started: Instant,
}

impl UsageTracker {
    pub fn start() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            started: Instant::now(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn latency_ms(&self) -> i64 {
        self.started.elapsed().as_millis() as i64
    }

    /// Writes the usage record. Sink failures are logged, never propagated.
    pub async fn log(
        &self,
        sink: &dyn UsageSink,
        user_id: &str,
        model: &str,
        endpoint: &str,
        result: String,
    ) {
        let record = UsageRecord {
            user_id: user_id.to_string(),
            request_id: self.request_id,
            model: model.to_string(),
            endpoint: endpoint.to_string(),
            latency_ms: self.latency_ms(),
            result,
            created_at: Utc::now(),
        };
        if let Err(e) = sink.record(record).await {
            warn!("usage tracking write failed (ignored): {e}");
        }
    }
}
