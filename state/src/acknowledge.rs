use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::ExecutionError;
use crate::runtime::acknowledge_errors;

/// Identity recorded on errors acknowledged by the reconciliation job.
pub const SYSTEM_ACKNOWLEDGER: &str = "SYSTEM";

/// Writes the acknowledgement for a batch of execution errors.
///
/// Implementations run on the connection they are handed and must not commit
/// or roll back on their own. Acknowledging an already acknowledged error must
/// succeed without changing it.
#[async_trait]
pub trait ErrorAcknowledger: Send + Sync {
    /// Returns the number of errors newly acknowledged.
    async fn acknowledge(
        &self,
        conn: &mut SqliteConnection,
        errors: &[ExecutionError],
    ) -> anyhow::Result<u64>;
}

/// SQL acknowledgement writing `acknowledged_by` and the current time.
#[derive(Debug, Clone)]
pub struct StoreAcknowledger {
    acknowledged_by: String,
}

impl StoreAcknowledger {
    pub fn new(acknowledged_by: impl Into<String>) -> Self {
        Self {
            acknowledged_by: acknowledged_by.into(),
        }
    }

    pub fn acknowledged_by(&self) -> &str {
        self.acknowledged_by.as_str()
    }
}

impl Default for StoreAcknowledger {
    fn default() -> Self {
        Self::new(SYSTEM_ACKNOWLEDGER)
    }
}

#[async_trait]
impl ErrorAcknowledger for StoreAcknowledger {
    async fn acknowledge(
        &self,
        conn: &mut SqliteConnection,
        errors: &[ExecutionError],
    ) -> anyhow::Result<u64> {
        let error_ids = errors
            .iter()
            .map(|error| error.error_id.as_str())
            .collect::<Vec<_>>();
        acknowledge_errors(conn, &error_ids, self.acknowledged_by.as_str(), Utc::now()).await
    }
}
