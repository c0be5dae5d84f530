use std::sync::Arc;

use async_trait::async_trait;
use autoack_state::ExecutionError;
use sqlx::SqliteConnection;

/// Decides which execution errors no longer reflect actionable state.
///
/// A rule only reads: it runs its queries on the connection it is handed,
/// inside the transaction the caller opened, and leaves acknowledging the
/// result to the caller. The returned list may contain the same error more
/// than once.
#[async_trait]
pub trait StalenessRule: Send + Sync {
    async fn find_stale_errors(
        &self,
        conn: &mut SqliteConnection,
    ) -> anyhow::Result<Vec<ExecutionError>>;

    /// Human readable policy, used in logs only.
    fn describe_rule(&self) -> &str;
}

#[async_trait]
impl<T> StalenessRule for Box<T>
where
    T: StalenessRule + ?Sized,
{
    async fn find_stale_errors(
        &self,
        conn: &mut SqliteConnection,
    ) -> anyhow::Result<Vec<ExecutionError>> {
        (**self).find_stale_errors(conn).await
    }

    fn describe_rule(&self) -> &str {
        (**self).describe_rule()
    }
}

#[async_trait]
impl<T> StalenessRule for Arc<T>
where
    T: StalenessRule + ?Sized,
{
    async fn find_stale_errors(
        &self,
        conn: &mut SqliteConnection,
    ) -> anyhow::Result<Vec<ExecutionError>> {
        (**self).find_stale_errors(conn).await
    }

    fn describe_rule(&self) -> &str {
        (**self).describe_rule()
    }
}
