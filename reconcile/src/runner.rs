use autoack_state::DataStore;
use autoack_state::ErrorAcknowledger;
use autoack_state::StoreAcknowledger;
use sqlx::Connection;
use sqlx::Sqlite;
use sqlx::SqliteConnection;
use sqlx::Transaction;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::StalenessRule;

/// Who owns the transaction a reconciliation cycle runs in.
pub enum TransactionScope<'c> {
    /// No transaction is open. The runner begins a write transaction on the
    /// data store and commits or rolls it back itself. Overlapping owned
    /// cycles queue on the write lock instead of failing.
    Owned,
    /// The caller already holds a transaction on this connection. The runner
    /// works inside a savepoint and leaves commit or rollback of the
    /// enclosing transaction to the caller.
    Joined(&'c mut SqliteConnection),
}

/// Counts for one successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Errors selected by the rule, duplicates included.
    pub candidates: usize,
    /// Errors whose acknowledged flag this cycle flipped.
    pub acknowledged: u64,
}

/// Runs a [`StalenessRule`] and acknowledges what it selects, all in one
/// transactional unit.
///
/// Failures never reach the caller: a failed cycle is logged, its unit is
/// rolled back, and the errors stay unacknowledged for the next cycle.
pub struct ReconciliationRunner<R, A = StoreAcknowledger> {
    rule: R,
    acknowledger: A,
}

impl<R> ReconciliationRunner<R>
where
    R: StalenessRule,
{
    /// Runner acknowledging as [`autoack_state::SYSTEM_ACKNOWLEDGER`].
    pub fn new(rule: R) -> Self {
        Self::with_acknowledger(rule, StoreAcknowledger::default())
    }
}

impl<R, A> ReconciliationRunner<R, A>
where
    R: StalenessRule,
    A: ErrorAcknowledger,
{
    pub fn with_acknowledger(rule: R, acknowledger: A) -> Self {
        Self { rule, acknowledger }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Run one reconciliation cycle against `store`.
    pub async fn run_once(&self, store: &DataStore, scope: TransactionScope<'_>) {
        match scope {
            TransactionScope::Owned => match store.begin_write().await {
                Ok(tx) => self.run_in(store, tx).await,
                Err(err) => self.report_failure(store, &err),
            },
            TransactionScope::Joined(conn) => match conn.begin().await {
                Ok(savepoint) => self.run_in(store, savepoint).await,
                Err(err) => self.report_failure(store, &err.into()),
            },
        }
    }

    /// Commit `tx` when the cycle succeeds, roll it back otherwise. For a
    /// joined scope `tx` is a savepoint, so commit and rollback only release
    /// or undo this cycle's work.
    async fn run_in(&self, store: &DataStore, mut tx: Transaction<'_, Sqlite>) {
        match self.reconcile(&mut tx).await {
            Ok(summary) => match tx.commit().await {
                Ok(()) => self.report_success(store, summary),
                Err(err) => self.report_failure(store, &err.into()),
            },
            Err(err) => {
                self.report_failure(store, &err);
                if let Err(err) = tx.rollback().await {
                    warn!(
                        data_store = store.name(),
                        "failed to roll back reconciliation cycle: {err}"
                    );
                }
            }
        }
    }

    async fn reconcile(&self, conn: &mut SqliteConnection) -> anyhow::Result<CycleSummary> {
        let candidates = self.rule.find_stale_errors(&mut *conn).await?;
        for candidate in &candidates {
            debug!(
                error_id = candidate.error_id.as_str(),
                process_instance_id = candidate.process_instance_id,
                "acknowledging stale execution error"
            );
        }
        let acknowledged = self
            .acknowledger
            .acknowledge(&mut *conn, &candidates)
            .await?;
        Ok(CycleSummary {
            candidates: candidates.len(),
            acknowledged,
        })
    }

    fn report_success(&self, store: &DataStore, summary: CycleSummary) {
        info!(
            data_store = store.name(),
            rule = self.rule.describe_rule(),
            candidates = summary.candidates,
            acknowledged = summary.acknowledged,
            "found {} errors to be acknowledged, acknowledged {}",
            summary.candidates,
            summary.acknowledged
        );
    }

    fn report_failure(&self, store: &DataStore, err: &anyhow::Error) {
        error!(
            data_store = store.name(),
            rule = self.rule.describe_rule(),
            "execution error auto acknowledgement failed: {err:#}"
        );
    }
}
