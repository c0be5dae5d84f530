use std::future::Future;

use autoack_reconcile::ProcessStalenessRule;
use autoack_reconcile::ReconciliationRunner;
use autoack_reconcile::TransactionScope;
use autoack_state::DataStore;
use autoack_state::StoreAcknowledger;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::RunOptions;

/// Schedules reconciliation cycles against one named data store.
pub struct JobTrigger {
    options: RunOptions,
}

impl JobTrigger {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run until a single run finishes or the process receives Ctrl-C.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.run_with_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for ctrl-c: {err}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run cycles until a single run finishes or `shutdown` resolves.
    ///
    /// Only opening the data store can fail; a failed cycle is logged by the
    /// runner and the next one is still scheduled.
    pub async fn run_with_shutdown<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let store = DataStore::open(&self.options.home, &self.options.data_store_name).await?;
        let runner = ReconciliationRunner::with_acknowledger(
            ProcessStalenessRule::new(),
            StoreAcknowledger::new(self.options.acknowledged_by.clone()),
        );
        tokio::pin!(shutdown);

        loop {
            runner.run_once(&store, TransactionScope::Owned).await;
            let Some(delay) = self.options.next_delay() else {
                debug!(data_store = store.name(), "single run finished");
                return Ok(());
            };
            debug!(
                data_store = store.name(),
                ?delay,
                "next auto acknowledgement cycle scheduled"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    info!(data_store = store.name(), "auto acknowledgement job stopped");
                    return Ok(());
                }
            }
        }
    }
}
