use async_trait::async_trait;
use autoack_state::EXECUTION_ERROR_COLUMNS;
use autoack_state::ExecutionError;
use autoack_state::NodeEventType;
use autoack_state::ProcessStatus;
use sqlx::QueryBuilder;
use sqlx::Sqlite;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::StalenessRule;

pub const PROCESS_RULE_DESCRIPTION: &str = "Process instances that previously failed but now are in different nodes - meaning node where they were was already completed - or completed/aborted";

/// Process statuses after which an error on the instance is moot.
pub const TERMINATED_PROCESS_STATUSES: [ProcessStatus; 2] =
    [ProcessStatus::Completed, ProcessStatus::Aborted];

/// Node log event type that corroborates an error's initiating node instance.
pub const CORROBORATING_NODE_EVENT: NodeEventType = NodeEventType::Exit;

/// Acknowledges errors of finished process instances and errors whose
/// initiating node instance has a corroborating node log entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessStalenessRule;

impl ProcessStalenessRule {
    pub fn new() -> Self {
        Self
    }

    /// Unacknowledged errors whose process instance completed or aborted.
    pub async fn find_terminated_process_errors(
        &self,
        conn: &mut SqliteConnection,
    ) -> anyhow::Result<Vec<ExecutionError>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            r#"
SELECT {EXECUTION_ERROR_COLUMNS}
FROM execution_errors error
WHERE error.acknowledged = 0
  AND error.process_instance_id IN (
      SELECT pil.process_instance_id
      FROM process_instance_log pil
      WHERE pil.status IN ("#
        ));
        let mut separated = builder.separated(", ");
        for status in TERMINATED_PROCESS_STATUSES {
            separated.push_bind(status.as_str());
        }
        separated.push_unseparated("))");
        builder.push(" ORDER BY error.error_date ASC, error.error_id ASC");

        let rows = builder.build().fetch_all(&mut *conn).await?;
        rows.iter().map(ExecutionError::try_from_row).collect()
    }

    /// Unacknowledged errors whose initiating activity matches a node log
    /// entry of the corroborating event type in the same process instance.
    ///
    /// The error keeps the activity as an integer and the node log keeps text
    /// in canonical form, so the integer side is cast before comparing.
    pub async fn find_advanced_activity_errors(
        &self,
        conn: &mut SqliteConnection,
    ) -> anyhow::Result<Vec<ExecutionError>> {
        let sql = format!(
            r#"
SELECT {EXECUTION_ERROR_COLUMNS}
FROM execution_errors error
WHERE error.acknowledged = 0
  AND error.init_activity_id IS NOT NULL
  AND EXISTS (
      SELECT 1
      FROM node_instance_log nil
      WHERE nil.process_instance_id = error.process_instance_id
        AND nil.node_instance_id = CAST(error.init_activity_id AS TEXT)
        AND nil.event_type = ?
  )
ORDER BY error.error_date ASC, error.error_id ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(CORROBORATING_NODE_EVENT.as_str())
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(ExecutionError::try_from_row).collect()
    }
}

#[async_trait]
impl StalenessRule for ProcessStalenessRule {
    async fn find_stale_errors(
        &self,
        conn: &mut SqliteConnection,
    ) -> anyhow::Result<Vec<ExecutionError>> {
        let mut errors = self.find_terminated_process_errors(conn).await?;
        let terminated = errors.len();
        errors.extend(self.find_advanced_activity_errors(conn).await?);
        debug!(
            terminated,
            advanced = errors.len() - terminated,
            corroborating_event = CORROBORATING_NODE_EVENT.as_str(),
            engine_code = CORROBORATING_NODE_EVENT.engine_code(),
            "evaluated process staleness rule"
        );
        Ok(errors)
    }

    fn describe_rule(&self) -> &str {
        PROCESS_RULE_DESCRIPTION
    }
}
