use super::*;

impl DataStore {
    /// Record the current lifecycle status of a process instance.
    ///
    /// There is one row per process instance; later calls overwrite it.
    pub async fn upsert_process_status(
        &self,
        record: &ProcessStatusRecord,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO process_instance_log (
    process_instance_id,
    process_id,
    status,
    start_date,
    end_date
) VALUES (?, ?, ?, ?, ?)
ON CONFLICT(process_instance_id) DO UPDATE SET
    process_id = excluded.process_id,
    status = excluded.status,
    start_date = excluded.start_date,
    end_date = excluded.end_date
            "#,
        )
        .bind(record.process_instance_id)
        .bind(record.process_id.as_str())
        .bind(record.status.as_str())
        .bind(datetime_to_epoch_seconds(record.start_date))
        .bind(record.end_date.map(datetime_to_epoch_seconds))
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    /// Shorthand for [`Self::upsert_process_status`] with placeholder metadata.
    pub async fn set_process_status(
        &self,
        process_instance_id: i64,
        status: ProcessStatus,
    ) -> anyhow::Result<()> {
        let now = Utc::now();
        self.upsert_process_status(&ProcessStatusRecord {
            process_instance_id,
            process_id: "process".to_string(),
            status,
            start_date: now,
            end_date: status.is_terminal().then_some(now),
        })
        .await
    }

    pub async fn get_process_status(
        &self,
        process_instance_id: i64,
    ) -> anyhow::Result<Option<ProcessStatusRecord>> {
        let row = sqlx::query(
            r#"
SELECT process_instance_id, process_id, status, start_date, end_date
FROM process_instance_log
WHERE process_instance_id = ?
            "#,
        )
        .bind(process_instance_id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        row.map(|row| ProcessStatusRecord::try_from_row(&row))
            .transpose()
    }

    /// Append a node event, storing the node instance id in canonical form.
    pub async fn append_node_event(
        &self,
        params: &NodeEventCreateParams,
    ) -> anyhow::Result<ActivityStatusRecord> {
        let node_instance_id = normalize_activity_id(params.node_instance_id.as_str())
            .with_context(|| {
                format!(
                    "invalid node instance id for process instance {}",
                    params.process_instance_id
                )
            })?;
        let id = sqlx::query(
            r#"
INSERT INTO node_instance_log (
    process_instance_id,
    node_instance_id,
    node_id,
    node_name,
    node_type,
    event_type,
    log_date
) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(params.process_instance_id)
        .bind(node_instance_id.as_str())
        .bind(params.node_id.as_str())
        .bind(params.node_name.as_str())
        .bind(params.node_type.as_str())
        .bind(params.event_type.as_str())
        .bind(datetime_to_epoch_seconds(params.log_date))
        .execute(self.pool.as_ref())
        .await?
        .last_insert_rowid();

        let row = sqlx::query(
            r#"
SELECT
    id,
    process_instance_id,
    node_instance_id,
    node_id,
    node_name,
    node_type,
    event_type,
    log_date
FROM node_instance_log
WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(self.pool.as_ref())
        .await?;
        ActivityStatusRecord::try_from_row(&row)
    }

    /// List node events of a process instance in log order.
    pub async fn list_node_events(
        &self,
        process_instance_id: i64,
    ) -> anyhow::Result<Vec<ActivityStatusRecord>> {
        let rows = sqlx::query(
            r#"
SELECT
    id,
    process_instance_id,
    node_instance_id,
    node_id,
    node_name,
    node_type,
    event_type,
    log_date
FROM node_instance_log
WHERE process_instance_id = ?
ORDER BY id ASC
            "#,
        )
        .bind(process_instance_id)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(ActivityStatusRecord::try_from_row).collect()
    }
}
