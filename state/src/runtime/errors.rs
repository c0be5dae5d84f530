use super::*;

impl DataStore {
    /// Record a new, unacknowledged execution error.
    pub async fn insert_execution_error(
        &self,
        params: &ExecutionErrorCreateParams,
    ) -> anyhow::Result<ExecutionError> {
        sqlx::query(
            r#"
INSERT INTO execution_errors (
    error_id,
    error_type,
    deployment_id,
    process_instance_id,
    process_id,
    activity_id,
    activity_name,
    job_id,
    error_message,
    error_info,
    error_date,
    init_activity_id,
    acknowledged,
    acknowledged_by,
    acknowledged_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, NULL)
            "#,
        )
        .bind(params.error_id.as_str())
        .bind(params.error_type.as_str())
        .bind(params.deployment_id.as_str())
        .bind(params.process_instance_id)
        .bind(params.process_id.as_str())
        .bind(params.activity_id)
        .bind(params.activity_name.as_deref())
        .bind(params.job_id)
        .bind(params.error_message.as_str())
        .bind(params.error_info.as_deref())
        .bind(datetime_to_epoch_seconds(params.error_date))
        .bind(params.init_activity_id)
        .execute(self.pool.as_ref())
        .await?;

        let error_id = params.error_id.as_str();
        self.get_execution_error(error_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("failed to load created execution error {error_id}"))
    }

    pub async fn get_execution_error(
        &self,
        error_id: &str,
    ) -> anyhow::Result<Option<ExecutionError>> {
        let row = sqlx::query(&format!(
            "SELECT {EXECUTION_ERROR_COLUMNS} FROM execution_errors error WHERE error.error_id = ?"
        ))
        .bind(error_id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        row.map(|row| ExecutionError::try_from_row(&row)).transpose()
    }

    /// List unacknowledged errors, oldest first.
    pub async fn list_unacknowledged_errors(
        &self,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<ExecutionError>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {EXECUTION_ERROR_COLUMNS} FROM execution_errors error WHERE error.acknowledged = 0"
        ));
        builder.push(" ORDER BY error.error_date ASC, error.error_id ASC");
        if let Some(limit) = limit {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let rows = builder.build().fetch_all(self.pool.as_ref()).await?;
        rows.iter().map(ExecutionError::try_from_row).collect()
    }

    pub async fn count_unacknowledged_errors(&self) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM execution_errors WHERE acknowledged = 0",
        )
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(count)
    }
}

/// Acknowledge errors by id on `conn`, inside whatever transaction it holds.
///
/// Only rows that are still unacknowledged are touched, so acknowledging an
/// id twice (in one call or across concurrent runs) is a no-op rather than an
/// error, and the audit columns keep their first value. Returns the number of
/// rows newly acknowledged.
pub async fn acknowledge_errors(
    conn: &mut SqliteConnection,
    error_ids: &[&str],
    acknowledged_by: &str,
    acknowledged_at: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let mut error_ids = error_ids.to_vec();
    error_ids.sort_unstable();
    error_ids.dedup();

    let acknowledged_at = datetime_to_epoch_seconds(acknowledged_at);
    let mut acknowledged = 0;
    for chunk in error_ids.chunks(ACK_CHUNK_SIZE) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "UPDATE execution_errors SET acknowledged = 1, acknowledged_by = ",
        );
        builder.push_bind(acknowledged_by);
        builder.push(", acknowledged_at = ");
        builder.push_bind(acknowledged_at);
        builder.push(" WHERE acknowledged = 0 AND");
        push_error_id_list(&mut builder, chunk);
        let result = builder.build().execute(&mut *conn).await?;
        acknowledged += result.rows_affected();
    }
    Ok(acknowledged)
}

#[cfg(test)]
mod tests {
    use super::DataStore;
    use super::test_support::unique_temp_dir;
    use crate::ExecutionErrorCreateParams;
    use chrono::DateTime;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).expect("timestamp")
    }

    #[tokio::test]
    async fn insert_round_trips_all_columns() {
        let home = unique_temp_dir();
        let store = DataStore::open(&home, "errors").await.expect("open store");

        let params = ExecutionErrorCreateParams {
            error_id: "e-1".to_string(),
            error_type: "Task".to_string(),
            deployment_id: "org.acme:orders:1.0".to_string(),
            process_instance_id: 11,
            process_id: "orders.fulfil".to_string(),
            activity_id: Some(4),
            activity_name: Some("Ship".to_string()),
            job_id: Some(99),
            error_message: "carrier unavailable".to_string(),
            error_info: Some("stack".to_string()),
            error_date: at(1_700_000_000),
            init_activity_id: Some(3),
        };
        let created = store
            .insert_execution_error(&params)
            .await
            .expect("insert error");

        assert_eq!(created.error_id, "e-1");
        assert_eq!(created.error_type, "Task");
        assert_eq!(created.process_instance_id, 11);
        assert_eq!(created.activity_id, Some(4));
        assert_eq!(created.activity_name.as_deref(), Some("Ship"));
        assert_eq!(created.job_id, Some(99));
        assert_eq!(created.error_date, at(1_700_000_000));
        assert_eq!(created.init_activity_id, Some(3));
        assert_eq!(created.acknowledged, false);
        assert_eq!(created.acknowledged_by, None);
        assert_eq!(created.acknowledged_at, None);

        let _ = tokio::fs::remove_dir_all(home).await;
    }

    #[tokio::test]
    async fn acknowledge_is_idempotent_and_keeps_first_audit() {
        let home = unique_temp_dir();
        let store = DataStore::open(&home, "errors").await.expect("open store");
        for (error_id, process_instance_id) in [("e-1", 1), ("e-2", 2), ("e-3", 3)] {
            store
                .insert_execution_error(&ExecutionErrorCreateParams::process_error(
                    error_id,
                    process_instance_id,
                ))
                .await
                .expect("insert error");
        }

        let first = store
            .acknowledge_errors(&["e-1", "e-2", "e-1"], "SYSTEM", at(1_700_000_100))
            .await
            .expect("first acknowledge");
        assert_eq!(first, 2);

        let second = store
            .acknowledge_errors(&["e-1", "e-2"], "operator", at(1_700_000_200))
            .await
            .expect("second acknowledge");
        assert_eq!(second, 0);

        let e1 = store
            .get_execution_error("e-1")
            .await
            .expect("load e-1")
            .expect("e-1 exists");
        assert_eq!(e1.acknowledged, true);
        assert_eq!(e1.acknowledged_by.as_deref(), Some("SYSTEM"));
        assert_eq!(e1.acknowledged_at, Some(at(1_700_000_100)));

        let remaining = store
            .list_unacknowledged_errors(None)
            .await
            .expect("list unacknowledged");
        assert_eq!(
            remaining
                .iter()
                .map(|error| error.error_id.as_str())
                .collect::<Vec<_>>(),
            vec!["e-3"]
        );

        let _ = tokio::fs::remove_dir_all(home).await;
    }

    #[tokio::test]
    async fn acknowledge_handles_unknown_ids_and_large_batches() {
        let home = unique_temp_dir();
        let store = DataStore::open(&home, "errors").await.expect("open store");
        store
            .insert_execution_error(&ExecutionErrorCreateParams::process_error("known", 1))
            .await
            .expect("insert error");

        let mut ids = (0..1_200).map(|idx| format!("missing-{idx}")).collect::<Vec<_>>();
        ids.push("known".to_string());
        let ids = ids.iter().map(String::as_str).collect::<Vec<_>>();

        let acknowledged = store
            .acknowledge_errors(&ids, "SYSTEM", Utc::now())
            .await
            .expect("acknowledge");
        assert_eq!(acknowledged, 1);
        assert_eq!(
            store
                .count_unacknowledged_errors()
                .await
                .expect("count errors"),
            0
        );

        let nothing = store
            .acknowledge_errors(&[], "SYSTEM", Utc::now())
            .await
            .expect("acknowledge nothing");
        assert_eq!(nothing, 0);

        let _ = tokio::fs::remove_dir_all(home).await;
    }

    #[tokio::test]
    async fn list_honours_limit_and_clamps_oversized_limits() {
        let home = unique_temp_dir();
        let store = DataStore::open(&home, "errors").await.expect("open store");
        for (error_id, process_instance_id) in [("e-1", 1), ("e-2", 2), ("e-3", 3)] {
            let mut params = ExecutionErrorCreateParams::process_error(error_id, process_instance_id);
            params.error_date = at(1_700_000_000 + process_instance_id);
            store
                .insert_execution_error(&params)
                .await
                .expect("insert error");
        }

        let limited = store
            .list_unacknowledged_errors(Some(2))
            .await
            .expect("list with limit");
        assert_eq!(
            limited
                .iter()
                .map(|error| error.error_id.as_str())
                .collect::<Vec<_>>(),
            vec!["e-1", "e-2"]
        );

        let unbounded = store
            .list_unacknowledged_errors(Some(usize::MAX))
            .await
            .expect("list with oversized limit");
        assert_eq!(unbounded.len(), 3);

        let _ = tokio::fs::remove_dir_all(home).await;
    }
}
