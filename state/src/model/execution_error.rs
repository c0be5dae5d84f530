use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::epoch_seconds_to_datetime;

/// A failure recorded by the engine against a process instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    /// Unique identity of the error record.
    pub error_id: String,
    /// Engine-defined error category, e.g. `Process`, `Task`, `Job` or `DB`.
    pub error_type: String,
    pub deployment_id: String,
    /// The process instance the error was raised against.
    pub process_instance_id: i64,
    /// The process definition id of the owning instance.
    pub process_id: String,
    /// The activity instance executing when the failure surfaced.
    pub activity_id: Option<i64>,
    pub activity_name: Option<String>,
    pub job_id: Option<i64>,
    pub error_message: String,
    /// Detail text, usually a stack trace.
    pub error_info: Option<String>,
    pub error_date: DateTime<Utc>,
    /// The activity instance that initiated the failing unit of work.
    pub init_activity_id: Option<i64>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl ExecutionError {
    /// Decode a row selected with [`EXECUTION_ERROR_COLUMNS`].
    pub fn try_from_row(row: &SqliteRow) -> Result<Self> {
        let error_date: i64 = row.try_get("error_date")?;
        let acknowledged: i64 = row.try_get("acknowledged")?;
        let acknowledged_at = row
            .try_get::<Option<i64>, _>("acknowledged_at")?
            .map(epoch_seconds_to_datetime)
            .transpose()?;
        Ok(Self {
            error_id: row.try_get("error_id")?,
            error_type: row.try_get("error_type")?,
            deployment_id: row.try_get("deployment_id")?,
            process_instance_id: row.try_get("process_instance_id")?,
            process_id: row.try_get("process_id")?,
            activity_id: row.try_get("activity_id")?,
            activity_name: row.try_get("activity_name")?,
            job_id: row.try_get("job_id")?,
            error_message: row.try_get("error_message")?,
            error_info: row.try_get("error_info")?,
            error_date: epoch_seconds_to_datetime(error_date)?,
            init_activity_id: row.try_get("init_activity_id")?,
            acknowledged: acknowledged != 0,
            acknowledged_by: row.try_get("acknowledged_by")?,
            acknowledged_at,
        })
    }
}

/// Column list understood by [`ExecutionError::try_from_row`], qualified with
/// the `error` table alias so it can be dropped into joins and subqueries.
pub const EXECUTION_ERROR_COLUMNS: &str = r#"
    error.error_id,
    error.error_type,
    error.deployment_id,
    error.process_instance_id,
    error.process_id,
    error.activity_id,
    error.activity_name,
    error.job_id,
    error.error_message,
    error.error_info,
    error.error_date,
    error.init_activity_id,
    error.acknowledged,
    error.acknowledged_by,
    error.acknowledged_at
"#;

#[derive(Debug, Clone)]
pub struct ExecutionErrorCreateParams {
    pub error_id: String,
    pub error_type: String,
    pub deployment_id: String,
    pub process_instance_id: i64,
    pub process_id: String,
    pub activity_id: Option<i64>,
    pub activity_name: Option<String>,
    pub job_id: Option<i64>,
    pub error_message: String,
    pub error_info: Option<String>,
    pub error_date: DateTime<Utc>,
    pub init_activity_id: Option<i64>,
}

impl ExecutionErrorCreateParams {
    /// Minimal process error for `process_instance_id`, raised now.
    pub fn process_error(error_id: impl Into<String>, process_instance_id: i64) -> Self {
        Self {
            error_id: error_id.into(),
            error_type: "Process".to_string(),
            deployment_id: "default".to_string(),
            process_instance_id,
            process_id: "process".to_string(),
            activity_id: None,
            activity_name: None,
            job_id: None,
            error_message: "execution failed".to_string(),
            error_info: None,
            error_date: Utc::now(),
            init_activity_id: None,
        }
    }
}
