use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::epoch_seconds_to_datetime;

/// Lifecycle status of a process instance as logged by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Pending,
    Active,
    Completed,
    Aborted,
    Suspended,
}

impl ProcessStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Pending => "pending",
            ProcessStatus::Active => "active",
            ProcessStatus::Completed => "completed",
            ProcessStatus::Aborted => "aborted",
            ProcessStatus::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "aborted" => Ok(Self::Aborted),
            "suspended" => Ok(Self::Suspended),
            _ => Err(anyhow::anyhow!("invalid process status: {value}")),
        }
    }

    /// Completed and aborted instances never run again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessStatus::Completed | ProcessStatus::Aborted)
    }
}

/// Event type of a node log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEventType {
    Enter,
    /// Engine code `1`. The node instance finished its work and the process
    /// moved on from it.
    Exit,
    Aborted,
    Skipped,
    Obsolete,
    Error,
}

impl NodeEventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeEventType::Enter => "enter",
            NodeEventType::Exit => "exit",
            NodeEventType::Aborted => "aborted",
            NodeEventType::Skipped => "skipped",
            NodeEventType::Obsolete => "obsolete",
            NodeEventType::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "enter" => Ok(Self::Enter),
            "exit" => Ok(Self::Exit),
            "aborted" => Ok(Self::Aborted),
            "skipped" => Ok(Self::Skipped),
            "obsolete" => Ok(Self::Obsolete),
            "error" => Ok(Self::Error),
            _ => Err(anyhow::anyhow!("invalid node event type: {value}")),
        }
    }

    /// Numeric code the engine uses for this event type in its own log.
    pub const fn engine_code(self) -> i64 {
        match self {
            NodeEventType::Enter => 0,
            NodeEventType::Exit => 1,
            NodeEventType::Aborted => 2,
            NodeEventType::Skipped => 3,
            NodeEventType::Obsolete => 4,
            NodeEventType::Error => 5,
        }
    }
}

/// The logged lifecycle status of one process instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStatusRecord {
    pub process_instance_id: i64,
    pub process_id: String,
    pub status: ProcessStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ProcessStatusRecord {
    pub(crate) fn try_from_row(row: &SqliteRow) -> Result<Self> {
        let status: String = row.try_get("status")?;
        let start_date: i64 = row.try_get("start_date")?;
        let end_date = row
            .try_get::<Option<i64>, _>("end_date")?
            .map(epoch_seconds_to_datetime)
            .transpose()?;
        Ok(Self {
            process_instance_id: row.try_get("process_instance_id")?,
            process_id: row.try_get("process_id")?,
            status: ProcessStatus::parse(status.as_str())?,
            start_date: epoch_seconds_to_datetime(start_date)?,
            end_date,
        })
    }
}

/// One entry/exit event of a node instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStatusRecord {
    pub id: i64,
    pub process_instance_id: i64,
    /// Canonical text form, see [`crate::normalize_activity_id`].
    pub node_instance_id: String,
    pub node_id: String,
    pub node_name: String,
    pub node_type: String,
    pub event_type: NodeEventType,
    pub log_date: DateTime<Utc>,
}

impl ActivityStatusRecord {
    pub(crate) fn try_from_row(row: &SqliteRow) -> Result<Self> {
        let event_type: String = row.try_get("event_type")?;
        let log_date: i64 = row.try_get("log_date")?;
        Ok(Self {
            id: row.try_get("id")?,
            process_instance_id: row.try_get("process_instance_id")?,
            node_instance_id: row.try_get("node_instance_id")?,
            node_id: row.try_get("node_id")?,
            node_name: row.try_get("node_name")?,
            node_type: row.try_get("node_type")?,
            event_type: NodeEventType::parse(event_type.as_str())?,
            log_date: epoch_seconds_to_datetime(log_date)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NodeEventCreateParams {
    pub process_instance_id: i64,
    /// Raw node instance id as reported by the engine; normalized on write.
    pub node_instance_id: String,
    pub node_id: String,
    pub node_name: String,
    pub node_type: String,
    pub event_type: NodeEventType,
    pub log_date: DateTime<Utc>,
}

impl NodeEventCreateParams {
    pub fn new(
        process_instance_id: i64,
        node_instance_id: impl Into<String>,
        event_type: NodeEventType,
    ) -> Self {
        Self {
            process_instance_id,
            node_instance_id: node_instance_id.into(),
            node_id: "_node".to_string(),
            node_name: "Task".to_string(),
            node_type: "WorkItemNode".to_string(),
            event_type,
            log_date: Utc::now(),
        }
    }
}
