mod activity_id;
mod execution_error;
mod status_log;

pub use activity_id::canonical_activity_id;
pub use activity_id::normalize_activity_id;
pub use execution_error::EXECUTION_ERROR_COLUMNS;
pub use execution_error::ExecutionError;
pub use execution_error::ExecutionErrorCreateParams;
pub use status_log::ActivityStatusRecord;
pub use status_log::NodeEventCreateParams;
pub use status_log::NodeEventType;
pub use status_log::ProcessStatus;
pub use status_log::ProcessStatusRecord;

use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;

pub(crate) fn epoch_seconds_to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid unix timestamp: {secs}"))
}

pub(crate) fn datetime_to_epoch_seconds(value: DateTime<Utc>) -> i64 {
    value.timestamp()
}
