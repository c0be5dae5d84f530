//! SQLite-backed data store for engine execution errors and the status log.
//!
//! The engine records failures in `execution_errors` and logs process and node
//! progress in `process_instance_log` / `node_instance_log`. This crate owns
//! the schema, the connection setup, and the acknowledgement write used by the
//! reconciliation job in `autoack-reconcile`.

mod acknowledge;
mod migrations;
mod model;
mod runtime;

/// Preferred entrypoint: owns the connection pool and migrations.
pub use runtime::DataStore;

pub use acknowledge::ErrorAcknowledger;
pub use acknowledge::SYSTEM_ACKNOWLEDGER;
pub use acknowledge::StoreAcknowledger;
pub use model::ActivityStatusRecord;
pub use model::EXECUTION_ERROR_COLUMNS;
pub use model::ExecutionError;
pub use model::ExecutionErrorCreateParams;
pub use model::NodeEventCreateParams;
pub use model::NodeEventType;
pub use model::ProcessStatus;
pub use model::ProcessStatusRecord;
pub use model::canonical_activity_id;
pub use model::normalize_activity_id;
pub use runtime::DATA_STORE_EXTENSION;
pub use runtime::acknowledge_errors;
pub use runtime::data_store_path;
