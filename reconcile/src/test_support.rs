use autoack_state::DataStore;
use autoack_state::ExecutionErrorCreateParams;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use uuid::Uuid;

pub(crate) fn unique_temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    std::env::temp_dir().join(format!(
        "autoack-reconcile-test-{nanos}-{}",
        Uuid::new_v4()
    ))
}

pub(crate) async fn seed_error(
    store: &DataStore,
    error_id: &str,
    process_instance_id: i64,
    init_activity_id: Option<i64>,
) {
    let mut params = ExecutionErrorCreateParams::process_error(error_id, process_instance_id);
    params.init_activity_id = init_activity_id;
    store
        .insert_execution_error(&params)
        .await
        .expect("insert execution error");
}
