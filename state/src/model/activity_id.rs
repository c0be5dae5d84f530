//! Activity identities are integers on error records and text in the node
//! log. Both sides are compared in one canonical text form: the decimal
//! rendering of the integer, which is also what SQLite produces for
//! `CAST(<integer> AS TEXT)`.

use anyhow::Result;

/// Canonical text form of a numeric activity id.
pub fn canonical_activity_id(id: i64) -> String {
    id.to_string()
}

/// Normalize a node instance id as logged by the engine.
///
/// Surrounding whitespace is dropped. Values that parse as an integer
/// (including `+7` or `007`) are rewritten to [`canonical_activity_id`];
/// anything else is kept verbatim since it can never equal a numeric id.
pub fn normalize_activity_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("activity id is empty");
    }
    match trimmed.parse::<i64>() {
        Ok(id) => Ok(canonical_activity_id(id)),
        Err(_) => Ok(trimmed.to_string()),
    }
}
