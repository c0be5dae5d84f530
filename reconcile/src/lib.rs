//! Automatic acknowledgement of stale execution errors.
//!
//! A [`StalenessRule`] selects execution errors that no longer reflect
//! actionable state; the [`ReconciliationRunner`] acknowledges its selection in
//! a single transactional unit and absorbs any failure, so it can be invoked on
//! a schedule without supervision.

mod process_rule;
mod rule;
mod runner;
#[cfg(test)]
mod test_support;

pub use process_rule::CORROBORATING_NODE_EVENT;
pub use process_rule::PROCESS_RULE_DESCRIPTION;
pub use process_rule::ProcessStalenessRule;
pub use process_rule::TERMINATED_PROCESS_STATUSES;
pub use rule::StalenessRule;
pub use runner::CycleSummary;
pub use runner::ReconciliationRunner;
pub use runner::TransactionScope;
