//! Command line job that periodically acknowledges stale execution errors in
//! a named data store.

mod options;
mod time_expression;
mod trigger;

pub use options::Args;
pub use options::ConfigError;
pub use options::DEFAULT_HOME_DIR;
pub use options::RunOptions;
pub use time_expression::TimeExpressionError;
pub use time_expression::parse_time_expression;
pub use trigger::JobTrigger;
