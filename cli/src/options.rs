use std::path::PathBuf;
use std::time::Duration;

use autoack_state::SYSTEM_ACKNOWLEDGER;
use autoack_state::data_store_path;
use clap::Parser;
use thiserror::Error;

use crate::parse_time_expression;

/// Directory under the user's home holding data stores by default.
pub const DEFAULT_HOME_DIR: &str = ".autoack";

#[derive(Debug, Parser)]
#[command(name = "autoack")]
#[command(about = "Acknowledge execution errors whose process or node has moved on")]
pub struct Args {
    /// Data store to reconcile; resolves to `<home>/<name>.sqlite`.
    #[arg(long, env = "AUTOACK_DATA_STORE_NAME")]
    pub data_store_name: String,

    /// Run a single cycle and exit instead of rescheduling.
    #[arg(long, env = "AUTOACK_SINGLE_RUN")]
    pub single_run: bool,

    /// Delay before the next cycle, e.g. 1d, 5h, 1h 30m, 250ms.
    #[arg(
        long,
        env = "AUTOACK_NEXT_RUN",
        default_value = "1d",
        value_parser = parse_time_expression
    )]
    pub next_run: Duration,

    /// Directory holding data stores. Defaults to $AUTOACK_HOME or ~/.autoack.
    #[arg(long, env = "AUTOACK_HOME")]
    pub home: Option<PathBuf>,

    /// Identity recorded on acknowledged errors.
    #[arg(long, env = "AUTOACK_ACKNOWLEDGED_BY", default_value = SYSTEM_ACKNOWLEDGER)]
    pub acknowledged_by: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid data store name {name:?}: {reason}")]
    InvalidDataStoreName { name: String, reason: String },
    #[error("next run delay must be greater than zero unless --single-run is set")]
    ZeroNextRun,
    #[error("could not determine the home directory; pass --home or set AUTOACK_HOME")]
    MissingHome,
    #[error("acknowledged-by identity must not be empty")]
    EmptyAcknowledgedBy,
}

/// Validated options for the job trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub data_store_name: String,
    pub home: PathBuf,
    pub single_run: bool,
    pub next_run: Duration,
    pub acknowledged_by: String,
}

impl RunOptions {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let home = match args.home {
            Some(home) => home,
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_HOME_DIR))
                .ok_or(ConfigError::MissingHome)?,
        };
        Self::new(
            args.data_store_name,
            home,
            args.single_run,
            args.next_run,
            args.acknowledged_by,
        )
    }

    pub fn new(
        data_store_name: String,
        home: PathBuf,
        single_run: bool,
        next_run: Duration,
        acknowledged_by: String,
    ) -> Result<Self, ConfigError> {
        if let Err(err) = data_store_path(&home, &data_store_name) {
            return Err(ConfigError::InvalidDataStoreName {
                name: data_store_name,
                reason: err.to_string(),
            });
        }
        if !single_run && next_run.is_zero() {
            return Err(ConfigError::ZeroNextRun);
        }
        if acknowledged_by.trim().is_empty() {
            return Err(ConfigError::EmptyAcknowledgedBy);
        }
        Ok(Self {
            data_store_name,
            home,
            single_run,
            next_run,
            acknowledged_by,
        })
    }

    /// Delay before the next cycle, or `None` when this is a single run.
    pub fn next_delay(&self) -> Option<Duration> {
        (!self.single_run).then_some(self.next_run)
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use super::ConfigError;
    use super::RunOptions;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::time::Duration;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("autoack").chain(argv.iter().copied()))
            .expect("parse args")
    }

    #[test]
    fn defaults_to_daily_repeating_runs() {
        let args = parse(&["--data-store-name", "org.jbpm.domain", "--home", "/srv/autoack"]);
        let options = RunOptions::from_args(args).expect("valid options");
        assert_eq!(
            options,
            RunOptions {
                data_store_name: "org.jbpm.domain".to_string(),
                home: PathBuf::from("/srv/autoack"),
                single_run: false,
                next_run: Duration::from_secs(86_400),
                acknowledged_by: "SYSTEM".to_string(),
            }
        );
        assert_eq!(options.next_delay(), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn single_run_has_no_next_delay() {
        let args = parse(&[
            "--data-store-name",
            "jobs",
            "--home",
            "/srv/autoack",
            "--single-run",
            "--next-run",
            "5h",
        ]);
        let options = RunOptions::from_args(args).expect("valid options");
        assert_eq!(options.next_run, Duration::from_secs(5 * 3_600));
        assert_eq!(options.next_delay(), None);
    }

    #[test]
    fn data_store_name_is_required() {
        let result = Args::try_parse_from(["autoack", "--home", "/srv/autoack"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_next_run_is_rejected_by_the_parser() {
        let result = Args::try_parse_from([
            "autoack",
            "--data-store-name",
            "jobs",
            "--next-run",
            "soon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unusable_configuration() {
        let home = PathBuf::from("/srv/autoack");
        let err = RunOptions::new(
            "../escape".to_string(),
            home.clone(),
            true,
            Duration::ZERO,
            "SYSTEM".to_string(),
        )
        .expect_err("path-like name");
        assert!(matches!(err, ConfigError::InvalidDataStoreName { .. }));

        let err = RunOptions::new(
            "jobs".to_string(),
            home.clone(),
            false,
            Duration::ZERO,
            "SYSTEM".to_string(),
        )
        .expect_err("zero delay");
        assert!(matches!(err, ConfigError::ZeroNextRun));

        let err = RunOptions::new(
            "jobs".to_string(),
            home,
            true,
            Duration::ZERO,
            " ".to_string(),
        )
        .expect_err("blank identity");
        assert!(matches!(err, ConfigError::EmptyAcknowledgedBy));
    }
}
