use autoack_cli::Args;
use autoack_cli::JobTrigger;
use autoack_cli::RunOptions;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();

    let options = RunOptions::from_args(Args::parse())?;
    tracing::info!(
        data_store = options.data_store_name.as_str(),
        single_run = options.single_run,
        "starting execution error auto acknowledgement"
    );
    JobTrigger::new(options).run().await
}
