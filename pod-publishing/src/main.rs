use clap::Parser as _;
use dotenvy::dotenv;
use pod_publishing::cli::Cli;
use pod_publishing::core::config::Config;
use pod_publishing::publish::{publish, PublishOutcome};
use pod_publishing::utils::logging::init_logging;
use pod_publishing::PublishResult;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e:?}");
        std::process::exit(1);
    }
    info!(workflow = %cli.workflow, "Starting pod-publishing");

    match run(&cli).await {
        Ok(outcome) => {
            info!(
                did = %outcome.asset_did,
                bucket = %outcome.bucket,
                files = outcome.files.len(),
                "Workflow outputs published"
            );
        }
        Err(e) => {
            error!(
                error = %e,
                error_chain = ?e,
                error_type = e.error_type(),
                "Failed to publish workflow outputs"
            );
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> PublishResult<PublishOutcome> {
    let config = Config::setup(cli).await?;
    debug!("Configuration initialized");
    publish(&config).await
}
