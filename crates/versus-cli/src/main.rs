mod render;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use versus_compare::{Comparator, ComparisonRequest, ComparisonSession, Observer, Progress};
use versus_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "versus-cli")]
#[command(about = "Compare products side by side from grounded web research")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two or more items
    Compare {
        /// Item names to compare
        #[arg(required = true)]
        items: Vec<String>,
        /// Metric the comparison must cover (repeatable)
        #[arg(long = "param", value_name = "PARAM")]
        params: Vec<String>,
        /// Compare only on the --param metrics
        #[arg(long)]
        custom_only: bool,
        /// Print the report as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration with API keys redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("versus-cli: run `versus-cli compare <ITEM> <ITEM>...` or `versus-cli --help`");
        return Ok(());
    };

    let config = versus_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match command {
        Commands::Compare {
            items,
            params,
            custom_only,
            json,
        } => {
            let request = ComparisonRequest {
                items,
                custom_params: params,
                custom_only,
            };
            run_compare(&config, &request, json).await?;
        }
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Runs one comparison, cancelling it on Ctrl-C.
async fn run_compare(
    config: &AppConfig,
    request: &ComparisonRequest,
    json: bool,
) -> anyhow::Result<()> {
    let comparator = Comparator::from_config(config)?;

    let mut session = ComparisonSession::new();
    let cancel = session.begin();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling comparison");
            interrupt.cancel();
        }
    });

    let observer: Observer = Arc::new(|progress: &Progress| {
        if let Some(message) = &progress.message {
            eprintln!("{message}");
        }
    });

    let report = comparator.run_observed(request, &cancel, observer).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::markdown(&report)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
