use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ApiClient, QueryController, QueryOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod repl;
mod view;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "explorer", about = "Browse locations and their residents")]
struct Args {
    /// Location identifier to load.
    location_id: Option<String>,
    /// Page of residents to show after loading.
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    api_url: Option<String>,
    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keep reading location ids and navigation commands from stdin.
    #[arg(long, short)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    settings.validate()?;

    let client = ApiClient::new(settings.client_options())?;
    info!(
        base_url = %client.base_url(),
        timeout_secs = settings.request_timeout_secs,
        "explorer ready"
    );
    let controller = QueryController::with_client(client);

    if args.interactive {
        return repl::run(controller, args.location_id).await;
    }

    let Some(identifier) = args.location_id else {
        print!("{}", view::render(&controller.snapshot().await));
        println!("Pass a location id, or use --interactive.");
        return Ok(());
    };

    let outcome = controller.submit(&identifier).await;
    if args.page > 1 {
        controller.go_to_page(args.page).await;
    }
    print!("{}", view::render(&controller.snapshot().await));

    match outcome {
        QueryOutcome::Failed(err) => {
            Err(err).with_context(|| format!("failed to load location '{identifier}'"))
        }
        _ => Ok(()),
    }
}
