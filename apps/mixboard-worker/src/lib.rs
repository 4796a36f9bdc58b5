use std::{sync::Arc, time::Duration};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use mixboard_domain::WorkspaceItem;
use mixboard_service::{EnrichService, Scheduler};

#[derive(Debug, Parser)]
#[command(
	version = mixboard_cli::VERSION,
	rename_all = "kebab",
	styles = mixboard_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = mixboard_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let token = CancellationToken::new();
	let shutdown = token.clone();

	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::info!("Shutdown requested.");
			shutdown.cancel();
		}
	});

	let poll_interval = Duration::from_millis(config.scheduler.poll_interval_ms);
	let service = Arc::new(EnrichService::new(config));
	let scheduler = Scheduler::new(service.clone(), token.clone());
	let mut last_items: Option<Vec<WorkspaceItem>> = None;

	tracing::info!("Enrichment worker started.");

	loop {
		match service.list_items().await {
			Ok(items) =>
				if last_items.as_ref() != Some(&items) {
					tracing::debug!(count = items.len(), "Workspace item list changed.");
					scheduler.on_items_changed(&items).await;

					last_items = Some(items);
				},
			Err(err) => {
				tracing::warn!(error = %err, "Failed to list workspace items.");
			},
		}

		tokio::select! {
			_ = token.cancelled() => break,
			_ = tokio::time::sleep(poll_interval) => {},
		}
	}

	tracing::info!("Enrichment worker stopped.");

	Ok(())
}
