use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mixboard_worker::Args::parse();

	mixboard_worker::run(args).await
}
