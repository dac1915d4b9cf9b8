use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = burst_cli::Args::parse();

	burst_api::run(args).await
}
