use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = muse_api::Args::parse();

	muse_api::run(args).await
}
