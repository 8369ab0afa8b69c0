use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = herald_api::Args::parse();
	herald_api::run(args).await
}
