use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = herald_worker::Args::parse();
	herald_worker::run(args).await
}
