pub mod worker;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use herald_service::HeraldService;
use herald_storage::db::Db;
use herald_transport::{EmailTransport, PushTransport, SmtpMailer, VapidPushClient};

#[derive(Debug, Parser)]
#[command(
	version = herald_cli::VERSION,
	rename_all = "kebab",
	styles = herald_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = herald_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let push = match config.push.as_ref() {
		Some(push_cfg) => {
			let client: Arc<dyn PushTransport> = Arc::new(VapidPushClient::new(push_cfg)?);

			Some(client)
		},
		None => {
			tracing::info!("No [push] config; push entries will fail as unconfigured.");

			None
		},
	};
	let email = match config.email.as_ref() {
		Some(email_cfg) => {
			let mailer: Arc<dyn EmailTransport> = Arc::new(SmtpMailer::new(email_cfg)?);

			Some(mailer)
		},
		None => {
			tracing::info!("No [email] config; email entries will fail as unconfigured.");

			None
		},
	};
	let service = Arc::new(HeraldService::new(config, db, push, email));

	worker::run_worker(service).await
}
