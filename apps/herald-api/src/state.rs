use std::sync::Arc;

use herald_service::HeraldService;
use herald_storage::db::Db;
use herald_transport::{EmailTransport, PushTransport, SmtpMailer, VapidPushClient};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HeraldService>,
}
impl AppState {
	pub async fn new(config: herald_config::Config) -> color_eyre::Result<Self> {
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
		let service = HeraldService::new(config, db, push, email);

		Ok(Self { service: Arc::new(service) })
	}
}
