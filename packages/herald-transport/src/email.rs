use async_trait::async_trait;
use lettre::{
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
	transport::smtp::authentication::Credentials,
};

use crate::{EmailTransport, Result, TransportError};

pub struct SmtpMailer {
	mailer: AsyncSmtpTransport<Tokio1Executor>,
	from_address: String,
}
impl SmtpMailer {
	pub fn new(cfg: &herald_config::Email) -> Result<Self> {
		let credentials =
			Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
		let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
			.map_err(|err| TransportError::ConnectionFailed(err.to_string()))?
			.port(cfg.smtp_port)
			.credentials(credentials)
			.build();

		Ok(Self { mailer, from_address: cfg.from_address.clone() })
	}
}

#[async_trait]
impl EmailTransport for SmtpMailer {
	async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
		let message = Message::builder()
			.from(
				self.from_address
					.parse()
					.map_err(|err| TransportError::Other(format!("invalid from address: {err}")))?,
			)
			.to(recipient
				.parse()
				.map_err(|err| TransportError::Rejected(format!("invalid recipient: {err}")))?)
			.subject(subject)
			.header(ContentType::TEXT_PLAIN)
			.body(body.to_string())
			.map_err(|err| TransportError::Other(format!("failed to build message: {err}")))?;

		self.mailer.send(message).await.map_err(|err| {
			if err.is_permanent() {
				TransportError::Rejected(err.to_string())
			} else {
				TransportError::ConnectionFailed(err.to_string())
			}
		})?;

		Ok(())
	}
}
