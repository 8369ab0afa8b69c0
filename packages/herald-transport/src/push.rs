use std::{fs, io::Cursor};

use async_trait::async_trait;
use web_push::{
	ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
	WebPushError, WebPushMessageBuilder,
};

use crate::{PushTransport, Result, TransportError};

/// Web Push sender authenticated with a VAPID key pair. The private key is
/// read once at startup; each send signs a fresh JWT for the subscription's
/// push service origin.
pub struct VapidPushClient {
	client: IsahcWebPushClient,
	private_key_pem: Vec<u8>,
	subject: String,
	ttl_seconds: u32,
}
impl VapidPushClient {
	pub fn new(cfg: &herald_config::Push) -> Result<Self> {
		let private_key_pem = fs::read(&cfg.vapid_private_key_path).map_err(|err| {
			TransportError::Other(format!(
				"failed to read VAPID key at {}: {err}",
				cfg.vapid_private_key_path
			))
		})?;
		let client = IsahcWebPushClient::new()
			.map_err(|err| TransportError::Other(format!("failed to build push client: {err}")))?;

		Ok(Self {
			client,
			private_key_pem,
			subject: cfg.vapid_subject.clone(),
			ttl_seconds: cfg.ttl_seconds,
		})
	}
}

#[async_trait]
impl PushTransport for VapidPushClient {
	async fn send_push(&self, subscription_json: &str, payload: &[u8]) -> Result<()> {
		let subscription: SubscriptionInfo = serde_json::from_str(subscription_json)
			.map_err(|err| TransportError::InvalidSubscription(err.to_string()))?;
		let mut signature =
			VapidSignatureBuilder::from_pem(Cursor::new(&self.private_key_pem[..]), &subscription)
				.map_err(classify)?;

		signature.add_claim("sub", self.subject.as_str());

		let signature = signature.build().map_err(classify)?;
		let mut message = WebPushMessageBuilder::new(&subscription);

		message.set_payload(ContentEncoding::Aes128Gcm, payload);
		message.set_ttl(self.ttl_seconds);
		message.set_vapid_signature(signature);

		let message = message.build().map_err(classify)?;

		self.client.send(message).await.map_err(classify)?;

		Ok(())
	}
}

/// Map push service outcomes onto transport errors. A 404/410 from the push
/// service means the browser dropped the subscription; callers treat that as
/// a signal to stop using it rather than as a transient failure.
fn classify(err: WebPushError) -> TransportError {
	classify_code(err.short_description(), err.to_string())
}

fn classify_code(code: &str, detail: String) -> TransportError {
	match code {
		"endpoint_not_valid" | "endpoint_not_found" => TransportError::SubscriptionExpired,
		"unauthorized" | "invalid_claims" | "bad_request" | "payload_too_large" =>
			TransportError::Rejected(detail),
		"invalid_uri" | "missing_crypto_keys" | "invalid_crypto_keys" =>
			TransportError::InvalidSubscription(detail),
		_ => TransportError::ConnectionFailed(detail),
	}
}
