pub mod email;
pub mod push;

pub use email::SmtpMailer;
pub use push::VapidPushClient;

use async_trait::async_trait;

pub type Result<T, E = TransportError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
	#[error("connection failed: {0}")]
	ConnectionFailed(String),
	#[error("delivery rejected: {0}")]
	Rejected(String),
	#[error("push subscription expired")]
	SubscriptionExpired,
	#[error("invalid push subscription: {0}")]
	InvalidSubscription(String),
	#[error("transport error: {0}")]
	Other(String),
}
impl TransportError {
	/// Stable machine-readable code, recorded as the failure reason prefix in
	/// the notification log.
	pub fn reason_code(&self) -> &'static str {
		match self {
			Self::ConnectionFailed(_) => "connection_failed",
			Self::Rejected(_) => "rejected",
			Self::SubscriptionExpired => "subscription_expired",
			Self::InvalidSubscription(_) => "invalid_subscription",
			Self::Other(_) => "other",
		}
	}
}

#[async_trait]
pub trait PushTransport: Send + Sync {
	/// Deliver an already-serialized payload to one stored subscription.
	async fn send_push(&self, subscription_json: &str, payload: &[u8]) -> Result<()>;
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
	async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reason_codes_are_stable() {
		assert_eq!(TransportError::SubscriptionExpired.reason_code(), "subscription_expired");
		assert_eq!(
			TransportError::ConnectionFailed("refused".to_string()).reason_code(),
			"connection_failed"
		);
		assert_eq!(TransportError::Rejected("550".to_string()).reason_code(), "rejected");
		assert_eq!(
			TransportError::InvalidSubscription("not json".to_string()).reason_code(),
			"invalid_subscription"
		);
	}
}
