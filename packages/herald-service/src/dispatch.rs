use std::{
	sync::Arc,
	time::{Duration as StdDuration, Instant},
};

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tokio::{sync::Semaphore, task::JoinSet};

use herald_domain::{Channel, NotificationPreferences};
use herald_storage::{log, models::NotificationLogEntry, preferences};
use herald_transport::TransportError;

use crate::{Error, HeraldService, Result};

#[derive(Debug, Default, Serialize)]
pub struct DispatchSummary {
	pub processed: usize,
	pub sent: usize,
	pub failed: usize,
	pub errors: Vec<String>,
}

enum Outcome {
	Sent,
	Failed,
	/// Another dispatcher resolved the entry while we were sending.
	Lost,
}

struct DeliveryFailure {
	reason: String,
	subscription_expired: bool,
}
impl DeliveryFailure {
	fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into(), subscription_expired: false }
	}
}
impl From<TransportError> for DeliveryFailure {
	fn from(err: TransportError) -> Self {
		Self {
			reason: format!("{}: {err}", err.reason_code()),
			subscription_expired: matches!(err, TransportError::SubscriptionExpired),
		}
	}
}

/// Drain deliverable log entries. Entries are claimed in batches under a
/// lease and sent concurrently, bounded by `dispatch_concurrency`. Once the
/// deadline passes no further batch is claimed; in-flight sends always run to
/// completion so every claimed entry reaches a terminal state or keeps its
/// lease for a later pass.
pub async fn run_dispatch(service: &Arc<HeraldService>, now: OffsetDateTime) -> Result<DispatchSummary> {
	let cfg = &service.cfg.notifications;
	let deadline = Instant::now() + StdDuration::from_secs(cfg.dispatch_deadline_seconds);
	let lease = Duration::seconds(cfg.claim_lease_seconds);
	let semaphore = Arc::new(Semaphore::new(cfg.dispatch_concurrency));
	let mut summary = DispatchSummary::default();

	loop {
		if Instant::now() >= deadline {
			break;
		}

		let batch = log::claim_batch(&service.db, now, lease, cfg.dispatch_batch).await?;

		if batch.is_empty() {
			break;
		}

		let batch_len = batch.len();
		let mut join_set = JoinSet::new();

		for entry in batch {
			let permit = Arc::clone(&semaphore)
				.acquire_owned()
				.await
				.map_err(|err| Error::Message(format!("dispatch semaphore closed: {err}")))?;
			let service = Arc::clone(service);

			join_set.spawn(async move {
				let _permit = permit;

				process_entry(&service, entry, now).await
			});
		}

		while let Some(joined) = join_set.join_next().await {
			summary.processed += 1;

			match joined {
				Ok(Ok(Outcome::Sent)) => summary.sent += 1,
				Ok(Ok(Outcome::Failed)) => summary.failed += 1,
				Ok(Ok(Outcome::Lost)) => {},
				Ok(Err(err)) => summary.errors.push(err.to_string()),
				Err(err) => summary.errors.push(format!("dispatch task panicked: {err}")),
			}
		}

		if (batch_len as i64) < cfg.dispatch_batch {
			break;
		}
	}

	Ok(summary)
}

async fn process_entry(
	service: &HeraldService,
	entry: NotificationLogEntry,
	now: OffsetDateTime,
) -> Result<Outcome> {
	match deliver(service, &entry).await? {
		Ok(()) =>
			if log::mark_sent(&service.db, entry.entry_id, now).await? {
				Ok(Outcome::Sent)
			} else {
				Ok(Outcome::Lost)
			},
		Err(failure) => {
			if failure.subscription_expired {
				preferences::mark_subscription_stale(&service.db, entry.account_id).await?;
			}
			if log::mark_failed(&service.db, entry.entry_id, &failure.reason, now).await? {
				tracing::warn!(
					entry_id = %entry.entry_id,
					channel = %entry.channel,
					reason = %failure.reason,
					"Notification delivery failed."
				);

				Ok(Outcome::Failed)
			} else {
				Ok(Outcome::Lost)
			}
		},
	}
}

/// Attempt one delivery. `Ok(Err(_))` is a classified delivery failure that
/// resolves the entry; a top-level `Err` is infrastructure trouble that
/// leaves the entry leased for a later pass.
async fn deliver(
	service: &HeraldService,
	entry: &NotificationLogEntry,
) -> Result<std::result::Result<(), DeliveryFailure>> {
	let channel = match entry.channel() {
		Ok(channel) => channel,
		Err(err) => return Ok(Err(DeliveryFailure::new(format!("invalid_channel: {err}")))),
	};
	let Some(record) = preferences::for_account(&service.db, entry.account_id).await? else {
		return Ok(Err(DeliveryFailure::new("missing_preferences")));
	};
	let prefs = NotificationPreferences::try_from(record)?;

	match channel {
		Channel::Email | Channel::Digest => {
			let Some(email) = service.email.as_ref() else {
				return Ok(Err(DeliveryFailure::new("channel_unconfigured")));
			};
			let Some(recipient) = prefs.email_destination() else {
				return Ok(Err(DeliveryFailure::new("missing_destination")));
			};
			let body = entry.body.as_deref().unwrap_or("");

			match email.send_email(recipient, &entry.subject, body).await {
				Ok(()) => Ok(Ok(())),
				Err(err) => Ok(Err(err.into())),
			}
		},
		Channel::Push => {
			let Some(push) = service.push.as_ref() else {
				return Ok(Err(DeliveryFailure::new("channel_unconfigured")));
			};

			if prefs.push_subscription_stale {
				return Ok(Err(DeliveryFailure::new("subscription_expired: already stale")));
			}

			let Some(subscription) = prefs.push_subscription.as_deref() else {
				return Ok(Err(DeliveryFailure::new("missing_destination")));
			};
			let Some(payload) = entry.body.as_deref() else {
				return Ok(Err(DeliveryFailure::new("missing_payload")));
			};

			match push.send_push(subscription, payload.as_bytes()).await {
				Ok(()) => Ok(Ok(())),
				Err(err) => Ok(Err(err.into())),
			}
		},
	}
}
