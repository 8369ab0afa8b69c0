use std::{sync::Arc, time::Duration as StdDuration};

use color_eyre::Result;
use time::{Duration, OffsetDateTime, Weekday};
use tokio::time as tokio_time;

use herald_service::{HeraldService, digest::run_digest, dispatch::run_dispatch, scan::run_scan};

const POLL_INTERVAL_SECONDS: u64 = 60;
const SCAN_INTERVAL: Duration = Duration::hours(1);
const DISPATCH_INTERVAL: Duration = Duration::minutes(5);
/// Slightly under a day so clock drift never skips the weekly slot.
const DIGEST_MIN_GAP: Duration = Duration::hours(23);

/// Scheduler loop. Each job runs on its own cadence against a shared "now";
/// a failing job logs and retries on the next tick without disturbing the
/// others. All job logic lives in `herald-service`.
pub async fn run_worker(service: Arc<HeraldService>) -> Result<()> {
	let mut last_scan: Option<OffsetDateTime> = None;
	let mut last_dispatch: Option<OffsetDateTime> = None;
	let mut last_digest: Option<OffsetDateTime> = None;

	loop {
		let now = OffsetDateTime::now_utc();

		if interval_elapsed(last_scan, now, SCAN_INTERVAL) {
			match run_scan(&service, now).await {
				Ok(summary) => {
					tracing::info!(
						scanned = summary.scanned,
						email_queued = summary.email_queued,
						push_queued = summary.push_queued,
						skipped = summary.skipped,
						"Reminder sweep complete."
					);

					last_scan = Some(now);
				},
				Err(err) => {
					tracing::error!(error = %err, "Reminder sweep failed.");
				},
			}
		}
		if digest_due(&service.cfg.notifications, last_digest, now) {
			match run_digest(&service, now).await {
				Ok(summary) => {
					tracing::info!(
						recipients = summary.recipients,
						queued = summary.queued,
						skipped = summary.skipped,
						"Digest aggregation complete."
					);

					last_digest = Some(now);
				},
				Err(err) => {
					tracing::error!(error = %err, "Digest aggregation failed.");
				},
			}
		}
		if interval_elapsed(last_dispatch, now, DISPATCH_INTERVAL) {
			match run_dispatch(&service, now).await {
				Ok(summary) => {
					if summary.processed > 0 {
						tracing::info!(
							processed = summary.processed,
							sent = summary.sent,
							failed = summary.failed,
							"Dispatch pass complete."
						);
					}
					for error in &summary.errors {
						tracing::error!(error = %error, "Dispatch task error.");
					}

					last_dispatch = Some(now);
				},
				Err(err) => {
					tracing::error!(error = %err, "Dispatch pass failed.");
				},
			}
		}

		tokio_time::sleep(StdDuration::from_secs(POLL_INTERVAL_SECONDS)).await;
	}
}

fn interval_elapsed(last: Option<OffsetDateTime>, now: OffsetDateTime, interval: Duration) -> bool {
	last.is_none_or(|at| now - at >= interval)
}

/// The digest fires in the configured UTC weekday/hour slot, at most once a
/// week.
fn digest_due(
	cfg: &herald_config::Notifications,
	last: Option<OffsetDateTime>,
	now: OffsetDateTime,
) -> bool {
	if !interval_elapsed(last, now, DIGEST_MIN_GAP) {
		return false;
	}

	weekday_name(now.weekday()) == cfg.digest_weekday && now.hour() == cfg.digest_hour_utc
}

fn weekday_name(weekday: Weekday) -> &'static str {
	match weekday {
		Weekday::Monday => "monday",
		Weekday::Tuesday => "tuesday",
		Weekday::Wednesday => "wednesday",
		Weekday::Thursday => "thursday",
		Weekday::Friday => "friday",
		Weekday::Saturday => "saturday",
		Weekday::Sunday => "sunday",
	}
}
