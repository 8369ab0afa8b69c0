use std::collections::HashMap;

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use herald_domain::{Channel, NotificationPreferences, PushPayload, evaluate_eligibility};
use herald_storage::{log, log::NewEntry, preferences, reminders};

use crate::{HeraldService, Result};

#[derive(Debug, Default, Serialize)]
pub struct ScanSummary {
	pub scanned: usize,
	pub email_queued: usize,
	pub push_queued: usize,
	pub skipped: usize,
}

/// One sweep over due reminders: load everything pending inside the lookahead
/// window, match each reminder against its account's preferences, and append
/// a PENDING log entry per eligible channel. Re-running a sweep is harmless;
/// the log layer drops entries that already exist for the same occurrence.
pub async fn run_scan(service: &HeraldService, now: OffsetDateTime) -> Result<ScanSummary> {
	let cfg = &service.cfg.notifications;
	let lookahead = Duration::hours(cfg.lookahead_hours);
	let due = reminders::due_pending(&service.db, now + lookahead, cfg.scan_batch).await?;
	let mut account_ids = due.iter().map(|reminder| reminder.account_id).collect::<Vec<_>>();

	account_ids.sort_unstable();
	account_ids.dedup();

	let prefs_by_account = load_preferences(service, &account_ids).await?;
	let mut summary = ScanSummary::default();

	for reminder in &due {
		summary.scanned += 1;

		let Some(prefs) = prefs_by_account.get(&reminder.account_id) else {
			summary.skipped += 1;

			continue;
		};
		let (category, priority) = match (reminder.category(), reminder.priority()) {
			(Ok(category), Ok(priority)) => (category, priority),
			(Err(err), _) | (_, Err(err)) => {
				tracing::warn!(
					error = %err,
					reminder_id = %reminder.reminder_id,
					"Skipping reminder with unknown category or priority."
				);

				summary.skipped += 1;

				continue;
			},
		};
		let eligibility = evaluate_eligibility(category, prefs, reminder.is_overdue(now));

		if eligibility.none() {
			summary.skipped += 1;

			continue;
		}

		// The occurrence window starts when the reminder first became
		// deliverable; a SENT entry inside it means this due date was already
		// notified.
		let occurrence_start = reminder.due_at - lookahead;

		if eligibility.email {
			let subject = format!("Reminder: {}", reminder.title);
			let entry = NewEntry {
				account_id: reminder.account_id,
				reminder_id: reminder.reminder_id,
				channel: Channel::Email,
				subject: &subject,
				body: reminder.description.as_deref(),
			};

			if log::insert_reminder_entry(&service.db, &entry, occurrence_start).await? {
				summary.email_queued += 1;
			}
		}
		if eligibility.push {
			let payload = PushPayload::for_reminder(
				reminder.reminder_id,
				&reminder.title,
				reminder.description.as_deref(),
				priority,
			);
			let body = serde_json::to_string(&payload)?;
			let entry = NewEntry {
				account_id: reminder.account_id,
				reminder_id: reminder.reminder_id,
				channel: Channel::Push,
				subject: &reminder.title,
				body: Some(&body),
			};

			if log::insert_reminder_entry(&service.db, &entry, occurrence_start).await? {
				summary.push_queued += 1;
			}
		}
	}

	Ok(summary)
}

async fn load_preferences(
	service: &HeraldService,
	account_ids: &[Uuid],
) -> Result<HashMap<Uuid, NotificationPreferences>> {
	let records = preferences::for_accounts(&service.db, account_ids).await?;
	let mut by_account = HashMap::with_capacity(records.len());

	for record in records {
		let account_id = record.account_id;

		match NotificationPreferences::try_from(record) {
			Ok(prefs) => {
				by_account.insert(account_id, prefs);
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					account_id = %account_id,
					"Skipping account with unreadable preferences."
				);
			},
		}
	}

	Ok(by_account)
}
