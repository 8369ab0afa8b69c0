use serde::Serialize;
use time::OffsetDateTime;

use herald_domain::NotificationPreferences;
use herald_storage::{log, models::ReminderRecord, preferences, reminders};

use crate::{HeraldService, Result};

#[derive(Debug, Default, Serialize)]
pub struct DigestSummary {
	pub recipients: usize,
	pub queued: usize,
	pub skipped: usize,
}

/// Build one digest per opted-in account: collect every pending reminder the
/// account still has open (capped at `digest_max_items`), render them into a
/// single email body, and append one digest log entry. Accounts with nothing
/// pending get no digest, and an account never has more than one digest
/// waiting.
pub async fn run_digest(service: &HeraldService, now: OffsetDateTime) -> Result<DigestSummary> {
	let cfg = &service.cfg.notifications;
	let recipients = preferences::digest_recipients(&service.db, cfg.digest_batch).await?;
	let mut summary = DigestSummary::default();

	for record in recipients {
		summary.recipients += 1;

		let prefs = match NotificationPreferences::try_from(record) {
			Ok(prefs) => prefs,
			Err(err) => {
				tracing::warn!(error = %err, "Skipping digest for unreadable preferences.");

				summary.skipped += 1;

				continue;
			},
		};
		let upcoming = reminders::pending_for_account(
			&service.db,
			prefs.account_id,
			cfg.digest_max_items as i64,
		)
		.await?;

		if upcoming.is_empty() {
			summary.skipped += 1;

			continue;
		}

		let subject = digest_subject(upcoming.len());
		let body = render_digest(&upcoming, now);

		if log::insert_digest_entry(&service.db, prefs.account_id, &subject, &body).await? {
			summary.queued += 1;
		} else {
			summary.skipped += 1;
		}
	}

	Ok(summary)
}

pub fn digest_subject(count: usize) -> String {
	format!("Weekly reminder summary ({count} items)")
}

/// Plain-text digest body, one line per reminder, oldest due first.
pub fn render_digest(upcoming: &[ReminderRecord], now: OffsetDateTime) -> String {
	let mut body = format!(
		"You have {} reminder{} coming up:\n\n",
		upcoming.len(),
		if upcoming.len() == 1 { "" } else { "s" }
	);

	for reminder in upcoming {
		let due_date = reminder.due_at.date();
		let marker = if reminder.is_overdue(now) { " (overdue)" } else { "" };

		body.push_str(&format!(
			"- {} [{}] due {due_date}{marker}\n",
			reminder.title, reminder.priority,
		));
	}

	body
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;
	use uuid::Uuid;

	use super::*;

	fn reminder(title: &str, priority: &str, due_at: OffsetDateTime) -> ReminderRecord {
		ReminderRecord {
			reminder_id: Uuid::new_v4(),
			account_id: Uuid::new_v4(),
			category: "custom".to_string(),
			title: title.to_string(),
			description: None,
			priority: priority.to_string(),
			status: "pending".to_string(),
			due_at,
			created_at: due_at - time::Duration::days(30),
			updated_at: due_at - time::Duration::days(30),
		}
	}

	#[test]
	fn subject_carries_the_item_count() {
		assert_eq!(digest_subject(3), "Weekly reminder summary (3 items)");
	}

	#[test]
	fn body_lists_each_reminder_with_its_due_date() {
		let now = datetime!(2026-08-23 14:00 UTC);
		let body = render_digest(
			&[
				reminder("Review your will", "high", datetime!(2026-08-25 09:00 UTC)),
				reminder("Update beneficiaries", "medium", datetime!(2026-08-28 09:00 UTC)),
			],
			now,
		);

		assert!(body.starts_with("You have 2 reminders coming up:\n"));
		assert!(body.contains("- Review your will [high] due 2026-08-25\n"));
		assert!(body.contains("- Update beneficiaries [medium] due 2026-08-28\n"));
		assert!(!body.contains("(overdue)"));
	}

	#[test]
	fn past_due_reminders_are_marked_overdue() {
		let now = datetime!(2026-08-23 14:00 UTC);
		let body =
			render_digest(&[reminder("File the deed", "urgent", datetime!(2026-08-20 09:00 UTC))], now);

		assert!(body.starts_with("You have 1 reminder coming up:\n"));
		assert!(body.contains("- File the deed [urgent] due 2026-08-20 (overdue)\n"));
	}
}
