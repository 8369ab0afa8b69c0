use uuid::Uuid;

use herald_domain::NotificationPreferences;

use crate::{Result, db::Db, models::PreferencesRecord};

const PREFERENCE_COLUMNS: &str = "\
	account_id,
	email_enabled,
	email_address,
	email_verified,
	push_enabled,
	push_subscription,
	push_subscription_stale,
	digest_enabled,
	digest_frequency,
	annual_review_reminders,
	beneficiary_review_reminders,
	life_event_prompts,
	overdue_alerts";

pub async fn for_account(db: &Db, account_id: Uuid) -> Result<Option<PreferencesRecord>> {
	let row = sqlx::query_as::<_, PreferencesRecord>(&format!(
		"\
SELECT
{PREFERENCE_COLUMNS}
FROM notification_preferences
WHERE account_id = $1",
	))
	.bind(account_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

/// Preference rows for a set of accounts in one round trip. Accounts without
/// a row are simply absent from the result.
pub async fn for_accounts(db: &Db, account_ids: &[Uuid]) -> Result<Vec<PreferencesRecord>> {
	if account_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, PreferencesRecord>(&format!(
		"\
SELECT
{PREFERENCE_COLUMNS}
FROM notification_preferences
WHERE account_id = ANY($1)",
	))
	.bind(account_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Accounts opted into weekly digests with a usable email destination.
/// Other digest frequencies are stored but not yet produced.
pub async fn digest_recipients(db: &Db, limit: i64) -> Result<Vec<PreferencesRecord>> {
	let rows = sqlx::query_as::<_, PreferencesRecord>(&format!(
		"\
SELECT
{PREFERENCE_COLUMNS}
FROM notification_preferences
WHERE digest_enabled
	AND digest_frequency = 'weekly'
	AND email_enabled
	AND email_verified
	AND email_address IS NOT NULL
	AND email_address <> ''
ORDER BY account_id ASC
LIMIT $1",
	))
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Flag a push subscription the push service reported gone. The stored
/// subscription is kept for diagnosis; eligibility checks skip the account
/// until the client re-subscribes.
pub async fn mark_subscription_stale(db: &Db, account_id: Uuid) -> Result<()> {
	sqlx::query(
		"\
UPDATE notification_preferences
SET push_subscription_stale = TRUE, updated_at = now()
WHERE account_id = $1",
	)
	.bind(account_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert(db: &Db, preferences: &NotificationPreferences) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO notification_preferences (
	account_id,
	email_enabled,
	email_address,
	email_verified,
	push_enabled,
	push_subscription,
	push_subscription_stale,
	digest_enabled,
	digest_frequency,
	annual_review_reminders,
	beneficiary_review_reminders,
	life_event_prompts,
	overdue_alerts
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
ON CONFLICT (account_id) DO UPDATE SET
	email_enabled = EXCLUDED.email_enabled,
	email_address = EXCLUDED.email_address,
	email_verified = EXCLUDED.email_verified,
	push_enabled = EXCLUDED.push_enabled,
	push_subscription = EXCLUDED.push_subscription,
	push_subscription_stale = EXCLUDED.push_subscription_stale,
	digest_enabled = EXCLUDED.digest_enabled,
	digest_frequency = EXCLUDED.digest_frequency,
	annual_review_reminders = EXCLUDED.annual_review_reminders,
	beneficiary_review_reminders = EXCLUDED.beneficiary_review_reminders,
	life_event_prompts = EXCLUDED.life_event_prompts,
	overdue_alerts = EXCLUDED.overdue_alerts,
	updated_at = now()",
	)
	.bind(preferences.account_id)
	.bind(preferences.email_enabled)
	.bind(preferences.email_address.as_deref())
	.bind(preferences.email_verified)
	.bind(preferences.push_enabled)
	.bind(preferences.push_subscription.as_deref())
	.bind(preferences.push_subscription_stale)
	.bind(preferences.digest_enabled)
	.bind(preferences.digest_frequency.as_str())
	.bind(preferences.annual_review_reminders)
	.bind(preferences.beneficiary_review_reminders)
	.bind(preferences.life_event_prompts)
	.bind(preferences.overdue_alerts)
	.execute(&db.pool)
	.await?;

	Ok(())
}
