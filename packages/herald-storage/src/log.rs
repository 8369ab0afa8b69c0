use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use herald_domain::Channel;

use crate::{Result, db::Db, models::NotificationLogEntry};

const LOG_COLUMNS: &str = "\
	entry_id,
	account_id,
	reminder_id,
	channel,
	subject,
	body,
	status,
	failure_reason,
	available_at,
	created_at,
	resolved_at";

pub struct NewEntry<'a> {
	pub account_id: Uuid,
	pub reminder_id: Uuid,
	pub channel: Channel,
	pub subject: &'a str,
	pub body: Option<&'a str>,
}

/// Append a PENDING entry for a reminder on one channel unless an equivalent
/// delivery is already in flight or already happened for this due occurrence.
///
/// A PENDING entry for the same reminder and channel always blocks. A SENT
/// entry blocks only when it was created at or after `occurrence_start` (the
/// due time minus the lookahead window), so a reminder that becomes due again
/// later is notified again. FAILED entries never block; the next sweep is the
/// retry.
///
/// Returns whether a row was inserted.
pub async fn insert_reminder_entry(
	db: &Db,
	entry: &NewEntry<'_>,
	occurrence_start: OffsetDateTime,
) -> Result<bool> {
	let mut tx = db.pool.begin().await?;
	let duplicate: Option<Uuid> = sqlx::query_scalar(
		"\
SELECT entry_id
FROM notification_log
WHERE reminder_id = $1
	AND channel = $2
	AND (status = 'PENDING' OR (status = 'SENT' AND created_at >= $3))
LIMIT 1",
	)
	.bind(entry.reminder_id)
	.bind(entry.channel.as_str())
	.bind(occurrence_start)
	.fetch_optional(&mut *tx)
	.await?;

	if duplicate.is_some() {
		tx.commit().await?;

		return Ok(false);
	}

	sqlx::query(
		"\
INSERT INTO notification_log (entry_id, account_id, reminder_id, channel, subject, body, status)
VALUES ($1, $2, $3, $4, $5, $6, 'PENDING')",
	)
	.bind(Uuid::new_v4())
	.bind(entry.account_id)
	.bind(entry.reminder_id)
	.bind(entry.channel.as_str())
	.bind(entry.subject)
	.bind(entry.body)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(true)
}

/// Append a PENDING digest entry for an account unless one is already
/// waiting. Digest entries carry no reminder id; the rendered body is the
/// payload.
pub async fn insert_digest_entry(
	db: &Db,
	account_id: Uuid,
	subject: &str,
	body: &str,
) -> Result<bool> {
	let mut tx = db.pool.begin().await?;
	let waiting: Option<Uuid> = sqlx::query_scalar(
		"\
SELECT entry_id
FROM notification_log
WHERE account_id = $1 AND channel = 'digest' AND status = 'PENDING'
LIMIT 1",
	)
	.bind(account_id)
	.fetch_optional(&mut *tx)
	.await?;

	if waiting.is_some() {
		tx.commit().await?;

		return Ok(false);
	}

	sqlx::query(
		"\
INSERT INTO notification_log (entry_id, account_id, channel, subject, body, status)
VALUES ($1, $2, 'digest', $3, $4, 'PENDING')",
	)
	.bind(Uuid::new_v4())
	.bind(account_id)
	.bind(subject)
	.bind(body)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(true)
}

/// Claim a batch of deliverable entries. Claimed rows stay PENDING but their
/// `available_at` moves past the lease, so concurrent dispatchers skip them;
/// a dispatcher that dies mid-send loses the claim when the lease expires.
pub async fn claim_batch(
	db: &Db,
	now: OffsetDateTime,
	lease: Duration,
	limit: i64,
) -> Result<Vec<NotificationLogEntry>> {
	let mut tx = db.pool.begin().await?;
	let mut rows = sqlx::query_as::<_, NotificationLogEntry>(&format!(
		"\
SELECT
{LOG_COLUMNS}
FROM notification_log
WHERE status = 'PENDING' AND available_at <= $1
ORDER BY created_at ASC
LIMIT $2
FOR UPDATE SKIP LOCKED",
	))
	.bind(now)
	.bind(limit)
	.fetch_all(&mut *tx)
	.await?;

	if !rows.is_empty() {
		let lease_until = now + lease;
		let entry_ids = rows.iter().map(|entry| entry.entry_id).collect::<Vec<_>>();

		sqlx::query("UPDATE notification_log SET available_at = $1 WHERE entry_id = ANY($2)")
			.bind(lease_until)
			.bind(&entry_ids)
			.execute(&mut *tx)
			.await?;

		for entry in &mut rows {
			entry.available_at = lease_until;
		}
	}

	tx.commit().await?;

	Ok(rows)
}

/// Resolve an entry as delivered. Compare-and-set on PENDING; returns false
/// when another dispatcher already resolved it.
pub async fn mark_sent(db: &Db, entry_id: Uuid, now: OffsetDateTime) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE notification_log
SET status = 'SENT', failure_reason = NULL, resolved_at = $2
WHERE entry_id = $1 AND status = 'PENDING'",
	)
	.bind(entry_id)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() == 1)
}

/// Resolve an entry as failed with a stable reason string.
pub async fn mark_failed(
	db: &Db,
	entry_id: Uuid,
	reason: &str,
	now: OffsetDateTime,
) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE notification_log
SET status = 'FAILED', failure_reason = $2, resolved_at = $3
WHERE entry_id = $1 AND status = 'PENDING'",
	)
	.bind(entry_id)
	.bind(reason)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub async fn recent_for_account(
	db: &Db,
	account_id: Uuid,
	limit: i64,
) -> Result<Vec<NotificationLogEntry>> {
	let rows = sqlx::query_as::<_, NotificationLogEntry>(&format!(
		"\
SELECT
{LOG_COLUMNS}
FROM notification_log
WHERE account_id = $1
ORDER BY created_at DESC
LIMIT $2",
	))
	.bind(account_id)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
