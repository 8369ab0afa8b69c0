use time::OffsetDateTime;
use uuid::Uuid;

use herald_domain::{Priority, ReminderCategory, ReminderStatus};

use crate::{Result, db::Db, models::ReminderRecord};

const REMINDER_COLUMNS: &str = "\
	reminder_id,
	account_id,
	category,
	title,
	description,
	priority,
	status,
	due_at,
	created_at,
	updated_at";

/// Pending reminders whose due time falls on or before `horizon`, oldest due
/// first. Includes reminders already past due.
pub async fn due_pending(
	db: &Db,
	horizon: OffsetDateTime,
	limit: i64,
) -> Result<Vec<ReminderRecord>> {
	let rows = sqlx::query_as::<_, ReminderRecord>(&format!(
		"\
SELECT
{REMINDER_COLUMNS}
FROM reminders
WHERE status = 'pending' AND due_at <= $1
ORDER BY due_at ASC
LIMIT $2",
	))
	.bind(horizon)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Every pending reminder for one account, oldest due first, for digest
/// aggregation. No due-date cutoff: a digest lists everything still open.
pub async fn pending_for_account(
	db: &Db,
	account_id: Uuid,
	limit: i64,
) -> Result<Vec<ReminderRecord>> {
	let rows = sqlx::query_as::<_, ReminderRecord>(&format!(
		"\
SELECT
{REMINDER_COLUMNS}
FROM reminders
WHERE account_id = $1 AND status = 'pending'
ORDER BY due_at ASC
LIMIT $2",
	))
	.bind(account_id)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub struct NewReminder<'a> {
	pub account_id: Uuid,
	pub category: ReminderCategory,
	pub title: &'a str,
	pub description: Option<&'a str>,
	pub priority: Priority,
	pub due_at: OffsetDateTime,
}

pub async fn insert(db: &Db, reminder: &NewReminder<'_>) -> Result<Uuid> {
	let reminder_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO reminders (reminder_id, account_id, category, title, description, priority, status, due_at)
VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)",
	)
	.bind(reminder_id)
	.bind(reminder.account_id)
	.bind(reminder.category.as_str())
	.bind(reminder.title)
	.bind(reminder.description)
	.bind(reminder.priority.as_str())
	.bind(reminder.due_at)
	.execute(&db.pool)
	.await?;

	Ok(reminder_id)
}

/// Lifecycle transition on behalf of the surrounding application; the
/// pipeline itself only ever reads status.
pub async fn set_status(db: &Db, reminder_id: Uuid, status: ReminderStatus) -> Result<()> {
	sqlx::query(
		"\
UPDATE reminders
SET status = $2, updated_at = now()
WHERE reminder_id = $1",
	)
	.bind(reminder_id)
	.bind(status.as_str())
	.execute(&db.pool)
	.await?;

	Ok(())
}
