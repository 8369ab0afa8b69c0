use time::OffsetDateTime;
use uuid::Uuid;

use herald_domain::{
	Channel, EntryStatus, NotificationPreferences, ParseEnumError, Priority, ReminderCategory,
};

#[derive(Debug, sqlx::FromRow)]
pub struct ReminderRecord {
	pub reminder_id: Uuid,
	pub account_id: Uuid,
	pub category: String,
	pub title: String,
	pub description: Option<String>,
	pub priority: String,
	pub status: String,
	pub due_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl ReminderRecord {
	pub fn category(&self) -> Result<ReminderCategory, ParseEnumError> {
		self.category.parse()
	}

	pub fn priority(&self) -> Result<Priority, ParseEnumError> {
		self.priority.parse()
	}

	pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
		self.due_at < now
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct PreferencesRecord {
	pub account_id: Uuid,
	pub email_enabled: bool,
	pub email_address: Option<String>,
	pub email_verified: bool,
	pub push_enabled: bool,
	pub push_subscription: Option<String>,
	pub push_subscription_stale: bool,
	pub digest_enabled: bool,
	pub digest_frequency: String,
	pub annual_review_reminders: bool,
	pub beneficiary_review_reminders: bool,
	pub life_event_prompts: bool,
	pub overdue_alerts: bool,
}
impl TryFrom<PreferencesRecord> for NotificationPreferences {
	type Error = ParseEnumError;

	fn try_from(record: PreferencesRecord) -> Result<Self, Self::Error> {
		Ok(Self {
			account_id: record.account_id,
			email_enabled: record.email_enabled,
			email_address: record.email_address,
			email_verified: record.email_verified,
			push_enabled: record.push_enabled,
			push_subscription: record.push_subscription,
			push_subscription_stale: record.push_subscription_stale,
			digest_enabled: record.digest_enabled,
			digest_frequency: record.digest_frequency.parse()?,
			annual_review_reminders: record.annual_review_reminders,
			beneficiary_review_reminders: record.beneficiary_review_reminders,
			life_event_prompts: record.life_event_prompts,
			overdue_alerts: record.overdue_alerts,
		})
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationLogEntry {
	pub entry_id: Uuid,
	pub account_id: Uuid,
	pub reminder_id: Option<Uuid>,
	pub channel: String,
	pub subject: String,
	pub body: Option<String>,
	pub status: String,
	pub failure_reason: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub resolved_at: Option<OffsetDateTime>,
}
impl NotificationLogEntry {
	pub fn channel(&self) -> Result<Channel, ParseEnumError> {
		self.channel.parse()
	}

	pub fn status(&self) -> Result<EntryStatus, ParseEnumError> {
		self.status.parse()
	}
}
