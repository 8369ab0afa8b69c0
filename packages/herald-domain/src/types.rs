use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("Unknown {kind}: {value:?}.")]
pub struct ParseEnumError {
	pub kind: &'static str,
	pub value: String,
}

macro_rules! storage_enum {
	($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
		#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
		#[serde(rename_all = "snake_case")]
		pub enum $name {
			$($variant,)+
		}
		impl $name {
			pub fn as_str(&self) -> &'static str {
				match self {
					$(Self::$variant => $text,)+
				}
			}
		}
		impl FromStr for $name {
			type Err = ParseEnumError;

			fn from_str(value: &str) -> Result<Self, Self::Err> {
				match value {
					$($text => Ok(Self::$variant),)+
					_ => Err(ParseEnumError { kind: $kind, value: value.to_string() }),
				}
			}
		}
		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}
	};
}

storage_enum!(ReminderCategory, "reminder category", {
	AnnualReview => "annual_review",
	BeneficiaryReview => "beneficiary_review",
	LifeEvent => "life_event",
	DocumentUpdate => "document_update",
	PreparationTask => "preparation_task",
	Custom => "custom",
});

storage_enum!(ReminderStatus, "reminder status", {
	Pending => "pending",
	Completed => "completed",
	Dismissed => "dismissed",
});

storage_enum!(Priority, "priority", {
	Low => "low",
	Medium => "medium",
	High => "high",
	Urgent => "urgent",
});

storage_enum!(Channel, "channel", {
	Email => "email",
	Push => "push",
	Digest => "digest",
});

storage_enum!(DigestFrequency, "digest frequency", {
	Daily => "daily",
	Weekly => "weekly",
	Monthly => "monthly",
});

// Log entry states are stored uppercase, matching the outbox convention.
storage_enum!(EntryStatus, "entry status", {
	Pending => "PENDING",
	Sent => "SENT",
	Failed => "FAILED",
});

/// Per-account delivery preferences. A channel is usable only when its
/// enablement flag is set AND its destination data is present and valid.
#[derive(Clone, Debug)]
pub struct NotificationPreferences {
	pub account_id: Uuid,
	pub email_enabled: bool,
	pub email_address: Option<String>,
	pub email_verified: bool,
	pub push_enabled: bool,
	/// Serialized push subscription descriptor, stored opaquely; the server
	/// never inspects its internals beyond handing it to the transport.
	pub push_subscription: Option<String>,
	pub push_subscription_stale: bool,
	pub digest_enabled: bool,
	pub digest_frequency: DigestFrequency,
	pub annual_review_reminders: bool,
	pub beneficiary_review_reminders: bool,
	pub life_event_prompts: bool,
	pub overdue_alerts: bool,
}

impl NotificationPreferences {
	pub fn email_destination(&self) -> Option<&str> {
		if !self.email_verified {
			return None;
		}

		self.email_address.as_deref().filter(|address| !address.is_empty())
	}
}
