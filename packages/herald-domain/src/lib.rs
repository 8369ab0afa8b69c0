pub mod eligibility;
pub mod payload;
pub mod types;

pub use eligibility::{ChannelEligibility, evaluate_eligibility};
pub use payload::PushPayload;
pub use types::{
	Channel, DigestFrequency, EntryStatus, NotificationPreferences, ParseEnumError, Priority,
	ReminderCategory, ReminderStatus,
};
