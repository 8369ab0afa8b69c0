use crate::types::{NotificationPreferences, ReminderCategory};

/// Which channels a single reminder may be delivered on for one account.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ChannelEligibility {
	pub email: bool,
	pub push: bool,
}

impl ChannelEligibility {
	pub fn none(&self) -> bool {
		!self.email && !self.push
	}
}

/// Decide per-channel eligibility for a reminder.
///
/// Email requires the channel to be enabled with a verified address, and the
/// reminder's category to be opted in; an overdue reminder is additionally
/// admitted by the overdue-alerts flag regardless of its category.
///
/// Push requires only an enabled channel with a usable subscription on file.
/// Category flags deliberately do not apply: they are email controls in the
/// preferences surface, and push is already opt-in per device.
pub fn evaluate_eligibility(
	category: ReminderCategory,
	preferences: &NotificationPreferences,
	is_overdue: bool,
) -> ChannelEligibility {
	let email = preferences.email_enabled
		&& preferences.email_destination().is_some()
		&& (category_enabled(category, preferences)
			|| (is_overdue && preferences.overdue_alerts));
	let push = preferences.push_enabled
		&& !preferences.push_subscription_stale
		&& preferences.push_subscription.as_deref().is_some_and(|sub| !sub.is_empty());

	ChannelEligibility { email, push }
}

fn category_enabled(category: ReminderCategory, preferences: &NotificationPreferences) -> bool {
	match category {
		ReminderCategory::AnnualReview => preferences.annual_review_reminders,
		ReminderCategory::BeneficiaryReview => preferences.beneficiary_review_reminders,
		ReminderCategory::LifeEvent => preferences.life_event_prompts,
		ReminderCategory::DocumentUpdate
		| ReminderCategory::PreparationTask
		| ReminderCategory::Custom => true,
	}
}
