use serde::Serialize;
use uuid::Uuid;

use crate::types::Priority;

/// Wire payload consumed by the client-side notification renderer. `tag`
/// drives client-side de-duplication; `url` is the in-app target opened on
/// click.
#[derive(Clone, Debug, Serialize)]
pub struct PushPayload {
	pub title: String,
	pub body: String,
	pub url: String,
	pub icon: String,
	pub tag: String,
	pub priority: Priority,
	#[serde(rename = "reminderId")]
	pub reminder_id: Option<Uuid>,
}

impl PushPayload {
	pub fn for_reminder(
		reminder_id: Uuid,
		title: &str,
		body: Option<&str>,
		priority: Priority,
	) -> Self {
		Self {
			title: title.to_string(),
			body: body.unwrap_or_default().to_string(),
			url: format!("/reminders/{reminder_id}"),
			icon: "/icon-192.png".to_string(),
			tag: format!("reminder-{reminder_id}"),
			priority,
			reminder_id: Some(reminder_id),
		}
	}
}
