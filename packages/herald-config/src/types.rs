use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub notifications: Notifications,
	pub push: Option<Push>,
	pub email: Option<Email>,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Pipeline tuning. Every field has a production-ready default so a minimal
/// config file only needs service and storage sections.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Notifications {
	/// How far ahead of the due time a reminder becomes deliverable.
	pub lookahead_hours: i64,
	pub scan_batch: i64,
	pub digest_batch: i64,
	/// Per-account cap on reminders listed in one digest body.
	pub digest_max_items: usize,
	pub digest_weekday: String,
	pub digest_hour_utc: u8,
	pub dispatch_batch: i64,
	pub dispatch_concurrency: usize,
	/// Wall-clock budget for one dispatch pass; in-flight sends finish, no
	/// new entries are claimed past it.
	pub dispatch_deadline_seconds: u64,
	/// How long a claimed entry stays invisible to other dispatchers.
	pub claim_lease_seconds: i64,
}
impl Default for Notifications {
	fn default() -> Self {
		Self {
			lookahead_hours: 24,
			scan_batch: 100,
			digest_batch: 500,
			digest_max_items: 50,
			digest_weekday: "sunday".to_string(),
			digest_hour_utc: 14,
			dispatch_batch: 100,
			dispatch_concurrency: 8,
			dispatch_deadline_seconds: 55,
			claim_lease_seconds: 30,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Push {
	/// PEM file holding the VAPID ES256 private key.
	pub vapid_private_key_path: String,
	/// VAPID subject claim, a mailto: or https: URI identifying the operator.
	pub vapid_subject: String,
	#[serde(default = "default_push_ttl_seconds")]
	pub ttl_seconds: u32,
}

#[derive(Debug, Deserialize)]
pub struct Email {
	pub smtp_host: String,
	#[serde(default = "default_smtp_port")]
	pub smtp_port: u16,
	pub smtp_username: String,
	pub smtp_password: String,
	pub from_address: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Security {
	pub api_auth_token: Option<String>,
	pub internal_sentinel: Option<String>,
}

pub const WEEKDAY_NAMES: [&str; 7] =
	["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

fn default_push_ttl_seconds() -> u32 {
	86_400
}

fn default_smtp_port() -> u16 {
	587
}
