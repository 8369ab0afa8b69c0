use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use herald_config::Config;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml() -> String {
	SAMPLE_CONFIG_TEMPLATE_TOML.to_string()
}

fn sample_toml_with<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("herald_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: String) -> herald_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = herald_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_error(payload: String, needle: &str) {
	let err = load(payload).expect_err("Expected a validation error.");
	let message = err.to_string();

	assert!(message.contains(needle), "Unexpected error message: {message}");
}

#[test]
fn template_config_loads() {
	let cfg = load(sample_toml()).expect("Template config must load.");

	assert_eq!(cfg.notifications.lookahead_hours, 24);
	assert_eq!(cfg.notifications.digest_weekday, "sunday");
	assert_eq!(cfg.security.api_auth_token.as_deref(), Some("test-token"));
	assert!(cfg.push.is_some());
	assert!(cfg.email.is_some());
}

#[test]
fn notifications_section_is_optional_with_defaults() {
	let payload = sample_toml_with(|root| {
		root.remove("notifications");
		root.remove("push");
		root.remove("email");
		root.remove("security");
	});
	let cfg = load(payload).expect("Minimal config must load.");

	assert_eq!(cfg.notifications.scan_batch, 100);
	assert_eq!(cfg.notifications.digest_max_items, 50);
	assert_eq!(cfg.notifications.digest_hour_utc, 14);
	assert_eq!(cfg.notifications.dispatch_concurrency, 8);
	assert!(cfg.push.is_none());
	assert!(cfg.email.is_none());
	assert!(cfg.security.api_auth_token.is_none());
}

#[test]
fn empty_dsn_is_rejected() {
	let payload = sample_toml_with(|root| {
		let postgres = root
			.get_mut("storage")
			.and_then(Value::as_table_mut)
			.and_then(|storage| storage.get_mut("postgres"))
			.and_then(Value::as_table_mut)
			.expect("Template config must include [storage.postgres].");

		postgres.insert("dsn".to_string(), Value::String("  ".to_string()));
	});

	expect_validation_error(payload, "storage.postgres.dsn must be non-empty.");
}

#[test]
fn zero_lookahead_is_rejected() {
	let payload = sample_toml_with(|root| {
		let notifications = root
			.get_mut("notifications")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [notifications].");

		notifications.insert("lookahead_hours".to_string(), Value::Integer(0));
	});

	expect_validation_error(payload, "notifications.lookahead_hours must be greater than zero.");
}

#[test]
fn out_of_range_digest_hour_is_rejected() {
	let payload = sample_toml_with(|root| {
		let notifications = root
			.get_mut("notifications")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [notifications].");

		notifications.insert("digest_hour_utc".to_string(), Value::Integer(24));
	});

	expect_validation_error(payload, "notifications.digest_hour_utc must be in the range 0-23.");
}

#[test]
fn unknown_digest_weekday_is_rejected() {
	let payload = sample_toml_with(|root| {
		let notifications = root
			.get_mut("notifications")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [notifications].");

		notifications
			.insert("digest_weekday".to_string(), Value::String("Sonntag".to_string()));
	});

	expect_validation_error(
		payload,
		"notifications.digest_weekday must be a lowercase English weekday name.",
	);
}

#[test]
fn bare_vapid_subject_is_rejected() {
	let payload = sample_toml_with(|root| {
		let push = root
			.get_mut("push")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [push].");

		push.insert("vapid_subject".to_string(), Value::String("ops@example.com".to_string()));
	});

	expect_validation_error(payload, "push.vapid_subject must be a mailto: or https:// URI.");
}

#[test]
fn blank_tokens_normalize_to_none() {
	let payload = sample_toml_with(|root| {
		let security = root
			.get_mut("security")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [security].");

		security.insert("api_auth_token".to_string(), Value::String("   ".to_string()));
		security.insert("internal_sentinel".to_string(), Value::String(String::new()));
	});
	let cfg = load(payload).expect("Config with blank tokens must load.");

	assert!(cfg.security.api_auth_token.is_none());
	assert!(cfg.security.internal_sentinel.is_none());
}
