mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Email, Notifications, Postgres, Push, Security, Service, Storage, WEEKDAY_NAMES,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let notifications = &cfg.notifications;

	for (label, value) in [
		("notifications.lookahead_hours", notifications.lookahead_hours),
		("notifications.scan_batch", notifications.scan_batch),
		("notifications.digest_batch", notifications.digest_batch),
		("notifications.dispatch_batch", notifications.dispatch_batch),
		("notifications.claim_lease_seconds", notifications.claim_lease_seconds),
	] {
		if value <= 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if notifications.digest_max_items == 0 {
		return Err(Error::Validation {
			message: "notifications.digest_max_items must be greater than zero.".to_string(),
		});
	}
	if notifications.dispatch_concurrency == 0 {
		return Err(Error::Validation {
			message: "notifications.dispatch_concurrency must be greater than zero.".to_string(),
		});
	}
	if notifications.dispatch_deadline_seconds == 0 {
		return Err(Error::Validation {
			message: "notifications.dispatch_deadline_seconds must be greater than zero."
				.to_string(),
		});
	}
	if notifications.digest_hour_utc > 23 {
		return Err(Error::Validation {
			message: "notifications.digest_hour_utc must be in the range 0-23.".to_string(),
		});
	}
	if !WEEKDAY_NAMES.contains(&notifications.digest_weekday.as_str()) {
		return Err(Error::Validation {
			message: "notifications.digest_weekday must be a lowercase English weekday name."
				.to_string(),
		});
	}

	if let Some(push) = cfg.push.as_ref() {
		if push.vapid_private_key_path.trim().is_empty() {
			return Err(Error::Validation {
				message: "push.vapid_private_key_path must be non-empty.".to_string(),
			});
		}
		if !push.vapid_subject.starts_with("mailto:") && !push.vapid_subject.starts_with("https://")
		{
			return Err(Error::Validation {
				message: "push.vapid_subject must be a mailto: or https:// URI.".to_string(),
			});
		}
		if push.ttl_seconds == 0 {
			return Err(Error::Validation {
				message: "push.ttl_seconds must be greater than zero.".to_string(),
			});
		}
	}

	if let Some(email) = cfg.email.as_ref() {
		for (label, value) in [
			("email.smtp_host", &email.smtp_host),
			("email.from_address", &email.from_address),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}
		if email.smtp_port == 0 {
			return Err(Error::Validation {
				message: "email.smtp_port must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
	if cfg
		.security
		.internal_sentinel
		.as_deref()
		.map(|sentinel| sentinel.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.security.internal_sentinel = None;
	}
}
