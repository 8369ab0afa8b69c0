use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use herald_service::dispatch::{DispatchSummary, run_dispatch};
use herald_storage::log;

use crate::state::AppState;

/// Header trusted internal callers use instead of a bearer token.
pub const INTERNAL_HEADER: &str = "x-herald-internal";

const DEFAULT_LOG_LIMIT: i64 = 20;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notifications/dispatch", post(dispatch))
		.route("/v1/notifications/log", get(notification_log))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	push_configured: bool,
	email_configured: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		push_configured: state.service.push.is_some(),
		email_configured: state.service.email.is_some(),
	})
}

async fn dispatch(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<DispatchSummary>, ApiError> {
	authorize(&state.service.cfg.security, &headers)?;

	let summary = run_dispatch(&state.service, OffsetDateTime::now_utc())
		.await
		.map_err(internal_error)?;

	Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
struct LogQuery {
	account_id: Uuid,
	limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct LogResponse {
	entries: Vec<LogEntryView>,
}

#[derive(Debug, Serialize)]
struct LogEntryView {
	entry_id: Uuid,
	reminder_id: Option<Uuid>,
	channel: String,
	subject: String,
	status: String,
	failure_reason: Option<String>,
	created_at: String,
	resolved_at: Option<String>,
}

async fn notification_log(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<LogQuery>,
) -> Result<Json<LogResponse>, ApiError> {
	authorize(&state.service.cfg.security, &headers)?;

	let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, 200);
	let entries = log::recent_for_account(&state.service.db, query.account_id, limit)
		.await
		.map_err(|err| internal_error(err.into()))?
		.into_iter()
		.map(|entry| LogEntryView {
			entry_id: entry.entry_id,
			reminder_id: entry.reminder_id,
			channel: entry.channel,
			subject: entry.subject,
			status: entry.status,
			failure_reason: entry.failure_reason,
			created_at: entry.created_at.to_string(),
			resolved_at: entry.resolved_at.map(|at| at.to_string()),
		})
		.collect();

	Ok(Json(LogResponse { entries }))
}

/// Admit a request when it carries the internal sentinel, the configured
/// bearer token, or when no token is configured at all.
pub fn authorize(security: &herald_config::Security, headers: &HeaderMap) -> Result<(), ApiError> {
	if let Some(sentinel) = security.internal_sentinel.as_deref()
		&& headers.get(INTERNAL_HEADER).and_then(|value| value.to_str().ok()) == Some(sentinel)
	{
		return Ok(());
	}

	let Some(token) = security.api_auth_token.as_deref() else {
		return Ok(());
	};
	let expected = format!("Bearer {token}");

	match headers.get("authorization").and_then(|value| value.to_str().ok()) {
		Some(value) if value == expected => Ok(()),
		_ => Err(ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Missing or invalid credentials.")),
	}
}

fn internal_error(err: herald_service::Error) -> ApiError {
	ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn security(token: Option<&str>, sentinel: Option<&str>) -> herald_config::Security {
		herald_config::Security {
			api_auth_token: token.map(str::to_string),
			internal_sentinel: sentinel.map(str::to_string),
		}
	}

	#[test]
	fn open_when_no_token_is_configured() {
		assert!(authorize(&security(None, None), &HeaderMap::new()).is_ok());
	}

	#[test]
	fn configured_token_requires_a_matching_bearer_header() {
		let security = security(Some("secret"), None);
		let mut headers = HeaderMap::new();

		assert!(authorize(&security, &headers).is_err());

		headers.insert("authorization", "Bearer wrong".parse().unwrap());

		assert!(authorize(&security, &headers).is_err());

		headers.insert("authorization", "Bearer secret".parse().unwrap());

		assert!(authorize(&security, &headers).is_ok());
	}

	#[test]
	fn internal_sentinel_bypasses_the_token_check() {
		let security = security(Some("secret"), Some("cron"));
		let mut headers = HeaderMap::new();

		headers.insert(INTERNAL_HEADER, "cron".parse().unwrap());

		assert!(authorize(&security, &headers).is_ok());

		headers.insert(INTERNAL_HEADER, "not-cron".parse().unwrap());

		assert!(authorize(&security, &headers).is_err());
	}

	#[test]
	fn sentinel_alone_does_not_open_unrelated_headers() {
		let security = security(None, Some("cron"));
		let headers = HeaderMap::new();

		// No token configured, so requests stay open even without the
		// sentinel.
		assert!(authorize(&security, &headers).is_ok());
	}
}
