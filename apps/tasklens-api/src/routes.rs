use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use tasklens_domain::SearchMode;
use tasklens_service::{Error, SearchRequest, SearchResponse, TenantContext};

pub const HEADER_TENANT_ID: &str = "X-Tenant-Id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/tasks/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let ctx = tenant_context(&state, &headers)?;
	let Json(payload) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	})?;
	let response = state.service.search(&ctx, payload).await?;

	Ok(Json(response))
}

fn tenant_context(state: &AppState, headers: &HeaderMap) -> Result<TenantContext, ApiError> {
	let authenticated_tenant = match bearer_token(headers)? {
		Some(token) => {
			let tenant_id = state.tenant_for_token(token).ok_or_else(|| {
				json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unknown API token.", None)
			})?;

			Some(tenant_id.to_string())
		},
		None => None,
	};
	let header_tenant = optional_header(headers, HEADER_TENANT_ID)?;

	Ok(TenantContext { authenticated_tenant, header_tenant })
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
	let Some(raw) = headers.get(AUTHORIZATION) else { return Ok(None) };
	let malformed = || {
		json_error(
			StatusCode::UNAUTHORIZED,
			"UNAUTHORIZED",
			"Authorization header must be a Bearer token.",
			None,
		)
	};
	let value = raw.to_str().map_err(|_| malformed())?;
	let token = value.strip_prefix("Bearer ").map(str::trim).ok_or_else(malformed)?;

	if token.is_empty() {
		return Err(malformed());
	}

	Ok(Some(token))
}

fn optional_header(headers: &HeaderMap, name: &'static str) -> Result<Option<String>, ApiError> {
	let Some(raw) = headers.get(name) else { return Ok(None) };
	let value = raw.to_str().map_err(|_| {
		let message = format!("{name} must be visible ASCII.");

		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None)
	})?;
	let trimmed = value.trim();

	Ok(if trimmed.is_empty() { None } else { Some(trimmed.to_string()) })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	mode: Option<SearchMode>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	mode: Option<SearchMode>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		mode: Option<SearchMode>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), mode }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			Error::Unauthorized { message } =>
				json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message, None),
			Error::TenantMismatch { message } =>
				json_error(StatusCode::FORBIDDEN, "TENANT_MISMATCH", message, None),
			Error::SemanticUnavailable { message } => json_error(
				StatusCode::SERVICE_UNAVAILABLE,
				"SEMANTIC_UNAVAILABLE",
				message,
				Some(SearchMode::SemanticUnavailable),
			),
			err @ (Error::Timeout { .. }
			| Error::Provider { .. }
			| Error::Storage { .. }
			| Error::Qdrant { .. }) => {
				tracing::error!(error = %err, "Search request failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL",
					"Internal error.",
					None,
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let Self { status, error_code, message, mode } = self;

		(status, Json(ErrorBody { error_code, message, mode })).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	mode: Option<SearchMode>,
) -> ApiError {
	ApiError::new(status, code, message, mode)
}
