use axum::{
	Form, Json, Router,
	extract::{
		Query, State,
		rejection::{FormRejection, JsonRejection, QueryRejection},
	},
	http::{HeaderMap, StatusCode, header::USER_AGENT},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use burst_service::{Error as ServiceError, FlushRequest, FlushResponse, LogSearchRequest};

pub const QUERY_LOGGED: &str = "Query logged";

/// Decoded url-encoded pairs in wire order. Repeated keys are kept.
pub type FormPairs = Vec<(String, String)>;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/search", post(search).fallback(method_not_allowed))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/flush", post(flush)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn method_not_allowed() -> SearchError {
	SearchError::MethodNotAllowed
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	query: Result<Query<FormPairs>, QueryRejection>,
	form: Result<Form<FormPairs>, FormRejection>,
) -> Result<&'static str, SearchError> {
	let Query(query) = query.map_err(|_| SearchError::BadForm)?;
	let form = match form {
		Ok(Form(form)) => form,
		// Bodies that are not url-encoded carry no form fields.
		Err(FormRejection::InvalidFormContentType(_)) => FormPairs::new(),
		Err(_) => return Err(SearchError::BadForm),
	};
	let q = form_value(&form, &query, "q")
		.filter(|q| !q.is_empty())
		.ok_or(SearchError::MissingQuery)?;
	let user_agent =
		headers.get(USER_AGENT).map(|value| value.as_bytes().to_vec()).unwrap_or_default();
	let request = LogSearchRequest {
		user_id: form_value(&form, &query, "user_id"),
		user_agent,
		query: q,
	};

	state.service.log_search(&request).await.map_err(|err| {
		tracing::error!(error = %err, "Failed to log search.");

		SearchError::Logging
	})?;

	Ok(QUERY_LOGGED)
}

/// First value for `key`, body pairs before URL query pairs.
fn form_value(form: &[(String, String)], query: &[(String, String)], key: &str) -> Option<String> {
	form.iter().chain(query).find(|(name, _)| name == key).map(|(_, value)| value.clone())
}

async fn flush(
	State(state): State<AppState>,
	payload: Result<Json<FlushRequest>, JsonRejection>,
) -> Result<Json<FlushResponse>, ApiError> {
	let Json(payload) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text())
	})?;
	let response = state.service.flush_request(&payload).await?;

	Ok(Json(response))
}

/// Plain-text failures of the public search route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
	MethodNotAllowed,
	BadForm,
	MissingQuery,
	Logging,
}
impl SearchError {
	fn status(self) -> StatusCode {
		match self {
			Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
			Self::BadForm | Self::MissingQuery => StatusCode::BAD_REQUEST,
			Self::Logging => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(self) -> &'static str {
		match self {
			Self::MethodNotAllowed => "method not allowed",
			Self::BadForm => "error parsing form",
			Self::MissingQuery => "missing query parameter q",
			Self::Logging => "error logging search",
		}
	}
}
impl IntoResponse for SearchError {
	fn into_response(self) -> Response {
		(self.status(), self.message()).into_response()
	}
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
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, code) = match &err {
			ServiceError::Cache { .. } | ServiceError::CacheWrite { .. } =>
				(StatusCode::SERVICE_UNAVAILABLE, "CACHE_UNAVAILABLE"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILED"),
			_ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
		};

		tracing::error!(error = %err, "Admin request failed.");

		json_error(status, code, err.to_string())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into() }
}
