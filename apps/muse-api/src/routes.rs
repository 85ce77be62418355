use axum::{
	Json, Router,
	extract::{Path, Query, Request, State},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use muse_domain::{Entity, EntityRef, EntityType, SessionDetails};
use muse_providers::{chat::ChatRequest, search::SearchResponse};
use muse_service::{
	BatchReport, EmbedOutcome, EmbeddingItem, SearchOptions, SessionContext, USAGE_EVENT_TYPE,
	UsageSummary,
};

use crate::state::AppState;

const DEFAULT_USAGE_DAYS: u32 = 7;
const MAX_USAGE_DAYS: u32 = 90;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/v1/embeddings", post(embed))
		.route("/v1/embeddings/batch", post(embed_batch))
		.route("/v1/embeddings/{entity_type}/{entity_id}", delete(remove_embedding))
		.route("/v1/entities/index", post(index_entity))
		.route("/v1/search", post(search))
		.route("/v1/events", post(record_event))
		.route("/v1/generate", post(generate))
		.route("/v1/usage", get(usage))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_token))
		.route("/health", get(health))
		.with_state(state)
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
	pub outcome: EmbedOutcome,
	pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
	pub items: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
pub struct IndexBody {
	pub entity_type: EntityType,
	pub entity_id: Uuid,
	#[serde(default)]
	pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct IndexAccepted {
	pub entity_type: EntityType,
	pub entity_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
	pub query: String,
	pub user_id: String,
	#[serde(flatten)]
	pub options: SearchOptions,
}

/// Either literal `content` or a `summary` composed into session content server-side.
#[derive(Debug, Deserialize)]
pub struct EventBody {
	pub user_id: String,
	pub event_type: String,
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default)]
	pub summary: Option<EventSummary>,
	#[serde(flatten)]
	pub context: SessionContext,
}

#[derive(Debug, Deserialize)]
pub struct EventSummary {
	pub action: String,
	pub entity_type: String,
	pub title: String,
	#[serde(default)]
	pub details: SessionDetails,
}

#[derive(Debug, Serialize)]
pub struct EventAccepted {
	pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
	#[serde(flatten)]
	pub request: ChatRequest,
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde(default)]
	pub structured: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
	#[serde(default)]
	pub since_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
	pub since_days: u32,
	pub usage: Vec<UsageSummary>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn embed(
	State(state): State<AppState>,
	Json(item): Json<EmbeddingItem>,
) -> Json<EmbedResponse> {
	let outcome =
		state.service.generate_embedding(item.entity_type, item.entity_id, &item.content).await;

	Json(EmbedResponse { outcome, success: outcome.succeeded() })
}

async fn embed_batch(
	State(state): State<AppState>,
	Json(body): Json<BatchBody>,
) -> Json<BatchReport> {
	Json(state.service.generate_embeddings_batch(body.items).await)
}

async fn remove_embedding(
	State(state): State<AppState>,
	Path((entity_type, entity_id)): Path<(EntityType, Uuid)>,
) -> Result<StatusCode, ApiError> {
	if state.service.remove_embedding(EntityRef::new(entity_type, entity_id)).await {
		Ok(StatusCode::NO_CONTENT)
	} else {
		Err(ApiError::new(
			StatusCode::SERVICE_UNAVAILABLE,
			"storage_unavailable",
			"Embedding removal failed.",
		))
	}
}

async fn index_entity(
	State(state): State<AppState>,
	Json(body): Json<IndexBody>,
) -> (StatusCode, Json<IndexAccepted>) {
	let entity = Entity::from_fields(body.entity_type, &body.fields);

	drop(state.service.index_entity(body.entity_id, &entity));

	(
		StatusCode::ACCEPTED,
		Json(IndexAccepted { entity_type: body.entity_type, entity_id: body.entity_id }),
	)
}

async fn search(
	State(state): State<AppState>,
	Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
	if body.user_id.trim().is_empty() {
		return Err(ApiError::invalid_request("user_id must be non-empty."));
	}

	Ok(Json(state.service.search(&body.query, &body.user_id, body.options).await))
}

async fn record_event(
	State(state): State<AppState>,
	Json(body): Json<EventBody>,
) -> Result<(StatusCode, Json<EventAccepted>), ApiError> {
	if body.user_id.trim().is_empty() {
		return Err(ApiError::invalid_request("user_id must be non-empty."));
	}
	if body.event_type.trim().is_empty() {
		return Err(ApiError::invalid_request("event_type must be non-empty."));
	}
	if body.event_type.trim() == USAGE_EVENT_TYPE {
		return Err(ApiError::invalid_request(format!(
			"event_type {USAGE_EVENT_TYPE:?} is reserved."
		)));
	}

	let content = match (body.content, body.summary) {
		(Some(content), _) => content,
		(None, Some(summary)) => muse_domain::build_session_content(
			&summary.action,
			&summary.entity_type,
			&summary.title,
			&summary.details,
		),
		(None, None) =>
			return Err(ApiError::invalid_request("Either content or summary is required.")),
	};

	drop(state.service.record(body.user_id, body.event_type, content, body.context));

	Ok((StatusCode::ACCEPTED, Json(EventAccepted { accepted: true })))
}

async fn generate(
	State(state): State<AppState>,
	Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError> {
	if body.request.prompt.trim().is_empty() {
		return Err(ApiError::invalid_request("prompt must be non-empty."));
	}

	let user_id = body.user_id.as_deref();
	let response = if body.structured {
		state
			.service
			.generate_structured(&body.request, user_id)
			.await
			.map(|value| GenerateResponse { text: None, value: Some(value) })
	} else {
		state
			.service
			.generate_text(&body.request, user_id)
			.await
			.map(|text| GenerateResponse { text: Some(text), value: None })
	};

	response.map(Json).ok_or_else(|| {
		ApiError::new(StatusCode::BAD_GATEWAY, "generation_failed", "Text generation failed.")
	})
}

async fn usage(
	State(state): State<AppState>,
	Query(query): Query<UsageQuery>,
) -> Json<UsageResponse> {
	let since_days = query.since_days.unwrap_or(DEFAULT_USAGE_DAYS).clamp(1, MAX_USAGE_DAYS);
	let since = OffsetDateTime::now_utc() - Duration::days(i64::from(since_days));

	Json(UsageResponse { since_days, usage: state.service.usage_report(since).await })
}

async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
	let authorized = match state.auth_token.as_deref() {
		Some(expected) => read_bearer_token(req.headers()) == Some(expected),
		None => true,
	};

	if !authorized {
		return ApiError::new(
			StatusCode::UNAUTHORIZED,
			"unauthorized",
			"A valid Bearer token is required.",
		)
		.into_response();
	}

	next.run(req).await
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
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
	fn new(status: StatusCode, error_code: &str, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.to_string(), message: message.into() }
	}

	fn invalid_request(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
