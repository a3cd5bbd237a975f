use std::sync::Arc;

use axum::{
	body::Bytes,
	extract::State,
	http::{header, HeaderMap, Method, StatusCode, Uri},
	response::{IntoResponse, Response},
	routing::{any, get, post},
	Json, Router,
};
use dms_erp_client::transport::{SOAP_ACTION_HEADER, SOAP_CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct Upstreams {
	pub api: String,
	pub public: String,
	pub relay: String,
}

#[derive(Debug, Clone)]
pub struct ProxyState {
	client: reqwest::Client,
	upstreams: Arc<Upstreams>,
}

impl ProxyState {
	pub fn new(upstreams: Upstreams) -> Self {
		Self {
			client: reqwest::Client::new(),
			upstreams: Arc::new(upstreams),
		}
	}
}

#[derive(Debug, Error)]
pub enum ProxyError {
	#[error("Method Not Allowed")]
	MethodNotAllowed,
	#[error("invalid relay request: {0}")]
	BadRequest(#[from] serde_json::Error),
	/// A pass-through route could not reach its upstream.
	#[error("upstream unreachable: {0}")]
	Gateway(reqwest::Error),
	#[error("{0}")]
	Relay(String),
}

impl IntoResponse for ProxyError {
	fn into_response(self) -> Response {
		let status = match &self {
			Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::Gateway(_) => StatusCode::BAD_GATEWAY,
			Self::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};
		error!(%status, e = %self, "Proxy request failed");

		(status, Json(json!({ "error": self.to_string() }))).into_response()
	}
}

pub fn router(state: ProxyState, relay_path: &str) -> Router {
	let relay_path = format!("/{}", relay_path.trim_start_matches('/'));

	Router::new()
		.route("/health", get(|| async { "OK" }))
		.route("/api", post(forward_api))
		.route("/api/*rest", post(forward_api))
		.route("/public", post(forward_public))
		.route("/public/*rest", post(forward_public))
		.route(&relay_path, any(relay))
		.with_state(state)
}

async fn forward_api(
	State(state): State<ProxyState>,
	uri: Uri,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	forward(&state, &state.upstreams.api, "/api", &uri, &headers, body).await
}

async fn forward_public(
	State(state): State<ProxyState>,
	uri: Uri,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	forward(&state, &state.upstreams.public, "/public", &uri, &headers, body).await
}

/// Strips `prefix` and replays the request against `upstream` with the SOAP headers intact.
async fn forward(
	state: &ProxyState,
	upstream: &str,
	prefix: &str,
	uri: &Uri,
	headers: &HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	let rest = uri.path().strip_prefix(prefix).unwrap_or_default();
	let mut url = format!("{upstream}{rest}");
	if let Some(query) = uri.query() {
		url.push('?');
		url.push_str(query);
	}
	debug!(%url, "Forwarding SOAP request");

	let mut request = state.client.post(&url).body(body);
	for name in [header::CONTENT_TYPE.as_str(), SOAP_ACTION_HEADER] {
		if let Some(value) = headers.get(name) {
			request = request.header(name, value.clone());
		}
	}

	let response = request.send().await.map_err(ProxyError::Gateway)?;
	let status = response.status();
	let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
	let body = response.bytes().await.map_err(ProxyError::Gateway)?;

	let mut res = (status, body).into_response();
	if let Some(content_type) = content_type {
		res.headers_mut().insert(header::CONTENT_TYPE, content_type);
	}

	Ok(res)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest {
	soap_action: String,
	soap_body: String,
}

async fn relay(
	State(state): State<ProxyState>,
	method: Method,
	body: Bytes,
) -> Result<Json<Value>, ProxyError> {
	if method != Method::POST {
		return Err(ProxyError::MethodNotAllowed);
	}

	let request = serde_json::from_slice::<RelayRequest>(&body)?;
	debug!(action = %request.soap_action, "Relaying SOAP request");

	let response = state
		.client
		.post(&state.upstreams.relay)
		.header(header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
		.header(SOAP_ACTION_HEADER, &request.soap_action)
		.body(request.soap_body)
		.send()
		.await
		.map_err(|e| ProxyError::Relay(e.to_string()))?;

	let status = response.status();
	let text = response
		.text()
		.await
		.map_err(|e| ProxyError::Relay(e.to_string()))?;

	if !status.is_success() {
		return Err(ProxyError::Relay(format!("upstream answered {status}")));
	}

	Ok(Json(json!({ "data": text })))
}
