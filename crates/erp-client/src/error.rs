use std::fmt::Display;

use thiserror::Error;
use tracing::error;

/// Everything a business call can fail with. Nothing here is recovered inside the adapter.
#[derive(Debug, Error)]
pub enum Error {
	/// Raised before any I/O happens, e.g. a missing caller identity.
	#[error("configuration error: {0}")]
	Configuration(String),
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The connect pre-check answered with something other than the success sentinel.
	#[error("connection failed: {message}")]
	Session { message: String },
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// HTTP or network level failure.
#[derive(Debug, Error)]
#[error(
	"transport error{}: {message}",
	status.map(|s| format!(" <status='{s}'>")).unwrap_or_default()
)]
pub struct TransportError {
	/// `true` when the server answered (4xx/5xx), `false` when no response arrived at all.
	pub response_received: bool,
	pub status: Option<u16>,
	pub message: String,
	/// Raw body of an error response, kept for diagnostics only.
	pub body: Option<String>,
}

impl TransportError {
	pub fn no_response(message: impl Display) -> Self {
		Self {
			response_received: false,
			status: None,
			message: message.to_string(),
			body: None,
		}
	}

	pub fn status(status: u16, message: impl Display, body: Option<String>) -> Self {
		Self {
			response_received: true,
			status: Some(status),
			message: message.to_string(),
			body,
		}
	}

	/// Only network level failures are worth repeating unchanged.
	pub fn is_retryable(&self) -> bool {
		!self.response_received
	}
}

#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("malformed xml response: {0}")]
	MalformedXml(String),
	#[error("response has no soap body")]
	MissingBody,
	#[error("soap fault <code='{code}'>: {message}")]
	Fault { code: String, message: String },
	/// A byte array payload that is not a valid JSON array.
	#[error("invalid json payload: {0}")]
	InvalidJson(#[from] serde_json::Error),
	#[error("invalid binary payload: {0}")]
	InvalidBinary(String),
}

impl From<quick_xml::Error> for DecodeError {
	fn from(e: quick_xml::Error) -> Self {
		Self::MalformedXml(e.to_string())
	}
}

/// Report an error with tracing
pub fn report_error<T>(res: &Result<T, Error>) {
	if let Err(e) = res {
		error!("{e:#}");
	}
}
