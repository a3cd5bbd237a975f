use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
	endpoint::{Endpoint, EndpointMode},
	envelope::{fault_message, Envelope},
	error::{Error, TransportError},
};

pub const SOAP_ACTION_HEADER: &str = "SOAPAction";
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// A single request/response exchange. No retries and no timeout beyond the client default.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Returns the raw response document on a 2xx answer.
	async fn send(&self, endpoint: &Endpoint, envelope: &Envelope) -> Result<String, TransportError>;
}

/// HTTP transport. The strategy follows the endpoint mode: raw XML for direct and proxied
/// endpoints, a JSON wrapper for the serverless relay.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	base_url: Url,
}

impl HttpTransport {
	pub fn new(base_url: &str) -> Result<Self, Error> {
		Self::with_client(reqwest::Client::new(), base_url)
	}

	pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, Error> {
		let base_url = Url::parse(base_url)
			.map_err(|e| Error::Configuration(format!("invalid base url '{base_url}': {e}")))?;

		Ok(Self { client, base_url })
	}

	fn url_for(&self, address: &str) -> Result<Url, TransportError> {
		match Url::parse(address) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => self
				.base_url
				.join(address)
				.map_err(|e| TransportError::no_response(format!("invalid address '{address}': {e}"))),
			Err(e) => Err(TransportError::no_response(format!(
				"invalid address '{address}': {e}"
			))),
		}
	}

	async fn send_xml(&self, url: Url, envelope: &Envelope) -> Result<String, TransportError> {
		let response = self
			.client
			.post(url)
			.header(header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
			.header(SOAP_ACTION_HEADER, &envelope.action)
			.body(envelope.xml.clone())
			.send()
			.await
			.map_err(TransportError::no_response)?;

		let status = response.status();
		let body = read_body(response, status).await?;

		if !status.is_success() {
			let message = fault_message(&body).unwrap_or_else(|| reason(status));
			return Err(TransportError::status(status.as_u16(), message, Some(body)));
		}

		Ok(body)
	}

	async fn send_relay(&self, url: Url, envelope: &Envelope) -> Result<String, TransportError> {
		let response = self
			.client
			.post(url)
			.header(SOAP_ACTION_HEADER, &envelope.action)
			.json(&envelope.to_relay_json())
			.send()
			.await
			.map_err(TransportError::no_response)?;

		let status = response.status();
		let body = read_body(response, status).await?;
		let wrapper = serde_json::from_str::<Value>(&body).ok();

		if !status.is_success() {
			let message = wrapper
				.as_ref()
				.and_then(|w| w.get("error"))
				.and_then(Value::as_str)
				.map(str::to_owned)
				.unwrap_or_else(|| reason(status));
			return Err(TransportError::status(status.as_u16(), message, Some(body)));
		}

		// Anything but `{ data }` is handed to the decoder untouched so it can reject it
		Ok(match wrapper.and_then(|mut w| w.get_mut("data").map(Value::take)) {
			Some(Value::String(data)) => data,
			Some(other) => other.to_string(),
			None => body,
		})
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, endpoint: &Endpoint, envelope: &Envelope) -> Result<String, TransportError> {
		let url = self.url_for(&endpoint.address)?;

		debug!(
			action = %envelope.action,
			%url,
			mode = ?endpoint.mode,
			"Sending SOAP request"
		);

		let res = match endpoint.mode {
			EndpointMode::Direct | EndpointMode::DevProxy => self.send_xml(url, envelope).await,
			EndpointMode::Relay => self.send_relay(url, envelope).await,
		};

		match &res {
			Ok(body) => debug!(bytes = body.len(), "SOAP response received"),
			Err(e) => debug!(status = ?e.status, "SOAP request failed"),
		}

		res
	}
}

async fn read_body(response: reqwest::Response, status: StatusCode) -> Result<String, TransportError> {
	response
		.text()
		.await
		.map_err(|e| TransportError::status(status.as_u16(), format!("failed to read body: {e}"), None))
}

fn reason(status: StatusCode) -> String {
	status
		.canonical_reason()
		.map(str::to_owned)
		.unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn relative_addresses_join_the_base() {
		let transport = HttpTransport::new("http://localhost:5173").unwrap();

		assert_eq!(
			transport.url_for("/api").unwrap().as_str(),
			"http://localhost:5173/api"
		);
		assert_eq!(
			transport
				.url_for("http://103.168.19.35/iStWebPublic/iStreamsSmartPublic.asmx")
				.unwrap()
				.host_str(),
			Some("103.168.19.35")
		);
	}

	#[test]
	fn bad_base_is_a_configuration_error() {
		assert!(matches!(
			HttpTransport::new("not a url"),
			Err(Error::Configuration(_))
		));
	}

	#[test]
	fn unusable_address_fails_without_response() {
		let transport = HttpTransport::new("http://localhost:5173").unwrap();
		let err = transport.url_for("http://[broken").unwrap_err();
		assert!(!err.response_received);
		assert!(err.is_retryable());
	}
}
