//! Connect-then-call session discipline.
//!
//! The remote service keeps no session between requests, so every business call is preceded by
//! its own connect call for the caller's identity. Nothing is cached between calls.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
	config::ClientConfig,
	connection,
	endpoint::Endpoint,
	envelope::EnvelopeCodec,
	error::Error,
	transport::Transport,
};

#[async_trait]
pub trait SessionGate: Send + Sync {
	/// Succeeds only when the remote side accepted the identity for this request.
	async fn establish(
		&self,
		transport: &dyn Transport,
		codec: &EnvelopeCodec,
		identity: &str,
		endpoint: &Endpoint,
	) -> Result<(), Error>;
}

/// Issues the connect operation on every call and compares its scalar answer to the sentinel.
#[derive(Debug, Clone)]
pub struct ConnectPerCall {
	operation: String,
	success_sentinel: String,
}

impl ConnectPerCall {
	pub fn new(operation: impl Into<String>, success_sentinel: impl Into<String>) -> Self {
		Self {
			operation: operation.into(),
			success_sentinel: success_sentinel.into(),
		}
	}

	pub fn from_config(config: &ClientConfig) -> Self {
		Self::new(&config.connect_operation, &config.success_sentinel)
	}
}

impl Default for ConnectPerCall {
	fn default() -> Self {
		Self::new(connection::OPERATION, "SUCCESS")
	}
}

#[async_trait]
impl SessionGate for ConnectPerCall {
	async fn establish(
		&self,
		transport: &dyn Transport,
		codec: &EnvelopeCodec,
		identity: &str,
		endpoint: &Endpoint,
	) -> Result<(), Error> {
		let envelope = codec.encode(&self.operation, &connection::params(identity));
		let raw = transport.send(endpoint, &envelope).await?;
		let result = codec.decode(&raw, &self.operation)?;

		match result.as_scalar() {
			Some(status) if status.trim() == self.success_sentinel => {
				debug!("Connection established");
				Ok(())
			}
			_ => {
				let message = result.to_message();
				warn!(%message, "Connection refused");
				Err(Error::Session { message })
			}
		}
	}
}

/// Runs `body` only after the gate accepted `identity`.
///
/// An empty identity fails with [`Error::Configuration`] before anything is sent.
pub async fn with_session<G, F, Fut, T>(
	gate: &G,
	transport: &dyn Transport,
	codec: &EnvelopeCodec,
	identity: &str,
	endpoint: &Endpoint,
	body: F,
) -> Result<T, Error>
where
	G: SessionGate + ?Sized,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<T, Error>>,
{
	if identity.trim().is_empty() {
		return Err(Error::Configuration(
			"caller identity is required to open a connection".to_string(),
		));
	}

	gate.establish(transport, codec, identity, endpoint).await?;

	body().await
}
