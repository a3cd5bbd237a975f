use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::{
	config::ClientConfig,
	endpoint::{Endpoint, EndpointResolver},
	envelope::EnvelopeCodec,
	error::{report_error, Error},
	session::{with_session, ConnectPerCall, SessionGate},
	transport::{HttpTransport, Transport},
	value::{Params, ParsedResult},
};

/// Composes endpoint resolution, the session gate, the envelope codec and a transport into
/// named remote calls. Holds no mutable state, so one client can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct ErpClient<T = HttpTransport, G = ConnectPerCall> {
	resolver: EndpointResolver,
	codec: EnvelopeCodec,
	transport: T,
	gate: G,
	default_target: String,
}

impl ErpClient {
	/// HTTP client with the per-call connect gate.
	pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
		Ok(Self::new(
			config,
			HttpTransport::new(&config.base_url)?,
			ConnectPerCall::from_config(config),
		))
	}
}

impl<T: Transport, G: SessionGate> ErpClient<T, G> {
	pub fn new(config: &ClientConfig, transport: T, gate: G) -> Self {
		Self {
			resolver: config.resolver(),
			codec: EnvelopeCodec::new(&config.namespace),
			transport,
			gate,
			default_target: config.default_target.clone(),
		}
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn resolve(&self, target: Option<&str>) -> Endpoint {
		self.resolver
			.resolve(target.unwrap_or(self.default_target.as_str()))
	}

	/// Runs `operation` behind the session gate and returns the decoded result as-is.
	pub async fn call(
		&self,
		operation: &str,
		params: Params,
		identity: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		let endpoint = self.resolve(target);
		let span = info_span!(
			"erp_call",
			operation,
			call_id = %Uuid::new_v4(),
			mode = ?endpoint.mode
		);

		async {
			let res = with_session(
				&self.gate,
				&self.transport,
				&self.codec,
				identity,
				&endpoint,
				|| self.exchange(operation, &params, &endpoint),
			)
			.await;

			report_error(&res);
			res
		}
		.instrument(span)
		.await
	}

	/// A call without the connect pre-check, used for the connect operation itself.
	pub(crate) async fn call_ungated(
		&self,
		operation: &str,
		params: Params,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		let endpoint = self.resolve(target);
		self.exchange(operation, &params, &endpoint)
			.instrument(info_span!("erp_call", operation, mode = ?endpoint.mode))
			.await
	}

	async fn exchange(
		&self,
		operation: &str,
		params: &Params,
		endpoint: &Endpoint,
	) -> Result<ParsedResult, Error> {
		let envelope = self.codec.encode(operation, params);
		let raw = self.transport.send(endpoint, &envelope).await?;
		Ok(self.codec.decode(&raw, operation)?)
	}
}
