use crate::config::Environment;

/// How a request reaches the legacy service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
	/// Raw SOAP XML posted straight to the configured target.
	Direct,
	/// Raw SOAP XML posted to the local development proxy, which strips its prefix and forwards.
	DevProxy,
	/// JSON `{ soapAction, soapBody }` posted to a serverless relay that answers `{ data }` or `{ error }`.
	Relay,
}

/// A resolved transport address. Relative addresses are joined to the transport's base url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
	pub address: String,
	pub mode: EndpointMode,
}

impl Endpoint {
	pub fn direct(address: impl Into<String>) -> Self {
		Self {
			address: address.into(),
			mode: EndpointMode::Direct,
		}
	}
}

/// Picks the literal address for a configured target. Pure, and never fails: anything that
/// doesn't match the legacy host marker is passed through unchanged.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
	environment: Environment,
	legacy_host_marker: String,
	dev_proxy_path: String,
	relay_path: Option<String>,
}

impl EndpointResolver {
	pub fn new(
		environment: Environment,
		legacy_host_marker: impl Into<String>,
		dev_proxy_path: impl Into<String>,
		relay_path: Option<String>,
	) -> Self {
		Self {
			environment,
			legacy_host_marker: legacy_host_marker.into(),
			dev_proxy_path: dev_proxy_path.into(),
			relay_path,
		}
	}

	pub fn environment(&self) -> Environment {
		self.environment
	}

	pub fn resolve(&self, configured_target: &str) -> Endpoint {
		let is_legacy_host = !self.legacy_host_marker.is_empty()
			&& configured_target.contains(&self.legacy_host_marker);

		match (self.environment, &self.relay_path) {
			(Environment::Development, _) if is_legacy_host => Endpoint {
				address: self.dev_proxy_path.clone(),
				mode: EndpointMode::DevProxy,
			},
			(Environment::Production, Some(relay_path)) if is_legacy_host => Endpoint {
				address: relay_path.clone(),
				mode: EndpointMode::Relay,
			},
			_ => Endpoint::direct(configured_target),
		}
	}
}
