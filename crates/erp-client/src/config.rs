//! Client configuration

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::endpoint::EndpointResolver;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file: {0}")]
	Io(#[from] std::io::Error),
	#[error("failed to parse config file: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("unknown environment '{0}', expected 'development' or 'production'")]
	UnknownEnvironment(String),
}

/// Runtime environment, decides whether the development proxy is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	Development,
	#[default]
	Production,
}

impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Self::Development),
			"production" | "prod" => Ok(Self::Production),
			other => Err(ConfigError::UnknownEnvironment(other.to_owned())),
		}
	}
}

/// Main client configuration, read once at startup and injected into the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	pub environment: Environment,

	/// Target used when a call does not pass its own
	pub default_target: String,

	/// Origin that relative addresses ("/api", relay paths) are joined to
	pub base_url: String,

	/// Substring identifying the cross-origin restricted legacy host
	pub legacy_host_marker: String,

	/// Local proxy path used for the legacy host during development
	pub dev_proxy_path: String,

	/// Serverless relay path, used for the legacy host outside development when set
	pub relay_path: Option<String>,

	/// XML namespace of the remote operations, also the SOAPAction prefix
	pub namespace: String,

	pub connect_operation: String,

	pub success_sentinel: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			environment: Environment::default(),
			default_target: "/api".to_string(),
			base_url: "http://localhost:5173".to_string(),
			legacy_host_marker: "103.168.19.35".to_string(),
			dev_proxy_path: "/api".to_string(),
			relay_path: None,
			namespace: "http://tempuri.org/".to_string(),
			connect_operation: "doConnection".to_string(),
			success_sentinel: "SUCCESS".to_string(),
		}
	}
}

impl ClientConfig {
	/// Load configuration from a JSON file, falling back to defaults when it doesn't exist
	pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		if path.exists() {
			info!("Loading client config from {:?}", path);
			let json = fs::read_to_string(path)?;
			Ok(serde_json::from_str(&json)?)
		} else {
			warn!("No client config at {:?}, using defaults", path);
			Ok(Self::default())
		}
	}

	/// Defaults overlaid with environment variables
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::default().apply_env()
	}

	pub fn apply_env(mut self) -> Result<Self, ConfigError> {
		if let Ok(environment) = std::env::var("DMS_ENVIRONMENT") {
			self.environment = environment.parse()?;
		}
		if let Ok(target) = std::env::var("DMS_SOAP_URL") {
			self.default_target = target;
		}
		if let Ok(base_url) = std::env::var("DMS_BASE_URL") {
			self.base_url = base_url;
		}
		if let Ok(relay_path) = std::env::var("DMS_RELAY_PATH") {
			self.relay_path = Some(relay_path).filter(|p| !p.is_empty());
		}
		Ok(self)
	}

	pub fn resolver(&self) -> EndpointResolver {
		EndpointResolver::new(
			self.environment,
			&self.legacy_host_marker,
			&self.dev_proxy_path,
			self.relay_path.clone(),
		)
	}
}
