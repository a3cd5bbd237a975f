#![allow(dead_code)]

use std::{
	collections::{HashMap, VecDeque},
	sync::Mutex,
};

use async_trait::async_trait;
use dms_erp_client::{ClientConfig, Endpoint, Envelope, ErpClient, Transport, TransportError};

pub const IDENTITY: &str = "alice@example.com";
pub const LEGACY_TARGET: &str = "http://103.168.19.35/iStWebClient_Demo/istreamssmartservice.asmx";

pub fn soap_response(operation: &str, result: &str) -> String {
	format!(
		r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema"><soap:Body><{operation}Response xmlns="http://tempuri.org/"><{operation}Result>{result}</{operation}Result></{operation}Response></soap:Body></soap:Envelope>"#
	)
}

pub fn connected(status: &str) -> String {
	soap_response("doConnection", status)
}

/// In-memory transport answering per operation, recording every exchange.
#[derive(Default)]
pub struct ScriptedTransport {
	queued: Mutex<HashMap<String, VecDeque<Result<String, TransportError>>>>,
	repeated: Mutex<HashMap<String, String>>,
	sent: Mutex<Vec<(Endpoint, Envelope)>>,
}

impl ScriptedTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answer the next call of `operation` once.
	pub fn once(self, operation: &str, answer: Result<String, TransportError>) -> Self {
		self.queued
			.lock()
			.unwrap()
			.entry(operation.to_owned())
			.or_default()
			.push_back(answer);
		self
	}

	/// Answer every call of `operation` with the same body.
	pub fn always(self, operation: &str, body: String) -> Self {
		self.repeated
			.lock()
			.unwrap()
			.insert(operation.to_owned(), body);
		self
	}

	pub fn sent(&self) -> Vec<(Endpoint, Envelope)> {
		self.sent.lock().unwrap().clone()
	}

	pub fn operations(&self) -> Vec<String> {
		self.sent()
			.into_iter()
			.map(|(_, envelope)| envelope.operation)
			.collect()
	}

	pub fn calls_for(&self, operation: &str) -> usize {
		self.operations()
			.iter()
			.filter(|op| op.as_str() == operation)
			.count()
	}
}

#[async_trait]
impl Transport for ScriptedTransport {
	async fn send(&self, endpoint: &Endpoint, envelope: &Envelope) -> Result<String, TransportError> {
		self.sent
			.lock()
			.unwrap()
			.push((endpoint.clone(), envelope.clone()));

		let queued = self
			.queued
			.lock()
			.unwrap()
			.get_mut(&envelope.operation)
			.and_then(VecDeque::pop_front);

		match queued {
			Some(answer) => answer,
			None => self
				.repeated
				.lock()
				.unwrap()
				.get(&envelope.operation)
				.cloned()
				.ok_or_else(|| {
					TransportError::no_response(format!("unscripted operation {}", envelope.operation))
				}),
		}
	}
}

pub fn client(transport: ScriptedTransport) -> ErpClient<ScriptedTransport> {
	client_with(&ClientConfig::default(), transport)
}

pub fn client_with(config: &ClientConfig, transport: ScriptedTransport) -> ErpClient<ScriptedTransport> {
	ErpClient::new(
		config,
		transport,
		dms_erp_client::ConnectPerCall::from_config(config),
	)
}
