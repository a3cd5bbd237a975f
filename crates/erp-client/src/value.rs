//! Values flowing in and out of the adapter.
//!
//! Requests carry an ordered [`Params`] map whose keys are sent verbatim, and responses come
//! back as a [`ParsedResult`]: a list of records, one record, or a bare scalar string.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One flattened response row, field name to value, in document order.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
	Text(String),
	Integer(i64),
	Float(f64),
	Bool(bool),
	/// File content, sent as base64 text.
	Bytes(Vec<u8>),
}

impl ParamValue {
	/// Text form embedded in the envelope.
	pub fn to_text(&self) -> String {
		match self {
			Self::Text(s) => s.clone(),
			Self::Integer(i) => i.to_string(),
			Self::Float(f) => f.to_string(),
			Self::Bool(b) => b.to_string(),
			Self::Bytes(bytes) => STANDARD.encode(bytes),
		}
	}
}

impl From<String> for ParamValue {
	fn from(s: String) -> Self {
		Self::Text(s)
	}
}

impl From<&str> for ParamValue {
	fn from(s: &str) -> Self {
		Self::Text(s.to_owned())
	}
}

impl From<i64> for ParamValue {
	fn from(i: i64) -> Self {
		Self::Integer(i)
	}
}

impl From<i32> for ParamValue {
	fn from(i: i32) -> Self {
		Self::Integer(i.into())
	}
}

impl From<i16> for ParamValue {
	fn from(i: i16) -> Self {
		Self::Integer(i.into())
	}
}

impl From<f64> for ParamValue {
	fn from(f: f64) -> Self {
		Self::Float(f)
	}
}

impl From<bool> for ParamValue {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<Vec<u8>> for ParamValue {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Bytes(bytes)
	}
}

/// Ordered parameter map. Keys are remote field names and are never normalized.
///
/// Absent values (`None`) are kept so the envelope can omit them, matching a caller that
/// passes an undefined field through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Option<ParamValue>)>);

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.0.push((key.into(), Some(value.into())));
		self
	}

	pub fn with_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
		self.0.push((key.into(), value.map(Into::into)));
		self
	}

	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.0
			.iter()
			.find(|(k, _)| k == key)
			.and_then(|(_, v)| v.as_ref())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParamValue>)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Decoded response, shape-faithful: a lone record is never wrapped into a list here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedResult {
	List(Vec<Record>),
	Record(Record),
	Scalar(String),
}

impl ParsedResult {
	pub fn as_scalar(&self) -> Option<&str> {
		match self {
			Self::Scalar(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_list(&self) -> bool {
		matches!(self, Self::List(_))
	}

	/// The one place single records are normalized into a sequence.
	///
	/// An empty scalar means "no rows"; any other scalar is not a row set and yields `None`.
	pub fn into_records(self) -> Option<Vec<Record>> {
		match self {
			Self::List(records) => Some(records),
			Self::Record(record) => Some(vec![record]),
			Self::Scalar(s) if s.trim().is_empty() => Some(Vec::new()),
			Self::Scalar(_) => None,
		}
	}

	/// Text used when a non-scalar result must be surfaced as a message.
	pub fn to_message(&self) -> String {
		match self {
			Self::Scalar(s) => s.clone(),
			other => serde_json::to_string(other).unwrap_or_default(),
		}
	}
}
