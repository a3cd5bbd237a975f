//! Binary payloads: uploads travel as base64 text, downloads come back either as base64 text or
//! as a JSON array of byte values.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{
	de::{self, SeqAccess, Visitor},
	Deserialize, Deserializer,
};
use serde_json::Value;

use crate::{
	error::DecodeError,
	value::{ParamValue, ParsedResult},
};

/// Field that carries document content in detail rows.
pub const DOC_DATA_FIELD: &str = "DOC_DATA";

pub fn encode_base64(bytes: &[u8]) -> String {
	STANDARD.encode(bytes)
}

/// Accepts plain base64 and `data:<mime>;base64,<payload>` urls.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
	let payload = match text.split_once(";base64,") {
		Some((prefix, payload)) if prefix.starts_with("data:") => payload,
		_ => text,
	};

	STANDARD
		.decode(payload.trim())
		.map_err(|e| DecodeError::InvalidBinary(e.to_string()))
}

pub fn bytes_from_value(value: &Value) -> Result<Vec<u8>, DecodeError> {
	match value {
		Value::Array(items) => items
			.iter()
			.map(|item| {
				item.as_u64()
					.and_then(|b| u8::try_from(b).ok())
					.ok_or_else(|| DecodeError::InvalidBinary(format!("not a byte: {item}")))
			})
			.collect(),
		Value::String(text) => bytes_from_text(text),
		Value::Null => Ok(Vec::new()),
		other => Err(DecodeError::InvalidBinary(format!(
			"unexpected binary value: {other}"
		))),
	}
}

pub fn bytes_from_text(text: &str) -> Result<Vec<u8>, DecodeError> {
	let text = text.trim();
	if text.starts_with('[') {
		bytes_from_value(&serde_json::from_str(text)?)
	} else {
		decode_base64(text)
	}
}

/// Image and download operations answer with a scalar holding the content.
pub fn bytes_from_result(result: &ParsedResult) -> Result<Vec<u8>, DecodeError> {
	match result {
		ParsedResult::Scalar(text) => bytes_from_text(text),
		ParsedResult::Record(record) => record
			.get(DOC_DATA_FIELD)
			.map(bytes_from_value)
			.unwrap_or_else(|| Err(DecodeError::InvalidBinary("record has no content".to_string()))),
		ParsedResult::List(_) => Err(DecodeError::InvalidBinary(
			"expected a single binary payload, got a list".to_string(),
		)),
	}
}

/// `report.final.pdf` -> `pdf`, `None` when the name has no extension.
pub fn extension_of(file_name: &str) -> Option<&str> {
	file_name
		.rsplit_once('.')
		.map(|(_, ext)| ext)
		.filter(|ext| !ext.is_empty())
}

/// File content supplied by a caller, either as base64 text or as an array of bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContent(pub Vec<u8>);

impl From<FileContent> for ParamValue {
	fn from(content: FileContent) -> Self {
		Self::Bytes(content.0)
	}
}

impl<'de> Deserialize<'de> for FileContent {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct FileContentVisitor;

		impl<'de> Visitor<'de> for FileContentVisitor {
			type Value = FileContent;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("base64 text or an array of bytes")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				decode_base64(v).map(FileContent).map_err(E::custom)
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
				let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or_default());
				while let Some(byte) = seq.next_element::<u8>()? {
					bytes.push(byte);
				}
				Ok(FileContent(bytes))
			}
		}

		deserializer.deserialize_any(FileContentVisitor)
	}
}
