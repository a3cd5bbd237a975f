//! SOAP envelope encoding and response decoding.
//!
//! Requests are SOAP 1.1 document/literal envelopes: the operation is the single child of
//! `soap:Body`, under the service namespace, and every parameter becomes a same-named child.
//!
//! Responses are decoded from the `<{operation}Result>` element, which the legacy service fills in
//! one of several ways:
//! - nested XML, either a single row of leaf fields or repeated row elements (possibly wrapped in
//!   `NewDataSet`/`diffgram` containers and preceded by an inline schema);
//! - JSON text: an array of rows, one row object, or a `{ "Data": [...] }` wrapper;
//! - a bare string such as `SUCCESS`, `ERROR` or a human readable message. Text that only looks
//!   like JSON (`[E102] Invalid domain`) stays a string.
//!
//! Decoding is shape-faithful: a container of row elements and a JSON array are always lists, even
//! with a single row, and a lone row is returned as [`ParsedResult::Record`]. When summary fields sit
//! next to rows, the result is a record holding both, with repeated rows collected into an array
//! under their element name. Leaf values are returned exactly as received, whitespace included.

use quick_xml::{
	escape::escape,
	events::{BytesStart, Event},
	Reader,
};
use serde_json::{json, Value};

use crate::{
	error::DecodeError,
	value::{Params, ParsedResult, Record},
};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// A serialized request, built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
	pub operation: String,
	/// Value of the `SOAPAction` header, always derived from the same operation as the body tag.
	pub action: String,
	pub xml: String,
}

impl Envelope {
	/// Body accepted by the serverless relay.
	pub fn to_relay_json(&self) -> Value {
		json!({
			"soapAction": self.action,
			"soapBody": self.xml,
		})
	}
}

#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
	namespace: String,
}

impl EnvelopeCodec {
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
		}
	}

	pub fn action(&self, operation: &str) -> String {
		if self.namespace.ends_with('/') {
			format!("{}{operation}", self.namespace)
		} else {
			format!("{}/{operation}", self.namespace)
		}
	}

	pub fn encode(&self, operation: &str, params: &Params) -> Envelope {
		let mut xml = String::with_capacity(256);

		xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
		xml.push_str(&format!(
			r#"<soap:Envelope xmlns:xsi="{XSI_NS}" xmlns:xsd="{XSD_NS}" xmlns:soap="{SOAP_ENVELOPE_NS}">"#
		));
		xml.push_str("<soap:Body>");
		xml.push_str(&format!(
			r#"<{operation} xmlns="{}">"#,
			escape(self.namespace.as_str())
		));

		// Absent values are omitted so the service applies its own default
		for (key, value) in params.iter() {
			if let Some(value) = value {
				xml.push_str(&format!("<{key}>{}</{key}>", escape(value.to_text().as_str())));
			}
		}

		xml.push_str(&format!("</{operation}>"));
		xml.push_str("</soap:Body></soap:Envelope>");

		Envelope {
			operation: operation.to_owned(),
			action: self.action(operation),
			xml,
		}
	}

	pub fn decode(&self, raw: &str, operation: &str) -> Result<ParsedResult, DecodeError> {
		decode(raw, operation)
	}
}

impl Default for EnvelopeCodec {
	fn default() -> Self {
		Self::new("http://tempuri.org/")
	}
}

pub fn decode(raw: &str, operation: &str) -> Result<ParsedResult, DecodeError> {
	let trimmed = raw.trim_start_matches('\u{feff}').trim();

	if !trimmed.starts_with('<') {
		return interpret_text(trimmed);
	}

	let root = parse_tree(trimmed)?;
	let Some(document) = root.elements().next() else {
		return interpret_text(&root.text);
	};

	let container = if document.name == "Envelope" {
		let body = document.child("Body").ok_or(DecodeError::MissingBody)?;
		if let Some(fault) = body.child("Fault") {
			return Err(fault.to_fault());
		}
		let Some(response) = body
			.child(&format!("{operation}Response"))
			.or_else(|| body.child(operation))
			.or_else(|| body.elements().next())
		else {
			return Ok(ParsedResult::Scalar(String::new()));
		};
		response
			.child(&format!("{operation}Result"))
			.unwrap_or(response)
	} else {
		// Plain `<string xmlns="...">` style answers without an envelope
		document
	};

	interpret_node(container)
}

/// Message of a SOAP fault carried by an error response, if the body is one.
pub fn fault_message(raw: &str) -> Option<String> {
	match decode(raw, "") {
		Err(DecodeError::Fault { message, .. }) => Some(message),
		_ => None,
	}
}

#[derive(Debug, Default)]
struct Node {
	name: String,
	nil: bool,
	text: String,
	children: Vec<Node>,
}

impl Node {
	fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
		let mut nil = false;
		for attr in start.attributes() {
			let attr = attr.map_err(|e| DecodeError::MalformedXml(e.to_string()))?;
			if attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true" {
				nil = true;
			}
		}

		Ok(Self {
			name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
			nil,
			..Default::default()
		})
	}

	/// Child elements, skipping inline DataSet schemas.
	fn elements(&self) -> impl Iterator<Item = &Node> {
		self.children.iter().filter(|c| c.name != "schema")
	}

	fn child(&self, name: &str) -> Option<&Node> {
		self.children.iter().find(|c| c.name == name)
	}

	/// Whitespace between child elements is layout, leaf text is kept as received.
	fn drop_indentation(&mut self) {
		if !self.children.is_empty() && self.text.trim().is_empty() {
			self.text.clear();
		}
	}

	fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	/// A wrapper whose children are all rows rather than fields.
	fn is_container(&self) -> bool {
		self.elements().next().is_some() && self.elements().all(|c| !c.is_leaf())
	}

	fn to_value(&self) -> Value {
		if self.nil {
			Value::Null
		} else if self.is_leaf() {
			Value::String(self.text.clone())
		} else {
			Value::Object(self.flatten())
		}
	}

	/// Repeated element names are collected into an array under that name.
	fn flatten(&self) -> Record {
		let mut record = Record::new();
		for child in self.elements() {
			let value = child.to_value();
			match record.get_mut(&child.name) {
				Some(Value::Array(items)) => items.push(value),
				Some(existing) => {
					let first = existing.take();
					*existing = Value::Array(vec![first, value]);
				}
				None => {
					record.insert(child.name.clone(), value);
				}
			}
		}
		record
	}

	fn text_at(&self, path: &[&str]) -> Option<String> {
		path.iter()
			.try_fold(self, |node, name| node.child(name))
			.map(|node| node.text.clone())
	}

	fn to_fault(&self) -> DecodeError {
		DecodeError::Fault {
			code: self
				.text_at(&["faultcode"])
				.or_else(|| self.text_at(&["Code", "Value"]))
				.unwrap_or_default(),
			message: self
				.text_at(&["faultstring"])
				.or_else(|| self.text_at(&["Reason", "Text"]))
				.unwrap_or_default(),
		}
	}
}

fn parse_tree(raw: &str) -> Result<Node, DecodeError> {
	let mut reader = Reader::from_str(raw);

	// Synthetic document root
	let mut stack = vec![Node::default()];

	loop {
		match reader.read_event()? {
			Event::Start(start) => stack.push(Node::open(&start)?),
			Event::Empty(start) => {
				let node = Node::open(&start)?;
				current(&mut stack)?.children.push(node);
			}
			Event::End(_) => {
				let mut node = stack
					.pop()
					.filter(|_| !stack.is_empty())
					.ok_or_else(|| DecodeError::MalformedXml("unbalanced end tag".to_string()))?;
				node.drop_indentation();
				current(&mut stack)?.children.push(node);
			}
			Event::Text(text) => current(&mut stack)?.text.push_str(&text.unescape()?),
			Event::CData(data) => current(&mut stack)?
				.text
				.push_str(&String::from_utf8_lossy(&data)),
			Event::Eof => break,
			_ => {}
		}
	}

	match (stack.pop(), stack.is_empty()) {
		(Some(mut root), true) => {
			root.drop_indentation();
			Ok(root)
		}
		_ => Err(DecodeError::MalformedXml("unclosed element".to_string())),
	}
}

fn current(stack: &mut [Node]) -> Result<&mut Node, DecodeError> {
	stack
		.last_mut()
		.ok_or_else(|| DecodeError::MalformedXml("unbalanced document".to_string()))
}

fn interpret_node(node: &Node) -> Result<ParsedResult, DecodeError> {
	if node.nil {
		return Ok(ParsedResult::Scalar(String::new()));
	}

	if node.is_leaf() {
		return interpret_text(&node.text);
	}

	let elements = node.elements().collect::<Vec<_>>();

	match elements.as_slice() {
		// Only a schema: a data set without rows
		[] => Ok(ParsedResult::List(Vec::new())),
		fields if fields.iter().all(|c| c.is_leaf()) => Ok(ParsedResult::Record(node.flatten())),
		[wrapper] if wrapper.is_container() => interpret_node(wrapper),
		rows if rows.iter().all(|c| !c.is_leaf()) => Ok(ParsedResult::List(
			rows.iter().map(|row| row.flatten()).collect(),
		)),
		// Summary fields next to rows: keep both, rows grouped under their element name
		_ => Ok(ParsedResult::Record(node.flatten())),
	}
}

fn interpret_text(text: &str) -> Result<ParsedResult, DecodeError> {
	let trimmed = text.trim();

	if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
		return Ok(ParsedResult::Scalar(text.to_owned()));
	}

	// Messages such as `[E102] Invalid domain` only look like JSON
	let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
		return Ok(ParsedResult::Scalar(text.to_owned()));
	};

	Ok(match value {
		Value::Array(items) => rows_or_scalar(items, text),
		Value::Object(mut object) => match object.remove("Data").or_else(|| object.remove("data")) {
			Some(Value::Array(items)) => rows_or_scalar(items, text),
			Some(other) => {
				object.insert("Data".to_owned(), other);
				ParsedResult::Record(object)
			}
			None => ParsedResult::Record(object),
		},
		_ => ParsedResult::Scalar(text.to_owned()),
	})
}

/// Arrays of objects are rows; anything else (e.g. a byte array) stays raw text.
fn rows_or_scalar(items: Vec<Value>, text: &str) -> ParsedResult {
	if items.iter().all(Value::is_object) {
		ParsedResult::List(
			items
				.into_iter()
				.filter_map(|item| match item {
					Value::Object(record) => Some(record),
					_ => None,
				})
				.collect(),
		)
	} else {
		ParsedResult::Scalar(text.to_owned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::ParamValue;

	fn soap_response(operation: &str, result: &str) -> String {
		format!(
			r#"<?xml version="1.0" encoding="utf-8"?>
			<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
				<soap:Body>
					<{operation}Response xmlns="http://tempuri.org/">
						<{operation}Result>{result}</{operation}Result>
					</{operation}Response>
				</soap:Body>
			</soap:Envelope>"#
		)
	}

	#[test]
	fn encode_embeds_operation_and_fields_verbatim() {
		let codec = EnvelopeCodec::default();
		let params = Params::new()
			.with("WhereCondition", "DOC_NAME = 'a&b' AND X < 3")
			.with("Orderby", "REF_SEQ_NO DESC")
			.with("REF_SEQ_NO", 9_007_199_254_740_993_i64)
			.with_opt::<bool>("IncludeEmpImage", None);

		let envelope = codec.encode("DMS_GetDocMaster_List", &params);

		assert_eq!(envelope.action, "http://tempuri.org/DMS_GetDocMaster_List");
		assert!(envelope
			.xml
			.contains(r#"<DMS_GetDocMaster_List xmlns="http://tempuri.org/">"#));
		assert!(envelope
			.xml
			.contains("<WhereCondition>DOC_NAME = &apos;a&amp;b&apos; AND X &lt; 3</WhereCondition>"));
		assert!(envelope.xml.contains("<REF_SEQ_NO>9007199254740993</REF_SEQ_NO>"));
		assert!(!envelope.xml.contains("IncludeEmpImage"));
	}

	#[test]
	fn encode_then_decode_keeps_names_and_values() {
		let codec = EnvelopeCodec::default();
		let params = Params::new()
			.with("REF_SEQ_NO", 9_007_199_254_740_993_i64)
			.with("DOCUMENT_NO", "DOC/<7>")
			.with("userName", "alice@example.com")
			.with("DOC_DATA", ParamValue::Bytes(vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff]));

		let envelope = codec.encode("DMS_CreateAndSave_DMS_Details", &params);
		let ParsedResult::Record(record) =
			codec.decode(&envelope.xml, "DMS_CreateAndSave_DMS_Details").unwrap()
		else {
			panic!("expected a single record");
		};

		let decoded = record
			.iter()
			.map(|(k, v)| (k.as_str(), v.as_str().unwrap().to_owned()))
			.collect::<Vec<_>>();
		let expected = params
			.iter()
			.map(|(k, v)| (k, v.unwrap().to_text()))
			.collect::<Vec<_>>();
		assert_eq!(decoded, expected);
	}

	#[test]
	fn decodes_status_sentinels_and_messages() {
		let raw = soap_response("doConnection", "SUCCESS");
		assert_eq!(
			decode(&raw, "doConnection").unwrap(),
			ParsedResult::Scalar("SUCCESS".into())
		);

		let raw = soap_response("doConnection", "Invalid domain on Client Connection Data");
		assert_eq!(
			decode(&raw, "doConnection").unwrap().as_scalar(),
			Some("Invalid domain on Client Connection Data")
		);
	}

	#[test]
	fn json_results_keep_shape() {
		let op = "DMS_GetDocMaster_List";

		let many = soap_response(
			op,
			r#"[{"REF_SEQ_NO":9007199254740993,"DOCUMENT_NO":"A"},{"REF_SEQ_NO":2,"DOCUMENT_NO":"B"}]"#,
		);
		let ParsedResult::List(rows) = decode(&many, op).unwrap() else {
			panic!("expected list");
		};
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0]["REF_SEQ_NO"].as_u64(), Some(9_007_199_254_740_993));
		assert_eq!(rows[1]["DOCUMENT_NO"], "B");

		let one_in_array = soap_response(op, r#"[{"REF_SEQ_NO":1}]"#);
		assert!(matches!(decode(&one_in_array, op).unwrap(), ParsedResult::List(rows) if rows.len() == 1));

		let bare = soap_response(op, r#"{"REF_SEQ_NO":1}"#);
		assert!(matches!(decode(&bare, op).unwrap(), ParsedResult::Record(_)));

		let wrapped = soap_response(op, r#"{"Data":[{"A":1},{"A":2}],"Count":2}"#);
		assert!(matches!(decode(&wrapped, op).unwrap(), ParsedResult::List(rows) if rows.len() == 2));
	}

	#[test]
	fn xml_data_set_results() {
		let op = "DataModel_GetData";

		let raw = soap_response(
			op,
			r#"<xs:schema id="NewDataSet" xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="Table"/></xs:schema>
			<diffgr:diffgram xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1">
				<NewDataSet>
					<Table><CATEGORY_NAME>Invoices</CATEGORY_NAME><EXPIRY_DATE xsi:nil="true"/></Table>
					<Table><CATEGORY_NAME>Contracts</CATEGORY_NAME><EXPIRY_DATE>2025-01-01</EXPIRY_DATE></Table>
				</NewDataSet>
			</diffgr:diffgram>"#,
		);
		let ParsedResult::List(rows) = decode(&raw, op).unwrap() else {
			panic!("expected list");
		};
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0]["CATEGORY_NAME"], "Invoices");
		assert_eq!(rows[0]["EXPIRY_DATE"], Value::Null);
		assert_eq!(rows[1]["EXPIRY_DATE"], "2025-01-01");

		let one_row = soap_response(op, "<Table><CATEGORY_NAME>Invoices</CATEGORY_NAME></Table>");
		assert!(matches!(decode(&one_row, op).unwrap(), ParsedResult::List(rows) if rows.len() == 1));

		let record = soap_response(op, "<CATEGORY_NAME>Invoices</CATEGORY_NAME><ID>3</ID>");
		assert!(matches!(decode(&record, op).unwrap(), ParsedResult::Record(r) if r["ID"] == "3"));

		let empty = soap_response(op, r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#);
		assert_eq!(decode(&empty, op).unwrap(), ParsedResult::List(vec![]));
	}

	#[test]
	fn byte_arrays_stay_scalar() {
		let raw = soap_response("getpic_bytearray", "[255,216,255]");
		assert_eq!(
			decode(&raw, "getpic_bytearray").unwrap(),
			ParsedResult::Scalar("[255,216,255]".into())
		);
	}

	#[test]
	fn unwrapped_and_void_answers() {
		let plain = r#"<?xml version="1.0" encoding="utf-8"?><string xmlns="http://tempuri.org/">SUCCESS</string>"#;
		assert_eq!(decode(plain, "doConnection").unwrap().as_scalar(), Some("SUCCESS"));

		let void = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><IM_Task_UpdateResponse xmlns="http://tempuri.org/"/></soap:Body></soap:Envelope>"#;
		assert_eq!(decode(void, "IM_Task_Update").unwrap().as_scalar(), Some(""));

		assert_eq!(decode("  ERROR \n", "x").unwrap().as_scalar(), Some("ERROR"));
	}

	#[test]
	fn faults_and_garbage_are_decode_errors() {
		let fault = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>Server was unable to process request.</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
		assert!(matches!(
			decode(fault, "doConnection"),
			Err(DecodeError::Fault { code, message })
				if code == "soap:Server" && message == "Server was unable to process request."
		));
		assert_eq!(
			fault_message(fault).as_deref(),
			Some("Server was unable to process request.")
		);

		assert!(matches!(
			decode("<soap:Envelope><soap:Body><a></b></soap:Body></soap:Envelope>", "x"),
			Err(DecodeError::MalformedXml(_))
		));
		assert!(matches!(
			decode("<Envelope><Header/></Envelope>", "x"),
			Err(DecodeError::MissingBody)
		));
	}

	#[test]
	fn text_that_only_looks_like_json_stays_verbatim() {
		for text in ["[E102] Invalid domain on Client Connection Data", "[{\"a\":", "{not json}"] {
			assert_eq!(
				decode(&soap_response("doConnection", text), "doConnection").unwrap(),
				ParsedResult::Scalar(text.into())
			);
		}
	}

	#[test]
	fn padded_values_survive_the_round_trip() {
		let codec = EnvelopeCodec::default();
		let params = Params::new()
			.with("COMMENTS", "  indented note ")
			.with("DOC_TAGS", "\ttab,newline\n")
			.with("SPACES", "   ");

		let envelope = codec.encode("DMS_CreateAndSave_DMS_Master", &params);
		let ParsedResult::Record(record) =
			codec.decode(&envelope.xml, "DMS_CreateAndSave_DMS_Master").unwrap()
		else {
			panic!("expected a single record");
		};

		assert_eq!(record["COMMENTS"], "  indented note ");
		assert_eq!(record["DOC_TAGS"], "\ttab,newline\n");
		assert_eq!(record["SPACES"], "   ");

		let raw = soap_response("x", "  padded message ");
		assert_eq!(decode(&raw, "x").unwrap().as_scalar(), Some("  padded message "));
	}

	#[test]
	fn summary_fields_next_to_rows_are_kept() {
		let op = "DMS_GetDashboard_OverallSummary";
		let raw = soap_response(
			op,
			"<Count>2</Count><Table><CHANNEL>Mail</CHANNEL></Table><Table><CHANNEL>Scan</CHANNEL></Table>",
		);

		let ParsedResult::Record(record) = decode(&raw, op).unwrap() else {
			panic!("expected a record");
		};
		assert_eq!(record["Count"], "2");
		assert_eq!(
			record["Table"],
			json!([{ "CHANNEL": "Mail" }, { "CHANNEL": "Scan" }])
		);

		let single = soap_response(op, "<Count>1</Count><Table><CHANNEL>Mail</CHANNEL></Table>");
		let ParsedResult::Record(record) = decode(&single, op).unwrap() else {
			panic!("expected a record");
		};
		assert_eq!(record["Table"], json!({ "CHANNEL": "Mail" }));
	}
}
