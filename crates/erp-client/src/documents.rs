//! Document master/detail operations.
//!
//! A document is a master row (`REF_SEQ_NO`) with numbered detail rows (`SERIAL_NO`), each
//! detail carrying one uploaded file.

use serde::Deserialize;

use crate::{
	client::ErpClient,
	error::Error,
	file::FileContent,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub use create_master::exec as create_master;
pub mod create_master {
	use super::*;

	pub const OPERATION: &str = "DMS_CreateAndSave_DMS_Master";

	/// Master form, keyed the way the form hands it over.
	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
	pub struct Input {
		pub ref_seq_no: Option<i64>,
		pub document_no: Option<String>,
		pub document_description: Option<String>,
		pub doc_source_from: Option<String>,
		pub doc_related_to: Option<String>,
		pub doc_related_category: Option<String>,
		pub doc_ref_value: Option<String>,
		pub user_name: Option<String>,
		pub comments: Option<String>,
		/// Comma separated
		pub doc_tags: Option<String>,
		/// Comma separated
		pub for_the_users: Option<String>,
		pub expiry_date: Option<String>,
		pub ref_task_id: Option<i64>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
			.with_opt("DOCUMENT_NO", input.document_no.clone())
			.with_opt("DOCUMENT_DESCRIPTION", input.document_description.clone())
			.with_opt("DOC_SOURCE_FROM", input.doc_source_from.clone())
			.with_opt("DOC_RELATED_TO", input.doc_related_to.clone())
			.with_opt("DOC_RELATED_CATEGORY", input.doc_related_category.clone())
			.with_opt("DOC_REF_VALUE", input.doc_ref_value.clone())
			.with_opt("USER_NAME", input.user_name.clone())
			.with_opt("COMMENTS", input.comments.clone())
			.with_opt("DOC_TAGS", input.doc_tags.clone())
			.with_opt("FOR_THE_USERS", input.for_the_users.clone())
			.with_opt("EXPIRY_DATE", input.expiry_date.clone())
			.with_opt("REF_TASK_ID", input.ref_task_id)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use create_details::exec as create_details;
pub mod create_details {
	use super::*;

	pub const OPERATION: &str = "DMS_CreateAndSave_DMS_Details";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
	pub struct Input {
		pub ref_seq_no: Option<i64>,
		pub serial_no: Option<i16>,
		pub document_no: Option<String>,
		pub document_description: Option<String>,
		pub doc_source_from: Option<String>,
		pub doc_related_to: Option<String>,
		pub doc_related_category: Option<String>,
		pub doc_ref_value: Option<String>,
		pub user_name: Option<String>,
		pub comments: Option<String>,
		pub doc_tags: Option<String>,
		pub for_the_users: Option<String>,
		pub expiry_date: Option<String>,
		pub doc_data: Option<FileContent>,
		pub doc_name: Option<String>,
		pub doc_ext: Option<String>,
		pub file_path: Option<String>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
			.with_opt("SERIAL_NO", input.serial_no)
			.with_opt("DOCUMENT_NO", input.document_no.clone())
			.with_opt("DOCUMENT_DESCRIPTION", input.document_description.clone())
			.with_opt("DOC_SOURCE_FROM", input.doc_source_from.clone())
			.with_opt("DOC_RELATED_TO", input.doc_related_to.clone())
			.with_opt("DOC_RELATED_CATEGORY", input.doc_related_category.clone())
			.with_opt("DOC_REF_VALUE", input.doc_ref_value.clone())
			.with_opt("USER_NAME", input.user_name.clone())
			.with_opt("COMMENTS", input.comments.clone())
			.with_opt("DOC_TAGS", input.doc_tags.clone())
			.with_opt("FOR_THE_USERS", input.for_the_users.clone())
			.with_opt("EXPIRY_DATE", input.expiry_date.clone())
			.with_opt(crate::file::DOC_DATA_FIELD, input.doc_data.clone())
			.with_opt("DOC_NAME", input.doc_name.clone())
			.with_opt("DOC_EXT", input.doc_ext.clone().or_else(|| {
				input
					.doc_name
					.as_deref()
					.and_then(crate::file::extension_of)
					.map(str::to_owned)
			}))
			.with_opt("FILE_PATH", input.file_path.clone())
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use update_verified_by::exec as update_verified_by;
pub mod update_verified_by {
	use super::*;

	pub const OPERATION: &str = "DMS_Update_VerifiedBy";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		pub user_name: Option<String>,
		pub ref_seq_no: Option<i64>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("USER_NAME", input.user_name.clone())
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use update_assigned_to::exec as update_assigned_to;
pub mod update_assigned_to {
	use super::*;

	pub const OPERATION: &str = "DMS_Update_AssignedTo";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		pub user_name: Option<String>,
		pub assigned_to: Option<String>,
		pub ref_seq_no: Option<i64>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("USER_NAME", input.user_name.clone())
			.with_opt("ASSIGNED_TO", input.assigned_to.clone())
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use update_verified_and_assigned_to::exec as update_verified_and_assigned_to;
pub mod update_verified_and_assigned_to {
	use super::*;

	pub use super::update_assigned_to::{params, Input};

	pub const OPERATION: &str = "DMS_Update_VerifiedAndAssignedTo";

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use reject::exec as reject;
pub mod reject {
	use super::*;

	pub const OPERATION: &str = "DMS_Update_Rejection";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		#[serde(rename = "ref_Seq_No")]
		pub ref_seq_no: Option<i64>,
		pub current_user_name: Option<String>,
		pub document_description: Option<String>,
		pub document_user_name: Option<String>,
		pub rejection_remarks: Option<String>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
			.with_opt("CURRENT_USER_NAME", input.current_user_name.clone())
			.with_opt("DOCUMENT_DESCRIPTION", input.document_description.clone())
			.with_opt("DOCUMENT_USER_NAME", input.document_user_name.clone())
			.with_opt("REJECTION_REMARKS", input.rejection_remarks.clone())
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use get_master_list::exec as get_master_list;
pub mod get_master_list {
	use super::*;

	pub const OPERATION: &str = "DMS_GetDocMaster_List";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		/// Raw SQL predicate, passed through as-is
		pub where_condition: Option<String>,
		pub orderby: Option<String>,
		pub include_emp_image: Option<bool>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("WhereCondition", input.where_condition.clone())
			.with_opt("Orderby", input.orderby.clone())
			.with_opt("IncludeEmpImage", input.include_emp_image)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use delete_master::exec as delete_master;
pub mod delete_master {
	use super::*;

	pub const OPERATION: &str = "DMS_Delete_DMS_Master";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		pub user_name: Option<String>,
		pub ref_seq_no: Option<i64>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("USER_NAME", input.user_name.clone())
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

pub use delete_details::exec as delete_details;
pub mod delete_details {
	use super::*;

	pub const OPERATION: &str = "DMS_Delete_DMS_Detail";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		pub user_name: Option<String>,
		pub ref_seq_no: Option<i64>,
		pub serial_no: Option<i16>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("USER_NAME", input.user_name.clone())
			.with_opt("REF_SEQ_NO", input.ref_seq_no)
			.with_opt("SERIAL_NO", input.serial_no)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(input), login_user_name, target)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::ParamValue;

	fn keys(params: &Params) -> Vec<&str> {
		params.iter().map(|(k, _)| k).collect()
	}

	#[test]
	fn master_form_keeps_service_field_names() {
		let input: create_master::Input = serde_json::from_str(
			r#"{
				"REF_SEQ_NO": 9007199254740993,
				"DOCUMENT_NO": "INV-7",
				"USER_NAME": "alice@example.com",
				"REF_TASK_ID": 42
			}"#,
		)
		.unwrap();
		let params = create_master::params(&input);

		assert_eq!(params.len(), 13);
		assert_eq!(
			params.get("REF_SEQ_NO"),
			Some(&ParamValue::Integer(9_007_199_254_740_993))
		);
		assert_eq!(params.get("REF_TASK_ID"), Some(&ParamValue::Integer(42)));
		assert!(params.get("COMMENTS").is_none());
	}

	#[test]
	fn detail_upload_carries_file_bytes() {
		let input: create_details::Input = serde_json::from_str(
			r#"{ "REF_SEQ_NO": 12, "SERIAL_NO": 3, "DOC_DATA": "JVBERg==", "DOC_NAME": "a.pdf", "DOC_EXT": "pdf" }"#,
		)
		.unwrap();
		let params = create_details::params(&input);

		assert_eq!(keys(&params).len(), 17);
		assert_eq!(
			params.get("DOC_DATA"),
			Some(&ParamValue::Bytes(b"%PDF".to_vec()))
		);
		assert_eq!(params.get("SERIAL_NO"), Some(&ParamValue::Integer(3)));
	}

	#[test]
	fn detail_extension_falls_back_to_the_file_name() {
		let input: create_details::Input =
			serde_json::from_str(r#"{ "DOC_NAME": "scan.2024.PNG" }"#).unwrap();
		assert_eq!(
			create_details::params(&input).get("DOC_EXT"),
			Some(&ParamValue::Text("PNG".into()))
		);

		let input: create_details::Input =
			serde_json::from_str(r#"{ "DOC_NAME": "scan.png", "DOC_EXT": "jpeg" }"#).unwrap();
		assert_eq!(
			create_details::params(&input).get("DOC_EXT"),
			Some(&ParamValue::Text("jpeg".into()))
		);

		let input: create_details::Input = serde_json::from_str(r#"{ "DOC_NAME": "README" }"#).unwrap();
		assert!(create_details::params(&input).get("DOC_EXT").is_none());
	}

	#[test]
	fn camel_case_inputs_rename_to_service_fields() {
		let rejection: reject::Input = serde_json::from_str(
			r#"{ "ref_Seq_No": 5, "currentUserName": "bob", "rejectionRemarks": "blurry scan" }"#,
		)
		.unwrap();
		assert_eq!(
			keys(&reject::params(&rejection)),
			[
				"REF_SEQ_NO",
				"CURRENT_USER_NAME",
				"DOCUMENT_DESCRIPTION",
				"DOCUMENT_USER_NAME",
				"REJECTION_REMARKS"
			]
		);
		assert_eq!(reject::params(&rejection).get("REF_SEQ_NO"), Some(&ParamValue::Integer(5)));

		let list: get_master_list::Input =
			serde_json::from_str(r#"{ "whereCondition": "", "orderby": "REF_SEQ_NO DESC" }"#).unwrap();
		assert_eq!(
			keys(&get_master_list::params(&list)),
			["WhereCondition", "Orderby", "IncludeEmpImage"]
		);

		let delete: delete_details::Input =
			serde_json::from_str(r#"{ "userName": "bob", "refSeqNo": 5, "serialNo": 2 }"#).unwrap();
		assert_eq!(
			keys(&delete_details::params(&delete)),
			["USER_NAME", "REF_SEQ_NO", "SERIAL_NO"]
		);
	}
}
