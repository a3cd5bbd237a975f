//! Generic table reads: lookup lists (categories, sources) and document detail rows.

use serde::Deserialize;

use crate::{
	client::ErpClient,
	error::Error,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub use get::exec as get;
pub mod get {
	use super::*;

	pub const OPERATION: &str = "DataModel_GetData";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		/// e.g. `SYNM_DMS_DETAILS`
		pub data_model_name: Option<String>,
		pub where_condition: Option<String>,
		pub orderby: Option<String>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("DataModelName", input.data_model_name.clone())
			.with_opt("WhereCondition", input.where_condition.clone())
			.with_opt("Orderby", input.orderby.clone())
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
