use serde::Deserialize;

use crate::{
	client::ErpClient,
	error::Error,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub use verify::exec as verify;
pub mod verify {
	use super::*;

	pub const OPERATION: &str = "verifyauthentication";

	/// Login form credentials.
	#[derive(Debug, Clone, Default, Deserialize)]
	pub struct Input {
		#[serde(rename = "User")]
		pub user: Option<String>,
		#[serde(rename = "Pass")]
		pub pass: Option<String>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("username", input.user.clone())
			.with_opt("password", input.pass.clone())
	}

	/// The connect pre-check runs for `email`, the account being verified.
	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		input: &Input,
		email: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client.call(OPERATION, params(input), email, target).await
	}
}
