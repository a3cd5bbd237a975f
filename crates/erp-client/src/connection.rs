use crate::{
	client::ErpClient,
	error::Error,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub const OPERATION: &str = "doConnection";

pub fn params(login_user_name: &str) -> Params {
	Params::new().with("LoginUserName", login_user_name)
}

/// The bare connect call. Business calls never need this, the session gate issues it for them.
pub async fn exec(
	client: &ErpClient<impl Transport, impl SessionGate>,
	login_user_name: &str,
	target: Option<&str>,
) -> Result<ParsedResult, Error> {
	if login_user_name.trim().is_empty() {
		return Err(Error::Configuration(
			"login user name is required to open a connection".to_string(),
		));
	}

	client
		.call_ungated(OPERATION, params(login_user_name), target)
		.await
}
