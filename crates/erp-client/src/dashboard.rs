use crate::{
	client::ErpClient,
	error::Error,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub use active_users::exec as active_users;
pub mod active_users {
	use super::*;

	pub const OPERATION: &str = "DMS_Get_All_ActiveUsers";

	pub fn params(user_name: &str) -> Params {
		Params::new().with("UserName", user_name)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		user_name: &str,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(user_name), login_user_name, target)
			.await
	}
}

/// Both summaries take the size of the reporting window in days.
fn window(no_of_days: i32) -> Params {
	Params::new().with("NoOfDays", no_of_days)
}

pub use overall_summary::exec as overall_summary;
pub mod overall_summary {
	use super::*;

	pub const OPERATION: &str = "DMS_GetDashboard_OverallSummary";

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		no_of_days: i32,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, window(no_of_days), login_user_name, target)
			.await
	}
}

pub use channel_summary::exec as channel_summary;
pub mod channel_summary {
	use super::*;

	pub const OPERATION: &str = "DMS_GetDashboard_ChannelSummary";

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		no_of_days: i32,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, window(no_of_days), login_user_name, target)
			.await
	}
}
