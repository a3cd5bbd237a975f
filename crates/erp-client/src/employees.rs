use crate::{
	client::ErpClient,
	error::Error,
	file::bytes_from_result,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub use name_and_id::exec as name_and_id;
pub mod name_and_id {
	use super::*;

	pub const OPERATION: &str = "getemployeename_and_id";

	pub fn params(first_name: &str) -> Params {
		Params::new().with("userfirstname", first_name)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		first_name: &str,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(first_name), login_user_name, target)
			.await
	}
}

pub use all_users::exec as all_users;
pub mod all_users {
	use super::*;

	pub const OPERATION: &str = "IM_Get_All_Users";

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

pub use all_active_users::exec as all_active_users;
pub mod all_active_users {
	use super::*;

	pub const OPERATION: &str = "IM_Get_All_ActiveUsers";

	pub use super::all_users::params;

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

pub use image::exec as image;
pub mod image {
	use super::*;

	pub const OPERATION: &str = "getpic_bytearray";

	pub fn params(employee_no: &str) -> Params {
		Params::new().with("EmpNo", employee_no)
	}

	pub async fn exec(
		client: &ErpClient<impl Transport, impl SessionGate>,
		employee_no: &str,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<ParsedResult, Error> {
		client
			.call(OPERATION, params(employee_no), login_user_name, target)
			.await
	}

	/// The picture as raw bytes, whichever encoding the service picked.
	pub async fn bytes(
		client: &ErpClient<impl Transport, impl SessionGate>,
		employee_no: &str,
		login_user_name: &str,
		target: Option<&str>,
	) -> Result<Vec<u8>, Error> {
		let result = exec(client, employee_no, login_user_name, target).await?;
		Ok(bytes_from_result(&result)?)
	}
}
