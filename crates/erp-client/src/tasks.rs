use serde::Deserialize;

use crate::{
	client::ErpClient,
	error::Error,
	session::SessionGate,
	transport::Transport,
	value::{Params, ParsedResult},
};

pub use create::exec as create;
pub mod create {
	use super::*;

	pub const OPERATION: &str = "IM_Task_Create";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		pub user_name: Option<String>,
		pub task_name: Option<String>,
		pub task_subject: Option<String>,
		pub related_to: Option<String>,
		pub assigned_to: Option<String>,
		pub creator_reminder_on: Option<String>,
		pub assigned_date: Option<String>,
		pub target_date: Option<String>,
		pub remind_on_date: Option<String>,
		/// Document the task was raised from
		pub ref_seq_no: Option<i64>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("UserName", input.user_name.clone())
			.with_opt("Subject", input.task_name.clone())
			.with_opt("Details", input.task_subject.clone())
			.with_opt("RelatedTo", input.related_to.clone())
			.with_opt("AssignedUser", input.assigned_to.clone())
			.with_opt("CreatorReminderOn", input.creator_reminder_on.clone())
			.with_opt("StartDate", input.assigned_date.clone())
			.with_opt("CompDate", input.target_date.clone())
			.with_opt("RemindTheUserOn", input.remind_on_date.clone())
			.with_opt("RefTaskID", input.ref_seq_no)
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

pub use list_for_user::exec as list_for_user;
pub mod list_for_user {
	use super::*;

	pub const OPERATION: &str = "IM_Get_User_Tasks";

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

pub use update::exec as update;
pub mod update {
	use super::*;

	pub const OPERATION: &str = "IM_Task_Update";

	#[derive(Debug, Clone, Default, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct Input {
		#[serde(rename = "taskID")]
		pub task_id: Option<i64>,
		pub task_status: Option<String>,
		pub status_date_time: Option<String>,
		pub reason: Option<String>,
		pub user_name: Option<String>,
	}

	pub fn params(input: &Input) -> Params {
		Params::new()
			.with_opt("TaskID", input.task_id)
			.with_opt("TaskStatus", input.task_status.clone())
			.with_opt("StatusDateTime", input.status_date_time.clone())
			.with_opt("Reason", input.reason.clone())
			.with_opt("UserName", input.user_name.clone())
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
