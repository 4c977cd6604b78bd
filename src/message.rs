//! JSON request bodies for every push variant.
//!
//! These are plain data carriers. The dispatcher fills `appkey` and `requestid` before sending,
//! so callers may leave them empty.

// self
use crate::_prelude::*;

/// Common message envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	/// Application key; overwritten by the dispatcher.
	#[serde(rename = "appkey")]
	pub app_key: String,
	/// Whether the service keeps the message for offline clients.
	pub is_offline: bool,
	/// Template type, e.g. `notification` or `transmission`.
	#[serde(rename = "msgtype")]
	pub msg_type: String,
}

/// Visual style of a notification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStyle {
	/// Style template number.
	#[serde(rename = "type")]
	pub kind: i32,
	/// Body text.
	pub text: String,
	/// Title text.
	pub title: String,
}

/// Notification template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	/// Visual style.
	pub style: NotificationStyle,
	/// Whether tapping launches the app with the transmission content.
	pub transmission_type: bool,
	/// Opaque payload handed to the app.
	pub transmission_content: String,
}

/// APNs alert text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApsAlert {
	/// Alert title.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub title: String,
	/// Alert body.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub body: String,
}

/// APNs dictionary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aps {
	/// Alert text.
	pub alert: ApsAlert,
	/// Badge directive such as `+1`.
	#[serde(default, rename = "autoBadge", skip_serializing_if = "String::is_empty")]
	pub auto_badge: String,
	/// `1` for silent background pushes.
	#[serde(default, rename = "content-available", skip_serializing_if = "is_zero")]
	pub content_available: i32,
}

/// Rich media attached to iOS pushes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multimedia {
	/// Resource URL.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub url: String,
	/// Resource type code.
	#[serde(default, rename = "type", skip_serializing_if = "is_zero")]
	pub kind: i32,
	/// Download only on Wi-Fi.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub only_wifi: bool,
}

/// iOS-specific push information.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushInfo {
	/// APNs dictionary.
	pub aps: Aps,
	/// Rich media attachments.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub multimedia: Vec<Multimedia>,
}

/// Body of a single-target push. Exactly one of `cid`/`alias` must be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglePush {
	/// Message envelope.
	pub message: Message,
	/// Notification template.
	pub notification: Notification,
	/// Target client id.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub cid: String,
	/// Target alias.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub alias: String,
	/// Client correlation id; generated when empty.
	#[serde(rename = "requestid")]
	pub request_id: String,
	/// iOS-specific details.
	pub push_info: PushInfo,
}

/// Body of a list push. The dispatcher saves the shared body first and fills `taskid`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPush {
	/// Message envelope.
	pub message: Message,
	/// Notification template.
	pub notification: Notification,
	/// Target client ids.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub cid: Vec<String>,
	/// Target alias.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub alias: String,
	/// iOS-specific details.
	pub push_info: PushInfo,
	/// Task id returned by the save phase.
	#[serde(rename = "taskid")]
	pub task_id: String,
	/// Ask the service for per-target results.
	pub need_detail: bool,
	/// Offline retention in milliseconds; only sent with the saved body.
	#[serde(skip)]
	pub offline_expire_time: i64,
}

/// Filter applied to app-wide pushes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCondition {
	/// Filter key, e.g. `phonetype`, `region`, `tag`.
	pub key: String,
	/// Accepted values.
	pub values: Vec<String>,
	/// Operator (`and`, `or`, `not`).
	pub opt_type: String,
}

/// Body of an app-wide push.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPush {
	/// Message envelope.
	pub message: Message,
	/// Notification template.
	pub notification: Notification,
	/// Target filters.
	pub condition: Vec<AppCondition>,
	/// Client correlation id; generated when empty.
	#[serde(rename = "requestid")]
	pub request_id: String,
}

/// Message envelope of the saved list body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMessage {
	/// Application key.
	#[serde(rename = "appkey")]
	pub app_key: String,
	/// Whether the service keeps the message for offline clients.
	pub is_offline: bool,
	/// Offline retention in milliseconds.
	pub offline_expire_time: i64,
	/// Template type.
	#[serde(rename = "msgtype")]
	pub msg_type: String,
}

/// Shared body stored by the first phase of a list push.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveListBody {
	/// Message envelope.
	pub message: SavedMessage,
	/// Notification template.
	pub notification: Notification,
}
impl SaveListBody {
	/// Derives the shared body from a list push, stamping `app_key`.
	pub fn from_list(list: &ListPush, app_key: &str) -> Self {
		Self {
			message: SavedMessage {
				app_key: app_key.to_owned(),
				is_offline: list.message.is_offline,
				offline_expire_time: list.offline_expire_time,
				msg_type: list.message.msg_type.clone(),
			},
			notification: list.notification.clone(),
		}
	}
}

fn is_zero(value: &i32) -> bool {
	*value == 0
}
