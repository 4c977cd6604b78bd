mod common;

// std
use std::{collections::HashSet, sync::Arc};
// self
use common::*;
use push_broker::{
	dispatch::Dispatcher,
	endpoint::{Endpoint, HttpMethod},
	envelope::Presence,
	error::{AuthError, DecodeError, Error, ValidationError},
	message::{AppCondition, AppPush, ListPush, Message, Notification, SinglePush},
	session::Session,
};

type FakeDispatcher = Dispatcher<ScriptedHttpClient>;

async fn dispatcher(client: ScriptedHttpClient) -> (FakeDispatcher, Arc<ScriptedHttpClient>) {
	let client = Arc::new(client);
	let config = fake_config().build().expect("Fake config should build.");
	let session = Session::<ScriptedHttpClient>::initialize(credentials(), config, client.clone())
		.await
		.expect("Initial acquisition should succeed.");

	(Dispatcher::new(session), client)
}

fn single_to(cid: &str) -> SinglePush {
	SinglePush {
		message: Message { msg_type: "notification".into(), ..Default::default() },
		cid: cid.into(),
		..Default::default()
	}
}

fn list_to(cids: &[&str]) -> ListPush {
	ListPush {
		message: Message { is_offline: true, msg_type: "notification".into(), ..Default::default() },
		notification: Notification { transmission_content: "hello".into(), ..Default::default() },
		cid: cids.iter().map(|cid| (*cid).to_owned()).collect(),
		offline_expire_time: 60_000,
		..Default::default()
	}
}

#[tokio::test]
async fn push_to_single_stamps_key_request_id_and_token() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default().ok(
		Endpoint::PushSingle,
		r#"{"result":"ok","taskid":"T-1","status":"successed_online"}"#,
	))
	.await;
	let receipt = dispatcher.push_to_single(single_to("c-1")).await.expect("Push should succeed.");
	let call = client.last_call(Endpoint::PushSingle);
	let body = call.body.expect("push_single should carry a JSON body.");
	let request_id = receipt.request_id.expect("Receipts should carry the request id.");

	assert_eq!(call.url, "https://push.test/v1/app-1/push_single");
	assert_eq!(call.method, HttpMethod::Post);
	assert_eq!(call.token.as_deref(), Some("token-1"));
	assert_eq!(body["message"]["appkey"], APP_KEY);
	assert_eq!(body["cid"], "c-1");
	assert_eq!(body["requestid"], request_id.as_str());
	assert_eq!(receipt.task_id.as_deref(), Some("T-1"));
	assert_eq!(receipt.status.as_deref(), Some("successed_online"));
}

#[tokio::test]
async fn caller_request_id_is_preserved() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default()).await;
	let mut body = single_to("c-1");

	body.request_id = "caller-chosen".into();

	let receipt = dispatcher.push_to_single(body).await.expect("Push should succeed.");

	assert_eq!(receipt.request_id.as_deref(), Some("caller-chosen"));
	assert_eq!(
		client.last_call(Endpoint::PushSingle).body.expect("Body should be recorded.")["requestid"],
		"caller-chosen"
	);
}

#[tokio::test]
async fn push_without_target_fails_before_network() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default()).await;
	let err = dispatcher
		.push_to_single(SinglePush::default())
		.await
		.expect_err("Targetless pushes must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::MissingTarget { operation: "push_single" })
	));

	let err = dispatcher
		.push_to_list(ListPush::default())
		.await
		.expect_err("Targetless list pushes must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::MissingTarget { operation: "push_list" })
	));
	assert_eq!(client.endpoints(), vec![Endpoint::AuthSign]);
}

#[tokio::test]
async fn alias_is_an_accepted_target() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default()).await;
	let body = SinglePush { alias: "user-42".into(), ..Default::default() };

	dispatcher.push_to_single(body).await.expect("Alias pushes should succeed.");

	let recorded = client.last_call(Endpoint::PushSingle).body.expect("Body should be recorded.");

	assert_eq!(recorded["alias"], "user-42");
	assert!(recorded.get("cid").is_none());
}

#[tokio::test]
async fn push_to_list_saves_then_pushes() {
	let (dispatcher, client) = dispatcher(
		ScriptedHttpClient::default()
			.ok(Endpoint::SaveListBody, r#"{"result":"ok","taskid":"T-7"}"#)
			.ok(Endpoint::PushList, r#"{"result":"ok","status":"successed_online"}"#),
	)
	.await;
	let receipt =
		dispatcher.push_to_list(list_to(&["c-1", "c-2"])).await.expect("List push should succeed.");

	assert_eq!(
		client.endpoints(),
		vec![Endpoint::AuthSign, Endpoint::SaveListBody, Endpoint::PushList]
	);
	assert_eq!(receipt.task_id.as_deref(), Some("T-7"));

	let saved = client.last_call(Endpoint::SaveListBody).body.expect("Save body should be recorded.");

	assert_eq!(saved["message"]["appkey"], APP_KEY);
	assert_eq!(saved["message"]["is_offline"], true);
	assert_eq!(saved["message"]["offline_expire_time"], 60_000);
	assert_eq!(saved["notification"]["transmission_content"], "hello");

	let pushed = client.last_call(Endpoint::PushList).body.expect("Push body should be recorded.");

	assert_eq!(pushed["taskid"], "T-7");
	assert_eq!(pushed["need_detail"], true);
	assert_eq!(pushed["cid"], serde_json::json!(["c-1", "c-2"]));
}

#[tokio::test]
async fn push_to_list_save_failure_short_circuits() {
	let (dispatcher, client) = dispatcher(
		ScriptedHttpClient::default()
			.ok(Endpoint::SaveListBody, r#"{"result":"error","desc":"quota exceeded"}"#),
	)
	.await;
	let err = dispatcher
		.push_to_list(list_to(&["c-1"]))
		.await
		.expect_err("A failed save must fail the list push.");

	assert_eq!(err.remote_code(), Some("error"));
	assert_eq!(client.count(Endpoint::PushList), 0);
}

#[tokio::test]
async fn push_to_list_requires_a_saved_task_id() {
	let (dispatcher, client) =
		dispatcher(ScriptedHttpClient::default().ok(Endpoint::SaveListBody, r#"{"result":"ok"}"#))
			.await;
	let err = dispatcher
		.push_to_list(list_to(&["c-1"]))
		.await
		.expect_err("A save without a task id cannot be pushed.");

	assert!(matches!(err, Error::Decode(DecodeError::Field { field: "taskid", .. })));
	assert_eq!(client.count(Endpoint::PushList), 0);
}

#[tokio::test]
async fn push_to_app_sends_conditions() {
	let (dispatcher, client) = dispatcher(
		ScriptedHttpClient::default().ok(Endpoint::PushApp, r#"{"result":"ok","taskid":"A-1"}"#),
	)
	.await;
	let body = AppPush {
		condition: vec![AppCondition {
			key: "phonetype".into(),
			values: vec!["ANDROID".into()],
			opt_type: "or".into(),
		}],
		..Default::default()
	};
	let receipt = dispatcher.push_to_app(body).await.expect("App push should succeed.");
	let recorded = client.last_call(Endpoint::PushApp).body.expect("Body should be recorded.");

	assert_eq!(receipt.task_id.as_deref(), Some("A-1"));
	assert_eq!(recorded["condition"][0]["key"], "phonetype");
	assert_eq!(recorded["message"]["appkey"], APP_KEY);
	assert!(!recorded["requestid"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn stop_task_uses_bodiless_delete() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default()).await;
	let receipt = dispatcher.stop_task("T-9").await.expect("Stop should succeed.");
	let call = client.last_call(Endpoint::StopTask);

	assert_eq!(call.method, HttpMethod::Delete);
	assert_eq!(call.url, "https://push.test/v1/app-1/stop_task/T-9");
	assert!(call.body.is_none());
	assert_eq!(call.token.as_deref(), Some("token-1"));
	assert_eq!(receipt.task_id.as_deref(), Some("T-9"));

	let err = dispatcher.stop_task("").await.expect_err("Empty task ids must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::EmptyField { operation: "stop_task", field: "task_id" })
	));
	assert_eq!(client.count(Endpoint::StopTask), 1);
}

#[tokio::test]
async fn user_status_converts_last_login() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default().ok(
		Endpoint::UserStatus,
		r#"{"result":"ok","cid":"c-1","status":"offline","lastlogin":"1500000000123"}"#,
	))
	.await;
	let status = dispatcher.user_status("c-1").await.expect("Lookup should succeed.");
	let call = client.last_call(Endpoint::UserStatus);

	assert_eq!(call.method, HttpMethod::Get);
	assert_eq!(call.url, "https://push.test/v1/app-1/user_status/c-1");
	assert!(call.body.is_none());
	assert_eq!(status.presence(), Some(Presence::Offline));

	let last_login = status.last_login.expect("Offline users should carry last login.");

	assert_eq!(last_login.unix_timestamp(), 1_500_000_000);
	assert_eq!(last_login.millisecond(), 123);
}

#[tokio::test]
async fn user_status_with_garbage_last_login_is_a_decode_error() {
	let (dispatcher, _) = dispatcher(ScriptedHttpClient::default().ok(
		Endpoint::UserStatus,
		r#"{"result":"ok","status":"offline","lastlogin":"yesterday"}"#,
	))
	.await;
	let err = dispatcher.user_status("c-1").await.expect_err("Garbage timestamps must fail.");

	assert!(matches!(err, Error::Decode(DecodeError::Field { field: "lastlogin", .. })));
}

#[tokio::test]
async fn user_existed_maps_no_user_to_false() {
	let (dispatcher, _) = dispatcher(
		ScriptedHttpClient::default()
			.ok(Endpoint::UserStatus, r#"{"result":"ok","status":"online"}"#)
			.ok(Endpoint::UserStatus, r#"{"result":"no_user"}"#)
			.ok(Endpoint::UserStatus, r#"{"result":"sign_error","desc":"bad token"}"#),
	)
	.await;

	assert!(dispatcher.user_existed("c-1").await.expect("Known users should resolve."));
	assert!(!dispatcher.user_existed("c-2").await.expect("Unknown users should resolve."));

	let err = dispatcher.user_existed("c-3").await.expect_err("Other codes must surface.");

	assert_eq!(err.remote_code(), Some("sign_error"));
	assert!(matches!(
		dispatcher.user_existed("").await,
		Err(Error::Validation(ValidationError::EmptyField { field: "cid", .. }))
	));
}

#[tokio::test]
async fn remote_error_wins_over_http_success() {
	let (dispatcher, _) = dispatcher(
		ScriptedHttpClient::default()
			.ok(Endpoint::PushSingle, r#"{"result":"target_error","desc":"unknown cid"}"#),
	)
	.await;
	let err = dispatcher.push_to_single(single_to("c-1")).await.expect_err("Non-ok must fail.");

	match err {
		Error::Remote { code, description } => {
			assert_eq!(code, "target_error");
			assert_eq!(description, "unknown cid");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_body_is_a_decode_error_with_status() {
	let (dispatcher, _) = dispatcher(
		ScriptedHttpClient::default().respond(Endpoint::PushApp, 502, "<html>bad gateway</html>"),
	)
	.await;
	let err =
		dispatcher.push_to_app(AppPush::default()).await.expect_err("HTML bodies must not decode.");

	match err {
		Error::Decode(DecodeError::Json { status, body, .. }) => {
			assert_eq!(status, Some(502));
			assert!(body.contains("bad gateway"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
	let (dispatcher, client) =
		dispatcher(ScriptedHttpClient::default().fail(Endpoint::PushSingle)).await;
	let err = dispatcher
		.push_to_single(single_to("c-1"))
		.await
		.expect_err("Transport failures must surface.");

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(client.count(Endpoint::PushSingle), 1);
}

#[tokio::test]
async fn rapid_pushes_get_unique_request_ids() {
	let (dispatcher, _) = dispatcher(ScriptedHttpClient::default()).await;
	let mut ids = HashSet::new();

	for _ in 0..50 {
		let receipt =
			dispatcher.push_to_single(single_to("c-1")).await.expect("Push should succeed.");

		assert!(ids.insert(receipt.request_id.expect("Receipts should carry the request id.")));
	}
}

#[tokio::test]
async fn close_auth_revokes_and_blocks_further_calls() {
	let (dispatcher, client) = dispatcher(ScriptedHttpClient::default()).await;

	assert_eq!(dispatcher.auth_token().expect("Token should be held.").expose(), "token-1");

	dispatcher.close_auth().await.expect("Close should succeed.");

	assert_eq!(client.last_call(Endpoint::AuthClose).token.as_deref(), Some("token-1"));
	assert!(matches!(dispatcher.auth_token(), Err(Error::Auth(AuthError::Closed))));

	let err = dispatcher
		.push_to_single(single_to("c-1"))
		.await
		.expect_err("Closed sessions cannot push.");

	assert!(matches!(err, Error::Auth(AuthError::Closed)));
	assert_eq!(client.count(Endpoint::PushSingle), 0);
}
