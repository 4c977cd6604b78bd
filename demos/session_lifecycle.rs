//! Demonstrates a full session lifecycle against a mock push service: signed acquisition, a
//! renewal cycle with an observer, a two-phase list push, a presence lookup, and close.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use push_broker::{
	auth::ApplicationCredentials,
	config::SessionConfig,
	dispatch::Dispatcher,
	http::ReqwestHttpClient,
	message::{ListPush, Message, Notification, NotificationStyle},
	reqwest::Client,
	session::{RenewalEvent, Session},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let sign_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/demo-app/auth_sign");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"result\":\"ok\",\"auth_token\":\"demo-token\"}");
		})
		.await;
	let close_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/demo-app/auth_close");
			then.status(200).header("content-type", "application/json").body("{\"result\":\"ok\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/demo-app/save_list_body");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"result\":\"ok\",\"taskid\":\"RASL-demo\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/demo-app/push_list").header("authtoken", "demo-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"result\":\"ok\",\"status\":\"successed_online\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/demo-app/user_status/demo-cid");
			then.status(200).header("content-type", "application/json").body(
				"{\"result\":\"ok\",\"cid\":\"demo-cid\",\"status\":\"offline\",\"lastlogin\":\"1700000000000\"}",
			);
		})
		.await;

	let credentials = ApplicationCredentials::parse("demo-app", "demo-key", "demo-master-secret")?;
	let config = SessionConfig::builder().base_url(server.url("/v1")).auto_renew(false).build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let session = Arc::new(
		<Session<ReqwestHttpClient>>::new(credentials, config, http_client).with_observer(
			|event: &RenewalEvent<'_>| println!("Renewal event: {event:?}"),
		),
	);

	session.activate().await?;
	session.renew_now().await?;

	let dispatcher = Dispatcher::new(session.clone());
	let receipt = dispatcher
		.push_to_list(ListPush {
			message: Message { is_offline: true, msg_type: "notification".into(), ..Default::default() },
			notification: Notification {
				style: NotificationStyle {
					kind: 0,
					text: "Build finished.".into(),
					title: "CI".into(),
				},
				..Default::default()
			},
			cid: vec!["demo-cid".into()],
			offline_expire_time: 3_600_000,
			..Default::default()
		})
		.await?;

	println!("List push receipt: {receipt:?}");

	let status = dispatcher.user_status("demo-cid").await?;

	println!("Presence: {:?}, last login: {:?}", status.presence(), status.last_login);
	println!("Renewal metrics: {:?}", session.metrics());

	dispatcher.close_auth().await?;

	sign_mock.assert_calls_async(2).await;
	close_mock.assert_calls_async(2).await;

	Ok(())
}
