#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_harvest::{
	_preludet::*,
	auth::AccessToken,
	error::{Endpoint, IdentityProviderError, IdentityProviderErrorKind, ResponseError},
	provider::{Harvest, ResourceOwner, Tenancy},
};

const CLIENT_ID: &str = "mock_client_id";
const CLIENT_SECRET: &str = "mock_secret";
const REDIRECT_URI: &str = "https://app.example.com/redirect_url";
const TOKEN_BODY: &str = "{\"access_token\":\"mock_access_token\",\"scopes\":\"account\",\"expires_in\":3600,\"refresh_token\":\"mock_refresh_token\",\"token_type\":\"bearer\"}";

fn self_hosted(server: &MockServer) -> Harvest {
	let domain = Url::parse(&server.url("")).expect("Mock server URL should parse successfully.");

	Harvest::self_hosted(domain).expect("Self-hosted adapter should build for the mock server.")
}

fn who_am_i_body() -> String {
	json!({
		"user": {
			"id": 12345,
			"email": "mock.name@example.com",
			"first_name": "mock_first_name",
			"last_name": "mock_last_name",
			"avatar_url": "https://cache.harvestapp.com/avatar.png",
		},
		"company": { "base_uri": "https://acme.harvestapp.com", "full_domain": "acme.harvestapp.com" },
	})
	.to_string()
}

fn token() -> AccessToken {
	AccessToken::builder("mock_access_token").build().expect("Token fixture should build.")
}

fn identity_error(err: Error) -> IdentityProviderError {
	match err {
		Error::IdentityProvider(inner) => inner,
		other => panic!("Expected an identity provider error, got {other:?}."),
	}
}

#[tokio::test]
async fn code_exchange_then_who_am_i_yields_resource_owner() {
	let server = MockServer::start_async().await;
	let harvest = self_hosted(&server);
	let domain = harvest.domain().clone();
	let client = build_reqwest_test_client(harvest, CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/account/who_am_i")
				.header("authorization", "Bearer mock_access_token")
				.header("accept", "application/json")
				.header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body(who_am_i_body());
		})
		.await;
	let token = client
		.exchange_code("mock_authorization_code")
		.await
		.expect("Authorization code exchange should succeed.");

	token_mock.assert_async().await;

	assert_eq!(token.secret(), "mock_access_token");
	assert_eq!(
		token.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("mock_refresh_token")
	);
	assert_eq!(token.token_type, "bearer");
	assert!(token.expires_at.is_some_and(|expires_at| expires_at > token.issued_at));

	let owner = client
		.fetch_resource_owner(&token)
		.await
		.expect("Resource owner fetch should succeed.");

	user_mock.assert_async().await;

	assert_eq!(owner.id().as_deref(), Some("12345"));
	assert_eq!(owner.email(), Some("mock.name@example.com"));
	assert_eq!(owner.name(), "mock_first_name mock_last_name");
	assert_eq!(owner.avatar_url(), Some("https://cache.harvestapp.com/avatar.png"));
	assert_eq!(owner.domain(), Some(&domain));
	assert_eq!(ResourceOwner::raw(&owner)["company"]["full_domain"], "acme.harvestapp.com");
}

#[tokio::test]
async fn who_am_i_failures_at_500_raise_client_errors() {
	let payloads = [
		json!({ "error": "mock_error", "error_description": "mock_error_description" }),
		json!({ "error": { "message": "mock_error" }, "error_description": "mock_error_description" }),
		json!({ "foo": "bar" }),
	];

	for payload in payloads {
		let server = MockServer::start_async().await;
		let client =
			build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/account/who_am_i");
				then.status(500)
					.header("content-type", "application/json")
					.body(payload.to_string());
			})
			.await;
		let err = client
			.fetch_resource_owner(&token())
			.await
			.expect_err("HTTP 500 responses must not produce a resource owner.");

		mock.assert_async().await;

		let err = identity_error(err);

		assert_eq!(err.kind, IdentityProviderErrorKind::ClientError);
		assert_eq!(err.status, 500);
		assert_eq!(err.body, payload);
	}
}

#[tokio::test]
async fn who_am_i_error_key_raises_oauth_error_on_success_status() {
	let server = MockServer::start_async().await;
	let client =
		build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/account/who_am_i");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"error\":{\"message\":\"mock_error\"}}");
		})
		.await;

	let err = identity_error(
		client.fetch_resource_owner(&token()).await.expect_err("Error payloads must be rejected."),
	);

	assert_eq!(err.kind, IdentityProviderErrorKind::OAuthError);
	assert_eq!(err.status, 200);
	assert_eq!(err.message, "mock_error");
}

#[tokio::test]
async fn who_am_i_non_json_bodies_are_classified_first() {
	let server = MockServer::start_async().await;
	let client =
		build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
	let mut mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/account/who_am_i");
			then.status(502).header("content-type", "text/plain").body("upstream down");
		})
		.await;
	let err = identity_error(
		client.fetch_resource_owner(&token()).await.expect_err("HTTP 502 must be rejected."),
	);

	assert_eq!(err.kind, IdentityProviderErrorKind::ClientError);
	assert_eq!(err.message, "upstream down");
	assert_eq!(err.body, json!("upstream down"));

	mock.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/account/who_am_i");
			then.status(200).header("content-type", "text/html").body("<html></html>");
		})
		.await;

	let err = client
		.fetch_resource_owner(&token())
		.await
		.expect_err("Non-JSON success bodies must be rejected.");

	assert!(matches!(
		err,
		Error::Response(ResponseError::Parse {
			endpoint: Endpoint::UserInfo,
			status: Some(200),
			..
		})
	));
}

#[tokio::test]
async fn who_am_i_must_return_an_object() {
	let server = MockServer::start_async().await;
	let client =
		build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/account/who_am_i");
			then.status(200).header("content-type", "application/json").body("[1,2,3]");
		})
		.await;

	let err = client
		.fetch_resource_owner(&token())
		.await
		.expect_err("Array payloads must be rejected.");

	assert!(matches!(err, Error::Response(ResponseError::Parse { .. })));
}

#[tokio::test]
async fn multi_tenant_who_am_i_uses_the_api_domain() {
	let server = MockServer::start_async().await;
	let api_domain = Url::parse(&server.url("")).expect("Mock server URL should parse successfully.");
	let harvest = Harvest::builder()
		.api_domain(api_domain)
		.build()
		.expect("Multi-tenant adapter should build with a custom API domain.");

	assert_eq!(harvest.tenancy(), Tenancy::MultiTenant);

	let client = build_reqwest_test_client(harvest, CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/account/who_am_i");
			then.status(200).header("content-type", "application/json").body(who_am_i_body());
		})
		.await;
	let owner = client
		.fetch_resource_owner(&token())
		.await
		.expect("Resource owner fetch should succeed.");

	mock.assert_async().await;

	assert_eq!(owner.id().as_deref(), Some("12345"));
	assert_eq!(
		owner.domain().map(Url::as_str),
		Some("https://api.harvestapp.com/"),
		"Multi-tenant owners carry the public domain."
	);
}

#[tokio::test]
async fn token_endpoint_failures_are_classified() {
	let cases = [
		(
			400,
			"{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}",
			IdentityProviderErrorKind::ClientError,
			"invalid_grant",
		),
		(500, "{\"foo\":\"bar\"}", IdentityProviderErrorKind::ClientError, "Internal Server Error"),
		(200, "{\"error\":\"mock_error\"}", IdentityProviderErrorKind::OAuthError, "mock_error"),
	];

	for (status, body, kind, message) in cases {
		let server = MockServer::start_async().await;
		let client =
			build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
		let mock = server
			.mock_async(|when, then| {
				when.method(POST).path("/oauth2/token");
				then.status(status).header("content-type", "application/json").body(body);
			})
			.await;
		let err = identity_error(
			client
				.exchange_code("stale-code")
				.await
				.expect_err("Token endpoint failures must be rejected."),
		);

		mock.assert_async().await;

		assert_eq!(err.kind, kind, "Unexpected kind for HTTP {status}.");
		assert_eq!(err.status, status);
		assert_eq!(err.message, message);
	}
}

#[tokio::test]
async fn token_endpoint_errors_keep_the_full_provider_body() {
	let server = MockServer::start_async().await;
	let client =
		build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
	let body = json!({
		"error": "invalid_grant",
		"error_description": "used",
		"request_id": "abc",
	});
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(400).header("content-type", "application/json").body(body.to_string());
		})
		.await;
	let err = identity_error(
		client.exchange_code("used-code").await.expect_err("A rejected grant must fail."),
	);

	mock.assert_async().await;

	assert_eq!(err.kind, IdentityProviderErrorKind::ClientError);
	assert_eq!(err.status, 400);
	assert_eq!(err.message, "invalid_grant");
	assert_eq!(err.body, body, "Fields outside the standard error shape must survive.");
}

#[tokio::test]
async fn refresh_keeps_the_presented_refresh_token() {
	let server = MockServer::start_async().await;
	let client =
		build_reqwest_test_client(self_hosted(&server), CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"rotated_access_token\",\"token_type\":\"bearer\",\"expires_in\":60}");
		})
		.await;
	let token = client
		.refresh_token("mock_refresh_token")
		.await
		.expect("Refresh should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(token.secret(), "rotated_access_token");
	assert_eq!(
		token.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("mock_refresh_token")
	);
}
