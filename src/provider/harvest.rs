//! Harvest adapter.
//!
//! Harvest serves its OAuth endpoints and its `who_am_i` API from a public multi-tenant
//! root. Self-hosted deployments run everything under one customer root instead, so the
//! user-info endpoint follows the configured domain in that case.

/// Builder API for assembling the adapter.
pub mod builder;
/// Resource owner view over the `who_am_i` payload.
pub mod resource_owner;

pub use builder::*;
pub use resource_owner::*;

// crates.io
use oauth2::{
	HttpRequest,
	http::{HeaderMap, HeaderValue, Method, header},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::{ConfigError, IdentityProviderError},
	provider::{ProviderAdapter, RequestOptions, bearer_request},
};

/// Public multi-tenant root hosting the OAuth endpoints.
pub const DEFAULT_DOMAIN: &str = "https://api.harvestapp.com";
/// Root hosting the `who_am_i` API for multi-tenant deployments.
pub const DEFAULT_API_DOMAIN: &str = "https://api.harvestapp.com";

const AUTHORIZE_PATH: &str = "/oauth2/authorize";
const TOKEN_PATH: &str = "/oauth2/token";
const WHO_AM_I_PATH: &str = "/account/who_am_i";

/// Deployment shape chosen when the adapter is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenancy {
	/// Public root; user details come from the API domain.
	#[default]
	MultiTenant,
	/// Customer-specific root serving both OAuth and API endpoints.
	SelfHosted,
}

/// Harvest [`ProviderAdapter`].
///
/// Both domains are validated once by [`HarvestBuilder::build`]; the adapter is read-only
/// afterwards and can be shared freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Harvest {
	domain: Url,
	api_domain: Url,
	tenancy: Tenancy,
}
impl Harvest {
	/// Creates a new builder seeded with the public defaults.
	pub fn builder() -> HarvestBuilder {
		HarvestBuilder::default()
	}

	/// Adapter for the public multi-tenant deployment.
	pub fn multi_tenant() -> Result<Self, ProviderConfigError> {
		Self::builder().build()
	}

	/// Adapter for a self-hosted deployment rooted at `domain`.
	///
	/// Passing [`DEFAULT_DOMAIN`] yields the multi-tenant adapter.
	pub fn self_hosted(domain: Url) -> Result<Self, ProviderConfigError> {
		Self::builder().domain(domain).build()
	}

	/// Root for the OAuth endpoints.
	pub fn domain(&self) -> &Url {
		&self.domain
	}

	/// Root for the user-info API in multi-tenant deployments.
	pub fn api_domain(&self) -> &Url {
		&self.api_domain
	}

	/// Deployment shape selected at construction.
	pub fn tenancy(&self) -> Tenancy {
		self.tenancy
	}
}
impl ProviderAdapter for Harvest {
	type ResourceOwner = HarvestResourceOwner;

	fn authorization_endpoint(&self) -> Url {
		append_path(&self.domain, AUTHORIZE_PATH)
	}

	fn token_endpoint(&self, _params: &BTreeMap<String, String>) -> Url {
		append_path(&self.domain, TOKEN_PATH)
	}

	fn user_info_endpoint(&self, _token: &AccessToken) -> Url {
		match self.tenancy {
			Tenancy::MultiTenant => append_path(&self.api_domain, WHO_AM_I_PATH),
			Tenancy::SelfHosted => append_path(&self.domain, WHO_AM_I_PATH),
		}
	}

	fn classify_response(&self, status: u16, body: &Value) -> Result<(), IdentityProviderError> {
		if status >= 400 {
			return Err(IdentityProviderError::client_error(status, body.clone()));
		}
		if body.get("error").is_some_and(|error| !error.is_null()) {
			return Err(IdentityProviderError::oauth_error(status, body.clone()));
		}

		Ok(())
	}

	fn user_info_request(
		&self,
		method: Method,
		url: &Url,
		token: &AccessToken,
		options: RequestOptions,
	) -> Result<HttpRequest, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
		headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

		bearer_request(method, url, token, RequestOptions { headers, ..options })
	}

	fn resource_owner(&self, body: Map<String, Value>, _token: &AccessToken) -> HarvestResourceOwner {
		HarvestResourceOwner::new(body).with_domain(self.domain.clone())
	}
}
impl TryFrom<HarvestConfig> for Harvest {
	type Error = ProviderConfigError;

	fn try_from(config: HarvestConfig) -> Result<Self, Self::Error> {
		config.into_adapter()
	}
}

/// Serde-friendly adapter configuration.
///
/// Tenancy follows [`HarvestBuilder`]: a `domain` equal to [`DEFAULT_DOMAIN`] selects
/// [`Tenancy::MultiTenant`] and any other value selects [`Tenancy::SelfHosted`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
	/// OAuth root; omitted means the public multi-tenant root.
	pub domain: Option<Url>,
	/// User-info API root for multi-tenant deployments.
	pub api_domain: Option<Url>,
}
impl HarvestConfig {
	/// Validates the configuration and builds the adapter.
	pub fn into_adapter(self) -> Result<Harvest, ProviderConfigError> {
		HarvestBuilder { domain: self.domain, api_domain: self.api_domain }.build()
	}
}

fn append_path(root: &Url, suffix: &str) -> Url {
	let mut url = root.clone();
	let path = format!("{}{suffix}", root.path().trim_end_matches('/'));

	url.set_path(&path);

	url
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::error::IdentityProviderErrorKind;

	fn token() -> AccessToken {
		AccessToken::builder("mock_access_token").build().expect("Token fixture should build.")
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	fn object(value: Value) -> Map<String, Value> {
		value.as_object().cloned().expect("Fixture payload must be a JSON object.")
	}

	#[test]
	fn explicit_public_domain_keeps_api_override() {
		let harvest = Harvest::builder()
			.domain(url(DEFAULT_DOMAIN))
			.api_domain(url("https://api.example.com"))
			.build()
			.expect("Public domain with an API override should build.");

		assert_eq!(harvest.tenancy(), Tenancy::MultiTenant);
		assert_eq!(
			harvest.user_info_endpoint(&token()).as_str(),
			"https://api.example.com/account/who_am_i"
		);

		let harvest = Harvest::builder()
			.domain(url("https://harvest.acme.test"))
			.api_domain(url("https://api.example.com"))
			.build()
			.expect("Self-hosted domain should build.");

		assert_eq!(harvest.tenancy(), Tenancy::SelfHosted);
		assert_eq!(
			harvest.user_info_endpoint(&token()).as_str(),
			"https://harvest.acme.test/account/who_am_i"
		);
	}

	#[test]
	fn multi_tenant_endpoints_use_public_roots() {
		let harvest = Harvest::multi_tenant().expect("Default adapter should build.");

		assert_eq!(harvest.tenancy(), Tenancy::MultiTenant);
		assert_eq!(
			harvest.authorization_endpoint().as_str(),
			"https://api.harvestapp.com/oauth2/authorize"
		);
		assert_eq!(
			harvest.token_endpoint(&BTreeMap::new()).as_str(),
			"https://api.harvestapp.com/oauth2/token"
		);
		assert_eq!(
			harvest.user_info_endpoint(&token()).as_str(),
			"https://api.harvestapp.com/account/who_am_i"
		);
		assert!(harvest.default_scopes().is_empty());
	}

	#[test]
	fn multi_tenant_user_info_follows_api_domain() {
		let harvest = Harvest::builder()
			.api_domain(url("https://api.example.com"))
			.build()
			.expect("Adapter with a custom API domain should build.");

		assert_eq!(
			harvest.user_info_endpoint(&token()).as_str(),
			"https://api.example.com/account/who_am_i"
		);
		assert_eq!(
			harvest.authorization_endpoint().as_str(),
			"https://api.harvestapp.com/oauth2/authorize"
		);
	}

	#[test]
	fn self_hosted_endpoints_share_the_domain() {
		let harvest = Harvest::builder()
			.domain(url("https://harvest.acme.test/"))
			.api_domain(url("https://api.example.com"))
			.build()
			.expect("Self-hosted adapter should build.");

		assert_eq!(harvest.tenancy(), Tenancy::SelfHosted);
		assert_eq!(
			harvest.authorization_endpoint().as_str(),
			"https://harvest.acme.test/oauth2/authorize"
		);
		assert_eq!(
			harvest.user_info_endpoint(&token()).as_str(),
			"https://harvest.acme.test/account/who_am_i"
		);
	}

	#[test]
	fn token_endpoint_ignores_params() {
		let harvest = Harvest::self_hosted(url("https://harvest.acme.test/tenant"))
			.expect("Self-hosted adapter with a path should build.");
		let params = BTreeMap::from([
			("grant_type".to_owned(), "authorization_code".to_owned()),
			("code".to_owned(), "mock_authorization_code".to_owned()),
		]);

		assert_eq!(
			harvest.token_endpoint(&params),
			harvest.token_endpoint(&BTreeMap::new()),
		);
		assert_eq!(harvest.token_endpoint(&params).path(), "/tenant/oauth2/token");
	}

	#[test]
	fn classify_response_checks_status_before_error_key() {
		let harvest = Harvest::multi_tenant().expect("Default adapter should build.");
		let err = harvest
			.classify_response(500, &json!({ "foo": "bar" }))
			.expect_err("Status 500 must fail without an error key.");

		assert_eq!(err.kind, IdentityProviderErrorKind::ClientError);
		assert_eq!(err.status, 500);

		let err = harvest
			.classify_response(404, &json!({ "error": "not_found" }))
			.expect_err("Status 404 must fail.");

		assert_eq!(err.kind, IdentityProviderErrorKind::ClientError);

		for body in [
			json!({ "error": "mock_error", "error_description": "mock_error_description" }),
			json!({ "error": { "message": "mock_error" }, "error_description": "mock" }),
		] {
			let err = harvest
				.classify_response(200, &body)
				.expect_err("Error payloads must fail even on HTTP 200.");

			assert_eq!(err.kind, IdentityProviderErrorKind::OAuthError);
			assert_eq!(err.message, "mock_error");
			assert_eq!(err.body, body);
		}

		assert!(harvest.classify_response(200, &json!({ "foo": "bar" })).is_ok());
		assert!(harvest.classify_response(399, &json!({ "error": null })).is_ok());
	}

	#[test]
	fn user_info_request_forces_json_headers() {
		let harvest = Harvest::multi_tenant().expect("Default adapter should build.");
		let url = harvest.user_info_endpoint(&token());
		let options = RequestOptions::default()
			.with_header(header::ACCEPT, HeaderValue::from_static("text/html"))
			.with_header(header::USER_AGENT, HeaderValue::from_static("custom"))
			.with_body("kept");
		let request = harvest
			.user_info_request(Method::GET, &url, &token(), options)
			.expect("User-info request should build.");
		let headers = request.headers();

		assert_eq!(headers[header::CONTENT_TYPE], "application/json");
		assert_eq!(headers[header::ACCEPT], "application/json");
		assert_eq!(headers[header::AUTHORIZATION], "Bearer mock_access_token");
		assert!(headers.get(header::USER_AGENT).is_none());
		assert_eq!(headers.len(), 3);
		assert_eq!(request.body().as_slice(), b"kept");
		assert_eq!(request.uri(), "https://api.harvestapp.com/account/who_am_i");
	}

	#[test]
	fn resource_owner_carries_domain() {
		let harvest = Harvest::self_hosted(url("https://harvest.acme.test"))
			.expect("Self-hosted adapter should build.");
		let owner = harvest.resource_owner(object(json!({ "user": { "id": 7 } })), &token());

		assert_eq!(owner.domain(), Some(harvest.domain()));
		assert_eq!(owner.id().as_deref(), Some("7"));
	}

	#[test]
	fn config_classifies_domain_once() {
		let config: HarvestConfig =
			serde_json::from_value(json!({ "domain": "https://api.harvestapp.com" }))
				.expect("Config should deserialize.");

		assert_eq!(
			config.into_adapter().expect("Config should build.").tenancy(),
			Tenancy::MultiTenant
		);

		let config: HarvestConfig =
			serde_json::from_value(json!({ "domain": "https://harvest.acme.test" }))
				.expect("Config should deserialize.");
		let harvest = Harvest::try_from(config).expect("Config should build.");

		assert_eq!(harvest.tenancy(), Tenancy::SelfHosted);

		let empty: HarvestConfig =
			serde_json::from_value(json!({})).expect("Empty config should deserialize.");

		assert_eq!(empty, HarvestConfig::default());
	}
}
