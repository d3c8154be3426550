//! Provider adapter contract consumed by [`ProviderClient`](crate::flows::ProviderClient).
//!
//! The OAuth core owns the flow (state, token exchange, transport); an adapter only answers
//! provider-specific questions. Hooks work on crate-owned or `http` types so adapters never
//! depend on a particular HTTP client.

// crates.io
use oauth2::{
	HttpRequest,
	http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Version, header::AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::{ConfigError, IdentityProviderError},
};

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Normalized view over a provider's user-info payload.
pub trait ResourceOwner: Debug + Send + Sync {
	/// Provider-assigned identifier of the resource owner, when present.
	fn id(&self) -> Option<String>;

	/// Full user-info payload as returned by the provider.
	fn raw(&self) -> &Map<String, Value>;
}

/// Extra request inputs accepted by [`ProviderAdapter::user_info_request`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Caller-supplied headers.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Vec<u8>,
	/// HTTP protocol version override.
	pub version: Option<Version>,
}
impl RequestOptions {
	/// Adds a header, replacing any previous value for the same name.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Overrides the HTTP protocol version.
	pub fn with_version(mut self, version: Version) -> Self {
		self.version = Some(version);

		self
	}
}

/// Provider-specific hooks invoked by the OAuth client.
///
/// Implementors are required to be `Send + Sync`. Only the endpoint, classification, and
/// resource owner hooks are mandatory; the rest default to what most providers expect.
pub trait ProviderAdapter: Send + Sync {
	/// Resource owner type produced from the user-info payload.
	type ResourceOwner: ResourceOwner;

	/// Endpoint end-users are redirected to.
	fn authorization_endpoint(&self) -> Url;

	/// Token endpoint for the grant described by `params`.
	///
	/// `params` carries the form the client is about to send (`grant_type`, `code`, ...), so
	/// providers that encode grant details in the URL can do so.
	fn token_endpoint(&self, params: &BTreeMap<String, String>) -> Url;

	/// Endpoint returning details about the token's resource owner.
	fn user_info_endpoint(&self, token: &AccessToken) -> Url;

	/// Scopes requested when the caller supplies none.
	fn default_scopes(&self) -> ScopeSet {
		ScopeSet::default()
	}

	/// Character joining scopes in the authorize URL.
	fn scope_separator(&self) -> char {
		','
	}

	/// Value of the `approval_prompt` authorize parameter, if the provider uses one.
	fn approval_prompt(&self) -> Option<&str> {
		Some("auto")
	}

	/// How the client authenticates against the token endpoint.
	fn client_auth_method(&self) -> ClientAuthMethod {
		ClientAuthMethod::default()
	}

	/// Checks a provider response for errors.
	///
	/// `status` is the HTTP status code and `body` the parsed payload; bodies that are not
	/// valid JSON arrive as a JSON string holding the raw text.
	fn classify_response(&self, status: u16, body: &Value) -> Result<(), IdentityProviderError>;

	/// Builds the authenticated request used to fetch user details.
	fn user_info_request(
		&self,
		method: Method,
		url: &Url,
		token: &AccessToken,
		options: RequestOptions,
	) -> Result<HttpRequest, ConfigError> {
		bearer_request(method, url, token, options)
	}

	/// Maps a successful user-info payload into the provider's resource owner.
	fn resource_owner(&self, body: Map<String, Value>, token: &AccessToken) -> Self::ResourceOwner;
}

/// Builds a request carrying `Authorization: Bearer <token>` plus the caller's options.
pub fn bearer_request(
	method: Method,
	url: &Url,
	token: &AccessToken,
	options: RequestOptions,
) -> Result<HttpRequest, ConfigError> {
	let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.secret()))
		.map_err(|_| ConfigError::InvalidAccessToken)?;

	authorization.set_sensitive(true);

	let RequestOptions { headers, body, version } = options;
	let mut builder = Request::builder().method(method).uri(url.as_str());

	if let Some(version) = version {
		builder = builder.version(version);
	}

	let mut request = builder.body(body)?;

	*request.headers_mut() = headers;
	request.headers_mut().insert(AUTHORIZATION, authorization);

	Ok(request)
}
