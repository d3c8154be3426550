//! Facade over the `oauth2` core, configured from a [`ProviderAdapter`].
//!
//! The core owns authorize URL assembly, CSRF state generation, and token exchanges. This
//! module feeds it the adapter's endpoints and funnels every token endpoint failure back
//! through [`ProviderAdapter::classify_response`].

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
	EndpointSet, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::{ConfigError, Endpoint, ResponseError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, Operation},
	provider::{ClientAuthMethod, ProviderAdapter},
};
#[cfg(feature = "reqwest")]
use crate::error::TransportError;

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted while calling `endpoint` into a crate error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					ConfigError::from(*inner).into()
				} else {
					TransportError::network(endpoint, *inner).into()
				},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => ResponseError::Unexpected {
				endpoint,
				message: format!("HTTP client error: {message}"),
				status: meta_status(meta),
			}
			.into(),
			_ => ResponseError::Unexpected {
				endpoint,
				message: "unknown HTTP client error".into(),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

/// `oauth2` client bound to one adapter, transport, and mapper.
pub(crate) struct BasicFacade<'a, P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	provider: &'a P,
	oauth_client: ConfiguredBasicClient,
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, P, C, M> BasicFacade<'a, P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Configures the core with the adapter's endpoints for the grant described by `params`.
	pub(crate) fn from_provider(
		provider: &'a P,
		params: &BTreeMap<String, String>,
		credentials: ClientCredentials<'_>,
		http_client: &'a C,
		error_mapper: &'a M,
	) -> Result<Self> {
		let auth_url = AuthUrl::from_url(provider.authorization_endpoint());
		let token_url = TokenUrl::from_url(provider.token_endpoint(params));
		let mut oauth_client = BasicClient::new(ClientId::new(credentials.client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if let Some(secret) = credentials.client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}
		if let Some(redirect) = credentials.redirect_uri {
			let redirect_url = RedirectUrl::new(redirect.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;

			oauth_client = oauth_client.set_redirect_uri(redirect_url);
		}
		if matches!(provider.client_auth_method(), ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { provider, oauth_client, http_client, error_mapper })
	}

	/// Builds the authorize URL; `scope` is always sent, even when empty.
	pub(crate) fn authorize_url(
		&self,
		scope: &str,
		state: Option<String>,
		extra_params: &[(String, String)],
	) -> (Url, CsrfToken) {
		let state_fn = move || state.map(CsrfToken::new).unwrap_or_else(CsrfToken::new_random);
		let mut request =
			self.oauth_client.authorize_url(state_fn).add_extra_param("scope", scope.to_owned());

		if let Some(prompt) = self.provider.approval_prompt() {
			request = request.add_extra_param("approval_prompt", prompt.to_owned());
		}
		for (key, value) in extra_params {
			request = request.add_extra_param(key.clone(), value.clone());
		}

		request.url()
	}

	/// Exchanges an authorization code for an access token.
	pub(crate) async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(Operation::CodeExchange, meta.take(), err))?;

		map_token_response(response, None)
	}

	/// Exchanges a refresh token for a new access token.
	///
	/// When the provider does not rotate the refresh token, the presented one is kept.
	pub(crate) async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(Operation::Refresh, meta.take(), err))?;

		map_token_response(response, Some(refresh_token))
	}

	fn map_request_error(
		&self,
		operation: Operation,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	) -> Error {
		let status = meta_status(meta.as_ref());
		let raw_body = meta.as_ref().and_then(|meta| meta.body.as_deref()).map(body_to_value);

		match err {
			RequestTokenError::ServerResponse(response) => {
				let body = raw_body
					.unwrap_or_else(|| serde_json::to_value(&response).unwrap_or(Value::Null));

				classify(self.provider, operation, status.unwrap_or(400), &body).err().unwrap_or_else(
					|| ResponseError::Unexpected {
						endpoint: Endpoint::Token,
						message: format!("unclassified OAuth error `{}`", response.error().as_ref()),
						status,
					}
					.into(),
				)
			},
			RequestTokenError::Request(error) =>
				self.error_mapper.map_transport_error(Endpoint::Token, meta.as_ref(), error),
			RequestTokenError::Parse(source, body) => {
				let body = body_to_value(&body);

				classify(self.provider, operation, status.unwrap_or(200), &body).err().unwrap_or_else(
					|| ResponseError::Parse { endpoint: Endpoint::Token, source, status }.into(),
				)
			},
			RequestTokenError::Other(message) => {
				let unexpected = ResponseError::Unexpected { endpoint: Endpoint::Token, message, status };

				match status {
					Some(status) if status >= 400 => classify(
						self.provider,
						operation,
						status,
						&raw_body.unwrap_or(Value::Null),
					)
					.err()
					.unwrap_or_else(|| unexpected.into()),
					_ => unexpected.into(),
				}
			},
		}
	}
}

/// Client credentials handed to the core.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClientCredentials<'a> {
	pub(crate) client_id: &'a str,
	pub(crate) client_secret: Option<&'a str>,
	pub(crate) redirect_uri: Option<&'a Url>,
}

/// Runs the adapter's classification and logs rejections.
pub(crate) fn classify<P>(provider: &P, operation: Operation, status: u16, body: &Value) -> Result<()>
where
	P: ?Sized + ProviderAdapter,
{
	provider.classify_response(status, body).map_err(|err| {
		obs::log_rejection(operation, err.status, err.kind.as_str());

		err.into()
	})
}

/// Parses a response body for classification; non-JSON text becomes a JSON string.
pub(crate) fn body_to_value(body: &[u8]) -> Value {
	serde_json::from_slice(body)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn map_token_response(
	response: BasicTokenResponse,
	presented_refresh: Option<&str>,
) -> Result<AccessToken> {
	let scope = match response.scopes() {
		Some(scopes) =>
			ScopeSet::new(scopes.iter().map(|scope| scope.as_str()).filter(|scope| !scope.is_empty()))
				.map_err(ConfigError::from)?,
		None => ScopeSet::default(),
	};
	let mut builder = AccessToken::builder(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref())
		.scope(scope)
		.issued_at(OffsetDateTime::now_utc());

	if let Some(expires_in) = response.expires_in() {
		let expires_in = i64::try_from(expires_in.as_secs())
			.map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		builder = builder.expires_in(Duration::seconds(expires_in));
	}

	let refresh = response
		.refresh_token()
		.map(|token| token.secret().as_str())
		.or(presented_refresh);

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}

	builder.build().map_err(|err| ConfigError::from(err).into())
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}
