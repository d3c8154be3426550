//! Client operations that drive the `oauth2` core with a provider adapter.

pub mod authorization;
pub mod resource_owner;
pub mod token;

pub use authorization::*;

// self
use crate::{
	_prelude::*,
	http::ProviderHttpClient,
	oauth::{BasicFacade, ClientCredentials, TransportErrorMapper},
	provider::ProviderAdapter,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper, provider::Harvest};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestProviderClient<P> = ProviderClient<P, ReqwestHttpClient, ReqwestTransportErrorMapper>;

#[cfg(feature = "reqwest")]
/// Reqwest-backed client for the Harvest adapter.
pub type HarvestClient = ReqwestProviderClient<Harvest>;

/// Runs OAuth 2.0 operations against a single provider adapter.
///
/// The client owns the adapter, the HTTP transport, and the client credentials. It asks the
/// adapter for endpoints and request shapes, lets the `oauth2` core handle the protocol, and
/// sends every provider response through [`ProviderAdapter::classify_response`].
pub struct ProviderClient<P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Provider adapter answering endpoint and mapping questions.
	pub provider: Arc<P>,
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret for confidential clients.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Option<Url>,
}
impl<P, C, M> ProviderClient<P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		provider: impl Into<Arc<P>>,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			provider: provider.into(),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri: None,
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets or replaces the redirect URI sent with authorize and code exchange requests.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	pub(crate) fn facade(&self, params: &BTreeMap<String, String>) -> Result<BasicFacade<'_, P, C, M>> {
		let credentials = ClientCredentials {
			client_id: &self.client_id,
			client_secret: self.client_secret.as_deref(),
			redirect_uri: self.redirect_uri.as_ref(),
		};

		BasicFacade::from_provider(
			self.provider.as_ref(),
			params,
			credentials,
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
		)
	}
}
#[cfg(feature = "reqwest")]
impl<P> ProviderClient<P, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	P: ProviderAdapter,
{
	/// Creates a new client for the adapter and client identifier.
	///
	/// The client provisions its own reqwest-backed transport. Use
	/// [`ProviderClient::with_client_secret`] and [`ProviderClient::with_redirect_uri`] to
	/// finish the configuration.
	pub fn new(provider: impl Into<Arc<P>>, client_id: impl Into<String>) -> Self {
		Self::with_http_client(
			provider,
			client_id,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<P, C, M> Clone for ProviderClient<P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			provider: Arc::clone(&self.provider),
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
			redirect_uri: self.redirect_uri.clone(),
		}
	}
}
impl<P, C, M> Debug for ProviderClient<P, C, M>
where
	P: ProviderAdapter + Debug,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderClient")
			.field("provider", &self.provider)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}
