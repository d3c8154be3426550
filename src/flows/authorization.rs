//! Authorize URL construction and `state` round-trip checks.

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	flows::ProviderClient,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, Operation, OperationSpan, Outcome},
	provider::ProviderAdapter,
};

/// Caller inputs for [`ProviderClient::authorization_session`].
#[derive(Clone, Debug, Default)]
pub struct AuthorizationOptions {
	/// Scopes to request; the adapter's defaults apply when unset.
	pub scopes: Option<ScopeSet>,
	/// Fixed `state` value; a random one is generated when unset.
	pub state: Option<String>,
	/// Additional query parameters appended after the standard ones.
	pub extra_params: Vec<(String, String)>,
}
impl AuthorizationOptions {
	/// Requests the provided scopes instead of the adapter defaults.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Uses a caller-chosen `state` value.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Appends an extra query parameter.
	pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.push((key.into(), value.into()));

		self
	}
}

/// Authorize redirect returned by [`ProviderClient::authorization_session`].
#[derive(Clone, Debug)]
pub struct AuthorizationSession {
	/// Scopes placed in the authorize URL.
	pub scope: ScopeSet,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
}
impl AuthorizationSession {
	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(Error::StateMismatch) }
	}
}

impl<P, C, M> ProviderClient<P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorize URL for an Authorization Code redirect.
	///
	/// The URL carries `response_type`, `client_id`, `redirect_uri` (when configured),
	/// `state`, `scope` joined with the adapter's separator, and the adapter's
	/// `approval_prompt`.
	pub fn authorization_session(&self, options: AuthorizationOptions) -> Result<AuthorizationSession> {
		const OPERATION: Operation = Operation::Authorization;

		let _guard = OperationSpan::new(OPERATION, "authorization_session").entered();

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = self.build_session(options);

		obs::record_result(OPERATION, &result);

		result
	}

	/// Convenience wrapper returning only the authorize URL.
	pub fn authorization_url(&self, options: AuthorizationOptions) -> Result<Url> {
		self.authorization_session(options).map(|session| session.authorize_url)
	}

	fn build_session(&self, options: AuthorizationOptions) -> Result<AuthorizationSession> {
		let AuthorizationOptions { scopes, state, extra_params } = options;
		let scope = scopes.unwrap_or_else(|| self.provider.default_scopes());
		let facade = self.facade(&BTreeMap::new())?;
		let (authorize_url, state) = facade.authorize_url(
			&scope.join(self.provider.scope_separator()),
			state,
			&extra_params,
		);

		Ok(AuthorizationSession { scope, state: state.secret().to_owned(), authorize_url })
	}
}
