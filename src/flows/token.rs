//! Token endpoint calls: authorization code exchange and refresh.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	flows::ProviderClient,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, Operation, OperationSpan, Outcome},
	provider::ProviderAdapter,
};

impl<P, C, M> ProviderClient<P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the authorization code returned to the redirect handler.
	///
	/// Error payloads are classified by the adapter, so a rejected exchange surfaces as
	/// [`Error::IdentityProvider`].
	pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
		const OPERATION: Operation = Operation::CodeExchange;

		let span = OperationSpan::new(OPERATION, "exchange_code");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let params = BTreeMap::from([
					("grant_type".to_owned(), "authorization_code".to_owned()),
					("code".to_owned(), code.to_owned()),
				]);

				self.facade(&params)?.exchange_code(code).await
			})
			.await;

		obs::record_result(OPERATION, &result);

		result
	}

	/// Exchanges a refresh token for a new access token.
	///
	/// The returned token keeps the presented refresh secret when the provider does not
	/// rotate it.
	pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken> {
		const OPERATION: Operation = Operation::Refresh;

		let span = OperationSpan::new(OPERATION, "refresh_token");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let params = BTreeMap::from([
					("grant_type".to_owned(), "refresh_token".to_owned()),
					("refresh_token".to_owned(), refresh_token.to_owned()),
				]);

				self.facade(&params)?.refresh_token(refresh_token).await
			})
			.await;

		obs::record_result(OPERATION, &result);

		result
	}
}
