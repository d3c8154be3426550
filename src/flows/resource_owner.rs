//! User-info fetch and resource owner mapping.

// crates.io
use oauth2::{AsyncHttpClient, HttpRequest, http::Method};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::{Endpoint, ResponseError},
	flows::ProviderClient,
	http::{ProviderHttpClient, ResponseMetadataSlot},
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation, OperationSpan, Outcome},
	provider::{ProviderAdapter, RequestOptions},
};

impl<P, C, M> ProviderClient<P, C, M>
where
	P: ProviderAdapter,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the signed `GET` request for the adapter's user-info endpoint.
	pub fn user_info_request(&self, token: &AccessToken) -> Result<HttpRequest> {
		let url = self.provider.user_info_endpoint(token);

		Ok(self.provider.user_info_request(Method::GET, &url, token, RequestOptions::default())?)
	}

	/// Fetches the user-info payload and maps it into the adapter's resource owner.
	///
	/// The response is classified before any mapping happens; bodies that are not JSON are
	/// classified as raw text and then rejected as [`ResponseError::Parse`].
	pub async fn fetch_resource_owner(&self, token: &AccessToken) -> Result<P::ResourceOwner> {
		const OPERATION: Operation = Operation::ResourceOwner;

		let span = OperationSpan::new(OPERATION, "fetch_resource_owner");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.user_info_request(token)?;
				let meta = ResponseMetadataSlot::default();
				let handle = self.http_client.with_metadata(meta.clone());
				let response = handle.call(request).await.map_err(|err| {
					self.transport_mapper.map_transport_error(
						Endpoint::UserInfo,
						meta.take().as_ref(),
						err,
					)
				})?;
				let status = response.status().as_u16();

				let body = match serde_path_to_error::deserialize::<_, Value>(
					&mut serde_json::Deserializer::from_slice(response.body()),
				) {
					Ok(body) => body,
					Err(source) => {
						oauth::classify(
							self.provider.as_ref(),
							OPERATION,
							status,
							&oauth::body_to_value(response.body()),
						)?;

						return Err(ResponseError::Parse {
							endpoint: Endpoint::UserInfo,
							source,
							status: Some(status),
						}
						.into());
					},
				};

				oauth::classify(self.provider.as_ref(), OPERATION, status, &body)?;

				let body = serde_path_to_error::deserialize::<_, Map<String, Value>>(body).map_err(
					|source| ResponseError::Parse {
						endpoint: Endpoint::UserInfo,
						source,
						status: Some(status),
					},
				)?;

				Ok(self.provider.resource_owner(body, token))
			})
			.await;

		obs::record_result(OPERATION, &result);

		result
	}
}
