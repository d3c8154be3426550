//! Harvest provider adapter for OAuth 2.0: derives the authorize, token, and user-info
//! endpoints, signs user-info requests, classifies provider errors, and maps the
//! `who_am_i` payload into a typed resource owner while the `oauth2` crate drives the flow.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::ProviderClient, http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper,
		provider::ProviderAdapter,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient<P> = ProviderClient<P, ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`ProviderClient`] around the provided adapter using the insecure reqwest
	/// transport shared by integration tests.
	pub fn build_reqwest_test_client<P>(
		provider: P,
		client_id: &str,
		client_secret: &str,
		redirect_uri: &str,
	) -> ReqwestTestClient<P>
	where
		P: ProviderAdapter,
	{
		let redirect_uri = Url::parse(redirect_uri).expect("Test redirect URI should parse.");

		ProviderClient::with_http_client(
			provider,
			client_id,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(client_secret)
		.with_redirect_uri(redirect_uri)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, oauth2_harvest as _, tokio as _};
