//! Crate-level error types shared by the adapter, the OAuth facade, and the client flows.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The identity provider reported a failure (HTTP status or OAuth `error` payload).
	#[error(transparent)]
	IdentityProvider(#[from] IdentityProviderError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a payload the client could not interpret.
	#[error(transparent)]
	Response(#[from] ResponseError),

	/// The `state` returned to the redirect handler does not match the issued one.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}

/// Failure family raised by [`ProviderAdapter::classify_response`].
///
/// Both transport-level (`status >= 400`) and protocol-level (`error` key in the body)
/// failures surface through this single type so callers need one catch site.
///
/// [`ProviderAdapter::classify_response`]: crate::provider::ProviderAdapter::classify_response
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("Identity provider returned {kind} (HTTP {status}): {message}.")]
pub struct IdentityProviderError {
	/// Which check rejected the response.
	pub kind: IdentityProviderErrorKind,
	/// HTTP status code of the rejected response.
	pub status: u16,
	/// Human-readable summary extracted from the payload.
	pub message: String,
	/// Parsed response body, kept verbatim.
	pub body: Value,
}
impl IdentityProviderError {
	/// Builds a [`IdentityProviderErrorKind::ClientError`] for a `status >= 400` response.
	pub fn client_error(status: u16, body: Value) -> Self {
		Self::new(IdentityProviderErrorKind::ClientError, status, body)
	}

	/// Builds a [`IdentityProviderErrorKind::OAuthError`] for a body carrying an `error` key.
	pub fn oauth_error(status: u16, body: Value) -> Self {
		Self::new(IdentityProviderErrorKind::OAuthError, status, body)
	}

	fn new(kind: IdentityProviderErrorKind, status: u16, body: Value) -> Self {
		let message = extract_message(status, &body);

		Self { kind, status, message, body }
	}
}

/// Classification attached to an [`IdentityProviderError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProviderErrorKind {
	/// HTTP status code was 400 or above.
	ClientError,
	/// Status was below 400 but the body carried an `error` key.
	OAuthError,
}
impl IdentityProviderErrorKind {
	/// Returns a stable label for logs and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ClientError => "client_error",
			Self::OAuthError => "oauth_error",
		}
	}
}
impl Display for IdentityProviderErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and request-building failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Access token cannot be encoded as an `Authorization` header.
	#[error("Access token contains characters that are not allowed in HTTP headers.")]
	InvalidAccessToken,
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Token builder validation failed.
	#[error("Unable to build access token.")]
	TokenBuild(#[from] crate::auth::AccessTokenBuilderError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Adapter configuration is invalid.
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Provider endpoints the client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Token endpoint (code exchange and refresh).
	Token,
	/// User-info endpoint.
	UserInfo,
}
impl Endpoint {
	/// Returns a stable label for messages, spans, and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Token => "token",
			Self::UserInfo => "user-info",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Responses that passed classification but could not be interpreted.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Body is not valid JSON or does not match the expected shape.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	Parse {
		/// Endpoint that produced the body.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// OAuth core reported a response it could not handle.
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Endpoint that produced the response.
		endpoint: Endpoint,
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

fn extract_message(status: u16, body: &Value) -> String {
	let from_error = match body.get("error") {
		Some(Value::String(message)) => Some(message.clone()),
		Some(Value::Object(nested)) =>
			nested.get("message").and_then(Value::as_str).map(ToOwned::to_owned),
		_ => None,
	};

	from_error
		.or_else(|| body.get("error_description").and_then(Value::as_str).map(ToOwned::to_owned))
		.or_else(|| body.as_str().filter(|text| !text.is_empty()).map(ToOwned::to_owned))
		.or_else(|| {
			oauth2::http::StatusCode::from_u16(status)
				.ok()
				.and_then(|code| code.canonical_reason())
				.map(ToOwned::to_owned)
		})
		.unwrap_or_else(|| "unknown error".into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn message_prefers_string_error_field() {
		let err = IdentityProviderError::oauth_error(
			200,
			json!({ "error": "mock_error", "error_description": "mock_error_description" }),
		);

		assert_eq!(err.kind, IdentityProviderErrorKind::OAuthError);
		assert_eq!(err.message, "mock_error");
	}

	#[test]
	fn message_reads_nested_error_objects() {
		let err = IdentityProviderError::client_error(
			500,
			json!({ "error": { "message": "mock_error" }, "error_description": "ignored" }),
		);

		assert_eq!(err.kind, IdentityProviderErrorKind::ClientError);
		assert_eq!(err.message, "mock_error");
		assert_eq!(err.body["error"]["message"], "mock_error");
	}

	#[test]
	fn message_falls_back_to_description_then_reason() {
		let err = IdentityProviderError::client_error(
			401,
			json!({ "error": { "code": 7 }, "error_description": "token expired" }),
		);

		assert_eq!(err.message, "token expired");

		let err = IdentityProviderError::client_error(503, json!({ "foo": "bar" }));

		assert_eq!(err.message, "Service Unavailable");
		assert!(err.to_string().contains("HTTP 503"));
	}

	#[test]
	fn identity_errors_convert_into_crate_error() {
		let err: Error = IdentityProviderError::client_error(500, Value::Null).into();

		assert!(matches!(
			err,
			Error::IdentityProvider(IdentityProviderError {
				kind: IdentityProviderErrorKind::ClientError,
				status: 500,
				..
			})
		));
	}
}
