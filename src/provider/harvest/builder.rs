// self
use crate::{
	_prelude::*,
	provider::harvest::{DEFAULT_API_DOMAIN, DEFAULT_DOMAIN, Harvest, Tenancy},
};

/// Errors raised while building a [`Harvest`] adapter.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// Domains must use HTTPS.
	#[error("The {field} must use HTTPS: {url}.")]
	InsecureDomain {
		/// Which field failed validation.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Domains must be plain roots that paths can be appended to.
	#[error("The {field} must be a hierarchical URL without query or fragment: {url}.")]
	UnsupportedDomain {
		/// Which field failed validation.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// A domain could not be parsed.
	#[error("The {field} is not a valid URL.")]
	InvalidUrl {
		/// Which field failed to parse.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Builder for [`Harvest`] adapters.
///
/// Leaving [`domain`](Self::domain) unset, or setting it to [`DEFAULT_DOMAIN`], targets the
/// public multi-tenant deployment; any other root switches the adapter to
/// [`Tenancy::SelfHosted`].
#[derive(Clone, Debug, Default)]
pub struct HarvestBuilder {
	/// Self-hosted root, if any.
	pub domain: Option<Url>,
	/// Override for the multi-tenant API root.
	pub api_domain: Option<Url>,
}
impl HarvestBuilder {
	/// Sets the OAuth root. Anything but [`DEFAULT_DOMAIN`] selects a self-hosted deployment.
	pub fn domain(mut self, url: Url) -> Self {
		self.domain = Some(url);

		self
	}

	/// Overrides the root serving `who_am_i` for multi-tenant deployments.
	pub fn api_domain(mut self, url: Url) -> Self {
		self.api_domain = Some(url);

		self
	}

	/// Validates both domains and produces the adapter.
	pub fn build(self) -> Result<Harvest, ProviderConfigError> {
		let public = default_url("domain", DEFAULT_DOMAIN)?;
		let (domain, tenancy) = match self.domain {
			Some(domain) if domain != public => (domain, Tenancy::SelfHosted),
			_ => (public, Tenancy::MultiTenant),
		};
		let api_domain = match self.api_domain {
			Some(api_domain) => api_domain,
			None => default_url("api_domain", DEFAULT_API_DOMAIN)?,
		};

		validate_domain("domain", &domain)?;
		validate_domain("api_domain", &api_domain)?;

		Ok(Harvest { domain, api_domain, tenancy })
	}
}

fn default_url(field: &'static str, value: &str) -> Result<Url, ProviderConfigError> {
	Url::parse(value).map_err(|source| ProviderConfigError::InvalidUrl { field, source })
}

fn validate_domain(field: &'static str, url: &Url) -> Result<(), ProviderConfigError> {
	if url.scheme() != "https" {
		return Err(ProviderConfigError::InsecureDomain { field, url: url.to_string() });
	}
	if url.cannot_be_a_base()
		|| url.host().is_none()
		|| url.query().is_some()
		|| url.fragment().is_some()
	{
		return Err(ProviderConfigError::UnsupportedDomain { field, url: url.to_string() });
	}

	Ok(())
}
