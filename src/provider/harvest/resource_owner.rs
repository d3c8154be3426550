// self
use crate::{_prelude::*, provider::ResourceOwner};

/// Harvest user, read lazily from the `who_am_i` payload.
///
/// Accessors look under the top-level `user` object and treat a key as present whenever it
/// holds a non-null value, so an id of `0` or an empty email are returned as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HarvestResourceOwner {
	raw: Map<String, Value>,
	#[serde(skip)]
	domain: Option<Url>,
}
impl HarvestResourceOwner {
	/// Wraps a raw payload. No domain is attached yet.
	pub fn new(raw: Map<String, Value>) -> Self {
		Self { raw, domain: None }
	}

	/// Attaches the deployment domain the payload was fetched from.
	pub fn with_domain(mut self, domain: Url) -> Self {
		self.domain = Some(domain);

		self
	}

	/// Deployment domain, once attached.
	pub fn domain(&self) -> Option<&Url> {
		self.domain.as_ref()
	}

	/// `user.id`, rendered as text.
	pub fn id(&self) -> Option<String> {
		match self.user_field("id")? {
			Value::Number(id) => Some(id.to_string()),
			Value::String(id) => Some(id.clone()),
			_ => None,
		}
	}

	/// `user.email`.
	pub fn email(&self) -> Option<&str> {
		self.user_field("email").and_then(Value::as_str)
	}

	/// `user.first_name` and `user.last_name` joined by a single space.
	///
	/// Missing parts render as empty strings, so the result is never absent.
	pub fn name(&self) -> String {
		let first = self.user_field("first_name").and_then(Value::as_str).unwrap_or_default();
		let last = self.user_field("last_name").and_then(Value::as_str).unwrap_or_default();

		format!("{first} {last}")
	}

	/// `user.avatar_url`.
	pub fn avatar_url(&self) -> Option<&str> {
		self.user_field("avatar_url").and_then(Value::as_str)
	}

	/// Unmodified payload.
	pub fn raw(&self) -> &Map<String, Value> {
		&self.raw
	}

	/// Consumes the record and returns the unmodified payload.
	pub fn into_raw(self) -> Map<String, Value> {
		self.raw
	}

	fn user_field(&self, key: &str) -> Option<&Value> {
		self.raw.get("user")?.get(key).filter(|value| !value.is_null())
	}
}
impl From<Map<String, Value>> for HarvestResourceOwner {
	fn from(raw: Map<String, Value>) -> Self {
		Self::new(raw)
	}
}
impl ResourceOwner for HarvestResourceOwner {
	fn id(&self) -> Option<String> {
		HarvestResourceOwner::id(self)
	}

	fn raw(&self) -> &Map<String, Value> {
		&self.raw
	}
}
