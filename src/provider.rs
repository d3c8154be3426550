//! Provider adapters plugged into the generic OAuth 2.0 client.
//!
//! `adapter` defines [`ProviderAdapter`], the contract every provider satisfies (endpoint
//! derivation, default scopes, response classification, user-info request signing, and
//! resource owner mapping). `harvest` implements it for Harvest, including the
//! multi-tenant vs. self-hosted domain split.

pub mod adapter;
pub mod harvest;

pub use adapter::*;
pub use harvest::*;
