//! Scope sets and access token models handed to provider adapters.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::record::*;
