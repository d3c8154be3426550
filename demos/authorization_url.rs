//! Builds a Harvest authorize URL from a JSON configuration and checks the returned `state`
//! the way a redirect handler would.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_harvest::{
	auth::ScopeSet,
	flows::{AuthorizationOptions, HarvestClient},
	provider::{Harvest, HarvestConfig},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	// Set `domain` to a self-hosted root to switch tenancy.
	let config: HarvestConfig = serde_json::from_str(r#"{ "api_domain": null }"#)?;
	let harvest = Harvest::try_from(config)?;

	println!("Deployment: {:?} at {}.", harvest.tenancy(), harvest.domain());

	let client = HarvestClient::new(harvest, "demo-client")
		.with_client_secret("demo-secret")
		.with_redirect_uri(Url::parse("https://app.example.com/oauth/callback")?);
	let session = client.authorization_session(
		AuthorizationOptions::default().with_scopes(ScopeSet::new(["harvest:all"])?),
	)?;

	println!("Send your user to {}.", &session.authorize_url);

	let mut sessions = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// Simulate the redirect handler looking up the stored session by `state`.
	let returned_state = session.state.clone();

	if let Some(stashed) = sessions.remove(&returned_state) {
		stashed.validate_state(&returned_state)?;
		println!("Validated state; call HarvestClient::exchange_code during the callback.");
	} else {
		eprintln!("State `{returned_state}` was not recognized.");
	}

	Ok(())
}
