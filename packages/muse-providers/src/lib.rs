pub mod chat;
pub mod embedding;
pub mod response;
pub mod search;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, RequestBuilder,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

/// Builds the shared HTTP client. Timeouts are applied per request from each provider's config.
pub fn build_client() -> Result<Client> {
	Ok(Client::builder().build()?)
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key:?} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn post(
	client: &Client,
	api_base: &str,
	path: &str,
	timeout_ms: u64,
	headers: HeaderMap,
) -> RequestBuilder {
	client
		.post(format!("{api_base}{path}"))
		.timeout(Duration::from_millis(timeout_ms))
		.headers(headers)
}
