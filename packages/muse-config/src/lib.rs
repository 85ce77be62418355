mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ChatProviderConfig, Config, EmbeddingProviderConfig, Memory, Postgres, Providers,
	SearchProviderConfig, Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes, and validates a TOML payload that did not come from a file.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("chat", &cfg.providers.chat.api_key),
		("search", &cfg.providers.search.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}
	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("chat", cfg.providers.chat.timeout_ms),
		("search", cfg.providers.search.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	let temperature = cfg.providers.chat.temperature;

	if !temperature.is_finite() || !(0.0..=1.0).contains(&temperature) {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.providers.chat.max_output_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.chat.max_output_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.memory.batch_window == 0 {
		return Err(Error::Validation {
			message: "memory.batch_window must be greater than zero.".to_string(),
		});
	}
	if cfg.memory.search_default_limit == 0 {
		return Err(Error::Validation {
			message: "memory.search_default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.memory.search_default_limit > cfg.memory.search_max_limit {
		return Err(Error::Validation {
			message: "memory.search_default_limit must not exceed memory.search_max_limit."
				.to_string(),
		});
	}

	let threshold = cfg.memory.search_default_threshold;

	if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
		return Err(Error::Validation {
			message: "memory.search_default_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}

	for api_base in [
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.chat.api_base,
		&mut cfg.providers.search.api_base,
	] {
		let trimmed = api_base.trim_end_matches('/').len();

		api_base.truncate(trimmed);
	}
}
