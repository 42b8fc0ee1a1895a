mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ApiKey, Config, EmbeddingProviderConfig, Postgres, Providers, Qdrant, Ranking, Search,
	Security, Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub const MAX_LIMIT_CEILING: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

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
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}

	validate_search(cfg)?;
	validate_ranking(cfg)?;
	validate_security(cfg)?;

	Ok(())
}

fn validate_search(cfg: &Config) -> Result<()> {
	let search = &cfg.search;

	if search.max_limit == 0 || search.max_limit > MAX_LIMIT_CEILING {
		return Err(Error::Validation {
			message: format!("search.max_limit must be in the range 1-{MAX_LIMIT_CEILING}."),
		});
	}
	if search.default_limit == 0 || search.default_limit > search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be in the range 1-search.max_limit.".to_string(),
		});
	}
	if search.min_query_chars == 0 {
		return Err(Error::Validation {
			message: "search.min_query_chars must be greater than zero.".to_string(),
		});
	}
	if search.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if search.max_candidates < search.max_limit {
		return Err(Error::Validation {
			message: "search.max_candidates must be at least search.max_limit.".to_string(),
		});
	}
	if search.semantic_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.semantic_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if search.keyword_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.keyword_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_ranking(cfg: &Config) -> Result<()> {
	let ranking = &cfg.ranking;

	for (label, value) in [
		("ranking.semantic_weight", ranking.semantic_weight),
		("ranking.coverage_weight", ranking.coverage_weight),
		("ranking.exact_phrase_boost", ranking.exact_phrase_boost),
		("ranking.min_semantic_score", ranking.min_semantic_score),
		("ranking.min_coverage", ranking.min_coverage),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	Ok(())
}

fn validate_security(cfg: &Config) -> Result<()> {
	let mut seen = HashSet::new();

	for (idx, key) in cfg.security.api_keys.iter().enumerate() {
		if key.token.is_empty() {
			return Err(Error::Validation {
				message: format!("security.api_keys[{idx}].token must be non-empty."),
			});
		}
		if key.tenant_id.is_empty() {
			return Err(Error::Validation {
				message: format!("security.api_keys[{idx}].tenant_id must be non-empty."),
			});
		}
		if !seen.insert(key.token.as_str()) {
			return Err(Error::Validation {
				message: format!("security.api_keys[{idx}].token is duplicated."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let timezone = cfg.service.default_timezone.trim();

	cfg.service.default_timezone =
		if timezone.is_empty() { "UTC".to_string() } else { timezone.to_string() };

	for key in &mut cfg.security.api_keys {
		key.token = key.token.trim().to_string();
		key.tenant_id = key.tenant_id.trim().to_string();
	}
}
