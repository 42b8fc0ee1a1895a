use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// IANA timezone echoed in responses when a tenant has none on record.
	#[serde(default = "default_timezone")]
	pub default_timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: u32,
	pub max_limit: u32,
	pub min_query_chars: u32,
	/// Semantic retrieval over-fetches `limit * candidate_multiplier` rows, capped by
	/// `max_candidates`, so filtering still leaves enough results.
	pub candidate_multiplier: u32,
	pub max_candidates: u32,
	pub semantic_enabled: bool,
	pub allow_keyword_fallback: bool,
	pub semantic_timeout_ms: u64,
	pub keyword_timeout_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 50,
			min_query_chars: 2,
			candidate_multiplier: 5,
			max_candidates: 200,
			semantic_enabled: true,
			allow_keyword_fallback: true,
			semantic_timeout_ms: 3_000,
			keyword_timeout_ms: 1_500,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub semantic_weight: f64,
	pub coverage_weight: f64,
	pub exact_phrase_boost: f64,
	pub min_semantic_score: f64,
	pub min_coverage: f64,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			semantic_weight: 0.65,
			coverage_weight: 0.35,
			exact_phrase_boost: 0.2,
			min_semantic_score: 0.2,
			min_coverage: 0.2,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	/// Bearer tokens and the tenant each one authenticates.
	#[serde(default)]
	pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
	pub token: String,
	pub tenant_id: String,
}

fn default_timezone() -> String {
	"UTC".to_string()
}
