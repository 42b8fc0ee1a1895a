use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use tasklens_config::EmbeddingProviderConfig;

pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

/// Embeds one search query and checks the vector against the configured dimension.
pub async fn embed_query(cfg: &EmbeddingProviderConfig, query: &str) -> Result<Vec<f32>> {
	let vectors = embed(cfg, std::slice::from_ref(&query.to_string())).await?;

	single_vector(cfg, vectors)
}

fn single_vector(cfg: &EmbeddingProviderConfig, vectors: Vec<Vec<f32>>) -> Result<Vec<f32>> {
	let vector = vectors.into_iter().next().ok_or_else(|| {
		eyre::eyre!("Embedding provider {} returned no vectors.", cfg.provider_id)
	})?;

	if vector.len() != cfg.dimensions as usize {
		return Err(eyre::eyre!(
			"Embedding provider {} returned {} dimensions; expected {}.",
			cfg.provider_id,
			vector.len(),
			cfg.dimensions
		));
	}

	Ok(vector)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Embedding response is missing data array."))?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.and_then(|v| v.as_array())
			.ok_or_else(|| eyre::eyre!("Embedding item missing embedding array."))?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number =
				value.as_f64().ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	fn provider(dimensions: u32) -> EmbeddingProviderConfig {
		EmbeddingProviderConfig {
			provider_id: "local".to_string(),
			api_base: "http://127.0.0.1:1".to_string(),
			api_key: "key".to_string(),
			path: "/embeddings".to_string(),
			model: "m".to_string(),
			dimensions,
			timeout_ms: 1_000,
			default_headers: serde_json::Map::new(),
		}
	}

	#[test]
	fn single_vector_checks_count_and_dimension() {
		let cfg = provider(2);

		assert_eq!(single_vector(&cfg, vec![vec![0.1, 0.2]]).expect("vector"), vec![0.1, 0.2]);

		let err = single_vector(&cfg, vec![vec![0.1]]).expect_err("dimension mismatch");

		assert!(err.to_string().contains("provider local returned 1 dimensions"), "{err}");

		let err = single_vector(&cfg, Vec::new()).expect_err("no vectors");

		assert!(err.to_string().contains("provider local returned no vectors"), "{err}");
	}

	#[test]
	fn rejects_missing_data_array() {
		let json = serde_json::json!({ "object": "list" });

		assert!(parse_embedding_response(json).is_err());
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": ["x"] }] });

		assert!(parse_embedding_response(json).is_err());
	}
}
