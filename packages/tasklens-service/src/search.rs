pub mod merge;
pub mod rerank;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time;

use crate::{BoxFuture, Error, KeywordFetch, Result, SemanticFetch, TaskSearchService};
use tasklens_domain::{
	CanonicalStatus, Expression, RankedTask, SearchMode, TaskCandidate, status::infer_status,
	tokenize::tokenize,
};
use rerank::RerankContext;

const SEMANTIC_UNAVAILABLE_MESSAGE: &str =
	"Semantic search is temporarily unavailable. Retry shortly or narrow the query.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub limit: Option<i64>,
	#[serde(default)]
	pub project_id: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub tenant_id: Option<String>,
}

/// Tenant identities established outside the request body.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
	pub authenticated_tenant: Option<String>,
	pub header_tenant: Option<String>,
}
impl TenantContext {
	/// The authenticated tenant, provided every declared tenant agrees with it.
	pub fn resolve(&self, requested_tenant: Option<&str>) -> Result<String> {
		let Some(tenant_id) = non_blank(self.authenticated_tenant.as_deref()) else {
			return Err(Error::Unauthorized { message: "Tenant context is required.".to_string() });
		};

		if let Some(header) = non_blank(self.header_tenant.as_deref())
			&& header != tenant_id
		{
			return Err(Error::TenantMismatch {
				message: "Header tenant does not match the authenticated tenant.".to_string(),
			});
		}
		if let Some(requested) = non_blank(requested_tenant)
			&& requested != tenant_id
		{
			return Err(Error::TenantMismatch {
				message: "Requested tenant does not match the authenticated tenant.".to_string(),
			});
		}

		Ok(tenant_id.to_string())
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
	pub total: usize,
	pub query: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	pub tenant_id: String,
	pub timezone: String,
	pub mode: SearchMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	pub data: Vec<RankedTask>,
	pub meta: SearchMeta,
}

/// Everything derived from a validated request before any retrieval happens.
#[derive(Debug, Clone)]
struct SearchPlan {
	tenant_id: String,
	query: String,
	limit: u32,
	project_id: Option<String>,
	status_filter: Option<CanonicalStatus>,
	expression: Expression,
	tokens: Vec<String>,
}
impl SearchPlan {
	fn needs_supplement(&self) -> bool {
		self.expression.has_boolean_operators || self.tokens.len() > 1
	}

	fn keyword_patterns(&self) -> Vec<String> {
		if self.tokens.is_empty() {
			vec![self.query.to_lowercase()]
		} else {
			self.tokens.clone()
		}
	}
}

struct Outcome {
	data: Vec<RankedTask>,
	mode: SearchMode,
}

impl TaskSearchService {
	pub async fn search(&self, ctx: &TenantContext, req: SearchRequest) -> Result<SearchResponse> {
		let started = Instant::now();
		let plan = self.plan(ctx, req)?;

		tracing::debug!(
			tenant_id = %plan.tenant_id,
			expression = ?plan.expression,
			tokens = ?plan.tokens,
			status_filter = plan.status_filter.map(CanonicalStatus::as_str),
			limit = plan.limit,
			"Search plan built."
		);

		let (outcome, timezone) =
			tokio::join!(self.execute(&plan), self.timezone(&plan.tenant_id));
		let outcome = outcome?;

		tracing::info!(
			tenant_id = %plan.tenant_id,
			mode = outcome.mode.as_str(),
			total = outcome.data.len(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Search completed."
		);

		Ok(SearchResponse {
			meta: SearchMeta {
				total: outcome.data.len(),
				query: plan.query,
				status: plan.status_filter.map(|status| status.as_str().to_string()),
				tenant_id: plan.tenant_id,
				timezone,
				mode: outcome.mode,
			},
			data: outcome.data,
		})
	}

	fn plan(&self, ctx: &TenantContext, req: SearchRequest) -> Result<SearchPlan> {
		let tenant_id = ctx.resolve(req.tenant_id.as_deref())?;
		let search = &self.cfg.search;
		let query = req.query.trim().to_string();

		if query.chars().count() < search.min_query_chars as usize {
			return Err(Error::InvalidRequest {
				message: format!(
					"query must be at least {} characters long.",
					search.min_query_chars
				),
			});
		}

		let limit = req
			.limit
			.unwrap_or(i64::from(search.default_limit))
			.clamp(1, i64::from(search.max_limit)) as u32;
		let explicit_status = match non_blank(req.status.as_deref()) {
			Some(raw) => Some(CanonicalStatus::parse(raw).ok_or_else(|| Error::InvalidRequest {
				message: format!("status {raw:?} is not a recognized task status."),
			})?),
			None => None,
		};
		let project_id = non_blank(req.project_id.as_deref()).map(str::to_string);
		let expression = Expression::parse(&query);
		let tokens = tokenize(&query);
		let status_filter = explicit_status.or_else(|| {
			if expression.has_boolean_operators { None } else { infer_status(&tokens) }
		});

		Ok(SearchPlan { tenant_id, query, limit, project_id, status_filter, expression, tokens })
	}

	async fn execute(&self, plan: &SearchPlan) -> Result<Outcome> {
		let search = &self.cfg.search;

		if !search.semantic_enabled {
			if !search.allow_keyword_fallback {
				tracing::warn!(
					tenant_id = %plan.tenant_id,
					"Semantic search is disabled and keyword fallback is not allowed."
				);

				return Err(semantic_unavailable());
			}

			let rows = self.keyword(plan).await.map_err(|err| {
				log_upstream_failure(plan, "keyword", &err);

				semantic_unavailable()
			})?;

			return Ok(self.keyword_outcome(plan, rows));
		}

		let (semantic, mut keyword) = if plan.needs_supplement() {
			let (semantic, keyword) = tokio::join!(self.semantic(plan), self.keyword(plan));

			(semantic, Some(keyword))
		} else {
			(self.semantic(plan).await, None)
		};
		let candidates = match semantic {
			Ok(candidates) => candidates,
			Err(err) => {
				log_upstream_failure(plan, "embedding", &err);

				if !search.allow_keyword_fallback {
					return Err(semantic_unavailable());
				}

				let rows = self.cached_keyword(plan, keyword.take()).await.map_err(|err| {
					log_upstream_failure(plan, "keyword", &err);

					semantic_unavailable()
				})?;

				return Ok(self.keyword_outcome(plan, rows));
			},
		};
		let ranked = rerank::rerank(
			candidates,
			RerankContext {
				query: &plan.query,
				expression: &plan.expression,
				tokens: &plan.tokens,
				status_filter: plan.status_filter,
				limit: plan.limit as usize,
			},
			&self.cfg.ranking,
		);

		if ranked.is_empty() {
			if search.allow_keyword_fallback {
				match self.cached_keyword(plan, keyword.take()).await {
					Ok(rows) => {
						let outcome = self.keyword_outcome(plan, rows);

						if !outcome.data.is_empty() {
							return Ok(outcome);
						}
					},
					Err(err) => log_upstream_failure(plan, "keyword", &err),
				}
			}

			return Ok(Outcome { data: Vec::new(), mode: SearchMode::SemanticEmpty });
		}

		let data = match keyword {
			Some(Ok(rows)) => {
				let limit = plan.limit as usize;

				merge::supplement(
					ranked,
					merge::rank_keyword_rows(rows, &plan.expression, plan.status_filter, limit),
					limit,
				)
			},
			Some(Err(err)) => {
				log_upstream_failure(plan, "keyword", &err);

				ranked
			},
			None => ranked,
		};

		Ok(Outcome { data, mode: SearchMode::Semantic })
	}

	async fn semantic(&self, plan: &SearchPlan) -> Result<Vec<TaskCandidate>> {
		let search = &self.cfg.search;
		let limit =
			plan.limit.saturating_mul(search.candidate_multiplier).min(search.max_candidates);
		let fetch = self.retrievers.embedding.fetch(SemanticFetch {
			tenant_id: &plan.tenant_id,
			query_text: &plan.query,
			project_id: plan.project_id.as_deref(),
			status: plan.status_filter,
			limit,
		});

		with_timeout("embedding", search.semantic_timeout_ms, fetch).await
	}

	async fn keyword(&self, plan: &SearchPlan) -> Result<Vec<TaskCandidate>> {
		let patterns = plan.keyword_patterns();
		let fetch = self.retrievers.keyword.fetch(KeywordFetch {
			tenant_id: &plan.tenant_id,
			patterns: &patterns,
			project_id: plan.project_id.as_deref(),
			status: plan.status_filter,
			limit: plan.limit,
		});

		with_timeout("keyword", self.cfg.search.keyword_timeout_ms, fetch).await
	}

	async fn cached_keyword(
		&self,
		plan: &SearchPlan,
		cached: Option<Result<Vec<TaskCandidate>>>,
	) -> Result<Vec<TaskCandidate>> {
		match cached {
			Some(result) => result,
			None => self.keyword(plan).await,
		}
	}

	fn keyword_outcome(&self, plan: &SearchPlan, rows: Vec<TaskCandidate>) -> Outcome {
		let data = merge::rank_keyword_rows(
			rows,
			&plan.expression,
			plan.status_filter,
			plan.limit as usize,
		);

		Outcome { data, mode: SearchMode::KeywordFallback }
	}

	async fn timezone(&self, tenant_id: &str) -> String {
		let default = &self.cfg.service.default_timezone;
		let lookup = self.retrievers.timezone.timezone(tenant_id);

		match with_timeout("timezone", self.cfg.search.keyword_timeout_ms, lookup).await {
			Ok(Some(timezone)) if !timezone.trim().is_empty() => timezone,
			Ok(_) => default.clone(),
			Err(err) => {
				tracing::warn!(
					tenant_id,
					error = %err,
					"Tenant timezone lookup failed; using the default timezone."
				);

				default.clone()
			},
		}
	}
}

async fn with_timeout<T>(
	collaborator: &'static str,
	timeout_ms: u64,
	fut: BoxFuture<'_, Result<T>>,
) -> Result<T> {
	match time::timeout(Duration::from_millis(timeout_ms), fut).await {
		Ok(result) => result,
		Err(_) => Err(Error::Timeout {
			message: format!("{collaborator} call exceeded {timeout_ms} ms."),
		}),
	}
}

fn log_upstream_failure(plan: &SearchPlan, collaborator: &'static str, err: &Error) {
	tracing::warn!(
		tenant_id = %plan.tenant_id,
		collaborator,
		error = %err,
		"Retrieval call failed."
	);
}

fn semantic_unavailable() -> Error {
	Error::SemanticUnavailable { message: SEMANTIC_UNAVAILABLE_MESSAGE.to_string() }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
