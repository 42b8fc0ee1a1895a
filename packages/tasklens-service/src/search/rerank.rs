use tasklens_config::Ranking;
use tasklens_domain::{
	CanonicalStatus, Expression, RankedTask, SearchMode, TaskCandidate,
	candidate::round_score,
	evaluate::evaluate,
	status::resolve_alias,
};

/// Parsed query state shared by every candidate in one rerank pass.
#[derive(Debug, Clone, Copy)]
pub struct RerankContext<'a> {
	pub query: &'a str,
	pub expression: &'a Expression,
	pub tokens: &'a [String],
	pub status_filter: Option<CanonicalStatus>,
	pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalEvidence {
	pub coverage: f64,
	pub exact_phrase_boost: f64,
}

/// Blends semantic similarity with lexical evidence and drops candidates that fail any gate.
/// Candidates without a semantic score are ignored.
pub fn rerank(
	candidates: Vec<TaskCandidate>,
	ctx: RerankContext<'_>,
	ranking: &Ranking,
) -> Vec<RankedTask> {
	let query = ctx.query.to_lowercase();
	let term_tokens: Vec<&str> = ctx
		.tokens
		.iter()
		.map(String::as_str)
		.filter(|token| resolve_alias(token).is_none())
		.collect();
	let mut ranked = Vec::with_capacity(candidates.len());

	for task in candidates {
		let Some(semantic_score) = task.semantic_score else { continue };

		if semantic_score < ranking.min_semantic_score {
			continue;
		}

		let evidence = lexical_evidence(&task, &query, ctx.tokens, ranking);

		if !ctx.tokens.is_empty() && evidence.coverage < ranking.min_coverage {
			continue;
		}
		if requires_title_hit(&ctx, &term_tokens) && !title_contains_any(&task, &term_tokens) {
			continue;
		}
		if !evaluate(&task, ctx.expression) {
			continue;
		}

		let lexical_boost =
			evidence.coverage * ranking.coverage_weight + evidence.exact_phrase_boost;
		let final_score = round_score(semantic_score * ranking.semantic_weight + lexical_boost);

		ranked.push(RankedTask { task, final_score, mode: SearchMode::Semantic });
	}

	ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
	ranked.truncate(ctx.limit);

	ranked
}

/// Token coverage over the searchable text plus the exact phrase boost. `query` must already be
/// lower-cased.
pub fn lexical_evidence(
	task: &TaskCandidate,
	query: &str,
	tokens: &[String],
	ranking: &Ranking,
) -> LexicalEvidence {
	let coverage = if tokens.is_empty() {
		0.0
	} else {
		let text = task.searchable_text();
		let hits = tokens.iter().filter(|token| text.contains(token.as_str())).count();

		hits as f64 / tokens.len() as f64
	};
	let exact_phrase_boost = if phrase_in_title_or_project(task, query) {
		ranking.exact_phrase_boost
	} else {
		0.0
	};

	LexicalEvidence { coverage, exact_phrase_boost }
}

fn phrase_in_title_or_project(task: &TaskCandidate, query: &str) -> bool {
	if query.is_empty() {
		return false;
	}

	task.title.to_lowercase().contains(query)
		|| task.project_name.as_deref().is_some_and(|name| name.to_lowercase().contains(query))
}

// A plain query that names a status and other words must hit the title with one of those words.
fn requires_title_hit(ctx: &RerankContext<'_>, term_tokens: &[&str]) -> bool {
	!ctx.expression.has_boolean_operators && ctx.status_filter.is_some() && !term_tokens.is_empty()
}

fn title_contains_any(task: &TaskCandidate, term_tokens: &[&str]) -> bool {
	let title = task.title.to_lowercase();

	term_tokens.iter().any(|token| title.contains(token))
}
