use std::collections::HashSet;

use uuid::Uuid;

use tasklens_domain::{
	CanonicalStatus, Condition, Expression, RankedTask, SearchMode, TaskCandidate,
	candidate::round_score,
	evaluate::{condition_matches, evaluate},
};

/// Turns keyword rows into results, keeping retriever order.
///
/// The retriever already matched every row on some field (description, due date and ids
/// included), so term conditions are not re-checked for implicit-AND queries; those rows only
/// have to agree with the status filter. Boolean queries still go through the full expression.
pub fn rank_keyword_rows(
	rows: Vec<TaskCandidate>,
	expression: &Expression,
	status_filter: Option<CanonicalStatus>,
	limit: usize,
) -> Vec<RankedTask> {
	rows.into_iter()
		.filter(|task| keyword_row_allowed(task, expression, status_filter))
		.take(limit)
		.map(|task| {
			let final_score = round_score(task.score.unwrap_or(0.0));

			RankedTask { task, final_score, mode: SearchMode::KeywordFallback }
		})
		.collect()
}

fn keyword_row_allowed(
	task: &TaskCandidate,
	expression: &Expression,
	status_filter: Option<CanonicalStatus>,
) -> bool {
	if expression.has_boolean_operators {
		return evaluate(task, expression);
	}

	status_filter.is_none_or(|status| condition_matches(task, &Condition::Status(status)))
}

/// Appends keyword results the semantic pass did not return, after every semantic result.
pub fn supplement(
	semantic: Vec<RankedTask>,
	keyword: Vec<RankedTask>,
	limit: usize,
) -> Vec<RankedTask> {
	let mut seen: HashSet<Uuid> = semantic.iter().map(|ranked| ranked.task.id).collect();
	let mut merged = semantic;

	for ranked in keyword {
		if merged.len() >= limit {
			break;
		}
		if seen.insert(ranked.task.id) {
			merged.push(ranked);
		}
	}

	merged.truncate(limit);

	merged
}
