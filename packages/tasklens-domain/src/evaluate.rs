use crate::{BooleanOperator, Condition, Expression, TaskCandidate};

/// Evaluates `expression` against one task. An expression without conditions matches everything.
/// Conditions fold strictly left to right with no precedence, so `a or b and c` means
/// `(a or b) and c`.
pub fn evaluate(task: &TaskCandidate, expression: &Expression) -> bool {
	let mut conditions = expression.conditions.iter();
	let Some(first) = conditions.next() else { return true };
	let mut acc = condition_matches(task, first);

	for (idx, condition) in conditions.enumerate() {
		let operator = expression.operators.get(idx).copied().unwrap_or(BooleanOperator::And);
		let matched = condition_matches(task, condition);

		acc = match operator {
			BooleanOperator::And => acc && matched,
			BooleanOperator::Or => acc || matched,
		};
	}

	acc
}

pub fn condition_matches(task: &TaskCandidate, condition: &Condition) -> bool {
	match condition {
		Condition::Status(status) => task.status.to_uppercase() == status.as_str(),
		Condition::Term(term) => term_matches(task, term),
	}
}

fn term_matches(task: &TaskCandidate, term: &str) -> bool {
	let term = term.to_lowercase();

	[Some(task.title.as_str()), task.project_name.as_deref(), Some(task.priority.as_str())]
		.into_iter()
		.flatten()
		.any(|field| field.to_lowercase().contains(&term))
}
