use uuid::Uuid;

use tasklens_domain::{
	BooleanOperator, CanonicalStatus, Condition, Expression, TaskCandidate, evaluate, status,
	tokenize,
};

fn task(title: &str, status: &str) -> TaskCandidate {
	TaskCandidate {
		id: Uuid::new_v4(),
		title: title.to_string(),
		status: status.to_string(),
		priority: "MEDIUM".to_string(),
		due_date: None,
		project_id: Some("proj-1".to_string()),
		project_name: Some("Core".to_string()),
		semantic_score: Some(0.7),
		score: None,
	}
}

#[test]
fn queries_without_boolean_words_use_implicit_and() {
	for query in ["onboarding checklist", "find todo", "android orders", "handoff notes", "x"] {
		let expr = Expression::parse(query);

		assert!(!expr.has_boolean_operators, "Unexpected boolean mode for {query:?}.");
		assert!(expr.operators.is_empty(), "Unexpected operators for {query:?}.");
	}
}

#[test]
fn find_todo_is_a_single_status_condition() {
	let expr = Expression::parse("find todo");

	assert_eq!(expr.conditions, vec![Condition::Status(CanonicalStatus::Todo)]);
	assert!(evaluate::evaluate(&task("Anything", "TODO"), &expr));
	assert!(!evaluate::evaluate(&task("Anything", "DONE"), &expr));
}

#[test]
fn todo_and_api_requires_both_conditions() {
	let expr = Expression::parse("todo and api");

	assert_eq!(
		expr.conditions,
		vec![Condition::Status(CanonicalStatus::Todo), Condition::Term("api".to_string())]
	);
	assert_eq!(expr.operators, vec![BooleanOperator::And]);
	assert!(evaluate::evaluate(&task("Document API limits", "TODO"), &expr));
	assert!(!evaluate::evaluate(&task("UI polish task", "TODO"), &expr));
}

#[test]
fn polish_or_todo_matches_either_condition() {
	let expr = Expression::parse("find polish or todo");

	assert_eq!(
		expr.conditions,
		vec![Condition::Term("polish".to_string()), Condition::Status(CanonicalStatus::Todo)]
	);
	assert_eq!(expr.operators, vec![BooleanOperator::Or]);
	assert!(evaluate::evaluate(&task("Polish account settings UI", "IN_REVIEW"), &expr));
	assert!(evaluate::evaluate(&task("Implement endpoint", "TODO"), &expr));
	assert!(!evaluate::evaluate(&task("Implement endpoint", "DONE"), &expr));
}

#[test]
fn parse_is_deterministic() {
	for query in ["todo and api or blocked", "find polish or todo", "in progress login"] {
		assert_eq!(Expression::parse(query), Expression::parse(query));
	}
}

#[test]
fn stopword_only_query_matches_everything() {
	let expr = Expression::parse("find the tasks");

	assert!(expr.is_empty());
	assert!(evaluate::evaluate(&task("Anything", "CANCELLED"), &expr));
}

#[test]
fn boolean_mode_always_has_one_operator_per_gap() {
	for query in ["a or b and c", "login and signup page or done", "api and or export", "and"] {
		let expr = Expression::parse(query);

		assert!(expr.has_boolean_operators);
		assert_eq!(
			expr.operators.len(),
			expr.conditions.len().saturating_sub(1),
			"Operator count mismatch for {query:?}."
		);
	}
}

#[test]
fn implicit_status_is_inferred_from_first_alias() {
	let tokens = tokenize::tokenize("login page in progress then done");

	assert_eq!(status::infer_status(&tokens), Some(CanonicalStatus::InProgress));
}
