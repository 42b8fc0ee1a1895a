use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
	status::{self, CanonicalStatus},
	tokenize,
};

static BOOLEAN_WORD: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b(and|or)\b").expect("boolean word pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Condition {
	Status(CanonicalStatus),
	Term(String),
}
impl Condition {
	/// Status alias tokens become status conditions; everything else is a free-text term.
	pub fn from_token(token: &str) -> Self {
		match status::resolve_alias(token) {
			Some(status) => Self::Status(status),
			None => Self::Term(token.to_string()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOperator {
	And,
	Or,
}
impl BooleanOperator {
	fn from_word(word: &str) -> Option<Self> {
		match word {
			"and" => Some(Self::And),
			"or" => Some(Self::Or),
			_ => None,
		}
	}
}

/// A parsed query. `operators[i]` joins `conditions[i]` and `conditions[i + 1]`; it is empty when
/// the query uses implicit AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
	pub conditions: Vec<Condition>,
	pub operators: Vec<BooleanOperator>,
	pub has_boolean_operators: bool,
}
impl Expression {
	pub fn parse(query: &str) -> Self {
		let normalized = tokenize::normalize(query);

		if BOOLEAN_WORD.is_match(&normalized) {
			parse_boolean(&normalized)
		} else {
			parse_implicit(&normalized)
		}
	}

	pub fn is_empty(&self) -> bool {
		self.conditions.is_empty()
	}
}

fn parse_implicit(normalized: &str) -> Expression {
	let conditions = tokenize::tokens_of(normalized)
		.iter()
		.map(|token| Condition::from_token(token))
		.collect();

	Expression { conditions, operators: Vec::new(), has_boolean_operators: false }
}

fn parse_boolean(normalized: &str) -> Expression {
	let mut conditions = Vec::new();
	let mut operators = Vec::new();
	let mut pending: Option<BooleanOperator> = None;

	for part in split_keeping_operators(normalized) {
		if let Some(operator) = BooleanOperator::from_word(part) {
			pending = Some(operator);

			continue;
		}

		let tokens = tokenize::tokens_of(part);

		if tokens.is_empty() {
			continue;
		}

		for (idx, token) in tokens.iter().enumerate() {
			if !conditions.is_empty() {
				let operator = if idx == 0 {
					pending.unwrap_or(BooleanOperator::And)
				} else {
					BooleanOperator::And
				};

				operators.push(operator);
			}

			conditions.push(Condition::from_token(token));
		}

		pending = None;
	}

	Expression { conditions, operators, has_boolean_operators: true }
}

fn split_keeping_operators(normalized: &str) -> Vec<&str> {
	let mut parts = Vec::new();
	let mut cursor = 0;

	for found in BOOLEAN_WORD.find_iter(normalized) {
		parts.push(&normalized[cursor..found.start()]);
		parts.push(found.as_str());

		cursor = found.end();
	}

	parts.push(&normalized[cursor..]);

	parts.into_iter().map(str::trim).filter(|part| !part.is_empty()).collect()
}
