use std::sync::LazyLock;

use regex::Regex;

pub const STOPWORDS: &[&str] =
	&["the", "and", "or", "for", "with", "from", "find", "task", "tasks", "status", "is"];

const MIN_TOKEN_CHARS: usize = 2;

static IN_PROGRESS_PHRASE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\bin\s+progress\b").expect("in-progress pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static DISALLOWED_CHARS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^a-z0-9\-_ ]").expect("character class pattern is valid"));

/// Lower-cases the query, folds "in progress" into one token, and removes every character
/// outside `[a-z0-9-_ ]`. Whitespace runs become a single space first so tabs and newlines still
/// separate words.
pub fn normalize(query: &str) -> String {
	let lowered = query.to_lowercase();
	let collapsed = IN_PROGRESS_PHRASE.replace_all(&lowered, "in-progress");
	let spaced = WHITESPACE_RUN.replace_all(&collapsed, " ");
	let stripped = DISALLOWED_CHARS.replace_all(&spaced, "");

	stripped.trim().to_string()
}

pub fn is_stopword(token: &str) -> bool {
	STOPWORDS.contains(&token)
}

pub fn tokenize(query: &str) -> Vec<String> {
	tokens_of(&normalize(query))
}

/// Splits already-normalized text into search tokens.
pub fn tokens_of(normalized: &str) -> Vec<String> {
	normalized
		.split_whitespace()
		.filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
		.filter(|token| !is_stopword(token))
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalize_collapses_in_progress_and_strips_punctuation() {
		assert_eq!(normalize("Tasks  In   Progress!"), "tasks in-progress");
		assert_eq!(normalize("API: v2.0, (urgent)"), "api v20 urgent");
		assert_eq!(normalize("line\tbreak\nhere"), "line break here");
	}

	#[test]
	fn tokenize_drops_stopwords_and_short_tokens() {
		assert_eq!(tokenize("Find the a task for onboarding"), vec!["onboarding".to_string()]);
		assert_eq!(tokenize("status is done"), vec!["done".to_string()]);
		assert!(tokenize("the and or").is_empty());
	}

	#[test]
	fn tokenize_keeps_hyphen_and_underscore_tokens() {
		assert_eq!(
			tokenize("to-do snake_case"),
			vec!["to-do".to_string(), "snake_case".to_string()]
		);
	}
}
