use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Lexical variants mapped onto canonical task statuses. Lookups are exact and case-sensitive on
/// already-normalized tokens.
pub const STATUS_ALIASES: &[(&str, CanonicalStatus)] = &[
	("todo", CanonicalStatus::Todo),
	("to-do", CanonicalStatus::Todo),
	("open", CanonicalStatus::Todo),
	("pending", CanonicalStatus::Todo),
	("inprogress", CanonicalStatus::InProgress),
	("in-progress", CanonicalStatus::InProgress),
	("progress", CanonicalStatus::InProgress),
	("review", CanonicalStatus::InReview),
	("blocked", CanonicalStatus::Blocked),
	("done", CanonicalStatus::Done),
	("completed", CanonicalStatus::Done),
	("complete", CanonicalStatus::Done),
	("cancelled", CanonicalStatus::Cancelled),
	("canceled", CanonicalStatus::Cancelled),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalStatus {
	Todo,
	InProgress,
	InReview,
	Blocked,
	Done,
	Cancelled,
}
impl CanonicalStatus {
	pub const ALL: [Self; 6] =
		[Self::Todo, Self::InProgress, Self::InReview, Self::Blocked, Self::Done, Self::Cancelled];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Todo => "TODO",
			Self::InProgress => "IN_PROGRESS",
			Self::InReview => "IN_REVIEW",
			Self::Blocked => "BLOCKED",
			Self::Done => "DONE",
			Self::Cancelled => "CANCELLED",
		}
	}

	/// Parses a caller-supplied status filter. Accepts canonical spellings in any case
	/// (`in_progress`, `IN PROGRESS`) as well as every alias in [`STATUS_ALIASES`].
	pub fn parse(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();

		if trimmed.is_empty() {
			return None;
		}

		let canonical = trimmed.to_ascii_uppercase().replace([' ', '-'], "_");

		if let Some(status) = Self::ALL.into_iter().find(|status| status.as_str() == canonical) {
			return Some(status);
		}

		let lowered = trimmed.to_ascii_lowercase();
		let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join("-");

		resolve_alias(&collapsed)
	}
}
impl Display for CanonicalStatus {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

pub fn resolve_alias(token: &str) -> Option<CanonicalStatus> {
	STATUS_ALIASES.iter().find(|(alias, _)| *alias == token).map(|(_, status)| *status)
}

/// Returns the status named by the first token that is a known alias.
pub fn infer_status(tokens: &[String]) -> Option<CanonicalStatus> {
	tokens.iter().find_map(|token| resolve_alias(token))
}
