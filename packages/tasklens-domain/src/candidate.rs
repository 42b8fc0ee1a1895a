pub mod date_serde;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

const SCORE_SCALE: f64 = 1_000_000.0;

/// Where a result came from, echoed per result and in the response metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
	Semantic,
	SemanticEmpty,
	KeywordFallback,
	SemanticUnavailable,
}
impl SearchMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Semantic => "semantic",
			Self::SemanticEmpty => "semantic-empty",
			Self::KeywordFallback => "keyword-fallback",
			Self::SemanticUnavailable => "semantic-unavailable",
		}
	}
}

/// A task projection returned by a retriever. Semantic retrieval fills `semantic_score`, keyword
/// retrieval fills `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidate {
	pub id: Uuid,
	pub title: String,
	pub status: String,
	pub priority: String,
	#[serde(default, with = "date_serde")]
	pub due_date: Option<Date>,
	pub project_id: Option<String>,
	pub project_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub semantic_score: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
}
impl TaskCandidate {
	/// Title, project name, status, priority and due date joined for substring checks.
	pub fn searchable_text(&self) -> String {
		let mut fields = vec![self.title.as_str()];

		if let Some(project_name) = self.project_name.as_deref() {
			fields.push(project_name);
		}

		fields.push(self.status.as_str());
		fields.push(self.priority.as_str());

		let due = self.due_date.and_then(|date| date_serde::format_date(date).ok());
		let mut text = fields.join(" ");

		if let Some(due) = due {
			text.push(' ');
			text.push_str(&due);
		}

		text.to_lowercase()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTask {
	#[serde(flatten)]
	pub task: TaskCandidate,
	pub final_score: f64,
	pub mode: SearchMode,
}

pub fn round_score(score: f64) -> f64 {
	(score * SCORE_SCALE).round() / SCORE_SCALE
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;

	#[test]
	fn round_score_keeps_six_decimal_places() {
		assert_eq!(round_score(0.123_456_789), 0.123_457);
		assert_eq!(round_score(0.5), 0.5);
	}

	#[test]
	fn searchable_text_includes_every_ranked_field() {
		let task = TaskCandidate {
			id: Uuid::nil(),
			title: "Ship API".to_string(),
			status: "IN_REVIEW".to_string(),
			priority: "HIGH".to_string(),
			due_date: Some(date!(2025 - 03 - 07)),
			project_id: Some("p1".to_string()),
			project_name: Some("Platform".to_string()),
			semantic_score: Some(0.8),
			score: None,
		};

		assert_eq!(task.searchable_text(), "ship api platform in_review high 2025-03-07");
	}

	#[test]
	fn due_date_serializes_as_calendar_date() {
		let task = TaskCandidate {
			id: Uuid::nil(),
			title: "Release".to_string(),
			status: "TODO".to_string(),
			priority: "LOW".to_string(),
			due_date: Some(date!(2025 - 03 - 07)),
			project_id: None,
			project_name: None,
			semantic_score: None,
			score: Some(0.7),
		};
		let json = serde_json::to_value(&task).expect("Failed to serialize task.");

		assert_eq!(json["dueDate"], "2025-03-07");

		let parsed: TaskCandidate = serde_json::from_value(json).expect("Failed to parse task.");

		assert_eq!(parsed.due_date, Some(date!(2025 - 03 - 07)));
	}

	#[test]
	fn ranked_task_flattens_candidate_fields() {
		let ranked = RankedTask {
			task: TaskCandidate {
				id: Uuid::nil(),
				title: "Ship API".to_string(),
				status: "TODO".to_string(),
				priority: "LOW".to_string(),
				due_date: None,
				project_id: None,
				project_name: None,
				semantic_score: None,
				score: Some(0.95),
			},
			final_score: 0.95,
			mode: SearchMode::KeywordFallback,
		};
		let json = serde_json::to_value(&ranked).expect("Failed to serialize ranked task.");

		assert_eq!(json["title"], "Ship API");
		assert_eq!(json["dueDate"], serde_json::Value::Null);
		assert_eq!(json["finalScore"], 0.95);
		assert_eq!(json["mode"], "keyword-fallback");
		assert!(json.get("semanticScore").is_none());
	}
}
