use time::Date;
use uuid::Uuid;

/// Task projection shared by hydration and keyword queries. `score` is only set by keyword
/// retrieval.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
	pub task_id: Uuid,
	pub title: String,
	pub status: String,
	pub priority: String,
	pub due_date: Option<Date>,
	pub project_id: Option<String>,
	pub project_name: Option<String>,
	pub score: Option<f64>,
}
