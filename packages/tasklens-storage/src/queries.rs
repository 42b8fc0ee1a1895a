use sqlx::PgPool;
use uuid::Uuid;

use crate::{Error, Result, models::TaskRow};

/// Literal-match retrieval request. `patterns` are raw search words; they are escaped and wrapped
/// in `%` before reaching SQL.
#[derive(Debug, Clone, Copy)]
pub struct KeywordQuery<'a> {
	pub tenant_id: &'a str,
	pub patterns: &'a [String],
	pub project_id: Option<&'a str>,
	pub status: Option<&'a str>,
	pub limit: u32,
}

/// Loads tasks by id within one tenant. Rows come back in the order of `task_ids`; ids that are
/// missing or belong to another tenant are dropped.
pub async fn fetch_tasks_by_ids(
	pool: &PgPool,
	tenant_id: &str,
	task_ids: &[Uuid],
) -> Result<Vec<TaskRow>> {
	if task_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<TaskRow> = sqlx::query_as(
		"\
SELECT
	t.task_id,
	t.title,
	t.status,
	t.priority,
	t.due_date,
	t.project_id,
	p.name AS project_name,
	NULL::float8 AS score
FROM tasks t
LEFT JOIN projects p ON p.tenant_id = t.tenant_id AND p.project_id = t.project_id
WHERE t.tenant_id = $1
	AND t.task_id = ANY($2)",
	)
	.bind(tenant_id)
	.bind(task_ids)
	.fetch_all(pool)
	.await?;

	Ok(order_by_ids(rows, task_ids))
}

/// Tiered literal match: title, project name, description, status, priority, due date, then any
/// id hit. Ordered by tier score, then most recently updated.
pub async fn keyword_search(pool: &PgPool, query: KeywordQuery<'_>) -> Result<Vec<TaskRow>> {
	let patterns = like_patterns(query.patterns);

	if patterns.is_empty() {
		return Err(Error::InvalidArgument("Keyword search requires a pattern.".to_string()));
	}

	let rows = sqlx::query_as(
		"\
SELECT task_id, title, status, priority, due_date, project_id, project_name, score
FROM (
	SELECT
		t.task_id,
		t.title,
		t.status,
		t.priority,
		t.due_date,
		t.project_id,
		p.name AS project_name,
		t.updated_at,
		(CASE
			WHEN t.title ILIKE ANY($2) THEN 0.95
			WHEN p.name ILIKE ANY($2) THEN 0.9
			WHEN t.description ILIKE ANY($2) THEN 0.75
			WHEN t.status ILIKE ANY($2) THEN 0.72
			WHEN t.priority ILIKE ANY($2) THEN 0.71
			WHEN to_char(t.due_date, 'YYYY-MM-DD') ILIKE ANY($2) THEN 0.7
			WHEN t.task_id::text ILIKE ANY($2) OR t.project_id ILIKE ANY($2) THEN 0.6
			ELSE NULL
		END)::float8 AS score
	FROM tasks t
	LEFT JOIN projects p ON p.tenant_id = t.tenant_id AND p.project_id = t.project_id
	WHERE t.tenant_id = $1
		AND ($3::text IS NULL OR t.project_id = $3)
		AND ($4::text IS NULL OR upper(t.status) = $4)
) matched
WHERE score IS NOT NULL
ORDER BY score DESC, updated_at DESC
LIMIT $5",
	)
	.bind(query.tenant_id)
	.bind(patterns)
	.bind(query.project_id)
	.bind(query.status)
	.bind(i64::from(query.limit))
	.fetch_all(pool)
	.await?;

	Ok(rows)
}

pub async fn tenant_timezone(pool: &PgPool, tenant_id: &str) -> Result<Option<String>> {
	let timezone = sqlx::query_scalar("SELECT timezone FROM tenants WHERE tenant_id = $1")
		.bind(tenant_id)
		.fetch_optional(pool)
		.await?;

	Ok(timezone)
}

/// Wraps each non-blank pattern as `%pattern%` with LIKE metacharacters escaped.
pub fn like_patterns(patterns: &[String]) -> Vec<String> {
	let mut out = Vec::with_capacity(patterns.len());

	for pattern in patterns {
		let trimmed = pattern.trim();

		if trimmed.is_empty() {
			continue;
		}

		let mut escaped = String::with_capacity(trimmed.len() + 2);

		escaped.push('%');

		for ch in trimmed.chars() {
			if matches!(ch, '\\' | '%' | '_') {
				escaped.push('\\');
			}

			escaped.push(ch);
		}

		escaped.push('%');
		out.push(escaped);
	}

	out
}

fn order_by_ids(rows: Vec<TaskRow>, task_ids: &[Uuid]) -> Vec<TaskRow> {
	let mut slots: Vec<Option<TaskRow>> = vec![None; task_ids.len()];

	for row in rows {
		if let Some(idx) = task_ids.iter().position(|id| *id == row.task_id) {
			slots[idx] = Some(row);
		}
	}

	slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(task_id: Uuid) -> TaskRow {
		TaskRow {
			task_id,
			title: "t".to_string(),
			status: "TODO".to_string(),
			priority: "LOW".to_string(),
			due_date: None,
			project_id: None,
			project_name: None,
			score: None,
		}
	}

	#[test]
	fn like_patterns_escape_metacharacters() {
		let patterns =
			like_patterns(&["snake_case".to_string(), "100%".to_string(), "  ".to_string()]);

		assert_eq!(patterns, vec!["%snake\\_case%".to_string(), "%100\\%%".to_string()]);
	}

	#[test]
	fn order_by_ids_follows_requested_order() {
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();
		let c = Uuid::new_v4();
		let ordered = order_by_ids(vec![row(c), row(a)], &[a, b, c]);
		let ids: Vec<Uuid> = ordered.iter().map(|row| row.task_id).collect();

		assert_eq!(ids, vec![a, c]);
	}
}
