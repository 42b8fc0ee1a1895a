use time::macros::date;

use tasklens_config::Postgres;
use tasklens_storage::{
	db::Db,
	qdrant::{DENSE_VECTOR_NAME, QdrantStore, TaskVectorFilter},
	queries::{self, KeywordQuery},
};
use tasklens_testkit::{
	TestDatabase,
	fixtures::{self, TaskFixture},
};

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TASKLENS_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = tasklens_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set TASKLENS_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	db.ensure_schema().await.expect("Schema bootstrap must be idempotent.");

	let count: i64 = sqlx::query_scalar(
		"\
SELECT count(*)
FROM information_schema.tables
WHERE table_name IN ('tenants', 'projects', 'tasks')",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 3);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TASKLENS_PG_DSN to run."]
async fn keyword_search_ranks_title_hits_first_and_stays_in_tenant() {
	let Some(base_dsn) = tasklens_testkit::env_dsn() else {
		eprintln!("Skipping keyword_search_ranks_title_hits_first_and_stays_in_tenant.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	fixtures::insert_project(&db.pool, "tenant-a", "billing", "Billing Revamp")
		.await
		.expect("Failed to insert project.");

	let title_hit = TaskFixture::new("tenant-a", "Invoice export fails");
	let project_hit = TaskFixture::new("tenant-a", "Rotate keys").project("billing");
	let description_hit =
		TaskFixture::new("tenant-a", "Cleanup").description("old invoice templates");
	let other_tenant = TaskFixture::new("tenant-b", "Invoice totals");

	for task in [&title_hit, &project_hit, &description_hit, &other_tenant] {
		fixtures::insert_task(&db.pool, task).await.expect("Failed to insert task.");
	}

	let patterns = vec!["invoice".to_string(), "billing".to_string()];
	let rows = queries::keyword_search(
		&db.pool,
		KeywordQuery {
			tenant_id: "tenant-a",
			patterns: &patterns,
			project_id: None,
			status: None,
			limit: 10,
		},
	)
	.await
	.expect("Keyword search failed.");
	let ids: Vec<_> = rows.iter().map(|row| row.task_id).collect();

	assert_eq!(ids, vec![title_hit.task_id, project_hit.task_id, description_hit.task_id]);
	assert_eq!(rows[0].score, Some(0.95));
	assert_eq!(rows[1].score, Some(0.9));
	assert_eq!(rows[1].project_name.as_deref(), Some("Billing Revamp"));
	assert_eq!(rows[2].score, Some(0.75));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TASKLENS_PG_DSN to run."]
async fn keyword_search_applies_status_and_project_filters() {
	let Some(base_dsn) = tasklens_testkit::env_dsn() else {
		eprintln!("Skipping keyword_search_applies_status_and_project_filters.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let blocked = TaskFixture::new("tenant-a", "Deploy api").project("ops").status("BLOCKED");
	let todo = TaskFixture::new("tenant-a", "Deploy web").project("ops");
	let elsewhere = TaskFixture::new("tenant-a", "Deploy docs").status("BLOCKED");

	for task in [&blocked, &todo, &elsewhere] {
		fixtures::insert_task(&db.pool, task).await.expect("Failed to insert task.");
	}

	let patterns = vec!["deploy".to_string()];
	let rows = queries::keyword_search(
		&db.pool,
		KeywordQuery {
			tenant_id: "tenant-a",
			patterns: &patterns,
			project_id: Some("ops"),
			status: Some("BLOCKED"),
			limit: 10,
		},
	)
	.await
	.expect("Keyword search failed.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].task_id, blocked.task_id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TASKLENS_PG_DSN to run."]
async fn fetch_by_ids_keeps_order_and_tenant_scope() {
	let Some(base_dsn) = tasklens_testkit::env_dsn() else {
		eprintln!("Skipping fetch_by_ids_keeps_order_and_tenant_scope.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let first = TaskFixture::new("tenant-a", "First").due_date(date!(2026 - 03 - 01));
	let second = TaskFixture::new("tenant-a", "Second");
	let foreign = TaskFixture::new("tenant-b", "Foreign");

	for task in [&first, &second, &foreign] {
		fixtures::insert_task(&db.pool, task).await.expect("Failed to insert task.");
	}

	let rows = queries::fetch_tasks_by_ids(
		&db.pool,
		"tenant-a",
		&[second.task_id, foreign.task_id, first.task_id],
	)
	.await
	.expect("Hydration failed.");
	let ids: Vec<_> = rows.iter().map(|row| row.task_id).collect();

	assert_eq!(ids, vec![second.task_id, first.task_id]);
	assert_eq!(rows[1].due_date, Some(date!(2026 - 03 - 01)));
	assert!(rows.iter().all(|row| row.score.is_none()));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TASKLENS_PG_DSN to run."]
async fn tenant_timezone_reads_configured_zone() {
	let Some(base_dsn) = tasklens_testkit::env_dsn() else {
		eprintln!("Skipping tenant_timezone_reads_configured_zone.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	fixtures::insert_tenant(&db.pool, "tenant-a", "Asia/Tokyo")
		.await
		.expect("Failed to insert tenant.");

	let known = queries::tenant_timezone(&db.pool, "tenant-a").await.expect("Lookup failed.");
	let unknown = queries::tenant_timezone(&db.pool, "tenant-z").await.expect("Lookup failed.");

	assert_eq!(known.as_deref(), Some("Asia/Tokyo"));
	assert_eq!(unknown, None);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set TASKLENS_PG_DSN and TASKLENS_QDRANT_URL."]
async fn vector_search_filters_by_tenant() {
	let (Some(base_dsn), Some(qdrant_url)) =
		(tasklens_testkit::env_dsn(), tasklens_testkit::env_qdrant_url())
	else {
		eprintln!("Skipping vector_search_filters_by_tenant; set TASKLENS_QDRANT_URL to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let collection = test_db.collection_name("tasklens_tasks");
	let store = QdrantStore::new(&tasklens_config::Qdrant {
		url: qdrant_url,
		collection: collection.clone(),
		vector_dim: 3,
	})
	.expect("Failed to build Qdrant client.");

	fixtures::create_task_collection(&store.client, &collection, DENSE_VECTOR_NAME, 3)
		.await
		.expect("Failed to create collection.");

	let mine = TaskFixture::new("tenant-a", "Mine");
	let theirs = TaskFixture::new("tenant-b", "Theirs");

	for task in [&mine, &theirs] {
		fixtures::upsert_task_point(
			&store.client,
			&collection,
			DENSE_VECTOR_NAME,
			task,
			vec![1.0, 0.0, 0.0],
		)
		.await
		.expect("Failed to upsert point.");
	}

	let hits = store
		.search_tasks(
			vec![1.0, 0.0, 0.0],
			TaskVectorFilter { tenant_id: "tenant-a", project_id: None, status: None },
			10,
		)
		.await
		.expect("Vector search failed.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].task_id, mine.task_id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
