use serde_json::{Value, json};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;
use zero_strikes_admin::{
    InMemoryRepository, Record, RepoError, Resource,
    repository::{PostgresRepository, Repository},
    resource::record_id,
};

// --- Test Utilities ---

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn titles(rows: &[Record]) -> Vec<Value> {
    rows.iter().map(|r| r["title"].clone()).collect()
}

// --- In-memory collaborator ---

#[test]
async fn test_in_memory_list_orders_desc_with_nulls_last() {
    let repo = InMemoryRepository::new();
    repo.seed(Resource::Blogs, record(json!({ "title": "Mid", "date": "2025-01-25" })));
    repo.seed(Resource::Blogs, record(json!({ "title": "Undated", "date": null })));
    repo.seed(Resource::Blogs, record(json!({ "title": "New", "date": "2025-01-28" })));
    repo.seed(Resource::Blogs, record(json!({ "title": "Old", "date": "2025-01-20" })));

    let rows = repo.list(Resource::Blogs, "date", false, None).await.unwrap();
    assert_eq!(titles(&rows), vec![json!("New"), json!("Mid"), json!("Old"), json!("Undated")]);

    let limited = repo.list(Resource::Blogs, "date", true, Some(2)).await.unwrap();
    assert_eq!(titles(&limited), vec![json!("Old"), json!("Mid")]);
}

#[test]
async fn test_in_memory_rejects_unknown_sort_column() {
    let repo = InMemoryRepository::new();

    let result = repo.list(Resource::Players, "password", false, None).await;

    assert!(matches!(result, Err(RepoError::UnknownColumn { .. })));
}

#[test]
async fn test_in_memory_insert_ignores_generated_and_foreign_columns() {
    let repo = InMemoryRepository::new();
    let forged = Uuid::new_v4();

    let row = repo
        .insert(
            Resource::Sponsors,
            record(json!({ "id": forged.to_string(), "name": "HyperX", "is_admin": true })),
        )
        .await
        .unwrap();

    assert_ne!(record_id(&row), Some(forged));
    assert!(!row.contains_key("is_admin"));
    assert!(row.contains_key("created_at"));
    assert_eq!(repo.count(Resource::Sponsors).await.unwrap(), 1);
}

#[test]
async fn test_in_memory_update_and_delete_missing_row() {
    let repo = InMemoryRepository::new();
    let missing = Uuid::new_v4();

    let update = repo.update(Resource::News, missing, Record::new()).await;
    assert!(matches!(update, Err(RepoError::NotFound(id)) if id == missing));

    let delete = repo.delete_by_id(Resource::News, missing).await;
    assert!(matches!(delete, Err(RepoError::NotFound(_))));
}

#[test]
async fn test_in_memory_profile_roles() {
    let repo = InMemoryRepository::new();
    let user = Uuid::new_v4();
    repo.set_profile_role(user, "admin");

    assert_eq!(repo.get_profile_role(user).await.unwrap().as_deref(), Some("admin"));
    assert_eq!(repo.get_profile_role(Uuid::new_v4()).await.unwrap(), None);
}

// --- Postgres collaborator ---
//
// These need a scratch database: DATABASE_URL=... cargo test -- --ignored

/// A simple structure to hold the database pool for testing
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

#[test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_postgres_player_crud() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = format!("player-{}", Uuid::new_v4());

    // 1. Insert with only some columns; the rest fall back to column defaults
    let created = repo
        .insert(
            Resource::Players,
            record(json!({
                "name": marker,
                "real_name": "Jonas Berg",
                "role": "IGL",
                "country": "Sweden",
                "age": 23
            })),
        )
        .await
        .unwrap();
    let id = record_id(&created).expect("insert returns the generated id");
    assert_eq!(created["win_rate"], json!("0%"));
    assert_eq!(created["kills"], json!(0));

    // 2. Update a subset of columns
    repo.update(Resource::Players, id, record(json!({ "role": "AWPer", "kills": 120 })))
        .await
        .unwrap();
    let rows = repo.list(Resource::Players, "created_at", false, None).await.unwrap();
    let row = rows.iter().find(|r| record_id(r) == Some(id)).unwrap();
    assert_eq!(row["role"], json!("AWPer"));
    assert_eq!(row["kills"], json!(120));
    assert_eq!(row["name"], json!(marker));

    // 3. Delete
    repo.delete_by_id(Resource::Players, id).await.unwrap();
    assert!(matches!(
        repo.delete_by_id(Resource::Players, id).await,
        Err(RepoError::NotFound(_))
    ));
}

#[test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_postgres_blog_tags_and_dates_roundtrip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let created = repo
        .insert(
            Resource::Blogs,
            record(json!({
                "title": "Mirage smokes",
                "excerpt": "Three lineups",
                "author": "Coach K",
                "date": "2025-01-28",
                "tags": ["utility", "mirage"]
            })),
        )
        .await
        .unwrap();

    assert_eq!(created["date"], json!("2025-01-28"));
    assert_eq!(created["tags"], json!(["utility", "mirage"]));

    let recent = repo.list(Resource::Blogs, "date", false, Some(1)).await.unwrap();
    assert_eq!(recent.len(), 1);

    repo.delete_by_id(Resource::Blogs, record_id(&created).unwrap())
        .await
        .unwrap();
}

#[test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_postgres_profile_role_lookup() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user_id = Uuid::new_v4();

    sqlx::query("INSERT INTO profiles (id, email, role) VALUES ($1, $2, 'admin')")
        .bind(user_id)
        .bind("admin@zerostrikes.gg")
        .execute(&ctx.pool)
        .await
        .unwrap();

    assert_eq!(repo.get_profile_role(user_id).await.unwrap().as_deref(), Some("admin"));
    assert_eq!(repo.get_profile_role(Uuid::new_v4()).await.unwrap(), None);
}

#[test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_postgres_nulls_sort_last_like_in_memory() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let memory = InMemoryRepository::new();
    let marker = format!("nulls-{}", Uuid::new_v4());

    let mut ids = Vec::new();
    for bio in [json!(null), json!("zzzz-sorts-after-everything")] {
        let row = record(json!({
            "name": marker, "real_name": "R", "role": "IGL", "country": "SE", "age": 20, "bio": bio
        }));
        memory.seed(Resource::Players, row.clone());
        let created = repo.insert(Resource::Players, row).await.unwrap();
        ids.push(record_id(&created).unwrap());
    }

    let ours = |rows: Vec<Record>| -> Vec<Value> {
        rows.into_iter()
            .filter(|r| r["name"] == json!(marker))
            .map(|r| r.get("bio").cloned().unwrap_or(Value::Null))
            .collect()
    };
    let from_postgres = ours(repo.list(Resource::Players, "bio", false, None).await.unwrap());
    let from_memory = ours(memory.list(Resource::Players, "bio", false, None).await.unwrap());

    assert_eq!(from_postgres, vec![json!("zzzz-sorts-after-everything"), json!(null)]);
    assert_eq!(from_postgres, from_memory);

    for id in ids {
        repo.delete_by_id(Resource::Players, id).await.unwrap();
    }
}
