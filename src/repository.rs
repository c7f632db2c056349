use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

use crate::{
    error::RepoError,
    resource::{Record, Resource, record_id},
};

/// Repository Trait
///
/// The persistence collaborator every controller talks to. It is table-oriented:
/// each call names the `Resource` it targets and moves plain JSON records.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Rows of a table ordered by `order_by`. `limit` caps the result when set.
    async fn list(
        &self,
        resource: Resource,
        order_by: &str,
        ascending: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Record>, RepoError>;

    async fn count(&self, resource: Resource) -> Result<i64, RepoError>;

    /// Inserts a draft. The store assigns `id` and `created_at`.
    async fn insert(&self, resource: Resource, draft: Record) -> Result<Record, RepoError>;

    /// Partial update by primary key: only the columns present in `patch` change.
    async fn update(&self, resource: Resource, id: Uuid, patch: Record) -> Result<(), RepoError>;

    async fn delete_by_id(&self, resource: Resource, id: Uuid) -> Result<(), RepoError>;

    /// Role claim stored in `profiles` for a signed-in user.
    async fn get_profile_role(&self, user_id: Uuid) -> Result<Option<String>, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

fn check_column(resource: Resource, column: &str) -> Result<(), RepoError> {
    if resource.schema().has_column(column) {
        Ok(())
    } else {
        Err(RepoError::UnknownColumn {
            table: resource.table(),
            column: column.to_string(),
        })
    }
}

/// Keeps only schema columns, in schema order. Column names reach SQL text, so
/// nothing outside the schema may pass.
fn writable_columns(resource: Resource, record: &Record) -> Vec<&'static str> {
    resource
        .schema()
        .fields
        .iter()
        .map(|f| f.name)
        .filter(|name| record.contains_key(*name))
        .collect()
}

fn into_record(value: Value) -> Result<Record, RepoError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RepoError::Malformed(format!("expected an object, got {other}"))),
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by the Supabase Postgres database.
/// Rows travel as `jsonb`: reads use `to_jsonb(row)`, writes go through
/// `jsonb_populate_record` so column types are coerced by Postgres itself.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list(
        &self,
        resource: Resource,
        order_by: &str,
        ascending: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Record>, RepoError> {
        check_column(resource, order_by)?;
        let table = resource.table();

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {table} t ORDER BY t.{order_by} "));
        builder.push(if ascending { "ASC NULLS LAST" } else { "DESC NULLS LAST" });
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let rows: Vec<Value> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(table, "list error: {:?}", e))?;

        rows.into_iter().map(into_record).collect()
    }

    async fn count(&self, resource: Resource) -> Result<i64, RepoError> {
        let sql = format!("SELECT COUNT(*) FROM {}", resource.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(table = resource.table(), "count error: {:?}", e))?;
        Ok(count)
    }

    async fn insert(&self, resource: Resource, draft: Record) -> Result<Record, RepoError> {
        let table = resource.table();
        let columns = writable_columns(resource, &draft).join(", ");

        let sql = if columns.is_empty() {
            format!("INSERT INTO {table} AS t DEFAULT VALUES RETURNING to_jsonb(t)")
        } else {
            format!(
                "INSERT INTO {table} AS t ({columns}) \
                 SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
                 RETURNING to_jsonb(t)"
            )
        };

        let query = sqlx::query_scalar::<_, Value>(&sql);
        let query = if columns.is_empty() {
            query
        } else {
            query.bind(Value::Object(draft))
        };

        let row = query
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(table, "insert error: {:?}", e))?;

        into_record(row)
    }

    async fn update(&self, resource: Resource, id: Uuid, patch: Record) -> Result<(), RepoError> {
        let table = resource.table();
        let columns = writable_columns(resource, &patch).join(", ");
        if columns.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE {table} AS t SET ({columns}) = \
             (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1)) \
             WHERE t.id = $2"
        );

        let result = sqlx::query(&sql)
            .bind(Value::Object(patch))
            .bind(id)
            .execute(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(table, %id, "update error: {:?}", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_by_id(&self, resource: Resource, id: Uuid) -> Result<(), RepoError> {
        let table = resource.table();
        let sql = format!("DELETE FROM {table} WHERE id = $1");

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(table, %id, "delete error: {:?}", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn get_profile_role(&self, user_id: Uuid) -> Result<Option<String>, RepoError> {
        let role = sqlx::query_scalar::<_, Option<String>>("SELECT role FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role.flatten())
    }
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. Used by the test-suite and for
/// running the service without a database. Failure injection (`set_failing`) and
/// per-operation call counters let tests observe exactly which calls were issued.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<HashMap<Resource, Vec<Record>>>,
    profiles: RwLock<HashMap<Uuid, String>>,
    failing: AtomicBool,
    pub calls: CallCounters,
}

/// Number of calls issued per operation.
#[derive(Default)]
pub struct CallCounters {
    pub list: AtomicUsize,
    pub count: AtomicUsize,
    pub insert: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl CallCounters {
    pub fn lists(&self) -> usize {
        self.list.load(AtomicOrdering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.insert.load(AtomicOrdering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.update.load(AtomicOrdering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.delete.load(AtomicOrdering::SeqCst)
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every subsequent call fails with `RepoError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn set_profile_role(&self, user_id: Uuid, role: &str) {
        self.profiles.write().insert(user_id, role.to_string());
    }

    /// Inserts a row as-is, keeping any `id`/`created_at` it carries. Missing ones are generated.
    pub fn seed(&self, resource: Resource, mut record: Record) -> Record {
        record
            .entry("id")
            .or_insert_with(|| Value::from(Uuid::new_v4().to_string()));
        record
            .entry("created_at")
            .or_insert_with(|| Value::from(Utc::now().to_rfc3339()));
        self.tables.write().entry(resource).or_default().push(record.clone());
        record
    }

    pub fn rows(&self, resource: Resource) -> Vec<Record> {
        self.tables.read().get(&resource).cloned().unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            Err(RepoError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Orders JSON values the way `PostgresRepository::list` orders the underlying
/// columns for the types the schemas use. Nulls sort last in either direction,
/// matching its `NULLS LAST`.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list(
        &self,
        resource: Resource,
        order_by: &str,
        ascending: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Record>, RepoError> {
        self.calls.list.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;
        check_column(resource, order_by)?;

        let mut rows = self.rows(resource);
        rows.sort_by(|a, b| {
            let null_last = compare_values(a.get(order_by), b.get(order_by));
            let is_null = |r: &Record| r.get(order_by).is_none_or(Value::is_null);
            if is_null(a) || is_null(b) || ascending {
                null_last
            } else {
                null_last.reverse()
            }
        });
        if let Some(limit) = limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows)
    }

    async fn count(&self, resource: Resource) -> Result<i64, RepoError> {
        self.calls.count.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;
        Ok(self.tables.read().get(&resource).map_or(0, |rows| rows.len() as i64))
    }

    async fn insert(&self, resource: Resource, draft: Record) -> Result<Record, RepoError> {
        self.calls.insert.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;

        let mut record = Record::new();
        for column in writable_columns(resource, &draft) {
            record.insert(column.to_string(), draft[column].clone());
        }
        record.remove("id");
        record.remove("created_at");
        Ok(self.seed(resource, record))
    }

    async fn update(&self, resource: Resource, id: Uuid, patch: Record) -> Result<(), RepoError> {
        self.calls.update.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;

        let mut tables = self.tables.write();
        let row = tables
            .get_mut(&resource)
            .and_then(|rows| rows.iter_mut().find(|r| record_id(r) == Some(id)))
            .ok_or(RepoError::NotFound(id))?;

        for column in writable_columns(resource, &patch) {
            row.insert(column.to_string(), patch[column].clone());
        }
        Ok(())
    }

    async fn delete_by_id(&self, resource: Resource, id: Uuid) -> Result<(), RepoError> {
        self.calls.delete.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;

        let mut tables = self.tables.write();
        let rows = tables.entry(resource).or_default();
        let before = rows.len();
        rows.retain(|r| record_id(r) != Some(id));
        if rows.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn get_profile_role(&self, user_id: Uuid) -> Result<Option<String>, RepoError> {
        self.check_available()?;
        Ok(self.profiles.read().get(&user_id).cloned())
    }
}
