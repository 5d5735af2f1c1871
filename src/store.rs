//! Generic entity persistence against PostgreSQL.

use crate::error::AppError;
use crate::model::EntitySpec;
use crate::sql::{self, PgBindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::PgPool;

pub struct EntityStore;

impl EntityStore {
    /// Insert one row; returns the created record. Duplicate values on a
    /// unique column surface as a conflict, not a server error.
    pub async fn create(
        pool: &PgPool,
        entity: &EntitySpec,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(entity, body);
        let row = Self::fetch_one(pool, &q)
            .await
            .map_err(|e| map_conflict(e, entity))?;
        row.ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Fetch one row by primary key.
    pub async fn get(
        pool: &PgPool,
        entity: &EntitySpec,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(entity);
        tracing::debug!(sql = %q.sql, id, "query");
        let row = sqlx::query(&q.sql).bind(id).fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Fetch all rows where `column` equals `value`, newest first.
    pub async fn find_by(
        pool: &PgPool,
        entity: &EntitySpec,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Value>, AppError> {
        let mut q = sql::select_by_column(entity, column);
        q.params.push(value.clone());
        Self::fetch_all(pool, &q).await
    }

    /// One page of rows matching the search term, with the total matching
    /// count for pagination metadata.
    pub async fn page(
        pool: &PgPool,
        entity: &EntitySpec,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Value>, i64), AppError> {
        let q = sql::select_page(entity, search, limit, offset);
        let rows = Self::fetch_all(pool, &q).await?;

        let cq = sql::count(entity, search);
        tracing::debug!(sql = %cq.sql, "query");
        let mut count_query = sqlx::query_as::<_, (i64,)>(&cq.sql);
        for p in &cq.params {
            count_query = count_query.bind(PgBindValue::from_json(p));
        }
        let (total,) = count_query.fetch_one(pool).await?;
        Ok((rows, total))
    }

    /// Full overwrite by id. None when the id does not resolve.
    pub async fn update(
        pool: &PgPool,
        entity: &EntitySpec,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update(entity, id, body);
        Self::fetch_one(pool, &q)
            .await
            .map_err(|e| map_conflict(e, entity))
    }

    /// Flip the boolean status flag; returns the updated record.
    pub async fn toggle_status(
        pool: &PgPool,
        entity: &EntitySpec,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::toggle_status(entity);
        tracing::debug!(sql = %q.sql, id, "query");
        let row = sqlx::query(&q.sql).bind(id).fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Permanent removal. False when the id does not resolve.
    pub async fn delete(pool: &PgPool, entity: &EntitySpec, id: i64) -> Result<bool, AppError> {
        let q = sql::delete(entity);
        tracing::debug!(sql = %q.sql, id, "query");
        let row = sqlx::query(&q.sql).bind(id).fetch_optional(pool).await?;
        Ok(row.is_some())
    }

    async fn fetch_one(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

/// Postgres unique_violation. Anything else stays a database error.
const UNIQUE_VIOLATION: &str = "23505";

fn map_conflict(e: AppError, entity: &EntitySpec) -> AppError {
    if let AppError::Db(sqlx::Error::Database(ref db)) = e {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::Conflict(format!(
                "A {} with the same unique field already exists",
                entity.label.to_lowercase()
            ));
        }
    }
    e
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
