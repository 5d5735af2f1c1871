//! Startup DDL: one table per registry entity, created idempotently.

use crate::error::AppError;
use crate::model::{EntitySpec, FieldKind, FieldSpec, Registry};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_type(f: &FieldSpec) -> String {
    if let Some(table) = f.references {
        return format!("INTEGER REFERENCES {}(\"id\")", quoted(table));
    }
    match f.kind {
        FieldKind::Text | FieldKind::Enum(_) => "TEXT".into(),
        FieldKind::Number => "DOUBLE PRECISION".into(),
        FieldKind::Date => "TIMESTAMPTZ".into(),
        FieldKind::Bool => "BOOLEAN".into(),
        FieldKind::Array => "JSONB".into(),
    }
}

/// CREATE TABLE IF NOT EXISTS for one entity. Identifier column, declared
/// fields, then the two server timestamps.
fn create_table_ddl(entity: &EntitySpec) -> String {
    let mut defs: Vec<String> = vec![format!("{} SERIAL PRIMARY KEY", quoted("id"))];
    for f in entity.fields {
        let mut def = format!("{} {}", quoted(f.name), column_type(f));
        if f.required || f.default.is_some() {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = f.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        if f.unique {
            def.push_str(" UNIQUE");
        }
        defs.push(def);
    }
    for name in ["createdAt", "updatedAt"] {
        defs.push(format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", quoted(name)));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quoted(entity.table),
        defs.join(",\n    ")
    )
}

/// Create every entity table. Registry order puts referenced tables before
/// their dependents (enquiries before remarks).
pub async fn ensure_tables(pool: &PgPool, registry: &Registry) -> Result<(), AppError> {
    for entity in registry.entities() {
        let ddl = create_table_ddl(entity);
        tracing::debug!(table = entity.table, "ensure table");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::Config("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}
