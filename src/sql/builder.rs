//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from an entity spec.

use crate::model::{EntitySpec, FieldKind};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (column names are camelCase).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: id, declared fields, timestamps.
fn select_column_list(entity: &EntitySpec) -> String {
    let mut cols = vec![quoted("id")];
    cols.extend(entity.fields.iter().map(|f| quoted(f.name)));
    cols.push(quoted("createdAt"));
    cols.push(quoted("updatedAt"));
    cols.join(", ")
}

/// SQL cast for a bound value whose wire type differs from the column type.
fn cast_for(kind: FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Date => Some("timestamptz"),
        _ => None,
    }
}

fn placeholder(n: usize, kind: FieldKind) -> String {
    match cast_for(kind) {
        Some(t) => format!("${}::{}", n, t),
        None => format!("${}", n),
    }
}

/// INSERT from body. Columns with a SQL default are omitted when the body
/// does not provide a value (absent key or explicit null), so the default
/// applies instead of binding NULL into a NOT NULL column.
pub fn insert(entity: &EntitySpec, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in entity.fields {
        let val = body.get(f.name).cloned();
        if matches!(val, None | Some(Value::Null)) && f.default.is_some() {
            continue;
        }
        let n = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(f.name));
        placeholders.push(placeholder(n, f.kind));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(entity.table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(entity)
    );
    q
}

/// SELECT by primary key. Caller binds the id as the sole parameter.
pub fn select_by_id(entity: &EntitySpec) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(entity),
        quoted(entity.table),
        quoted("id")
    );
    q
}

/// SELECT by an arbitrary declared column (login lookup, remark history),
/// newest first. Caller binds the value as the sole parameter.
pub fn select_by_column(entity: &EntitySpec, column: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY {} DESC, {} DESC",
        select_column_list(entity),
        quoted(entity.table),
        quoted(column),
        quoted("createdAt"),
        quoted("id")
    );
    q
}

/// Escape LIKE wildcards in a user-supplied search term.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Case-insensitive substring match OR-combined over the entity's search
/// columns. Empty or absent search matches all rows (intended contract).
fn search_clause(entity: &EntitySpec, search: Option<&str>, q: &mut QueryBuf) -> String {
    match search {
        Some(term) if !term.is_empty() && !entity.search_fields.is_empty() => {
            let n = q.push_param(Value::String(like_pattern(term)));
            let parts: Vec<String> = entity
                .search_fields
                .iter()
                .map(|f| format!("{} ILIKE ${}", quoted(f), n))
                .collect();
            format!(" WHERE ({})", parts.join(" OR "))
        }
        _ => String::new(),
    }
}

/// Paginated list: search filter, newest first, LIMIT/OFFSET. No upper bound
/// is enforced on limit (documented limitation).
pub fn select_page(entity: &EntitySpec, search: Option<&str>, limit: i64, offset: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(entity, search, &mut q);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} DESC, {} DESC LIMIT {} OFFSET {}",
        select_column_list(entity),
        quoted(entity.table),
        where_clause,
        quoted("createdAt"),
        quoted("id"),
        limit.max(0),
        offset.max(0)
    );
    q
}

/// Total row count for the same filter as `select_page`.
pub fn count(entity: &EntitySpec, search: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(entity, search, &mut q);
    q.sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        quoted(entity.table),
        where_clause
    );
    q
}

/// UPDATE by id: SET every declared field present in body, bump updatedAt.
pub fn update(entity: &EntitySpec, id: i64, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in entity.fields {
        let Some(v) = body.get(f.name) else { continue };
        if v.is_null() && f.default.is_some() {
            continue;
        }
        let n = q.push_param(v.clone());
        sets.push(format!("{} = {}", quoted(f.name), placeholder(n, f.kind)));
    }
    sets.push(format!("{} = NOW()", quoted("updatedAt")));
    let id_param = q.push_param(Value::Number(id.into()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(entity.table),
        sets.join(", "),
        quoted("id"),
        id_param,
        select_column_list(entity)
    );
    q
}

/// Flip the boolean status flag in a single statement.
pub fn toggle_status(entity: &EntitySpec) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "UPDATE {} SET {} = NOT {}, {} = NOW() WHERE {} = $1 RETURNING {}",
        quoted(entity.table),
        quoted("status"),
        quoted("status"),
        quoted("updatedAt"),
        quoted("id"),
        select_column_list(entity)
    );
    q
}

/// DELETE by id; RETURNING distinguishes deleted from missing.
pub fn delete(entity: &EntitySpec) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        quoted(entity.table),
        quoted("id"),
        quoted("id")
    );
    q
}
