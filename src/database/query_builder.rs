use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::types::SqlResult;
use crate::filter::{Filter, FilterData, FilterScope};

/// Executes filter-built SQL against the pool, binding JSON parameter values.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(table_name: &str, scope: FilterScope) -> Result<Self, DatabaseError> {
        let filter = Filter::new(table_name, scope).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Self { filter, _phantom: std::marker::PhantomData })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(self)
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.sql_result()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn select_optional(self, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.sql_result()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(pool).await?;
        Ok(row)
    }

    pub async fn count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self
            .filter
            .to_count_sql()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    fn sql_result(&self) -> Result<SqlResult, DatabaseError> {
        self.filter.to_sql().map_err(|e| DatabaseError::QueryError(e.to_string()))
    }
}

/// How a JSON string parameter should reach Postgres. Filter values arrive
/// untyped; uuid- and timestamp-shaped strings must bind with their real
/// types or comparisons against uuid/timestamptz columns fail.
enum StringBind {
    Uuid(uuid::Uuid),
    Timestamp(chrono::DateTime<chrono::Utc>),
    Date(chrono::NaiveDate),
    Text,
}

fn classify_string(s: &str) -> StringBind {
    if let Ok(u) = uuid::Uuid::parse_str(s) {
        return StringBind::Uuid(u);
    }
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(s) {
        return StringBind::Timestamp(ts.with_timezone(&chrono::Utc));
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return StringBind::Date(d);
    }
    StringBind::Text
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                // Postgres has no u64; cast down
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => match classify_string(s) {
            StringBind::Uuid(u) => q.bind(u),
            StringBind::Timestamp(ts) => q.bind(ts),
            StringBind::Date(d) => q.bind(d),
            StringBind::Text => q.bind(s),
        },
        // Arrays are expanded into individual placeholders by FilterWhere
        Value::Array(_) => q,
        Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => match classify_string(s) {
            StringBind::Uuid(u) => q.bind(u),
            StringBind::Timestamp(ts) => q.bind(ts),
            StringBind::Date(d) => q.bind(d),
            StringBind::Text => q.bind(s),
        },
        Value::Array(_) => q,
        Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_classification() {
        assert!(matches!(classify_string("2b0e9a52-78e2-4a5c-8f0e-43f24a1b9d11"), StringBind::Uuid(_)));
        assert!(matches!(classify_string("2026-08-07T10:00:00Z"), StringBind::Timestamp(_)));
        assert!(matches!(classify_string("2026-08-07"), StringBind::Date(_)));
        assert!(matches!(classify_string("SCH-001"), StringBind::Text));
        assert!(matches!(classify_string("open"), StringBind::Text));
    }
}
