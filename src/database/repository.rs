use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::{FilterData, FilterScope};

/// One page of a tenant-scoped listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Generic repository over one tenant-scoped table.
///
/// Every query is bound to the company the repository was created for;
/// rows of other tenants behave as if they do not exist. Soft-deleted rows
/// are invisible unless a method says otherwise.
pub struct TenantRepository<T> {
    table_name: &'static str,
    pool: PgPool,
    company_id: Uuid,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> TenantRepository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: PgPool, company_id: Uuid) -> Self {
        Self {
            table_name,
            pool,
            company_id,
            _phantom: std::marker::PhantomData,
        }
    }

    fn scope(&self) -> FilterScope {
        FilterScope::tenant(self.company_id)
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(self.table_name, self.scope())?
            .filter(filter_data)?
            .select_all(&self.pool)
            .await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(self.table_name, self.scope())?
            .filter(filter_data)?
            .select_optional(&self.pool)
            .await
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::new(self.table_name, self.scope())?
            .filter(filter_data)?
            .count(&self.pool)
            .await
    }

    /// Filtered listing plus total count for pagination metadata. The
    /// default page size applies when the caller gives no limit.
    pub async fn select_page(&self, filter_data: FilterData) -> Result<Page<T>, DatabaseError> {
        let limit = filter_data.limit.unwrap_or(crate::config::config().api.default_page_size as i32);
        let offset = filter_data.offset.unwrap_or(0);

        let count_filter = FilterData {
            where_clause: filter_data.where_clause.clone(),
            ..Default::default()
        };
        let page_filter = FilterData {
            limit: Some(limit),
            offset: Some(offset),
            ..filter_data
        };

        let items = self.select_any(page_filter).await?;
        let total = self.count(count_filter).await?;

        Ok(Page {
            items,
            total,
            limit: limit as i64,
            offset: offset as i64,
        })
    }

    pub async fn select_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
            self.table_name
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(self.company_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Like select_by_id but a missing row is an error
    pub async fn fetch_by_id(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", self.table_name, id)))
    }

    /// Mark a row deleted. Returns false when the row does not exist (or is
    /// already deleted) within this tenant.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
            self.table_name
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(self.company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear deleted_at on a soft-deleted row. Returns false when there is
    /// no deleted row to restore within this tenant.
    pub async fn restore(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!(
            "UPDATE \"{}\" SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 AND deleted_at IS NOT NULL",
            self.table_name
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(self.company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Grouped counts for dashboard statistics, e.g. work orders by status.
    /// The column is cast to text so enum columns group cleanly.
    pub async fn count_by(&self, column: &str) -> Result<Vec<(String, i64)>, DatabaseError> {
        crate::filter::validate_identifier(column)
            .map_err(|_| DatabaseError::QueryError(format!("invalid column: {}", column)))?;

        let sql = format!(
            "SELECT \"{}\"::text AS key, COUNT(*) AS count FROM \"{}\" \
             WHERE company_id = $1 AND deleted_at IS NULL GROUP BY 1 ORDER BY 1",
            column, self.table_name
        );
        let rows = sqlx::query(&sql).bind(self.company_id).fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let key: Option<String> = row.try_get("key")?;
            let count: i64 = row.try_get("count")?;
            out.push((key.unwrap_or_else(|| "none".to_string()), count));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_map_preserves_metadata() {
        let page = Page { items: vec![1, 2, 3], total: 10, limit: 3, offset: 0 };
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.total, 10);
        assert_eq!(mapped.limit, 3);
    }
}
