use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, FilterScope, SqlResult};

/// A validated, tenant-scoped query over a single table.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
    scope: FilterScope,
}

impl Filter {
    pub fn new(table_name: impl Into<String>, scope: FilterScope) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        super::validate_identifier(&table_name)
            .map_err(|_| FilterError::InvalidTableName(table_name.clone()))?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
            scope,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(select) = data.select {
            self.select(select)?;
        }
        if let Some(where_clause) = data.where_clause {
            self.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            self.order(order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        for column in &columns {
            if column == "*" {
                continue;
            }
            super::validate_identifier(column).map_err(|_| FilterError::InvalidColumn(column.clone()))?;
        }
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        // Cap at the configured maximum
        let max_limit = crate::config::config().filter.max_limit.unwrap_or(i32::MAX);
        let applied_limit = if limit > max_limit {
            if crate::config::config().filter.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping", limit, max_limit);
            }
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let select_clause = self.build_select_clause();
        let (where_clause, params) = self.render_where()?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.render_where()?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    fn render_where(&self) -> Result<(String, Vec<Value>), FilterError> {
        match &self.where_data {
            Some(where_data) => FilterWhere::generate(where_data, 0, &self.scope),
            None => Ok(FilterWhere::generate_scoped(&self.scope)),
        }
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() || self.select_columns.contains(&"*".to_string()) {
            "*".to_string()
        } else {
            self.select_columns
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn full_query_shape() {
        let company_id = Uuid::new_v4();
        let mut filter = Filter::new("work_orders", FilterScope::tenant(company_id)).unwrap();
        filter
            .assign(FilterData {
                select: None,
                where_clause: Some(json!({"status": "pending"})),
                order: Some(json!("created_at desc")),
                limit: Some(10),
                offset: Some(20),
            })
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"work_orders\" WHERE \"company_id\" = $1::uuid AND \"deleted_at\" IS NULL \
             AND \"status\" = $2 ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn count_query_drops_order_and_limit() {
        let company_id = Uuid::new_v4();
        let mut filter = Filter::new("assets", FilterScope::tenant(company_id)).unwrap();
        filter
            .assign(FilterData {
                order: Some(json!("name")),
                limit: Some(5),
                ..Default::default()
            })
            .unwrap();

        let sql = filter.to_count_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT COUNT(*) AS count FROM \"assets\" WHERE \"company_id\" = $1::uuid AND \"deleted_at\" IS NULL"
        );
    }

    #[test]
    fn rejects_bad_table_name() {
        assert!(Filter::new("assets; DROP TABLE users", FilterScope::default()).is_err());
    }

    #[test]
    fn caps_limit_to_config_max() {
        let mut filter = Filter::new("schools", FilterScope::default()).unwrap();
        filter.limit(i32::MAX, None).unwrap();
        let sql = filter.to_sql().unwrap();
        let max = crate::config::config().filter.max_limit.unwrap();
        assert!(sql.query.ends_with(&format!("LIMIT {}", max)));
    }
}
