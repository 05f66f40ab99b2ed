use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterScope, FilterWhereInfo};

/// Compiles a JSON `where` clause into a parameterized SQL predicate.
///
/// Scope conditions (tenant id, soft-delete visibility) are rendered ahead of
/// any user-supplied condition and cannot be disabled from the outside.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(
        where_data: &Value,
        starting_param_index: usize,
        scope: &FilterScope,
    ) -> Result<(String, Vec<Value>), FilterError> {
        Self::generate_at(where_data, starting_param_index, scope, 0)
    }

    /// Render only the scope conditions (no user-supplied predicate)
    pub fn generate_scoped(scope: &FilterScope) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(0);
        let conditions = filter_where.scope_conditions(scope);
        let where_clause = if conditions.is_empty() { "1=1".to_string() } else { conditions.join(" AND ") };
        (where_clause, filter_where.param_values)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be a JSON object".to_string())),
        }
    }

    fn generate_at(
        where_data: &Value,
        starting_param_index: usize,
        scope: &FilterScope,
        depth: u32,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let max_depth = crate::config::config().filter.max_nested_depth;
        if depth > max_depth {
            return Err(FilterError::TooDeeplyNested(max_depth));
        }

        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(where_data, scope, depth)
    }

    fn build(&mut self, where_data: &Value, scope: &FilterScope, depth: u32) -> Result<(String, Vec<Value>), FilterError> {
        let mut sql_conditions = self.scope_conditions(scope);

        self.parse_where_data(where_data, depth)?;

        let conditions_snapshot = self.conditions.clone();
        for condition in &conditions_snapshot {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }

        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, self.param_values.clone()))
    }

    fn scope_conditions(&mut self, scope: &FilterScope) -> Vec<String> {
        let mut conditions = vec![];
        if let Some(company_id) = scope.company_id {
            let placeholder = self.param(Value::String(company_id.to_string()));
            conditions.push(format!("\"company_id\" = {}::uuid", placeholder));
        }
        if !scope.include_deleted {
            conditions.push("\"deleted_at\" IS NULL".to_string());
        }
        conditions
    }

    fn parse_where_data(&mut self, where_data: &Value, depth: u32) -> Result<(), FilterError> {
        match where_data {
            Value::Null => Ok(()),
            Value::Object(obj) => {
                for (key, value) in obj {
                    if key.starts_with('$') {
                        self.parse_logical_operator(key, value, depth)?;
                    } else {
                        self.parse_field_condition(key, value)?;
                    }
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_logical_operator(&mut self, op: &str, value: &Value, depth: u32) -> Result<(), FilterError> {
        // Nested clauses never re-inject scope conditions; the outermost build did
        let unscoped = FilterScope { company_id: None, include_deleted: true };

        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires an array", op)))?;
                let mut sql_parts = Vec::new();
                for v in arr {
                    let (sql, params) = Self::generate_at(v, self.param_index, &unscoped, depth + 1)?;
                    self.param_values.extend(params);
                    self.param_index = self.param_values.len();
                    sql_parts.push(format!("({})", sql));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                self.push_fragment(sql_parts.join(joiner));
                Ok(())
            }
            "$not" => {
                let (sql, params) = Self::generate_at(value, self.param_index, &unscoped, depth + 1)?;
                self.param_values.extend(params);
                self.param_index = self.param_values.len();
                self.push_fragment(format!("NOT ({})", sql));
                Ok(())
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn push_fragment(&mut self, sql: String) {
        self.conditions.push(FilterWhereInfo { column: sql, operator: FilterOp::Fragment, data: Value::Null });
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        super::validate_identifier(field).map_err(|_| FilterError::InvalidColumn(field.to_string()))?;

        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                self.conditions.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator,
                    data: op_val.clone(),
                });
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            });
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$nlike" => FilterOp::NLike,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$between" => FilterOp::Between,
            "$null" => FilterOp::Null,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        // Pre-rendered fragments from logical operators
        if condition.operator == FilterOp::Fragment {
            return Ok(condition.column.clone());
        }

        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Ne => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NOT NULL", quoted_column))
                } else {
                    Ok(format!("{} <> {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Gt => Ok(format!("{} > {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Gte => Ok(format!("{} >= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lt => Ok(format!("{} < {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lte => Ok(format!("{} <= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Like => Ok(format!("{} LIKE {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::NLike => Ok(format!("{} NOT LIKE {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::ILike => Ok(format!("{} ILIKE {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::In | FilterOp::NIn => {
                let negated = condition.operator == FilterOp::NIn;
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() {
                        // IN () is invalid SQL; empty list matches nothing (or everything, negated)
                        return Ok(if negated { "1=1".to_string() } else { "1=0".to_string() });
                    }
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    let keyword = if negated { "NOT IN" } else { "IN" };
                    Ok(format!("{} {} ({})", quoted_column, keyword, params.join(", ")))
                } else {
                    Err(FilterError::InvalidOperatorData("$in/$nin require an array".to_string()))
                }
            }
            FilterOp::Between => {
                if let Value::Array(values) = &condition.data {
                    if values.len() != 2 {
                        return Err(FilterError::InvalidOperatorData("$between requires exactly 2 values".to_string()));
                    }
                    Ok(format!(
                        "{} BETWEEN {} AND {}",
                        quoted_column,
                        self.param(values[0].clone()),
                        self.param(values[1].clone())
                    ))
                } else {
                    Err(FilterError::InvalidOperatorData("$between requires an array with 2 values".to_string()))
                }
            }
            FilterOp::Null => match condition.data.as_bool() {
                Some(true) => Ok(format!("{} IS NULL", quoted_column)),
                Some(false) => Ok(format!("{} IS NOT NULL", quoted_column)),
                None => Err(FilterError::InvalidOperatorData("$null requires a boolean".to_string())),
            },
            FilterOp::And | FilterOp::Or | FilterOp::Not | FilterOp::Fragment => {
                Err(FilterError::UnsupportedOperator(format!("{:?} in field position", condition.operator)))
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn unscoped() -> FilterScope {
        FilterScope { company_id: None, include_deleted: true }
    }

    #[test]
    fn implicit_equality() {
        let (sql, params) = FilterWhere::generate(&json!({"city": "Riyadh"}), 0, &unscoped()).unwrap();
        assert_eq!(sql, "\"city\" = $1");
        assert_eq!(params, vec![json!("Riyadh")]);
    }

    #[test]
    fn scope_is_rendered_first() {
        let company_id = Uuid::new_v4();
        let scope = FilterScope::tenant(company_id);
        let (sql, params) = FilterWhere::generate(&json!({"status": "open"}), 0, &scope).unwrap();
        assert_eq!(sql, "\"company_id\" = $1::uuid AND \"deleted_at\" IS NULL AND \"status\" = $2");
        assert_eq!(params[0], json!(company_id.to_string()));
        assert_eq!(params[1], json!("open"));
    }

    #[test]
    fn or_clause_numbers_params_across_branches() {
        let (sql, params) = FilterWhere::generate(
            &json!({"$or": [{"priority": "high"}, {"priority": "critical"}]}),
            0,
            &unscoped(),
        )
        .unwrap();
        assert_eq!(sql, "(\"priority\" = $1) OR (\"priority\" = $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn scoped_or_cannot_escape_tenant() {
        let company_id = Uuid::new_v4();
        let scope = FilterScope::tenant(company_id);
        let (sql, _) = FilterWhere::generate(
            &json!({"$or": [{"name": "a"}, {"name": "b"}]}),
            0,
            &scope,
        )
        .unwrap();
        // The OR branches are parenthesized under the ANDed tenant condition
        assert!(sql.starts_with("\"company_id\" = $1::uuid AND \"deleted_at\" IS NULL AND "));
        assert!(sql.contains("(\"name\" = $2) OR (\"name\" = $3)"));
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, params) = FilterWhere::generate(&json!({"id": {"$in": []}}), 0, &unscoped()).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn null_operator() {
        let (sql, _) = FilterWhere::generate(&json!({"checked_out_at": {"$null": true}}), 0, &unscoped()).unwrap();
        assert_eq!(sql, "\"checked_out_at\" IS NULL");
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = FilterWhere::generate(&json!({"name": {"$regex": "x"}}), 0, &unscoped()).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedOperator(_)));
    }

    #[test]
    fn rejects_hostile_column_names() {
        let err = FilterWhere::generate(&json!({"name\" OR 1=1 --": "x"}), 0, &unscoped()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }

    #[test]
    fn rejects_raw_sql_strings() {
        let err = FilterWhere::generate(&json!("deleted_at IS NOT NULL"), 0, &unscoped()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidWhereClause(_)));
    }
}
