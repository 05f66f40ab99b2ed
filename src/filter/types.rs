use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comparison and logical operators accepted in a `where` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")]
    Eq,
    #[serde(rename = "$ne")]
    Ne,
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$lte")]
    Lte,

    #[serde(rename = "$like")]
    Like,
    #[serde(rename = "$nlike")]
    NLike,
    #[serde(rename = "$ilike")]
    ILike,

    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$nin")]
    NIn,

    #[serde(rename = "$between")]
    Between,
    #[serde(rename = "$null")]
    Null,

    #[serde(rename = "$and")]
    And,
    #[serde(rename = "$or")]
    Or,
    #[serde(rename = "$not")]
    Not,

    /// Pseudo-op for pre-rendered SQL fragments produced by logical operators
    #[serde(skip)]
    Fragment,
}

/// Wire format for /api/find requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub select: Option<Vec<String>>,
    #[serde(rename = "where")]
    pub where_clause: Option<serde_json::Value>,
    pub order: Option<serde_json::Value>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: serde_json::Value,
}

/// Scope conditions injected ahead of any user-supplied predicate
#[derive(Debug, Clone, Default)]
pub struct FilterScope {
    pub company_id: Option<Uuid>,
    pub include_deleted: bool,
}

impl FilterScope {
    pub fn tenant(company_id: Uuid) -> Self {
        Self { company_id: Some(company_id), include_deleted: false }
    }

    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// A rendered query plus its positional bind parameters
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
