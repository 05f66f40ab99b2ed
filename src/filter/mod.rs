pub mod error;
#[allow(clippy::module_inception)]
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use types::{FilterData, FilterScope, SqlResult};

/// SQL identifier rules shared by table, column and order validation:
/// ASCII alphanumerics and underscores, not starting with a digit.
pub fn validate_identifier(name: &str) -> Result<(), ()> {
    if name.is_empty() {
        return Err(());
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(());
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rules() {
        assert!(validate_identifier("work_orders").is_ok());
        assert!(validate_identifier("_internal").is_ok());
        assert!(validate_identifier("9lives").is_err());
        assert!(validate_identifier("name; --").is_err());
        assert!(validate_identifier("").is_err());
    }
}
