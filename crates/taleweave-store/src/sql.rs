//! Helpers shared by the repositories.

use taleweave_core::error::DomainError;

/// Wraps a driver error as an infrastructure failure.
pub(crate) fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("database error: {e}"))
}

/// Maps unique and check violations to validation errors; everything else
/// is infrastructure.
pub(crate) fn constraint_or_infrastructure(e: sqlx::Error, conflict: &str) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DomainError::Validation(conflict.to_owned());
        }
        if db.is_check_violation() {
            return DomainError::Validation(format!("rejected by the database: {}", db.message()));
        }
    }
    infrastructure(e)
}

/// Builds an `ILIKE` pattern matching `query` as a literal substring.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Converts a result limit to a SQL bind value.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
