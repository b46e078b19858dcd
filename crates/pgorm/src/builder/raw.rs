//! Raw hand-written SQL builder.
//!
//! Grounded on the teacher's `query::query`/`sql::sql` entry points (a builder wrapping a
//! hand-written SQL string plus its bound arguments), regeneralized here to go through
//! the same `(String, Vec<SqlValue>)` seam as the structured builders so the interpolator
//! and `SqlBuilder`/`MutationBuilder` execution methods work identically on raw SQL.

use super::shared::{renumber_placeholders, MutationBuilder, SqlBuilder};
use crate::error::OrmResult;
use crate::value::SqlValue;

pub struct RawBuilder {
    text: String,
    args: Vec<SqlValue>,
    is_interpolated: bool,
}

impl RawBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            args: Vec::new(),
            is_interpolated: false,
        }
    }

    /// Bind the arguments referenced by `$1..$k` in the raw SQL text.
    pub fn bind(mut self, args: Vec<SqlValue>) -> Self {
        self.args = args;
        self
    }

    pub fn set_is_interpolated(mut self, yes: bool) -> Self {
        self.is_interpolated = yes;
        self
    }
}

impl SqlBuilder for RawBuilder {
    fn is_interpolated(&self) -> bool {
        self.is_interpolated
    }

    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        // Renumbering is a no-op for a standalone raw query (it already starts at $1),
        // but keeps the builder composable as a CTE body via `QueryBuilder::with`.
        let sql = renumber_placeholders(&self.text, 0);
        Ok((sql, self.args.clone()))
    }
}

impl MutationBuilder for RawBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_sql_passes_through_args_unchanged() {
        let (sql, args) = RawBuilder::new("SELECT * FROM users WHERE id = $1")
            .bind(vec![SqlValue::I64(7)])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE id = $1");
        assert_eq!(args, vec![SqlValue::I64(7)]);
    }

    #[test]
    fn raw_sql_with_no_args() {
        let (sql, args) = RawBuilder::new("SELECT now()").to_sql().unwrap();
        assert_eq!(sql, "SELECT now()");
        assert!(args.is_empty());
    }
}
