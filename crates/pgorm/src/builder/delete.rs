//! DELETE builder.
//!
//! Grounded on the teacher's original `DeleteBuilder`, regeneralized to serialize to
//! `(String, Vec<SqlValue>)`. Keeps the teacher's safe-default idiom: a DELETE with no
//! WHERE clause is rewritten to a harmless no-op unless `.allow_delete_all()` is set
//! explicitly.

use super::shared::{renumber_placeholders, MutationBuilder, SqlBuilder};
use super::where_builder::WhereBuilder;
use crate::error::{BuildError, OrmResult};
use crate::value::SqlValue;

pub struct DeleteBuilder {
    table: String,
    where_: WhereBuilder,
    returning_cols: Vec<String>,
    allow_delete_all: bool,
    is_interpolated: bool,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_: WhereBuilder::new(),
            returning_cols: Vec::new(),
            allow_delete_all: false,
            is_interpolated: false,
        }
    }

    pub fn where_(mut self, expr: &str, args: Vec<SqlValue>) -> Self {
        self.where_.where_(expr, args);
        self
    }

    pub fn and_eq(mut self, col: &str, val: impl Into<SqlValue>) -> Self {
        self.where_.and_eq(col, val);
        self
    }

    pub fn and_ne(mut self, col: &str, val: impl Into<SqlValue>) -> Self {
        self.where_.and_ne(col, val);
        self
    }

    pub fn and_in<T: Into<SqlValue>>(mut self, col: &str, values: Vec<T>) -> Self {
        self.where_.and_in(col, values);
        self
    }

    pub fn and_is_null(mut self, col: &str) -> Self {
        self.where_.and_is_null(col);
        self
    }

    pub fn and_is_not_null(mut self, col: &str) -> Self {
        self.where_.and_is_not_null(col);
        self
    }

    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning_cols = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Escape hatch: permit `DELETE FROM t` with no WHERE clause at all.
    pub fn allow_delete_all(mut self) -> Self {
        self.allow_delete_all = true;
        self
    }

    pub fn set_is_interpolated(mut self, yes: bool) -> Self {
        self.is_interpolated = yes;
        self
    }
}

impl SqlBuilder for DeleteBuilder {
    fn is_interpolated(&self) -> bool {
        self.is_interpolated
    }

    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        if self.table.is_empty() {
            return Err(BuildError::Other("delete requires a table".to_string()).into());
        }
        if self.where_.is_empty() && !self.allow_delete_all {
            return Err(BuildError::Other(
                "delete requires a WHERE clause; call .allow_delete_all() to delete every row"
                    .to_string(),
            )
            .into());
        }

        let dialect = crate::dialect::current();
        let mut args: Vec<SqlValue> = Vec::new();
        let mut sql = format!("DELETE FROM {}", dialect.quote_ident(&self.table));

        if !self.where_.is_empty() {
            let clause = renumber_placeholders(&self.where_.build_clause(), 0);
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            args.extend(self.where_.bound_values());
        }

        if !self.returning_cols.is_empty() {
            let returning: Vec<String> = self
                .returning_cols
                .iter()
                .map(|c| dialect.quote_ident(c))
                .collect();
            sql.push_str(" RETURNING ");
            sql.push_str(&returning.join(", "));
        }

        Ok((sql, args))
    }
}

impl MutationBuilder for DeleteBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_delete() {
        let (sql, args) = DeleteBuilder::new("users").and_eq("id", 1_i64).to_sql().unwrap();
        assert_eq!(sql, "DELETE FROM \"users\" WHERE \"id\" = $1");
        assert_eq!(args, vec![SqlValue::I64(1)]);
    }

    #[test]
    fn refuses_delete_all_by_default() {
        assert!(DeleteBuilder::new("users").to_sql().is_err());
    }

    #[test]
    fn allow_delete_all_permits_unconditional_delete() {
        let (sql, args) = DeleteBuilder::new("users").allow_delete_all().to_sql().unwrap();
        assert_eq!(sql, "DELETE FROM \"users\"");
        assert!(args.is_empty());
    }

    #[test]
    fn returning_is_quoted() {
        let (sql, _) = DeleteBuilder::new("users")
            .and_eq("id", 1_i64)
            .returning(&["id", "name"])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM \"users\" WHERE \"id\" = $1 RETURNING \"id\", \"name\"");
    }
}
