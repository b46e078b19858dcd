//! UPDATE builder.
//!
//! Grounded on the teacher's original `UpdateBuilder`, regeneralized to serialize to
//! `(String, Vec<SqlValue>)` and to treat `SqlValue::Default` as a non-placeholder
//! sentinel (`col = DEFAULT`) rather than overloading a separate `SetField::Raw` variant.

use super::shared::{renumber_placeholders, MutationBuilder, SqlBuilder};
use super::where_builder::WhereBuilder;
use crate::error::{BuildError, OrmResult};
use crate::value::SqlValue;

pub struct UpdateBuilder {
    table: String,
    set_cols: Vec<(String, SqlValue)>,
    where_: WhereBuilder,
    returning_cols: Vec<String>,
    is_interpolated: bool,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            set_cols: Vec::new(),
            where_: WhereBuilder::new(),
            returning_cols: Vec::new(),
            is_interpolated: false,
        }
    }

    /// `.set(col, SqlValue::Default)` emits `col = DEFAULT` with no bound placeholder.
    pub fn set(mut self, col: &str, val: impl Into<SqlValue>) -> Self {
        self.set_cols.push((col.to_string(), val.into()));
        self
    }

    pub fn set_opt<T: Into<SqlValue>>(mut self, col: &str, val: Option<T>) -> Self {
        if let Some(v) = val {
            self.set_cols.push((col.to_string(), v.into()));
        }
        self
    }

    /// Bulk `.set(...)`, iteration order stabilized by column-name sort so the emitted
    /// SQL is deterministic regardless of the caller's map type.
    pub fn set_map(mut self, cols: impl IntoIterator<Item = (String, SqlValue)>) -> Self {
        let mut pairs: Vec<(String, SqlValue)> = cols.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        self.set_cols.extend(pairs);
        self
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

    pub fn set_is_interpolated(mut self, yes: bool) -> Self {
        self.is_interpolated = yes;
        self
    }
}

impl SqlBuilder for UpdateBuilder {
    fn is_interpolated(&self) -> bool {
        self.is_interpolated
    }

    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        if self.table.is_empty() {
            return Err(BuildError::Other("update requires a table".to_string()).into());
        }
        if self.set_cols.is_empty() {
            return Err(BuildError::Other("update requires at least one .set(...)".to_string()).into());
        }

        let dialect = crate::dialect::current();
        let mut args: Vec<SqlValue> = Vec::new();
        let mut assignments = Vec::with_capacity(self.set_cols.len());
        for (col, val) in &self.set_cols {
            let col = dialect.quote_ident(col);
            if val.is_default() {
                assignments.push(format!("{col} = DEFAULT"));
            } else {
                args.push(val.clone());
                assignments.push(format!("{col} = ${}", args.len()));
            }
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            dialect.quote_ident(&self.table),
            assignments.join(", ")
        );

        if !self.where_.is_empty() {
            let clause = renumber_placeholders(&self.where_.build_clause(), args.len());
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

impl MutationBuilder for UpdateBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_update() {
        let (sql, args) = UpdateBuilder::new("users")
            .set("name", "mario")
            .and_eq("id", 1_i64)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "UPDATE \"users\" SET \"name\" = $1 WHERE \"id\" = $2");
        assert_eq!(args, vec![SqlValue::Text("mario".into()), SqlValue::I64(1)]);
    }

    #[test]
    fn default_sentinel_emits_bare_keyword() {
        let (sql, args) = UpdateBuilder::new("users")
            .set("updated_at", SqlValue::Default)
            .and_eq("id", 1_i64)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "UPDATE \"users\" SET \"updated_at\" = DEFAULT WHERE \"id\" = $1");
        assert_eq!(args, vec![SqlValue::I64(1)]);
    }

    #[test]
    fn set_map_sorts_by_column_name() {
        let (sql, _) = UpdateBuilder::new("users")
            .set_map(vec![
                ("zeta".to_string(), SqlValue::I64(1)),
                ("alpha".to_string(), SqlValue::I64(2)),
            ])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "UPDATE \"users\" SET \"alpha\" = $1, \"zeta\" = $2");
    }

    #[test]
    fn requires_set() {
        assert!(UpdateBuilder::new("users").to_sql().is_err());
    }
}
