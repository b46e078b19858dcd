//! SELECT builder.
//!
//! Grounded on the teacher's original `QueryBuilder`, regeneralized to serialize to
//! `(String, Vec<SqlValue>)` and extended with CTE/`FOR UPDATE` support per the
//! teacher's `cte::WithBuilder`.

use super::shared::{renumber_placeholders, SqlBuilder};
use super::where_builder::WhereBuilder;
use crate::error::{BuildError, OrmResult};
use crate::value::SqlValue;

pub struct QueryBuilder {
    table: String,
    columns: Vec<String>,
    ctes: Vec<(String, bool, String, Vec<SqlValue>)>,
    joins: Vec<String>,
    where_: WhereBuilder,
    group_by: Vec<String>,
    having: Vec<String>,
    having_args: Vec<SqlValue>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    for_update: bool,
    is_interpolated: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            table: String::new(),
            columns: vec!["*".to_string()],
            ctes: Vec::new(),
            joins: Vec::new(),
            where_: WhereBuilder::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            having_args: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            for_update: false,
            is_interpolated: false,
        }
    }

    pub fn from(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn select(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn set_is_interpolated(mut self, yes: bool) -> Self {
        self.is_interpolated = yes;
        self
    }

    /// Add a CTE: `WITH name AS (builder's SQL)`. The CTE's own placeholders are
    /// renumbered ahead of the main query's.
    pub fn with(mut self, name: &str, builder: &impl SqlBuilder) -> OrmResult<Self> {
        let (sql, args) = builder.to_sql()?;
        self.ctes.push((name.to_string(), false, sql, args));
        Ok(self)
    }

    pub fn with_recursive(mut self, name: &str, builder: &impl SqlBuilder) -> OrmResult<Self> {
        let (sql, args) = builder.to_sql()?;
        self.ctes.push((name.to_string(), true, sql, args));
        Ok(self)
    }

    pub fn join(mut self, clause: &str) -> Self {
        self.joins.push(clause.to_string());
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

    pub fn and_in<T: Into<SqlValue>>(mut self, col: &str, values: Vec<T>) -> Self {
        self.where_.and_in(col, values);
        self
    }

    pub fn group_by(mut self, cols: &[&str]) -> Self {
        self.group_by = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Raw HAVING predicate; `$n` placeholders are renumbered after WHERE's own.
    pub fn having(mut self, expr: &str, args: Vec<SqlValue>) -> Self {
        self.having.push(expr.to_string());
        self.having_args.extend(args);
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by.push(expr.to_string());
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlBuilder for QueryBuilder {
    fn is_interpolated(&self) -> bool {
        self.is_interpolated
    }

    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        if self.table.is_empty() {
            return Err(BuildError::Other("select requires .from(table)".to_string()).into());
        }

        let mut args: Vec<SqlValue> = Vec::new();
        let mut sql = String::new();

        if !self.ctes.is_empty() {
            sql.push_str("WITH ");
            let mut parts = Vec::new();
            for (name, recursive, cte_sql, cte_args) in &self.ctes {
                let prefix = if *recursive { "RECURSIVE " } else { "" };
                let shifted = renumber_placeholders(cte_sql, args.len());
                args.extend(cte_args.iter().cloned());
                parts.push(format!("{prefix}{name} AS ({shifted})"));
            }
            sql.push_str(&parts.join(", "));
            sql.push(' ');
        }

        let dialect = crate::dialect::current();
        let cols = self
            .columns
            .iter()
            .map(|c| dialect.quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!("SELECT {} FROM {}", cols, dialect.quote_ident(&self.table)));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.where_.is_empty() {
            let offset = args.len();
            let clause = renumber_placeholders(&self.where_.build_clause(), offset);
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            args.extend(self.where_.bound_values());
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.having.is_empty() {
            let offset = args.len();
            let clause = renumber_placeholders(&self.having.join(" AND "), offset);
            sql.push_str(" HAVING ");
            sql.push_str(&clause);
            args.extend(self.having_args.iter().cloned());
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if let Some(n) = self.limit {
            args.push(SqlValue::I64(n));
            sql.push_str(&format!(" LIMIT ${}", args.len()));
        }

        if let Some(n) = self.offset {
            args.push(SqlValue::I64(n));
            sql.push_str(&format!(" OFFSET ${}", args.len()));
        }

        if self.for_update {
            sql.push_str(" FOR UPDATE");
        }

        Ok((sql, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_select() {
        let (sql, args) = QueryBuilder::new()
            .select(&["id", "name"])
            .from("users")
            .where_("name = $1", vec![SqlValue::Text("mario".into())])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\" WHERE name = $1");
        assert_eq!(args, vec![SqlValue::Text("mario".into())]);
    }

    #[test]
    fn where_and_limit_renumber_contiguously() {
        let (sql, args) = QueryBuilder::new()
            .select(&["*"])
            .from("users")
            .and_eq("active", true)
            .limit(10)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"active\" = $1 LIMIT $2");
        assert_eq!(args, vec![SqlValue::Bool(true), SqlValue::I64(10)]);
    }

    #[test]
    fn requires_from() {
        assert!(QueryBuilder::new().to_sql().is_err());
    }

    #[test]
    fn for_update_and_group_having() {
        let (sql, _) = QueryBuilder::new()
            .select(&["status", "count(*)"])
            .from("orders")
            .group_by(&["status"])
            .having("count(*) > $1", vec![SqlValue::I64(5)])
            .for_update()
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"status\", count(*) FROM \"orders\" GROUP BY status HAVING count(*) > $1 FOR UPDATE"
        );
    }
}
