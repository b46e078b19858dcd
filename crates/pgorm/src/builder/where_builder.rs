//! Shared WHERE clause fragment for SELECT, UPDATE, DELETE, and UPSERT.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// Reusable WHERE clause builder.
///
/// Conditions and their bound values accumulate here; `QueryBuilder`, `UpdateBuilder`,
/// `DeleteBuilder`, and `UpsertBuilder` each embed one instead of duplicating the
/// condition-building API.
pub struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<SqlValue>,
    param_count: usize,
    /// First column referenced by `and_eq`, used by `UpsertBuilder` to infer an
    /// `ON CONFLICT` target when the caller hasn't given one explicitly.
    first_eq_column: Option<String>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Create a WhereBuilder whose first placeholder is `offset + 1`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
            param_count: offset,
            first_eq_column: None,
        }
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.param_count = offset;
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn build_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    pub fn bound_values(&self) -> Vec<SqlValue> {
        self.params.clone()
    }

    /// The leftmost column referenced by an equality condition.
    pub fn leftmost_eq_column(&self) -> Option<&str> {
        self.first_eq_column.as_deref()
    }

    fn add_condition(&mut self, sql_template: &str, value: impl Into<SqlValue>) {
        self.param_count += 1;
        let placeholder = format!("${}", self.param_count);
        let condition = sql_template.replacen('$', &placeholder, 1);
        self.conditions.push(condition);
        self.params.push(value.into());
    }

    fn record_eq_column(&mut self, col: &str) {
        if self.first_eq_column.is_none() {
            self.first_eq_column = Some(col.to_string());
        }
    }

    pub fn and_eq(&mut self, col: &str, val: impl Into<SqlValue>) {
        self.record_eq_column(col);
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} = $"), val);
    }

    pub fn and_ne(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} != $"), val);
    }

    pub fn and_like(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} LIKE $"), val);
    }

    pub fn and_ilike(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} ILIKE $"), val);
    }

    pub fn and_gt(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} > $"), val);
    }

    pub fn and_gte(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} >= $"), val);
    }

    pub fn and_lt(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} < $"), val);
    }

    pub fn and_lte(&mut self, col: &str, val: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.add_condition(&format!("{col} <= $"), val);
    }

    pub fn and_is_null(&mut self, col: &str) {
        let col = crate::dialect::current().quote_ident(col);
        self.conditions.push(format!("{col} IS NULL"));
    }

    pub fn and_is_not_null(&mut self, col: &str) {
        let col = crate::dialect::current().quote_ident(col);
        self.conditions.push(format!("{col} IS NOT NULL"));
    }

    pub fn and_in<T: Into<SqlValue>>(&mut self, col: &str, values: Vec<T>) {
        let col = crate::dialect::current().quote_ident(col);
        if values.is_empty() {
            self.conditions.push("1=0".to_string());
            return;
        }
        let mut placeholders = Vec::new();
        for value in values {
            self.param_count += 1;
            placeholders.push(format!("${}", self.param_count));
            self.params.push(value.into());
        }
        self.conditions.push(format!("{col} IN ({})", placeholders.join(", ")));
    }

    pub fn and_not_in<T: Into<SqlValue>>(&mut self, col: &str, values: Vec<T>) {
        if values.is_empty() {
            return;
        }
        let col = crate::dialect::current().quote_ident(col);
        let mut placeholders = Vec::new();
        for value in values {
            self.param_count += 1;
            placeholders.push(format!("${}", self.param_count));
            self.params.push(value.into());
        }
        self.conditions
            .push(format!("{col} NOT IN ({})", placeholders.join(", ")));
    }

    pub fn and_between(&mut self, col: &str, from: impl Into<SqlValue>, to: impl Into<SqlValue>) {
        let col = crate::dialect::current().quote_ident(col);
        self.param_count += 1;
        let p1 = format!("${}", self.param_count);
        self.params.push(from.into());

        self.param_count += 1;
        let p2 = format!("${}", self.param_count);
        self.params.push(to.into());

        self.conditions.push(format!("{col} BETWEEN {p1} AND {p2}"));
    }

    /// Add a raw WHERE condition with no bound params.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure the fragment is free of
    /// unsanitized input.
    pub fn and_raw(&mut self, sql: &str) {
        self.conditions.push(sql.to_string());
    }

    /// Append a conjunctive predicate written by the caller. `$n` placeholders inside
    /// `expr` are re-numbered relative to whatever's already been bound, so `expr` can
    /// always be written starting from `$1`.
    pub fn where_(&mut self, expr: &str, args: Vec<SqlValue>) {
        let shifted = super::shared::renumber_placeholders(expr, self.param_count);
        self.conditions.push(shifted);
        self.param_count += args.len();
        self.params.extend(args);
    }

    pub fn and_eq_opt<T: Into<SqlValue>>(&mut self, col: &str, val: Option<T>) {
        if let Some(v) = val {
            self.and_eq(col, v);
        }
    }

    pub fn and_in_opt<T: Into<SqlValue>>(&mut self, col: &str, values: Option<Vec<T>>) {
        if let Some(v) = values {
            self.and_in(col, v);
        }
    }
}

impl Default for WhereBuilder {
    fn default() -> Self {
        Self::new()
    }
}
