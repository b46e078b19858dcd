//! INSERT builder.
//!
//! Grounded on the teacher's original `InsertBuilder`, regeneralized to serialize to
//! `(String, Vec<SqlValue>)` and to project columns off a `#[derive(Record)]` type via
//! `crate::record::project_columns` instead of the old per-field `set_*` API.

use super::shared::SqlBuilder;
use crate::error::{BuildError, OrmResult};
use crate::record::{project_columns, Record};
use crate::value::SqlValue;

enum Projection {
    Explicit(Vec<String>),
    Wildcard,
}

/// One row's worth of values, either given directly or projected off a record.
enum Row {
    Values(Vec<SqlValue>),
    Record(Vec<SqlValue>),
}

pub struct InsertBuilder {
    table: String,
    projection: Projection,
    whitelist: Vec<String>,
    blacklist: Vec<String>,
    rows: Vec<Row>,
    returning_cols: Vec<String>,
    is_interpolated: bool,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            projection: Projection::Wildcard,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            rows: Vec::new(),
            returning_cols: Vec::new(),
            is_interpolated: false,
        }
    }

    /// Declare the column list explicitly. Pass `&["*"]` (the default) to project every
    /// column discovered on the first `.record(...)` row, minus `.blacklist(...)`.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        if cols == ["*"] {
            self.projection = Projection::Wildcard;
        } else {
            self.projection = Projection::Explicit(cols.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    /// Restrict a `"*"` projection to exactly these columns.
    pub fn whitelist(mut self, cols: &[&str]) -> Self {
        self.whitelist = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Exclude these columns from a `"*"` projection. Mutually exclusive with
    /// `.whitelist(...)`.
    pub fn blacklist(mut self, cols: &[&str]) -> Self {
        self.blacklist = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add one row of explicit values, matched positionally against `.columns(...)`.
    pub fn values(mut self, vals: Vec<SqlValue>) -> Self {
        self.rows.push(Row::Values(vals));
        self
    }

    /// Add one row projected from a record. Multiple calls insert multiple rows; all
    /// rows (explicit or record-projected) must agree on column arity.
    pub fn record<R: Record>(mut self, record: &R) -> OrmResult<Self> {
        if !self.whitelist.is_empty() && !self.blacklist.is_empty() {
            return Err(BuildError::Other(
                "insert cannot combine .whitelist(...) and .blacklist(...)".to_string(),
            )
            .into());
        }
        let cols: Vec<&str> = match &self.projection {
            Projection::Wildcard => {
                if self.whitelist.is_empty() {
                    Vec::new()
                } else {
                    R::all_columns()
                        .into_iter()
                        .filter(|c| self.whitelist.iter().any(|w| w == c))
                        .collect()
                }
            }
            Projection::Explicit(cols) => {
                if !self.whitelist.is_empty() {
                    cols.iter()
                        .map(|s| s.as_str())
                        .filter(|c| self.whitelist.iter().any(|w| w == c))
                        .collect()
                } else {
                    cols.iter().map(|s| s.as_str()).collect()
                }
            }
        };
        let blacklist: Vec<&str> = self.blacklist.iter().map(|s| s.as_str()).collect();
        let (resolved_cols, vals) = project_columns(record, &cols, &blacklist)?;
        if matches!(self.projection, Projection::Wildcard) {
            self.projection = Projection::Explicit(resolved_cols);
        }
        self.rows.push(Row::Record(vals));
        Ok(self)
    }

    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning_cols = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn set_is_interpolated(mut self, yes: bool) -> Self {
        self.is_interpolated = yes;
        self
    }

    fn column_names(&self) -> OrmResult<&[String]> {
        match &self.projection {
            Projection::Explicit(cols) => Ok(cols),
            Projection::Wildcard => Err(BuildError::Other(
                "insert requires .columns(...) or at least one .record(...) row".to_string(),
            )
            .into()),
        }
    }
}

impl SqlBuilder for InsertBuilder {
    fn is_interpolated(&self) -> bool {
        self.is_interpolated
    }

    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        if self.table.is_empty() {
            return Err(BuildError::Other("insert requires a table".to_string()).into());
        }
        let cols = self.column_names()?;
        if cols.is_empty() {
            return Err(BuildError::Other("insert requires at least one column".to_string()).into());
        }
        if self.rows.is_empty() {
            return Err(BuildError::Other("insert requires at least one row".to_string()).into());
        }

        let dialect = crate::dialect::current();
        let mut args: Vec<SqlValue> = Vec::new();
        let mut row_fragments = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let vals = match row {
                Row::Values(vals) => vals,
                Row::Record(vals) => vals,
            };
            if vals.len() != cols.len() {
                return Err(BuildError::Other(format!(
                    "insert row has {} values but {} columns were declared",
                    vals.len(),
                    cols.len()
                ))
                .into());
            }
            let mut placeholders = Vec::with_capacity(vals.len());
            for v in vals {
                if v.is_default() {
                    placeholders.push("DEFAULT".to_string());
                } else {
                    args.push(v.clone());
                    placeholders.push(format!("${}", args.len()));
                }
            }
            row_fragments.push(format!("({})", placeholders.join(", ")));
        }

        let quoted_cols: Vec<String> = cols.iter().map(|c| dialect.quote_ident(c)).collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            dialect.quote_ident(&self.table),
            quoted_cols.join(", "),
            row_fragments.join(", ")
        );

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

impl super::shared::MutationBuilder for InsertBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_insert() {
        let (sql, args) = InsertBuilder::new("users")
            .columns(&["name", "active"])
            .values(vec![SqlValue::Text("mario".into()), SqlValue::Bool(true)])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"users\" (\"name\", \"active\") VALUES ($1, $2)");
        assert_eq!(args, vec![SqlValue::Text("mario".into()), SqlValue::Bool(true)]);
    }

    #[test]
    fn multi_row_insert_renumbers_contiguously() {
        let (sql, args) = InsertBuilder::new("users")
            .columns(&["name"])
            .values(vec![SqlValue::Text("a".into())])
            .values(vec![SqlValue::Text("b".into())])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"users\" (\"name\") VALUES ($1), ($2)");
        assert_eq!(args, vec![SqlValue::Text("a".into()), SqlValue::Text("b".into())]);
    }

    #[test]
    fn default_sentinel_consumes_no_placeholder() {
        let (sql, args) = InsertBuilder::new("users")
            .columns(&["name", "created_at"])
            .values(vec![SqlValue::Text("a".into()), SqlValue::Default])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"users\" (\"name\", \"created_at\") VALUES ($1, DEFAULT)");
        assert_eq!(args, vec![SqlValue::Text("a".into())]);
    }

    #[test]
    fn returning_is_quoted() {
        let (sql, _) = InsertBuilder::new("users")
            .columns(&["name"])
            .values(vec![SqlValue::Text("a".into())])
            .returning(&["id"])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"users\" (\"name\") VALUES ($1) RETURNING \"id\"");
    }

    #[test]
    fn mismatched_row_arity_is_a_build_error() {
        let result = InsertBuilder::new("users")
            .columns(&["name", "active"])
            .values(vec![SqlValue::Text("a".into())])
            .to_sql();
        assert!(result.is_err());
    }

    #[test]
    fn requires_columns() {
        assert!(InsertBuilder::new("users")
            .values(vec![SqlValue::Text("a".into())])
            .to_sql()
            .is_err());
    }

    struct Person {
        name: String,
        email: String,
    }

    impl crate::record::Record for Person {
        fn all_columns() -> Vec<&'static str> {
            vec!["name", "email"]
        }

        fn record_entries(&self) -> Vec<(&'static str, crate::record::RecordSlot)> {
            vec![
                ("name", crate::record::RecordSlot::Value(SqlValue::Text(self.name.clone()))),
                ("email", crate::record::RecordSlot::Value(SqlValue::Text(self.email.clone()))),
            ]
        }
    }

    #[test]
    fn whitelist_restricts_a_bare_wildcard_record_projection() {
        let person = Person { name: "mario".into(), email: "mario@x.com".into() };
        let (sql, args) = InsertBuilder::new("people")
            .whitelist(&["name"])
            .record(&person)
            .unwrap()
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"people\" (\"name\") VALUES ($1)");
        assert_eq!(args, vec![SqlValue::Text("mario".into())]);
    }

    #[test]
    fn conflicting_whitelist_and_blacklist_is_a_build_error() {
        let person = Person { name: "mario".into(), email: "mario@x.com".into() };
        let result = InsertBuilder::new("people")
            .whitelist(&["name"])
            .blacklist(&["email"])
            .record(&person);
        assert!(result.is_err());
    }
}
