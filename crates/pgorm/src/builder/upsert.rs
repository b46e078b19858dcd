//! UPSERT builder: PostgreSQL `INSERT ... ON CONFLICT ... DO UPDATE`.
//!
//! Grounded on `InsertBuilder`'s column/row projection plus `WhereBuilder::leftmost_eq_column`
//! for conflict-target inference (see `DESIGN.md`'s Open Question resolution: the `.where_`
//! predicate here is never rendered as a real `WHERE` clause — it only supplies the logical
//! uniqueness selector that determines `ON CONFLICT (...)`).

use super::shared::{MutationBuilder, SqlBuilder};
use super::where_builder::WhereBuilder;
use crate::error::{BuildError, OrmResult};
use crate::record::{project_columns, Record};
use crate::value::SqlValue;

enum Projection {
    Explicit(Vec<String>),
    Wildcard,
}

pub struct UpsertBuilder {
    table: String,
    projection: Projection,
    whitelist: Vec<String>,
    blacklist: Vec<String>,
    row: Option<Vec<SqlValue>>,
    conflict_where: WhereBuilder,
    conflict_target: Vec<String>,
    returning_cols: Vec<String>,
    is_interpolated: bool,
}

impl UpsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            projection: Projection::Wildcard,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            row: None,
            conflict_where: WhereBuilder::new(),
            conflict_target: Vec::new(),
            returning_cols: Vec::new(),
            is_interpolated: false,
        }
    }

    pub fn columns(mut self, cols: &[&str]) -> Self {
        if cols == ["*"] {
            self.projection = Projection::Wildcard;
        } else {
            self.projection = Projection::Explicit(cols.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    pub fn whitelist(mut self, cols: &[&str]) -> Self {
        self.whitelist = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn blacklist(mut self, cols: &[&str]) -> Self {
        self.blacklist = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// A single row of explicit values, matched positionally against `.columns(...)`.
    pub fn values(mut self, vals: Vec<SqlValue>) -> Self {
        self.row = Some(vals);
        self
    }

    /// Project a single row from a record.
    pub fn record<R: Record>(mut self, record: &R) -> OrmResult<Self> {
        if !self.whitelist.is_empty() && !self.blacklist.is_empty() {
            return Err(BuildError::Other(
                "upsert cannot combine .whitelist(...) and .blacklist(...)".to_string(),
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
        self.row = Some(vals);
        Ok(self)
    }

    /// The logical uniqueness predicate. Never rendered as SQL: only its leftmost
    /// equality column feeds conflict-target inference (unless `.on_conflict(...)` is
    /// given explicitly).
    pub fn where_(mut self, col: &str, val: impl Into<SqlValue>) -> Self {
        self.conflict_where.and_eq(col, val);
        self
    }

    /// Explicit `ON CONFLICT (cols...)` target, for multi-column unique constraints
    /// where leftmost-column inference is insufficient.
    pub fn on_conflict(mut self, cols: &[&str]) -> Self {
        self.conflict_target = cols.iter().map(|s| s.to_string()).collect();
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

    fn column_names(&self) -> OrmResult<&[String]> {
        match &self.projection {
            Projection::Explicit(cols) => Ok(cols),
            Projection::Wildcard => {
                Err(BuildError::Other("upsert requires .columns(...) or a .record(...) row".to_string()).into())
            }
        }
    }

    fn conflict_columns(&self) -> OrmResult<Vec<String>> {
        if !self.conflict_target.is_empty() {
            return Ok(self.conflict_target.clone());
        }
        if let Some(col) = self.conflict_where.leftmost_eq_column() {
            return Ok(vec![col.to_string()]);
        }
        Err(BuildError::Other(
            "upsert requires .where_(col, val) to infer ON CONFLICT, or an explicit .on_conflict(cols...)"
                .to_string(),
        )
        .into())
    }
}

impl SqlBuilder for UpsertBuilder {
    fn is_interpolated(&self) -> bool {
        self.is_interpolated
    }

    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        if self.table.is_empty() {
            return Err(BuildError::Other("upsert requires a table".to_string()).into());
        }
        let cols = self.column_names()?;
        if cols.is_empty() {
            return Err(BuildError::Other("upsert requires at least one column".to_string()).into());
        }
        let vals = self
            .row
            .as_ref()
            .ok_or_else(|| BuildError::Other("upsert requires .values(...) or .record(...)".to_string()))?;
        if vals.len() != cols.len() {
            return Err(BuildError::Other(format!(
                "upsert row has {} values but {} columns were declared",
                vals.len(),
                cols.len()
            ))
            .into());
        }

        let conflict_cols = self.conflict_columns()?;
        let dialect = crate::dialect::current();
        let mut args: Vec<SqlValue> = Vec::new();
        let mut placeholders = Vec::with_capacity(vals.len());
        for v in vals {
            if v.is_default() {
                placeholders.push("DEFAULT".to_string());
            } else {
                args.push(v.clone());
                placeholders.push(format!("${}", args.len()));
            }
        }

        let quoted_cols: Vec<String> = cols.iter().map(|c| dialect.quote_ident(c)).collect();
        let quoted_conflict: Vec<String> = conflict_cols.iter().map(|c| dialect.quote_ident(c)).collect();

        let update_cols: Vec<&String> = cols.iter().filter(|c| !conflict_cols.contains(c)).collect();
        if update_cols.is_empty() {
            return Err(BuildError::Other(
                "upsert has no non-conflict-target columns to update on conflict".to_string(),
            )
            .into());
        }
        let set_clause: Vec<String> = update_cols
            .iter()
            .map(|c| {
                let q = dialect.quote_ident(c);
                format!("{q} = EXCLUDED.{q}")
            })
            .collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
            dialect.quote_ident(&self.table),
            quoted_cols.join(", "),
            placeholders.join(", "),
            quoted_conflict.join(", "),
            set_clause.join(", ")
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

impl MutationBuilder for UpsertBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_conflict_target_from_leftmost_eq() {
        let (sql, args) = UpsertBuilder::new("users")
            .columns(&["email", "name"])
            .values(vec![SqlValue::Text("a@b.com".into()), SqlValue::Text("mario".into())])
            .where_("email", "a@b.com")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"users\" (\"email\", \"name\") VALUES ($1, $2) ON CONFLICT (\"email\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn explicit_on_conflict_overrides_inference() {
        let (sql, _) = UpsertBuilder::new("users")
            .columns(&["tenant_id", "email", "name"])
            .values(vec![
                SqlValue::I64(1),
                SqlValue::Text("a@b.com".into()),
                SqlValue::Text("mario".into()),
            ])
            .on_conflict(&["tenant_id", "email"])
            .to_sql()
            .unwrap();
        assert!(sql.contains("ON CONFLICT (\"tenant_id\", \"email\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""));
    }

    #[test]
    fn requires_a_conflict_target() {
        let result = UpsertBuilder::new("users")
            .columns(&["email"])
            .values(vec![SqlValue::Text("a@b.com".into())])
            .to_sql();
        assert!(result.is_err());
    }

    struct Account {
        email: String,
        display_name: String,
        bio: String,
    }

    impl crate::record::Record for Account {
        fn all_columns() -> Vec<&'static str> {
            vec!["email", "display_name", "bio"]
        }

        fn record_entries(&self) -> Vec<(&'static str, crate::record::RecordSlot)> {
            vec![
                ("email", crate::record::RecordSlot::Value(SqlValue::Text(self.email.clone()))),
                (
                    "display_name",
                    crate::record::RecordSlot::Value(SqlValue::Text(self.display_name.clone())),
                ),
                ("bio", crate::record::RecordSlot::Value(SqlValue::Text(self.bio.clone()))),
            ]
        }
    }

    #[test]
    fn whitelist_restricts_a_bare_wildcard_record_projection() {
        let account = Account {
            email: "a@b.com".into(),
            display_name: "mario".into(),
            bio: "plumber".into(),
        };
        // "bio" is discovered on the record but excluded by the whitelist, with no
        // explicit `.columns(...)` call to otherwise narrow the projection.
        let (sql, args) = UpsertBuilder::new("accounts")
            .whitelist(&["email", "display_name"])
            .record(&account)
            .unwrap()
            .where_("email", "a@b.com")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"accounts\" (\"email\", \"display_name\") VALUES ($1, $2) ON CONFLICT (\"email\") DO UPDATE SET \"display_name\" = EXCLUDED.\"display_name\""
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn conflicting_whitelist_and_blacklist_is_a_build_error() {
        let account = Account {
            email: "a@b.com".into(),
            display_name: "mario".into(),
            bio: "plumber".into(),
        };
        let result = UpsertBuilder::new("accounts")
            .whitelist(&["email"])
            .blacklist(&["display_name"])
            .record(&account);
        assert!(result.is_err());
    }
}
