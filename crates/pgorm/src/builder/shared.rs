//! Fragments shared across the builder graph: placeholder renumbering and the
//! `SqlBuilder`/`MutationBuilder` execution contract.
//!
//! Grounded on `builder/traits.rs`'s existing `SqlBuilder`/`MutationBuilder` shape
//! (default async methods taking `conn: &impl GenericClient`), generalized to serialize
//! to `(String, Vec<SqlValue>)` instead of a boxed-`ToSql` pair so the interpolator can
//! inspect argument values.

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::result::ScalarTarget;
use crate::row::FromRow;
use crate::value::SqlValue;
use std::future::Future;
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::Row;

/// Re-number the `$1..$k` placeholders inside a user-written fragment (a `.where_`,
/// `.having`, or raw SQL expression) so they land contiguously after `offset` already-
/// numbered placeholders.
pub(crate) fn renumber_placeholders(expr: &str, offset: usize) -> String {
    let bytes = expr.as_bytes();
    let mut out = String::with_capacity(expr.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            let n: usize = expr[start..end].parse().unwrap_or(0);
            out.push('$');
            out.push_str(&(n + offset).to_string());
            i = end;
            continue;
        }
        let ch = expr[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// A builder that serializes to a final `(sql, args)` pair.
///
/// `args` are always numbered contiguously `$1..$k` in left-to-right occurrence order;
/// `to_sql` is the single seam every execution method below goes through.
pub trait SqlBuilder: Sync {
    fn to_sql(&self) -> OrmResult<(String, Vec<SqlValue>)>;

    /// Whether this builder's own query should be rendered with literals inline
    /// (see `crate::interpolate`) regardless of the process-wide setting.
    fn is_interpolated(&self) -> bool {
        false
    }

    /// Resolve the final `(sql, args)` pair, applying interpolation when requested
    /// either on this builder or globally via `config::enable_interpolation()`.
    fn render(&self) -> OrmResult<(String, Vec<SqlValue>)> {
        let (sql, args) = self.to_sql()?;
        if self.is_interpolated() || crate::config::enable_interpolation() {
            let literal_sql = crate::interpolate::interpolate(&sql, &args)?;
            Ok((literal_sql, Vec::new()))
        } else {
            Ok((sql, args))
        }
    }

    fn query(&self, conn: &impl GenericClient) -> impl Future<Output = OrmResult<Vec<Row>>> + Send {
        async move {
            let (sql, args) = self.render()?;
            let params: Vec<&(dyn ToSql + Sync)> = args.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            let started = std::time::Instant::now();
            let rows = conn.query(&sql, &params).await?;
            crate::session::report_timing(&sql, started.elapsed());
            Ok(rows)
        }
    }

    fn query_one_row(&self, conn: &impl GenericClient) -> impl Future<Output = OrmResult<Row>> + Send {
        async move {
            let (sql, args) = self.render()?;
            let params: Vec<&(dyn ToSql + Sync)> = args.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            let started = std::time::Instant::now();
            let row = conn.query_one(&sql, &params).await?;
            crate::session::report_timing(&sql, started.elapsed());
            Ok(row)
        }
    }

    /// One row, N scalars, in `RETURNING`/`SELECT` order.
    fn query_scalar(
        &self,
        conn: &impl GenericClient,
        targets: &mut [&mut dyn ScalarTarget],
    ) -> impl Future<Output = OrmResult<()>> + Send {
        async move {
            let row = self.query_one_row(conn).await?;
            crate::result::query_scalar(&row, targets)
        }
    }

    /// One row mapped into a record by column-tag.
    fn query_struct<T: FromRow>(&self, conn: &impl GenericClient) -> impl Future<Output = OrmResult<T>> + Send {
        async move {
            let row = self.query_one_row(conn).await?;
            T::from_row(&row)
        }
    }

    /// Zero or more rows, each mapped into a record by column-tag.
    fn query_structs<T: FromRow>(&self, conn: &impl GenericClient) -> impl Future<Output = OrmResult<Vec<T>>> + Send {
        async move {
            let rows = self.query(conn).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Single-column, all rows.
    fn query_slice<T>(&self, conn: &impl GenericClient) -> impl Future<Output = OrmResult<Vec<T>>> + Send
    where
        T: for<'a> FromSql<'a>,
    {
        async move {
            let rows = self.query(conn).await?;
            crate::result::query_slice(&rows)
        }
    }
}

/// Extends `SqlBuilder` with row-affecting execution (INSERT/UPDATE/DELETE/UPSERT).
pub trait MutationBuilder: SqlBuilder {
    fn exec(&self, conn: &impl GenericClient) -> impl Future<Output = OrmResult<u64>> + Send {
        async move {
            let (sql, args) = self.render()?;
            let params: Vec<&(dyn ToSql + Sync)> = args.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            let started = std::time::Instant::now();
            let n = conn.execute(&sql, &params).await?;
            crate::session::report_timing(&sql, started.elapsed());
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumber_shifts_every_placeholder() {
        assert_eq!(renumber_placeholders("name = $1 AND age > $2", 2), "name = $3 AND age > $4");
    }

    #[test]
    fn renumber_leaves_non_placeholder_dollars_alone() {
        assert_eq!(renumber_placeholders("$tag$literal$tag$ = $1", 1), "$tag$literal$tag$ = $2");
    }
}
