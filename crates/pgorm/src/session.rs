//! Runner / session: binds a driver handle to the builder graph's entry points.
//!
//! Grounded on `client::GenericClient` already being generic over a bare client or a
//! transaction; `Session` is the thin wrapper that lets callers write
//! `session.select(...)`, `session.insert_into(...)`, etc. instead of constructing a
//! builder and passing the connection in separately at execution time.

use crate::builder::{
    DeleteBuilder, InsertBuilder, QueryBuilder, RawBuilder, UpdateBuilder, UpsertBuilder,
};
use crate::client::GenericClient;

/// A session bound to a connection or transaction. Builder entry points return
/// freestanding builders; executing them requires passing `session.client()` (kept
/// explicit, matching the teacher's `SqlBuilder::query(&self, conn)` shape) unless the
/// caller prefers `Session::exec`/`Session::query*`, which thread the client through.
///
/// Beginning a transaction is not a `Session` method: `tokio_postgres::Client::transaction`
/// takes `&mut Client`, while a `Session` only ever borrows its client immutably so several
/// builders can read from it at once. Call `Transaction::begin`/`Transaction::begin_scoped`
/// directly, then wrap the result in a fresh `Session::new(&tx)` for the same builder sugar
/// scoped to that transaction.
pub struct Session<'c, C: GenericClient> {
    client: &'c C,
}

impl<'c, C: GenericClient> Session<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &'c C {
        self.client
    }

    pub fn select(&self, columns: &[&str]) -> QueryBuilder {
        QueryBuilder::new().select(columns)
    }

    pub fn insert_into(&self, table: &str) -> InsertBuilder {
        InsertBuilder::new(table)
    }

    pub fn update(&self, table: &str) -> UpdateBuilder {
        UpdateBuilder::new(table)
    }

    pub fn delete_from(&self, table: &str) -> DeleteBuilder {
        DeleteBuilder::new(table)
    }

    pub fn upsert(&self, table: &str) -> UpsertBuilder {
        UpsertBuilder::new(table)
    }

    pub fn sql(&self, text: impl Into<String>) -> RawBuilder {
        RawBuilder::new(text)
    }
}

/// Report a query's elapsed time to the `sql` log sink: always when it crosses the
/// configured slow-query threshold, otherwise only when a sink is actually installed
/// (so formatting work is skipped when nobody is listening).
pub(crate) fn report_timing(sql: &str, elapsed: std::time::Duration) {
    if let Some(threshold) = crate::config::log_queries_threshold() {
        if elapsed >= threshold {
            crate::log::sql(
                "slow query",
                &[("sql", sql.to_string()), ("elapsed_ms", elapsed.as_millis().to_string())],
            );
            return;
        }
    }
    if crate::log::has_sql_logger() {
        crate::log::sql("query", &[("sql", sql.to_string())]);
    }
}
