//! # pgorm
//!
//! A fluent SQL construction and execution toolkit for PostgreSQL.
//!
//! ## Features
//!
//! - **SQL explicit**: every builder serializes to a plain `(String, Vec<SqlValue>)` pair;
//!   nothing is hidden behind a query DSL you can't read back out.
//! - **Type-safe mapping**: `Row` → struct via the `FromRow` trait (derivable), scalar
//!   columns via `ScalarTarget`.
//! - **Minimal magic**: `#[derive(Record)]`/`#[derive(FromRow)]` only reduce boilerplate;
//!   both traits are plain and hand-implementable.
//! - **Safe defaults**: DELETE requires a WHERE clause unless `.allow_delete_all()` is set.

pub mod builder;
pub mod cache;
pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod interpolate;
pub mod log;
pub mod record;
pub mod result;
pub mod row;
pub mod session;
pub mod transaction;
pub mod value;

pub use builder::{
    DeleteBuilder, InsertBuilder, MutationBuilder, QueryBuilder, RawBuilder, SqlBuilder,
    UpdateBuilder, UpsertBuilder, WhereBuilder,
};
pub use client::GenericClient;
pub use error::{OrmError, OrmResult};
pub use record::{Record, RecordSlot};
pub use result::ScalarTarget;
pub use row::{FromRow, RowExt};
pub use session::Session;
pub use transaction::Transaction;
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use client::PoolClient;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config, create_pool_with_manager_config, create_pool_with_tls};

#[cfg(feature = "derive")]
pub use pgorm_derive::{FromRow, Record};
