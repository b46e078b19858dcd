//! The SQL builder graph: SELECT, INSERT, UPDATE, DELETE, UPSERT, and raw-SQL builders.
//!
//! Each builder serializes to a `(String, Vec<SqlValue>)` pair via the shared
//! `SqlBuilder`/`MutationBuilder` traits (`shared.rs`). `WHERE`-bearing builders embed a
//! `WhereBuilder` (`where_builder.rs`) instead of duplicating condition-building.

pub mod delete;
pub mod insert;
pub mod raw;
pub mod select;
pub mod shared;
pub mod update;
pub mod upsert;
pub mod where_builder;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use raw::RawBuilder;
pub use select::QueryBuilder;
pub use shared::{MutationBuilder, SqlBuilder};
pub use update::UpdateBuilder;
pub use upsert::UpsertBuilder;
pub use where_builder::WhereBuilder;
