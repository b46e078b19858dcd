//! Derive macros for pgorm
//!
//! Provides `#[derive(FromRow)]` and `#[derive(Record)]` macros.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod from_row;
mod record;

/// Derive `FromRow` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use pgorm::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(embed)]` - Allocate a nested `Record + FromRow` field (`Option<T>` or
///   `Option<Box<T>>`) on demand: it stays `None` unless the row carries at least one
///   of `T`'s columns.
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Record` reflection for a struct.
///
/// Generates `all_columns()` and `record_entries()` so the struct can be
/// projected into an INSERT/UPDATE/UPSERT builder without hand-written
/// column lists.
///
/// # Example
///
/// ```ignore
/// use pgorm::Record;
///
/// #[derive(Record)]
/// struct User {
///     id: i64,
///     username: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(embed)]
///     profile: Option<Profile>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(embed)]` - Flatten a nested `Record` field (`Option<T>` or
///   `Option<Box<T>>` where `T: Record`). A `None` embedded value marks its
///   columns as unavailable rather than NULL.
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
