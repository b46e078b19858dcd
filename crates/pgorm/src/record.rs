//! Record reflection: introspects a native struct into a `tag -> value` mapping so the
//! builder graph can project columns from it.
//!
//! Grounded on `original_source/dat/struct_mapping_test.go`
//! (`TestEmbeddedStructMapping`/`TestEmbeddedStructInvalidColumns`): embedded pointer
//! fields flatten into the parent's column set, and a `None` embedded record makes its
//! columns unavailable rather than null. The dynamic, tag-based field walk the original
//! performs via reflection is replaced here by a `#[derive(Record)]` macro
//! (`pgorm-derive`) that generates the two methods below at compile time.

use crate::value::SqlValue;

/// The reflected state of one column on a record: present with a value, or unavailable
/// because it lives behind a `None` embedded record.
#[derive(Debug, Clone)]
pub enum RecordSlot {
    Value(SqlValue),
    Unavailable,
}

/// Implemented by `#[derive(Record)]`. Exposes a record's column tags and values without
/// runtime reflection.
pub trait Record {
    /// All column tags known to this record type, including flattened embedded tags, in
    /// declaration order.
    fn all_columns() -> Vec<&'static str>;

    /// The reflected value for each column tag, in the same order as `all_columns()`.
    fn record_entries(&self) -> Vec<(&'static str, RecordSlot)>;

    /// Look up a single column's reflected value by tag.
    fn column_value(&self, tag: &str) -> Option<RecordSlot> {
        self.record_entries()
            .into_iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v)
    }
}

/// Project a record's columns against an explicit `Columns(...)` list, honoring the
/// whitelist/blacklist rules from `InsertBuilder`/`UpsertBuilder`.
///
/// `Columns("*")` (represented here as an empty `columns` slice) yields `all_columns()`
/// minus `blacklist`. An explicit column list is used as-is (a `whitelist` further
/// restricts `"*"` before this function is called).
pub fn project_columns<R: Record>(
    record: &R,
    columns: &[&str],
    blacklist: &[&str],
) -> crate::error::OrmResult<(Vec<String>, Vec<SqlValue>)> {
    let wanted: Vec<&str> = if columns.is_empty() {
        R::all_columns()
            .into_iter()
            .filter(|c| !blacklist.contains(c))
            .collect()
    } else {
        columns.to_vec()
    };

    let mut out_cols = Vec::with_capacity(wanted.len());
    let mut out_vals = Vec::with_capacity(wanted.len());
    for tag in wanted {
        match record.column_value(tag) {
            Some(RecordSlot::Value(v)) => {
                out_cols.push(tag.to_string());
                out_vals.push(v);
            }
            Some(RecordSlot::Unavailable) | None => {
                return Err(crate::error::OrmError::column_not_in_record(tag));
            }
        }
    }
    Ok((out_cols, out_vals))
}
