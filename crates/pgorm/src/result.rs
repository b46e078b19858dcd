//! Result mapping: rows to scalar targets, flat records, or slices of records.
//!
//! Flat-record and slice-of-record mapping reuse `crate::row::FromRow`, grounded in
//! `pgorm/src/row.rs`. Scalar mapping is new, grounded in the original's `QueryScalar`
//! idiom (see `original_source/sqlx-runner/tx.go` and `upsert_test.go`, which call
//! `.QueryScalar(&id)` against a `RETURNING` clause).

use crate::error::{MappingError, OrmResult};
use crate::row::FromRow;
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

/// A single scalar output slot, bound positionally against a result row's columns.
pub trait ScalarTarget {
    fn assign(&mut self, row: &Row, index: usize) -> OrmResult<()>;
}

impl<'a, T> ScalarTarget for &'a mut T
where
    T: for<'b> FromSql<'b>,
{
    fn assign(&mut self, row: &Row, index: usize) -> OrmResult<()> {
        let value: T = row
            .try_get(index)
            .map_err(|e| crate::error::OrmError::decode(index.to_string(), e.to_string()))?;
        **self = value;
        Ok(())
    }
}

/// Map exactly one row's columns onto `targets`, positionally, failing if the arities
/// don't match.
pub fn query_scalar(row: &Row, targets: &mut [&mut dyn ScalarTarget]) -> OrmResult<()> {
    let actual = row.len();
    if actual != targets.len() {
        return Err(MappingError::ScalarArityMismatch {
            expected: targets.len(),
            actual,
        }
        .into());
    }
    for (i, target) in targets.iter_mut().enumerate() {
        target.assign(row, i)?;
    }
    Ok(())
}

/// Map a single column, across every row, into a flat `Vec<T>`.
pub fn query_slice<T>(rows: &[Row]) -> OrmResult<Vec<T>>
where
    T: for<'a> FromSql<'a>,
{
    rows.iter()
        .map(|row| {
            row.try_get(0)
                .map_err(|e| crate::error::OrmError::decode("0", e.to_string()))
        })
        .collect()
}

/// Map one row into a record via `FromRow`.
pub fn query_struct<T: FromRow>(row: &Row) -> OrmResult<T> {
    T::from_row(row)
}

/// Map every row into a record via `FromRow`.
pub fn query_structs<T: FromRow>(rows: &[Row]) -> OrmResult<Vec<T>> {
    rows.iter().map(T::from_row).collect()
}
