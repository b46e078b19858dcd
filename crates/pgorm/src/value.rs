//! Canonical argument representation shared by the builder graph and the interpolator.
//!
//! Builders accumulate `SqlValue`s instead of raw `Box<dyn ToSql>` so that a later pass
//! (the interpolator, see `crate::interpolate`) can inspect and render each argument as a
//! SQL literal without needing to downcast a trait object.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};

/// A single bound argument, or the `DEFAULT` sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    /// Homogeneous array of values, rendered as `ARRAY[...]` when interpolated.
    Array(Vec<SqlValue>),
    Json(serde_json::Value),
    /// The `DEFAULT` keyword. Never bound as a placeholder; callers must special-case it
    /// at the builder layer (see `builder::update::SetField`).
    Default,
}

impl SqlValue {
    pub fn is_default(&self) -> bool {
        matches!(self, SqlValue::Default)
    }
}

macro_rules! impl_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for SqlValue {
            fn from(v: $ty) -> Self {
                SqlValue::$variant(v)
            }
        }
    };
}

impl_from!(Bool, bool);
impl_from!(I16, i16);
impl_from!(I32, i32);
impl_from!(I64, i64);
impl_from!(F32, f32);
impl_from!(F64, f64);
impl_from!(Text, String);
impl_from!(Timestamp, DateTime<Utc>);
impl_from!(Json, serde_json::Value);

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl SqlValue {
    /// Build a byte-string value. Not a `From` impl: `Vec<u8>` would otherwise collide
    /// with the blanket array constructor below at the type-checker level.
    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        SqlValue::Bytes(v.into())
    }

    /// Build an array value from any iterable of values convertible to `SqlValue`.
    pub fn array<T: Into<SqlValue>>(items: impl IntoIterator<Item = T>) -> Self {
        SqlValue::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Marker type so `SqlValue::Default` can be written as `crate::value::Default` at call sites
/// that don't want to spell out the enum variant (mirrors `dat.DEFAULT` in the original).
pub const DEFAULT: SqlValue = SqlValue::Default;

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => v.to_sql(ty, out),
            SqlValue::I16(v) => v.to_sql(ty, out),
            SqlValue::I32(v) => v.to_sql(ty, out),
            SqlValue::I64(v) => v.to_sql(ty, out),
            SqlValue::F32(v) => v.to_sql(ty, out),
            SqlValue::F64(v) => v.to_sql(ty, out),
            SqlValue::Text(v) => v.to_sql(ty, out),
            SqlValue::Bytes(v) => v.to_sql(ty, out),
            SqlValue::Timestamp(v) => v.to_sql(ty, out),
            SqlValue::Json(v) => v.to_sql(ty, out),
            SqlValue::Array(items) => {
                // Only used when the array is round-tripped through the driver directly
                // (as opposed to being interpolated as an ARRAY[...] literal).
                let rendered: Vec<String> = items
                    .iter()
                    .map(|i| i.to_literal_unquoted())
                    .collect::<Result<_, _>>()
                    .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Sync + Send>)?;
                rendered.to_sql(ty, out)
            }
            SqlValue::Default => Err("SqlValue::Default cannot be bound as a parameter".into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl SqlValue {
    /// Best-effort plain-text rendering used only as an internal helper for nested arrays;
    /// not SQL-escaped. Real literal rendering goes through `crate::interpolate`.
    fn to_literal_unquoted(&self) -> Result<String, crate::error::OrmError> {
        Ok(match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::F32(v) => v.to_string(),
            SqlValue::F64(v) => v.to_string(),
            SqlValue::Text(v) => v.clone(),
            SqlValue::Bytes(_) | SqlValue::Timestamp(_) | SqlValue::Json(_) | SqlValue::Array(_) => {
                return Err(crate::error::OrmError::interpolation(
                    "nested arrays of this type are not supported",
                ));
            }
            SqlValue::Default => {
                return Err(crate::error::OrmError::interpolation(
                    "DEFAULT cannot appear inside an array literal",
                ));
            }
        })
    }
}
