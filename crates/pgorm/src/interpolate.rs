//! Interpolation: renders a `(sql, args)` pair into a single literal-bearing SQL string.
//!
//! Grounded on `original_source/sqlx-runner/insert_exec_test.go` — in particular
//! `TestInsertDoubleDollarQuote` (dollar-tag collision avoidance),
//! `TestInsertBytes` (bytea hex rendering), and `TestInsertDefault` (the `DEFAULT`
//! sentinel). Off by default; a builder opts in via `.set_is_interpolated(true)`, or
//! globally via `config::set_enable_interpolation(true)`.

use crate::dialect;
use crate::error::{InterpolationError, OrmResult};
use crate::value::SqlValue;

/// Render `sql` (containing `$1..$k` placeholders) with `args` substituted as SQL
/// literals, returning a single self-contained SQL string.
pub fn interpolate(sql: &str, args: &[SqlValue]) -> OrmResult<String> {
    // Dollar-tag safety: if any string/text payload contains the active tag, rotate it
    // *before* rendering any dollar-quoted literal, so every literal below is fenced with
    // a tag none of the payloads collide with.
    let string_payloads: Vec<&str> = args
        .iter()
        .filter_map(|a| match a {
            SqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    dialect::ensure_dollar_tag_safe(&string_payloads);

    let rendered: Vec<String> = args.iter().map(render_literal).collect::<Result<_, _>>()?;

    let mut out = String::with_capacity(sql.len() + rendered.iter().map(|s| s.len()).sum::<usize>());
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            let n: usize = sql[start..end].parse().unwrap_or(0);
            if n >= 1 && n <= rendered.len() {
                out.push_str(&rendered[n - 1]);
                i = end;
                continue;
            }
        }
        out.push(sql[i..].chars().next().unwrap());
        i += sql[i..].chars().next().unwrap().len_utf8();
    }
    Ok(out)
}

fn render_literal(value: &SqlValue) -> OrmResult<String> {
    match value {
        SqlValue::Null => Ok("NULL".to_string()),
        SqlValue::Default => Ok("DEFAULT".to_string()),
        SqlValue::Bool(b) => Ok(if *b { "TRUE".to_string() } else { "FALSE".to_string() }),
        SqlValue::I16(v) => Ok(v.to_string()),
        SqlValue::I32(v) => Ok(v.to_string()),
        SqlValue::I64(v) => Ok(v.to_string()),
        SqlValue::F32(v) => render_float(*v as f64),
        SqlValue::F64(v) => render_float(*v),
        SqlValue::Text(s) => Ok(render_string(s)),
        SqlValue::Bytes(b) => Ok(render_bytes(b)),
        SqlValue::Timestamp(t) => Ok(dialect::current().quote_literal_string(
            &t.format("%Y-%m-%d %H:%M:%S%.6f+00").to_string(),
        )),
        SqlValue::Json(v) => Ok(render_string(&v.to_string())),
        SqlValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_literal).collect::<Result<_, _>>()?;
            Ok(format!("ARRAY[{}]", rendered.join(", ")))
        }
    }
}

fn render_float(v: f64) -> OrmResult<String> {
    if !v.is_finite() {
        return Err(InterpolationError::NonFiniteFloat.into());
    }
    Ok(v.to_string())
}

/// Render a string literal, choosing dollar-quoting when the value contains a single
/// quote (cheaper than doubling every `'`), and plain-quoting otherwise.
fn render_string(s: &str) -> String {
    if s.contains('\'') {
        format!("{}{}{}", dialect::dollar_fence(), s, dialect::dollar_fence())
    } else {
        dialect::current().quote_literal_string(s)
    }
}

fn render_bytes(b: &[u8]) -> String {
    let mut hex = String::with_capacity(b.len() * 2 + 3);
    hex.push_str("'\\x");
    for byte in b {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex.push('\'');
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_basic_types() {
        let sql = "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = $3";
        let args = vec![SqlValue::I64(42), SqlValue::Bool(true), SqlValue::Null];
        let out = interpolate(sql, &args).unwrap();
        assert_eq!(out, "SELECT * FROM t WHERE a = 42 AND b = TRUE AND c = NULL");
    }

    #[test]
    fn interpolate_default_sentinel() {
        let sql = "UPDATE t SET a = $1";
        let out = interpolate(sql, &[SqlValue::Default]).unwrap();
        assert_eq!(out, "UPDATE t SET a = DEFAULT");
    }

    #[test]
    fn interpolate_rejects_non_finite_float() {
        let sql = "SELECT $1";
        let err = interpolate(sql, &[SqlValue::F64(f64::NAN)]);
        assert!(err.is_err());
    }

    #[test]
    fn interpolate_bytes_as_hex() {
        let sql = "SELECT $1";
        let out = interpolate(sql, &[SqlValue::bytes(vec![0xDE, 0xAD, 0xBE, 0xEF])]).unwrap();
        assert_eq!(out, "SELECT '\\xdeadbeef'");
    }
}
