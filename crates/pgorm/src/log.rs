//! Injectable logging sinks.
//!
//! Grounded directly in `original_source/dat/log.go` and
//! `original_source/internal/log/logger.go`: three independent function slots
//! (`debug`, `sql`, `error`), each defaulting to a no-op except `error`, plus guard
//! functions so callers can skip formatting work when nobody is listening.

use std::sync::{Arc, RwLock};

/// A log sink: receives a message and a set of key/value pairs.
pub type LogFn = Arc<dyn Fn(&str, &[(&str, String)]) + Send + Sync>;

struct Sinks {
    debug: Option<LogFn>,
    sql: Option<LogFn>,
    error: Option<LogFn>,
}

impl Default for Sinks {
    fn default() -> Self {
        Self {
            debug: None,
            sql: None,
            error: Some(Arc::new(|msg, kvs| {
                eprint!("[pgorm] {msg}");
                for (k, v) in kvs {
                    eprint!(" {k}={v}");
                }
                eprintln!();
            })),
        }
    }
}

static SINKS: RwLock<Option<Sinks>> = RwLock::new(None);

fn with_sinks<R>(f: impl FnOnce(&Sinks) -> R) -> R {
    {
        let guard = SINKS.read().expect("log sinks lock poisoned");
        if let Some(sinks) = guard.as_ref() {
            return f(sinks);
        }
    }
    let mut guard = SINKS.write().expect("log sinks lock poisoned");
    if guard.is_none() {
        *guard = Some(Sinks::default());
    }
    f(guard.as_ref().unwrap())
}

/// Install the debug sink. Pass `None` to silence it.
pub fn set_debug_logger(f: Option<LogFn>) {
    let mut guard = SINKS.write().expect("log sinks lock poisoned");
    guard.get_or_insert_with(Sinks::default).debug = f;
}

/// Install the SQL sink. Pass `None` to silence it.
pub fn set_sql_logger(f: Option<LogFn>) {
    let mut guard = SINKS.write().expect("log sinks lock poisoned");
    guard.get_or_insert_with(Sinks::default).sql = f;
}

/// Install the error sink. Pass `None` to silence it entirely (including the default
/// stderr fallback).
pub fn set_error_logger(f: Option<LogFn>) {
    let mut guard = SINKS.write().expect("log sinks lock poisoned");
    guard.get_or_insert_with(Sinks::default).error = f;
}

pub fn has_debug_logger() -> bool {
    with_sinks(|s| s.debug.is_some())
}

pub fn has_sql_logger() -> bool {
    with_sinks(|s| s.sql.is_some())
}

pub fn has_error_logger() -> bool {
    with_sinks(|s| s.error.is_some())
}

pub fn debug(msg: &str, kvs: &[(&str, String)]) {
    with_sinks(|s| {
        if let Some(f) = &s.debug {
            f(msg, kvs);
        }
    });
}

pub fn sql(msg: &str, kvs: &[(&str, String)]) {
    with_sinks(|s| {
        if let Some(f) = &s.sql {
            f(msg, kvs);
        }
    });
}

pub fn error(msg: &str, kvs: &[(&str, String)]) {
    with_sinks(|s| {
        if let Some(f) = &s.error {
            f(msg, kvs);
        }
    });
}

/// Log then return a formatted error, mirroring the original's `log.ErrorE`.
pub fn error_e(msg: impl Into<String>) -> crate::error::OrmError {
    let msg = msg.into();
    error(&msg, &[]);
    crate::error::OrmError::Other(msg)
}

/// Log then abort the process, mirroring the original's `log.Fatal` (used only by
/// strict-mode transaction-leak detection, see `crate::transaction`).
pub fn fatal(msg: &str, kvs: &[(&str, String)]) -> ! {
    error(msg, kvs);
    std::process::abort();
}

/// Wire all three sinks to `tracing` events, gated behind the `tracing` feature. The SQL
/// sink emits at `target: "pgorm::sql"`, mirroring `TracingSqlHook`'s dedicated target.
#[cfg(feature = "tracing")]
pub fn use_tracing() {
    set_debug_logger(Some(Arc::new(|msg, kvs| {
        tracing::debug!(target: "pgorm", kvs = ?kvs, "{msg}");
    })));
    set_sql_logger(Some(Arc::new(|msg, kvs| {
        tracing::info!(target: "pgorm::sql", kvs = ?kvs, "{msg}");
    })));
    set_error_logger(Some(Arc::new(|msg, kvs| {
        tracing::error!(target: "pgorm", kvs = ?kvs, "{msg}");
    })));
}
