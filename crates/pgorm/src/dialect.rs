//! PostgreSQL dialect: identifier quoting, placeholder syntax, and the process-wide
//! dollar-quote tag used by the interpolator.
//!
//! Grounded in `dat.Dialect = postgres.New()` (a single process-wide singleton in the
//! original source) and in `TestInsertDoubleDollarQuote`, which pins down the collision
//! rule for the active dollar tag.

use rand::Rng;
use std::sync::{Mutex, OnceLock};

/// A SQL dialect. PostgreSQL is the only implementation shipped; the trait exists so the
/// process-wide singleton has a seam, not because other dialects are in scope.
pub trait Dialect: Send + Sync {
    fn placeholder(&self, n: usize) -> String;
    fn quote_ident(&self, ident: &str) -> String;
    fn quote_literal_string(&self, s: &str) -> String;
}

/// PostgreSQL dialect implementation.
#[derive(Debug, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn placeholder(&self, n: usize) -> String {
        format!("${n}")
    }

    fn quote_ident(&self, ident: &str) -> String {
        if ident == "*" || ident.contains('.') || ident.contains(' ') || ident.contains('(') {
            // Wildcard, dotted, parenthesized (a function call), or otherwise already an
            // expression: pass through untouched.
            return ident.to_string();
        }
        let mut out = String::with_capacity(ident.len() + 2);
        out.push('"');
        for ch in ident.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
        out
    }

    fn quote_literal_string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for ch in s.chars() {
            if ch == '\'' {
                out.push('\'');
            }
            out.push(ch);
        }
        out.push('\'');
        out
    }
}

static DIALECT: OnceLock<Box<dyn Dialect>> = OnceLock::new();

/// Install the process-wide dialect. Must be called at most once; later calls are ignored
/// (mirrors the original's plain assignment, made safe for concurrent init).
pub fn set_dialect(dialect: Box<dyn Dialect>) {
    let _ = DIALECT.set(dialect);
}

/// Return the active dialect, installing the default PostgreSQL dialect on first use.
pub fn current() -> &'static dyn Dialect {
    DIALECT.get_or_init(|| Box::new(Postgres)).as_ref()
}

const TAG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TAG_LEN: usize = 8;

static DOLLAR_TAG: OnceLock<Mutex<String>> = OnceLock::new();

fn tag_cell() -> &'static Mutex<String> {
    DOLLAR_TAG.get_or_init(|| Mutex::new("dat".to_string()))
}

/// Return the currently active dollar-quote tag body (without the surrounding `$`s).
pub fn dollar_tag() -> String {
    tag_cell().lock().expect("dollar tag mutex poisoned").clone()
}

fn random_tag() -> String {
    let mut rng = rand::thread_rng();
    (0..TAG_LEN)
        .map(|_| TAG_ALPHABET[rng.gen_range(0..TAG_ALPHABET.len())] as char)
        .collect()
}

/// Ensure the active dollar-quote tag does not collide with any string in `payloads`. If it
/// does, generate fresh random tags (fenced by `$...$`) until one is collision-free and make
/// it the new active tag, process-wide.
pub fn ensure_dollar_tag_safe(payloads: &[&str]) {
    let mut guard = tag_cell().lock().expect("dollar tag mutex poisoned");
    loop {
        let tagged = format!("${}$", guard);
        if !payloads.iter().any(|p| p.contains(&tagged)) {
            return;
        }
        *guard = random_tag();
    }
}

/// Render the active tag fenced as `$tag$`.
pub fn dollar_fence() -> String {
    format!("${}$", dollar_tag())
}
