//! Pluggable key-value cache for memoizing query results.
//!
//! Grounded on `original_source/sqlx-runner/init.go`'s package-level
//! `Cache kvs.KeyValueStore` + `SetCache()` singleton. Reproduced here as a `Cache`
//! trait plus a `OnceLock`-installed default `MemoryCache`.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::error::OrmResult;
use crate::value::SqlValue;

/// Opaque, pluggable cache adapter.
pub trait Cache: Send + Sync {
    fn get(&self, key: u64) -> Option<Vec<u8>>;
    fn set(&self, key: u64, bytes: Vec<u8>, ttl: Duration) -> OrmResult<()>;
    fn delete(&self, key: u64) -> OrmResult<()>;
}

struct Entry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// Default in-memory cache implementation. Expired entries are pruned lazily on
/// lookup; there is no background sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<u64, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: u64) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.bytes.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: u64, bytes: Vec<u8>, ttl: Duration) -> OrmResult<()> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key,
            Entry {
                bytes,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: u64) -> OrmResult<()> {
        self.entries.lock().expect("cache mutex poisoned").remove(&key);
        Ok(())
    }
}

static CACHE: OnceLock<Box<dyn Cache>> = OnceLock::new();

/// Install the process-wide cache adapter. Must be called at most once; later calls
/// are ignored (mirrors `SetCache` in the original).
pub fn set_cache(cache: Box<dyn Cache>) {
    let _ = CACHE.set(cache);
}

/// The active cache, installing `MemoryCache` as the default on first use.
pub fn current() -> &'static dyn Cache {
    CACHE.get_or_init(|| Box::new(MemoryCache::new())).as_ref()
}

/// A stable fingerprint of a final `(sql, args)` pair, used as a cache key. Computed
/// before optional interpolation collapses `args` away, so caching behaves identically
/// whether or not interpolation is enabled.
pub fn fingerprint(sql: &str, args: &[SqlValue]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    sql.hash(&mut hasher);
    for arg in args {
        hash_value(arg, &mut hasher);
    }
    hasher.finish()
}

fn hash_value(value: &SqlValue, hasher: &mut impl Hasher) {
    match value {
        SqlValue::Null => 0u8.hash(hasher),
        SqlValue::Default => 1u8.hash(hasher),
        SqlValue::Bool(v) => v.hash(hasher),
        SqlValue::I16(v) => v.hash(hasher),
        SqlValue::I32(v) => v.hash(hasher),
        SqlValue::I64(v) => v.hash(hasher),
        SqlValue::F32(v) => v.to_bits().hash(hasher),
        SqlValue::F64(v) => v.to_bits().hash(hasher),
        SqlValue::Text(v) => v.hash(hasher),
        SqlValue::Bytes(v) => v.hash(hasher),
        SqlValue::Timestamp(v) => v.timestamp_nanos_opt().unwrap_or_default().hash(hasher),
        SqlValue::Json(v) => v.to_string().hash(hasher),
        SqlValue::Array(items) => {
            for item in items {
                hash_value(item, hasher);
            }
        }
    }
}
