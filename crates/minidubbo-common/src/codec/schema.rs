//! Per-type encoding schemas.
//!
//! A [`Schema`] names a Rust type and carries a stable fingerprint of that
//! name. Every encoded value is stamped with its schema fingerprint so the
//! decoding side can check it holds the same target type before it parses a
//! single byte of the body.
//!
//! Schemas are built lazily on first use and kept in a process-wide cache
//! keyed by [`TypeId`]. The cache only ever grows: entries are never evicted
//! and never shared across process boundaries.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

static SCHEMA_CACHE: OnceLock<RwLock<HashMap<TypeId, Schema>>> = OnceLock::new();

/// Encoding descriptor for one Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Schema {
    type_name: &'static str,
    fingerprint: u64,
}

impl Schema {
    fn build<T: ?Sized + 'static>() -> Self {
        let type_name = type_name::<T>();
        Self {
            type_name,
            fingerprint: fingerprint(type_name),
        }
    }

    /// Fully qualified type name, used as the parameter type descriptor.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// 64-bit FNV-1a over the type name.
pub fn fingerprint(type_name: &str) -> u64 {
    type_name.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

fn cache() -> &'static RwLock<HashMap<TypeId, Schema>> {
    SCHEMA_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the cached schema for `T`, building and caching it on first use.
pub fn schema_of<T: ?Sized + 'static>() -> Schema {
    let id = TypeId::of::<T>();

    if let Some(schema) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return *schema;
    }

    let mut schemas = cache().write().unwrap_or_else(PoisonError::into_inner);
    *schemas.entry(id).or_insert_with(|| {
        tracing::trace!(type_name = type_name::<T>(), "Caching codec schema");
        Schema::build::<T>()
    })
}

/// Number of schemas built so far in this process.
pub fn cached_schemas() -> usize {
    cache().read().unwrap_or_else(PoisonError::into_inner).len()
}
