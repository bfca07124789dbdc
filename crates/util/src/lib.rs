//! Shared runtime utilities for argo.
//!
//! - [`ObjectPool`] and [`shared_pool`] recycle scratch collections between
//!   decode calls.
//! - [`StringTable`] and [`EncodedStringTable`] intern decoded strings.

pub mod pool;
pub mod strings;

pub use pool::{shared_pool, ObjectPool, Poolable, Pooled, DEFAULT_POOL_CAPACITY};
pub use strings::{byte_hash, string_hash, EncodedId, EncodedStringTable, StringTable, DEFAULT_BUCKETS};
