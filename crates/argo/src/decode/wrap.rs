//! Decoders that wrap another decoder.

use std::any::type_name;
use std::sync::Arc;

use super::{JsonReader, ValueDecoder};
use crate::error::{CodecError, Result};

/// `Option<T>`: `null` is `None`, anything else goes to the inner decoder.
pub(crate) struct NullableDecoder<T> {
    inner: Arc<dyn ValueDecoder<T>>,
}

impl<T> NullableDecoder<T> {
    pub(crate) fn new(inner: Arc<dyn ValueDecoder<T>>) -> Self {
        Self { inner }
    }
}

impl<T: 'static> ValueDecoder<Option<T>> for NullableDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<Option<T>> {
        if reader.try_consume_keyword("null") {
            return Ok(None);
        }
        self.inner.decode(reader).map(Some)
    }

    fn matching_member_count(&self, names: &[Arc<str>]) -> usize {
        self.inner.matching_member_count(names)
    }
}

/// Handles the `null` token in front of a reference-like type.
///
/// `null` decodes into the type's declared null value, or fails when the
/// type has none.
pub(crate) struct NullGuardDecoder<T> {
    inner: Arc<dyn ValueDecoder<T>>,
    null_value: Option<fn() -> T>,
}

impl<T> NullGuardDecoder<T> {
    pub(crate) fn new(inner: Arc<dyn ValueDecoder<T>>, null_value: Option<fn() -> T>) -> Self {
        Self { inner, null_value }
    }
}

impl<T: 'static> ValueDecoder<T> for NullGuardDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        reader.skip_whitespace();
        let offset = reader.position();
        if reader.try_consume_keyword("null") {
            return match self.null_value {
                Some(null_value) => Ok(null_value()),
                None => Err(CodecError::malformed(
                    format!("a '{}' value instead of null", type_name::<T>()),
                    offset,
                )),
            };
        }
        self.inner.decode(reader)
    }

    fn matching_member_count(&self, names: &[Arc<str>]) -> usize {
        self.inner.matching_member_count(names)
    }
}

/// Decodes a `U` and converts it into a `T`.
///
/// Used for pointer types and for the variants of a polymorphic type.
pub(crate) struct MappedDecoder<T, U> {
    inner: Arc<dyn ValueDecoder<U>>,
    wrap: fn(U) -> T,
}

impl<T, U> MappedDecoder<T, U> {
    pub(crate) fn new(inner: Arc<dyn ValueDecoder<U>>, wrap: fn(U) -> T) -> Self {
        Self { inner, wrap }
    }
}

impl<T: 'static, U: 'static> ValueDecoder<T> for MappedDecoder<T, U> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        self.inner.decode(reader).map(self.wrap)
    }

    fn matching_member_count(&self, names: &[Arc<str>]) -> usize {
        self.inner.matching_member_count(names)
    }
}
