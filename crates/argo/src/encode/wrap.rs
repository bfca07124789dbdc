//! Encoders that wrap another encoder.

use std::sync::Arc;

use super::{JsonWriter, ValueEncoder};
use crate::error::Result;

/// `Option<T>`: `None` is `null`.
pub(crate) struct NullableEncoder<T> {
    inner: Arc<dyn ValueEncoder<T>>,
}

impl<T> NullableEncoder<T> {
    pub(crate) fn new(inner: Arc<dyn ValueEncoder<T>>) -> Self {
        Self { inner }
    }
}

impl<T: 'static> ValueEncoder<Option<T>> for NullableEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &Option<T>) -> Result<()> {
        match value {
            Some(value) => self.inner.encode(writer, value),
            None => writer.write_null(),
        }
    }
}

/// Encodes a `T` through the encoder of a `U` it derefs to.
pub(crate) struct ProjectedEncoder<T, U> {
    inner: Arc<dyn ValueEncoder<U>>,
    project: fn(&T) -> &U,
}

impl<T, U> ProjectedEncoder<T, U> {
    pub(crate) fn new(inner: Arc<dyn ValueEncoder<U>>, project: fn(&T) -> &U) -> Self {
        Self { inner, project }
    }
}

impl<T: 'static, U: 'static> ValueEncoder<T> for ProjectedEncoder<T, U> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        self.inner.encode(writer, (self.project)(value))
    }
}
