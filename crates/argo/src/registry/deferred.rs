//! Handles for codecs still under construction.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::CodecRegistry;
use crate::decode::{JsonReader, ValueDecoder};
use crate::encode::{JsonWriter, ValueEncoder};
use crate::error::Result;
use crate::shape::Codable;

/// Stands in for the decoder of a recursive type while that decoder is
/// being built, and forwards to it once it exists.
pub(crate) struct DeferredDecoder<T> {
    keys: bool,
    target: OnceCell<Arc<dyn ValueDecoder<T>>>,
}

impl<T: Codable> DeferredDecoder<T> {
    pub(crate) fn new() -> Self {
        Self {
            keys: false,
            target: OnceCell::new(),
        }
    }

    pub(crate) fn keys() -> Self {
        Self {
            keys: true,
            target: OnceCell::new(),
        }
    }

    fn target(&self) -> Result<&Arc<dyn ValueDecoder<T>>> {
        self.target.get_or_try_init(|| {
            let registry = CodecRegistry::global();
            if self.keys {
                registry.key_decoder::<T>()
            } else {
                registry.decoder::<T>()
            }
        })
    }
}

impl<T: Codable> ValueDecoder<T> for DeferredDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        self.target()?.decode(reader)
    }

    fn matching_member_count(&self, names: &[Arc<str>]) -> usize {
        self.target()
            .map(|target| target.matching_member_count(names))
            .unwrap_or(0)
    }
}

pub(crate) struct DeferredEncoder<T> {
    keys: bool,
    target: OnceCell<Arc<dyn ValueEncoder<T>>>,
}

impl<T: Codable> DeferredEncoder<T> {
    pub(crate) fn new() -> Self {
        Self {
            keys: false,
            target: OnceCell::new(),
        }
    }

    pub(crate) fn keys() -> Self {
        Self {
            keys: true,
            target: OnceCell::new(),
        }
    }

    fn target(&self) -> Result<&Arc<dyn ValueEncoder<T>>> {
        self.target.get_or_try_init(|| {
            let registry = CodecRegistry::global();
            if self.keys {
                registry.key_encoder::<T>()
            } else {
                registry.encoder::<T>()
            }
        })
    }
}

impl<T: Codable> ValueEncoder<T> for DeferredEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        self.target()?.encode(writer, value)
    }
}
