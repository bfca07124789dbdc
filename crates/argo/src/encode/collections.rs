//! Sequence and map encoders.

use std::sync::Arc;

use super::{JsonWriter, ValueEncoder};
use crate::error::Result;
use crate::shape::{EachEntryFn, EachFn};

/// Arrays and lists: every element in iteration order.
pub(crate) struct SequenceEncoder<T, E> {
    element: Arc<dyn ValueEncoder<E>>,
    each: EachFn<T, E>,
}

impl<T, E> SequenceEncoder<T, E> {
    pub(crate) fn new(element: Arc<dyn ValueEncoder<E>>, each: EachFn<T, E>) -> Self {
        Self { element, each }
    }
}

impl<T: 'static, E: 'static> ValueEncoder<T> for SequenceEncoder<T, E> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        writer.write_char('[')?;
        let mut first = true;
        (self.each)(value, &mut |element| {
            if !first {
                writer.item_separator()?;
            }
            first = false;
            self.element.encode(writer, element)
        })?;
        writer.write_char(']')
    }
}

/// Maps: one member per entry, the key written by the key encoder.
pub(crate) struct MapEncoder<T, K, V> {
    key: Arc<dyn ValueEncoder<K>>,
    value: Arc<dyn ValueEncoder<V>>,
    each_entry: EachEntryFn<T, K, V>,
}

impl<T, K, V> MapEncoder<T, K, V> {
    pub(crate) fn new(
        key: Arc<dyn ValueEncoder<K>>,
        value: Arc<dyn ValueEncoder<V>>,
        each_entry: EachEntryFn<T, K, V>,
    ) -> Self {
        Self { key, value, each_entry }
    }
}

impl<T: 'static, K: 'static, V: 'static> ValueEncoder<T> for MapEncoder<T, K, V> {
    fn encode(&self, writer: &mut JsonWriter<'_>, map: &T) -> Result<()> {
        writer.write_char('{')?;
        let mut first = true;
        (self.each_entry)(map, &mut |key, value| {
            if !first {
                writer.item_separator()?;
            }
            first = false;
            self.key.encode(writer, key)?;
            writer.key_separator()?;
            self.value.encode(writer, value)
        })?;
        writer.write_char('}')
    }
}
