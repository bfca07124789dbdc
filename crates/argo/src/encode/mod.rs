//! Encode engine.
//!
//! A [`JsonWriter`] wraps any `fmt::Write` sink; every encoder is a
//! [`ValueEncoder`] built once by the registry.

mod any;
mod collections;
mod object;
mod scalar;
mod string;
mod wrap;

use std::fmt;

use crate::error::Result;
use crate::options::EncodeOptions;

pub(crate) use any::AnyEncoder;
pub(crate) use collections::{MapEncoder, SequenceEncoder};
pub(crate) use object::{
    MemberEncoder, ObjectMemberEncoder, TypedMemberEncoder, TypedVariantArm, VariantArm, VariantEncoder,
};
pub use scalar::{BoolEncoder, DisplayEncoder, FloatEncoder};
pub(crate) use scalar::{ParseEncoder, TextEncoder};
pub(crate) use string::quoted;
pub(crate) use wrap::{NullableEncoder, ProjectedEncoder};

/// Writes one `T` as JSON.
pub trait ValueEncoder<T>: Send + Sync {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()>;
}

/// The encode sink.
pub struct JsonWriter<'w> {
    sink: &'w mut dyn fmt::Write,
    options: EncodeOptions,
}

impl<'w> JsonWriter<'w> {
    pub fn new(sink: &'w mut dyn fmt::Write, options: EncodeOptions) -> Self {
        Self { sink, options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Writes `text` verbatim.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.sink.write_str(text)?;
        Ok(())
    }

    pub fn write_char(&mut self, ch: char) -> Result<()> {
        self.sink.write_char(ch)?;
        Ok(())
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.write_raw("null")
    }

    pub fn write_display(&mut self, value: &dyn fmt::Display) -> Result<()> {
        write!(self.sink, "{value}")?;
        Ok(())
    }

    /// Writes a quoted string literal, escaping only when needed.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.sink.write_char('"')?;
        if string::needs_escaping(text) {
            string::write_escaped(self.sink, text)?;
        } else {
            self.sink.write_str(text)?;
        }
        self.sink.write_char('"')?;
        Ok(())
    }

    /// Separator between array items and object members.
    pub fn item_separator(&mut self) -> Result<()> {
        let separator = self.options.item_separator();
        self.write_raw(separator)
    }

    /// Separator between a key and its value.
    pub fn key_separator(&mut self) -> Result<()> {
        let separator = self.options.key_separator();
        self.write_raw(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_primitives() {
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out, EncodeOptions::default());
        writer.write_char('[').unwrap();
        writer.write_string("a\"b").unwrap();
        writer.item_separator().unwrap();
        writer.write_display(&42).unwrap();
        writer.item_separator().unwrap();
        writer.write_null().unwrap();
        writer.write_char(']').unwrap();
        assert_eq!(out, r#"["a\"b", 42, null]"#);
    }

    #[test]
    fn compact_separators() {
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out, EncodeOptions::new().compact(true));
        writer.write_string("k").unwrap();
        writer.key_separator().unwrap();
        writer.write_display(&1).unwrap();
        assert_eq!(out, r#""k":1"#);
    }
}
