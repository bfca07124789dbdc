//! Leaf encoders.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use argo_util::{shared_pool, ObjectPool};

use super::{JsonWriter, ValueEncoder};
use crate::error::Result;

/// Writes a value through its `Display` impl, unquoted.
///
/// Used for integers and [`Decimal`](crate::Decimal).
pub struct DisplayEncoder<T>(PhantomData<fn(&T)>);

impl<T> DisplayEncoder<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DisplayEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Display> ValueEncoder<T> for DisplayEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        writer.write_display(value)
    }
}

/// Floating-point numbers in their shortest round-trip form.
///
/// Very large and very small magnitudes use exponent notation. NaN and the
/// infinities have no JSON spelling and encode as `null`.
pub struct FloatEncoder;

fn exponent_form(value: f64) -> bool {
    let magnitude = value.abs();
    magnitude != 0.0 && !(1e-7..1e21).contains(&magnitude)
}

impl ValueEncoder<f64> for FloatEncoder {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &f64) -> Result<()> {
        match *value {
            v if !v.is_finite() => writer.write_null(),
            v if exponent_form(v) => writer.write_display(&format_args!("{v:e}")),
            v => writer.write_display(&v),
        }
    }
}

impl ValueEncoder<f32> for FloatEncoder {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &f32) -> Result<()> {
        match *value {
            v if !v.is_finite() => writer.write_null(),
            v if exponent_form(f64::from(v)) => writer.write_display(&format_args!("{v:e}")),
            v => writer.write_display(&v),
        }
    }
}

pub struct BoolEncoder;

impl ValueEncoder<bool> for BoolEncoder {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &bool) -> Result<()> {
        writer.write_raw(if *value { "true" } else { "false" })
    }
}

/// String-like types, written as an escaped literal.
pub(crate) struct TextEncoder<T> {
    as_str: fn(&T) -> &str,
}

impl<T> TextEncoder<T> {
    pub(crate) fn new(as_str: fn(&T) -> &str) -> Self {
        Self { as_str }
    }
}

impl<T: 'static> ValueEncoder<T> for TextEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        writer.write_string((self.as_str)(value))
    }
}

/// Scalars whose JSON form is their formatted text inside a string literal.
pub(crate) struct ParseEncoder<T> {
    format: fn(&T, &mut dyn fmt::Write) -> fmt::Result,
    buffers: Arc<ObjectPool<String>>,
}

impl<T> ParseEncoder<T> {
    pub(crate) fn new(format: fn(&T, &mut dyn fmt::Write) -> fmt::Result) -> Self {
        Self {
            format,
            buffers: shared_pool(),
        }
    }
}

impl<T: 'static> ValueEncoder<T> for ParseEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        let mut text = self.buffers.acquire();
        (self.format)(value, &mut *text)?;
        writer.write_string(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::EncodeOptions;

    fn encode<T>(encoder: &dyn ValueEncoder<T>, value: T) -> String {
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out, EncodeOptions::default());
        encoder.encode(&mut writer, &value).unwrap();
        out
    }

    #[test]
    fn floats_use_shortest_form() {
        assert_eq!(encode::<f64>(&FloatEncoder, 0.1), "0.1");
        assert_eq!(encode::<f64>(&FloatEncoder, 2.0), "2");
        assert_eq!(encode::<f64>(&FloatEncoder, -0.0), "-0");
        assert_eq!(encode::<f64>(&FloatEncoder, 1e300), "1e300");
        assert_eq!(encode::<f64>(&FloatEncoder, 1.5e-10), "1.5e-10");
        assert_eq!(encode::<f32>(&FloatEncoder, 0.1), "0.1");
        assert_eq!(encode::<f32>(&FloatEncoder, f32::MAX), "3.4028235e38");
    }

    #[test]
    fn non_finite_floats_are_null() {
        assert_eq!(encode::<f64>(&FloatEncoder, f64::NAN), "null");
        assert_eq!(encode::<f32>(&FloatEncoder, f32::NEG_INFINITY), "null");
    }

    #[test]
    fn leaves() {
        assert_eq!(encode(&DisplayEncoder::<i64>::new(), i64::MIN), "-9223372036854775808");
        assert_eq!(encode(&BoolEncoder, true), "true");
        assert_eq!(encode(&TextEncoder::<String>::new(String::as_str), "a\tb".to_owned()), r#""a\tb""#);
        let parse = ParseEncoder::<std::net::Ipv4Addr>::new(|v, out| write!(out, "{v}"));
        assert_eq!(encode(&parse, std::net::Ipv4Addr::LOCALHOST), r#""127.0.0.1""#);
    }
}
