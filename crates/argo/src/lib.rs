//! Type-driven JSON codecs over UTF-8 and UTF-16 byte buffers.
//!
//! Every [`Codable`] type describes its shape once; the [`CodecRegistry`]
//! turns that description into a decoder and an encoder the first time the
//! type is used and caches both for the life of the process. Decoding reads
//! tokens straight from the encoded bytes, with no intermediate tree.
//!
//! # Example
//!
//! ```
//! use argo::{JsonObject, TextEncoding};
//!
//! #[derive(Debug, Default, PartialEq, JsonObject)]
//! struct Point {
//!     #[json(rename = "X")]
//!     x: i32,
//!     #[json(rename = "Y")]
//!     y: i32,
//! }
//!
//! let text = argo::encode(&Point { x: 100, y: 200 }).unwrap();
//! assert_eq!(text, r#"{"X": 100, "Y": 200}"#);
//!
//! let bytes = TextEncoding::Utf16Le.encode(&text);
//! let point: Point = argo::decode(&bytes, TextEncoding::Utf16Le).unwrap();
//! assert_eq!(point, Point { x: 100, y: 200 });
//! ```

extern crate self as argo;

mod decimal;
mod error;
mod impls;
mod member;
mod options;
mod registry;
mod runtime;
mod shape;
mod value;

pub mod decode;
pub mod encode;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::{fmt, io};

pub use argo_buffers::TextEncoding;
pub use argo_derive::{JsonObject, JsonVariants};

pub use decimal::{Decimal, ParseDecimalError, MAX_SCALE};
pub use decode::{JsonReader, LooseObject, ValueDecoder};
pub use encode::{JsonWriter, ValueEncoder};
pub use error::{CodecError, Result};
pub use member::{members_of, EncodingMember, JsonObject};
pub use options::{DecodeOptions, EncodeOptions, DEFAULT_MAX_DEPTH};
pub use registry::CodecRegistry;
pub use runtime::RuntimeType;
pub use shape::{
    ArrayForm, Codable, Descriptor, EachEntryFn, EachFn, MapForm, ObjectForm, ParseForm, SequenceForm, TextForm,
    VariantSet,
};
pub use value::Value;

/// Encodes `value` with default options.
pub fn encode<T: Codable>(value: &T) -> Result<String> {
    encode_with(value, &EncodeOptions::default())
}

pub fn encode_with<T: Codable>(value: &T, options: &EncodeOptions) -> Result<String> {
    let mut out = String::new();
    encode_to(value, &mut out, options)?;
    Ok(out)
}

/// Encodes into any `fmt::Write` sink.
pub fn encode_to<T: Codable>(value: &T, sink: &mut dyn fmt::Write, options: &EncodeOptions) -> Result<()> {
    let encoder = CodecRegistry::global().encoder::<T>()?;
    encoder.encode(&mut JsonWriter::new(sink, *options), value)
}

/// Forwards `fmt::Write` to an `io::Write`, keeping the first I/O error.
struct IoSink<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

/// Encodes as UTF-8 into an `io::Write` sink.
pub fn encode_to_writer<T: Codable, W: io::Write>(value: &T, writer: W, options: &EncodeOptions) -> Result<()> {
    let mut sink = IoSink { inner: writer, error: None };
    let result = encode_to(value, &mut sink, options);
    match sink.error.take() {
        Some(error) => Err(CodecError::Io(error)),
        None => result,
    }
}

/// Encodes into a byte buffer in the given encoding, without a byte order
/// mark.
pub fn encode_to_bytes<T: Codable>(value: &T, encoding: TextEncoding) -> Result<Vec<u8>> {
    Ok(encoding.encode(&encode(value)?))
}

/// Encodes a value whose type is only known at runtime.
pub fn encode_as(value: &dyn Any, runtime: &RuntimeType) -> Result<String> {
    let mut out = String::new();
    runtime.encode(&mut JsonWriter::new(&mut out, EncodeOptions::default()), value)?;
    Ok(out)
}

/// Decodes a whole buffer with default options.
pub fn decode<T: Codable>(bytes: &[u8], encoding: TextEncoding) -> Result<T> {
    decode_with(bytes, encoding, &DecodeOptions::default())
}

/// Decodes UTF-8 text.
pub fn decode_str<T: Codable>(text: &str) -> Result<T> {
    decode(text.as_bytes(), TextEncoding::Utf8)
}

/// Decodes a whole buffer: anything but whitespace after the value is an
/// error.
pub fn decode_with<T: Codable>(bytes: &[u8], encoding: TextEncoding, options: &DecodeOptions) -> Result<T> {
    let decoder = CodecRegistry::global().decoder::<T>()?;
    let mut reader = JsonReader::new(bytes, encoding, *options);
    let value = decoder.decode(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Reads `reader` to the end, then decodes the whole buffer.
pub fn decode_from_reader<T: Codable, R: io::Read>(mut reader: R, encoding: TextEncoding) -> Result<T> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes, encoding)
}

/// Decodes one value starting at the first character boundary at or after
/// `offset`, returning it with the byte offset just past it. Whatever
/// follows the value is left alone.
///
/// ```
/// let bytes = br#"[1] [2, 3]"#;
/// let (first, next): (Vec<u8>, usize) = argo::decode_at(bytes, Default::default(), 0).unwrap();
/// let (second, _): (Vec<u8>, usize) = argo::decode_at(bytes, Default::default(), next).unwrap();
/// assert_eq!((first, second), (vec![1], vec![2, 3]));
/// ```
pub fn decode_at<T: Codable>(bytes: &[u8], encoding: TextEncoding, offset: usize) -> Result<(T, usize)> {
    let decoder = CodecRegistry::global().decoder::<T>()?;
    let mut reader = JsonReader::at(bytes, encoding, offset, DecodeOptions::default());
    let value = decoder.decode(&mut reader)?;
    Ok((value, reader.position()))
}

/// Decodes a whole buffer into the type described by `runtime`.
pub fn decode_as(bytes: &[u8], encoding: TextEncoding, runtime: &RuntimeType) -> Result<Box<dyn Any + Send>> {
    let mut reader = JsonReader::new(bytes, encoding, DecodeOptions::default());
    let value = runtime.decode(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Decodes an object whose known members have runtime-chosen types.
///
/// Keys listed in `fields` decode into their type; any other key decodes as
/// a [`Value`]. `null` gives `None`.
///
/// ```
/// use argo::{RuntimeType, Value};
///
/// let fields = [("id", RuntimeType::of::<u64>())];
/// let object = argo::decode_fields(br#"{"id": 7, "tag": "x"}"#, Default::default(), &fields)
///     .unwrap()
///     .unwrap();
/// assert_eq!(object["id"].downcast_ref::<u64>(), Some(&7));
/// assert_eq!(object["tag"].downcast_ref::<Value>(), Some(&Value::from("x")));
/// ```
pub fn decode_fields(
    bytes: &[u8],
    encoding: TextEncoding,
    fields: &[(&str, RuntimeType)],
) -> Result<Option<LooseObject>> {
    let fields: HashMap<_, _> = fields.iter().map(|(name, runtime)| (Arc::from(*name), *runtime)).collect();
    let mut reader = JsonReader::new(bytes, encoding, DecodeOptions::default());
    let object = decode::FieldLookupDecoder::new(fields).decode(&mut reader)?;
    reader.finish()?;
    Ok(object)
}
