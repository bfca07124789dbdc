//! Encoded text buffers for argo.
//!
//! This crate lets the JSON engine read text straight out of encoded byte
//! buffers without transcoding them into a `String` first.
//!
//! # Overview
//!
//! - [`TextEncoding`] - UTF-8, UTF-16LE and UTF-16BE code-unit access
//! - [`Reader`] - A character cursor over an encoded byte slice
//!
//! # Example
//!
//! ```
//! use argo_buffers::{Reader, TextEncoding};
//!
//! let bytes = TextEncoding::Utf16Le.encode("ok");
//! let mut reader = Reader::new(&bytes, TextEncoding::Utf16Le);
//!
//! assert_eq!(reader.read(), Some('o'));
//! assert_eq!(reader.read(), Some('k'));
//! assert_eq!(reader.read(), None);
//! ```

mod encoding;
mod reader;

pub use encoding::{TextEncoding, REPLACEMENT};
pub use reader::Reader;
