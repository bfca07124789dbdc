//! String lexing and the string-backed decoders.

use std::any::type_name;
use std::sync::Arc;

use argo_buffers::REPLACEMENT;
use argo_util::{shared_pool, ObjectPool};
use once_cell::sync::Lazy;

use super::{JsonReader, ValueDecoder};
use crate::error::{CodecError, Result};

static BUFFERS: Lazy<Arc<ObjectPool<String>>> = Lazy::new(shared_pool::<String>);

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

/// Appends one `\u` code unit, pairing surrogates across escapes.
fn push_unit(buffer: &mut String, pending: &mut Option<u16>, unit: u16) {
    if let Some(high) = pending.take() {
        if is_low_surrogate(unit) {
            let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
            buffer.push(char::from_u32(code).unwrap_or(REPLACEMENT));
            return;
        }
        buffer.push(REPLACEMENT);
    }
    if is_high_surrogate(unit) {
        *pending = Some(unit);
    } else {
        buffer.push(char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT));
    }
}

fn flush_unit(buffer: &mut String, pending: &mut Option<u16>) {
    if pending.take().is_some() {
        buffer.push(REPLACEMENT);
    }
}

impl JsonReader<'_> {
    /// Lexes a string literal and returns its interned text.
    ///
    /// Literals without escapes are interned straight from their bytes. The
    /// first backslash switches to a pooled buffer.
    pub fn lex_string(&mut self) -> Result<Arc<str>> {
        self.consume('"')?;
        let start = self.position();
        loop {
            match self.reader.peek() {
                None => return Err(CodecError::malformed("'\"'", self.position())),
                Some('"') => {
                    let end = self.position();
                    self.reader.read();
                    return Ok(self.intern_span(start, end));
                }
                Some('\\') => return self.lex_escaped_string(start),
                Some(_) => {
                    self.reader.read();
                }
            }
        }
    }

    fn lex_escaped_string(&mut self, start: usize) -> Result<Arc<str>> {
        let mut buffer = BUFFERS.acquire();
        let encoding = self.reader.encoding;
        let scanned = self.reader.span(start, self.position());
        let mut x = 0;
        while let Some((ch, len)) = encoding.read_code(scanned, x) {
            buffer.push(ch);
            x += len;
        }

        let mut pending = None;
        loop {
            let Some(ch) = self.reader.read() else {
                return Err(CodecError::malformed("'\"'", self.position()));
            };
            match ch {
                '"' => break,
                '\\' => {
                    let Some(escaped) = self.reader.read() else {
                        return Err(CodecError::malformed("an escape character", self.position()));
                    };
                    if escaped == 'u' {
                        let unit = self.read_hex_unit();
                        push_unit(&mut buffer, &mut pending, unit);
                        continue;
                    }
                    flush_unit(&mut buffer, &mut pending);
                    buffer.push(match escaped {
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        // '"', '\\', '/' and unknown escapes stand for themselves.
                        other => other,
                    });
                }
                other => {
                    flush_unit(&mut buffer, &mut pending);
                    buffer.push(other);
                }
            }
        }
        flush_unit(&mut buffer, &mut pending);
        Ok(self.intern(&buffer))
    }

    /// Up to four hex digits.
    fn read_hex_unit(&mut self) -> u16 {
        let mut unit = 0u16;
        for _ in 0..4 {
            match self.reader.read_if(|ch| ch.is_ascii_hexdigit()) {
                Some(ch) => unit = (unit << 4) | ch.to_digit(16).unwrap_or(0) as u16,
                None => break,
            }
        }
        unit
    }

    pub(super) fn skip_string(&mut self) -> Result<()> {
        self.consume('"')?;
        loop {
            match self.reader.read() {
                None => return Err(CodecError::malformed("'\"'", self.position())),
                Some('"') => return Ok(()),
                Some('\\') => {
                    self.reader.read();
                }
                Some(_) => {}
            }
        }
    }
}

/// Decoder for string-like types built from the interned text.
pub(crate) struct TextDecoder<T> {
    from: fn(Arc<str>) -> T,
}

impl<T> TextDecoder<T> {
    pub(crate) fn new(from: fn(Arc<str>) -> T) -> Self {
        Self { from }
    }
}

impl<T: 'static> ValueDecoder<T> for TextDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        Ok((self.from)(reader.lex_string()?))
    }
}

/// Decoder for scalars that parse from a string literal.
pub(crate) struct ParseDecoder<T> {
    parse: fn(&str) -> std::result::Result<T, String>,
}

impl<T> ParseDecoder<T> {
    pub(crate) fn new(parse: fn(&str) -> std::result::Result<T, String>) -> Self {
        Self { parse }
    }
}

impl<T: 'static> ValueDecoder<T> for ParseDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let text = reader.lex_string()?;
        (self.parse)(&text).map_err(|reason| CodecError::InvalidText {
            type_name: type_name::<T>(),
            text,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DecodeOptions;
    use argo_buffers::TextEncoding;

    fn lex(text: &str) -> Result<Arc<str>> {
        JsonReader::new(text.as_bytes(), TextEncoding::Utf8, DecodeOptions::default()).lex_string()
    }

    #[test]
    fn escapes_decode() {
        assert_eq!(&*lex(r#""a\"b\\c\nd""#).unwrap(), "a\"b\\c\nd");
        assert_eq!(&*lex(r#""\/\b\f\r\t""#).unwrap(), "/\u{8}\u{c}\r\t");
        assert_eq!(&*lex(r#""\u0041""#).unwrap(), "A");
        assert_eq!(&*lex(r#""\uFFFF""#).unwrap(), "\u{FFFF}");
        assert_eq!(&*lex(r#""\q""#).unwrap(), "q");
    }

    #[test]
    fn scanned_prefix_is_replayed() {
        assert_eq!(&*lex(r#""héllo\tw""#).unwrap(), "héllo\tw");
    }

    #[test]
    fn surrogate_escapes() {
        assert_eq!(&*lex(r#""\ud83d\ude00""#).unwrap(), "\u{1F600}");
        assert_eq!(&*lex(r#""\ud83dx""#).unwrap(), "\u{FFFD}x");
        assert_eq!(&*lex(r#""\ude00""#).unwrap(), "\u{FFFD}");
        assert_eq!(&*lex(r#""\ud83d""#).unwrap(), "\u{FFFD}");
    }

    #[test]
    fn unterminated_is_malformed() {
        assert!(matches!(lex(r#""abc"#), Err(CodecError::MalformedToken { offset: 4, .. })));
        assert!(matches!(lex(r#""ab\"#), Err(CodecError::MalformedToken { .. })));
    }

    #[test]
    fn same_literal_interns_once_per_call() {
        let bytes = br#""key" "key" "key" "key""#;
        let mut reader = JsonReader::new(bytes, TextEncoding::Utf8, DecodeOptions::default());
        let a = reader.lex_string().unwrap();
        let b = reader.lex_string().unwrap();
        let c = reader.lex_string().unwrap();
        let d = reader.lex_string().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&c, &d));
        assert_eq!(a, c);
    }
}
