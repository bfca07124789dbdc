//! Token-level cursor over an encoded JSON buffer.

use std::sync::Arc;

use argo_buffers::{Reader, TextEncoding};
use argo_util::{EncodedStringTable, StringTable};

use crate::error::{CodecError, Result};
use crate::options::DecodeOptions;

fn is_json_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// The decode cursor.
///
/// Owns the position inside one buffer plus the string tables of the
/// current call. Codecs receive it by `&mut` and never share it.
pub struct JsonReader<'a> {
    pub(super) reader: Reader<'a>,
    pub(super) options: DecodeOptions,
    depth: usize,
    encoded: Option<EncodedStringTable>,
    strings: Option<StringTable>,
}

impl<'a> JsonReader<'a> {
    pub fn new(bytes: &'a [u8], encoding: TextEncoding, options: DecodeOptions) -> Self {
        Self::at(bytes, encoding, 0, options)
    }

    /// Starts at the first character boundary at or after `offset`.
    pub fn at(bytes: &'a [u8], encoding: TextEncoding, offset: usize, options: DecodeOptions) -> Self {
        let mut reader = Reader::at(bytes, encoding, offset);
        if options.skip_bom && reader.position() == 0 {
            reader.skip_bom();
        }
        Self {
            reader,
            options,
            depth: 0,
            encoded: None,
            strings: None,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn encoding(&self) -> TextEncoding {
        self.reader.encoding
    }

    /// Byte offset of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Moves the cursor back to a position previously returned by
    /// [`position`](Self::position).
    pub fn rewind(&mut self, position: usize) {
        self.reader.seek(position);
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.reader.peek()
    }

    #[inline]
    pub fn read(&mut self) -> Option<char> {
        self.reader.read()
    }

    #[inline]
    pub fn read_if(&mut self, predicate: impl FnOnce(char) -> bool) -> Option<char> {
        self.reader.read_if(predicate)
    }

    pub fn skip_whitespace(&mut self) {
        while self.reader.read_if(is_json_whitespace).is_some() {}
    }

    /// Next non-whitespace character, not consumed.
    pub fn peek_token(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.reader.peek()
    }

    pub fn is_token(&mut self, token: char) -> bool {
        self.peek_token() == Some(token)
    }

    pub fn try_consume(&mut self, token: char) -> bool {
        self.skip_whitespace();
        self.reader.read_if(|ch| ch == token).is_some()
    }

    pub fn consume(&mut self, token: char) -> Result<()> {
        if self.try_consume(token) {
            Ok(())
        } else {
            Err(CodecError::malformed(format!("'{token}'"), self.position()))
        }
    }

    pub fn is_keyword(&mut self, keyword: &str) -> bool {
        let start = self.position();
        let matched = self.try_consume_keyword(keyword);
        self.reader.seek(start);
        matched
    }

    /// Consumes `keyword` if it comes next; otherwise leaves the cursor at
    /// the start of the token.
    pub fn try_consume_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let start = self.position();
        for expected in keyword.chars() {
            if self.reader.read_if(|ch| ch == expected).is_none() {
                self.reader.seek(start);
                return false;
            }
        }
        true
    }

    pub fn consume_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.try_consume_keyword(keyword) {
            Ok(())
        } else {
            Err(CodecError::malformed(format!("'{keyword}'"), self.position()))
        }
    }

    /// Requires that only whitespace remains.
    pub fn finish(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.reader.is_at_end() {
            Ok(())
        } else {
            Err(CodecError::malformed("end of input", self.position()))
        }
    }

    /// Reads `[ item, ... ]`, calling `item` with the cursor on each element.
    pub fn read_array<F>(&mut self, item: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        self.read_container('[', ']', item)
    }

    /// Reads `{ entry, ... }`, calling `entry` with the cursor on each key.
    ///
    /// The callback decodes the key, the `:` and the value itself.
    pub fn read_entries<F>(&mut self, entry: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        self.read_container('{', '}', entry)
    }

    /// Reads `{ "key": value, ... }` with string keys, calling `member` with
    /// each interned key and the cursor on its value.
    pub fn read_object<F>(&mut self, mut member: F) -> Result<()>
    where
        F: FnMut(&mut Self, Arc<str>) -> Result<()>,
    {
        self.read_container('{', '}', |reader| {
            let key = reader.lex_string()?;
            reader.consume(':')?;
            member(reader, key)
        })
    }

    fn read_container<F>(&mut self, open: char, close: char, item: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        if self.depth >= self.options.max_depth {
            let expected = format!("at most {} nested containers", self.options.max_depth);
            return Err(CodecError::malformed(expected, self.position()));
        }
        self.depth += 1;
        let result = self.read_items(open, close, item);
        self.depth -= 1;
        result
    }

    fn read_items<F>(&mut self, open: char, close: char, mut item: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        self.consume(open)?;
        if self.try_consume(close) {
            return Ok(());
        }
        loop {
            item(self)?;
            if !self.try_consume(',') {
                break;
            }
            if self.is_token(close) {
                if self.options.allow_trailing_commas {
                    break;
                }
                return Err(CodecError::malformed("a value after ','", self.position()));
            }
        }
        self.consume(close)
    }

    /// Skips one value of any shape without materializing it.
    pub fn skip_value(&mut self) -> Result<()> {
        match self.peek_token() {
            Some('"') => self.skip_string(),
            Some('[') => self.read_array(|reader| reader.skip_value()),
            Some('{') => self.read_entries(|reader| {
                reader.skip_string()?;
                reader.consume(':')?;
                reader.skip_value()
            }),
            Some('t') => self.consume_keyword("true"),
            Some('f') => self.consume_keyword("false"),
            Some('n') => self.consume_keyword("null"),
            _ => self.scan_number().map(drop),
        }
    }

    /// Canonical instance of a raw byte span.
    pub(super) fn intern_span(&mut self, start: usize, end: usize) -> Arc<str> {
        let bytes = self.reader.span(start, end);
        let encoding = self.reader.encoding;
        let buckets = self.options.string_table_buckets;
        self.encoded
            .get_or_insert_with(|| EncodedStringTable::with_buckets(encoding, buckets))
            .intern_text(bytes)
    }

    /// Canonical instance of decoded text.
    pub fn intern(&mut self, text: &str) -> Arc<str> {
        let buckets = self.options.string_table_buckets;
        self.strings
            .get_or_insert_with(|| StringTable::with_buckets(buckets))
            .intern(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> JsonReader<'_> {
        JsonReader::new(text.as_bytes(), TextEncoding::Utf8, DecodeOptions::default())
    }

    #[test]
    fn tokens_skip_whitespace() {
        let mut r = reader(" \t\n[ ]");
        assert!(r.is_token('['));
        assert!(r.try_consume('['));
        assert!(!r.try_consume('x'));
        r.consume(']').unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn failed_keyword_leaves_cursor() {
        let mut r = reader("  nul");
        assert!(!r.try_consume_keyword("null"));
        assert_eq!(r.position(), 2);
        let err = r.consume_keyword("null").unwrap_err();
        assert!(matches!(err, CodecError::MalformedToken { offset: 2, .. }));
    }

    #[test]
    fn is_keyword_does_not_consume() {
        let mut r = reader("true");
        assert!(r.is_keyword("true"));
        assert!(r.try_consume_keyword("true"));
        r.finish().unwrap();
    }

    #[test]
    fn trailing_comma_policy() {
        let mut strict = reader("[1,]");
        let err = strict.read_array(|r| r.skip_value()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedToken { offset: 3, .. }));

        let options = DecodeOptions::default().allow_trailing_commas(true);
        let mut lenient = JsonReader::new(b"[1,]", TextEncoding::Utf8, options);
        lenient.read_array(|r| r.skip_value()).unwrap();
    }

    #[test]
    fn skip_value_handles_nesting() {
        let mut r = reader(r#"{"a": [1, {"b": "x\"]"}], "c": null} 7"#);
        r.skip_value().unwrap();
        assert!(r.is_token('7'));
        assert!(r.finish().is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let options = DecodeOptions::default().max_depth(3);
        let mut shallow = JsonReader::new(b"[[[]]]", TextEncoding::Utf8, options);
        shallow.skip_value().unwrap();
        shallow.finish().unwrap();

        let mut deep = JsonReader::new(b"[[[[]]]]", TextEncoding::Utf8, options);
        let err = deep.skip_value().unwrap_err();
        assert!(matches!(err, CodecError::MalformedToken { offset: 3, .. }));
    }

    #[test]
    fn interning_shares_instances() {
        let mut r = reader("");
        let a = r.intern("k");
        let b = r.intern("k");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
