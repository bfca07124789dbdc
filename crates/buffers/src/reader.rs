//! Encoded text reader with cursor tracking.

use crate::encoding::TextEncoding;

/// A cursor over encoded text.
///
/// The reader walks a byte slice one character at a time, decoding through
/// its [`TextEncoding`]. Positions are byte offsets into `uint8`.
///
/// # Example
///
/// ```
/// use argo_buffers::{Reader, TextEncoding};
///
/// let data = TextEncoding::Utf16Le.encode("[1]");
/// let mut reader = Reader::new(&data, TextEncoding::Utf16Le);
///
/// assert_eq!(reader.peek(), Some('['));
/// assert_eq!(reader.read(), Some('['));
/// assert_eq!(reader.position(), 2);
/// assert!(reader.read_if(|c| c.is_ascii_digit()).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
    /// Encoding of the bytes.
    pub encoding: TextEncoding,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8], encoding: TextEncoding) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
            encoding,
        }
    }

    /// Creates a reader positioned at the first character boundary at or
    /// after `offset`.
    pub fn at(uint8: &'a [u8], encoding: TextEncoding, offset: usize) -> Self {
        let x = encoding.next_code_start(uint8, offset);
        Self {
            uint8,
            x,
            end: uint8.len(),
            encoding,
        }
    }

    /// Skips a leading byte order mark, if present at the cursor.
    pub fn skip_bom(&mut self) -> bool {
        let bom = self.encoding.bom();
        if self.uint8[self.x..self.end].starts_with(bom) {
            self.x += bom.len();
            return true;
        }
        false
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.x
    }

    /// Moves the cursor to an absolute byte offset.
    #[inline]
    pub fn seek(&mut self, x: usize) {
        self.x = x.min(self.end);
    }

    /// Returns `true` when no characters remain.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.x >= self.end
    }

    /// Peeks at the current character without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.decode_at(self.x).map(|(ch, _)| ch)
    }

    /// Consumes and returns the current character.
    #[inline]
    pub fn read(&mut self) -> Option<char> {
        let (ch, len) = self.decode_at(self.x)?;
        self.x += len;
        Some(ch)
    }

    /// Consumes the current character only if `predicate` accepts it.
    #[inline]
    pub fn read_if(&mut self, predicate: impl FnOnce(char) -> bool) -> Option<char> {
        let (ch, len) = self.decode_at(self.x)?;
        if predicate(ch) {
            self.x += len;
            Some(ch)
        } else {
            None
        }
    }

    /// Returns the raw bytes between two offsets.
    pub fn span(&self, start: usize, end: usize) -> &'a [u8] {
        &self.uint8[start..end]
    }

    #[inline]
    fn decode_at(&self, x: usize) -> Option<(char, usize)> {
        if x >= self.end {
            return None;
        }
        // ASCII fast path for single-byte units.
        if self.encoding == TextEncoding::Utf8 {
            let byte = self.uint8[x];
            if byte < 0x80 {
                return Some((byte as char, 1));
            }
        }
        self.encoding.read_code(&self.uint8[..self.end], x)
    }
}
