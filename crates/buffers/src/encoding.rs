//! Code-unit level access to encoded text.
//!
//! A [`TextEncoding`] knows how to read one character at an arbitrary byte
//! offset and how to find the next code-unit boundary, so cursors can walk
//! UTF-8 and UTF-16 buffers without transcoding them first.

/// Replacement character produced for malformed sequences.
pub const REPLACEMENT: char = '\u{FFFD}';

/// The text encodings understood by the JSON cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Size of one code unit in bytes.
    pub fn unit_len(self) -> usize {
        match self {
            TextEncoding::Utf8 => 1,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
        }
    }

    /// Byte order mark for this encoding.
    pub fn bom(self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            TextEncoding::Utf16Le => &[0xFF, 0xFE],
            TextEncoding::Utf16Be => &[0xFE, 0xFF],
        }
    }

    /// Reads the character starting at `offset`.
    ///
    /// Returns the character and the number of bytes it occupies. Malformed
    /// or truncated input yields [`REPLACEMENT`] spanning one code unit.
    /// Returns `None` only when `offset` is at or past the end of `buf`.
    ///
    /// # Example
    ///
    /// ```
    /// use argo_buffers::TextEncoding;
    ///
    /// let bytes = TextEncoding::Utf16Be.encode("\u{1F600}!");
    /// assert_eq!(TextEncoding::Utf16Be.read_code(&bytes, 0), Some(('\u{1F600}', 4)));
    /// assert_eq!(TextEncoding::Utf16Be.read_code(&bytes, 4), Some(('!', 2)));
    /// assert_eq!(TextEncoding::Utf16Be.read_code(&bytes, 6), None);
    /// ```
    pub fn read_code(self, buf: &[u8], offset: usize) -> Option<(char, usize)> {
        match self {
            TextEncoding::Utf8 => read_utf8_code(buf, offset),
            TextEncoding::Utf16Le => read_utf16_code(buf, offset, u16::from_le_bytes),
            TextEncoding::Utf16Be => read_utf16_code(buf, offset, u16::from_be_bytes),
        }
    }

    /// Number of bytes to add to `offset` to land on a code-unit boundary.
    pub fn alignment(self, offset: usize) -> usize {
        match self {
            TextEncoding::Utf8 => 0,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => offset & 1,
        }
    }

    /// Smallest offset at or after `offset` where a character starts.
    ///
    /// UTF-8 continuation bytes are skipped; UTF-16 offsets are aligned to
    /// two bytes and never land on the low half of a surrogate pair.
    pub fn next_code_start(self, buf: &[u8], offset: usize) -> usize {
        let mut x = offset + self.alignment(offset);
        match self {
            TextEncoding::Utf8 => {
                while x < buf.len() && buf[x] & 0xC0 == 0x80 {
                    x += 1;
                }
            }
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                if let Some(unit) = self.unit_at(buf, x) {
                    if is_low_surrogate(unit) && x >= 2 {
                        let before = self.unit_at(buf, x - 2);
                        if before.is_some_and(is_high_surrogate) {
                            x += 2;
                        }
                    }
                }
            }
        }
        x.min(buf.len())
    }

    /// Encodes `text` into bytes.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            TextEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    /// Decodes `bytes`, replacing malformed sequences with [`REPLACEMENT`].
    pub fn decode_lossy(self, bytes: &[u8]) -> String {
        if self == TextEncoding::Utf8 {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        let mut out = String::with_capacity(bytes.len() / 2);
        let mut x = 0;
        while let Some((ch, len)) = self.read_code(bytes, x) {
            out.push(ch);
            x += len;
        }
        out
    }

    fn unit_at(self, buf: &[u8], x: usize) -> Option<u16> {
        let pair = [*buf.get(x)?, *buf.get(x + 1)?];
        Some(match self {
            TextEncoding::Utf16Be => u16::from_be_bytes(pair),
            _ => u16::from_le_bytes(pair),
        })
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

fn read_utf8_code(buf: &[u8], x: usize) -> Option<(char, usize)> {
    let lead = *buf.get(x)?;
    if lead < 0x80 {
        return Some((lead as char, 1));
    }
    let (len, init) = match lead {
        0xC2..=0xDF => (2, u32::from(lead & 0x1F)),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
        0xF0..=0xF4 => (4, u32::from(lead & 0x07)),
        _ => return Some((REPLACEMENT, 1)),
    };
    let Some(tail) = buf.get(x + 1..x + len) else {
        return Some((REPLACEMENT, 1));
    };
    let mut code = init;
    for &byte in tail {
        if byte & 0xC0 != 0x80 {
            return Some((REPLACEMENT, 1));
        }
        code = (code << 6) | u32::from(byte & 0x3F);
    }
    let min = match len {
        2 => 0x80,
        3 => 0x800,
        _ => 0x10000,
    };
    match char::from_u32(code) {
        Some(ch) if code >= min => Some((ch, len)),
        _ => Some((REPLACEMENT, 1)),
    }
}

fn read_utf16_code(buf: &[u8], x: usize, unit: fn([u8; 2]) -> u16) -> Option<(char, usize)> {
    let pair = |at: usize| -> Option<u16> { Some(unit([*buf.get(at)?, *buf.get(at + 1)?])) };
    if x >= buf.len() {
        return None;
    }
    let Some(first) = pair(x) else {
        return Some((REPLACEMENT, 1));
    };
    if is_high_surrogate(first) {
        if let Some(second) = pair(x + 2).filter(|u| is_low_surrogate(*u)) {
            let code = 0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00);
            return Some((char::from_u32(code).unwrap_or(REPLACEMENT), 4));
        }
        return Some((REPLACEMENT, 2));
    }
    Some((char::from_u32(u32::from(first)).unwrap_or(REPLACEMENT), 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_multibyte() {
        let bytes = "aé€😀".as_bytes();
        let enc = TextEncoding::Utf8;
        assert_eq!(enc.read_code(bytes, 0), Some(('a', 1)));
        assert_eq!(enc.read_code(bytes, 1), Some(('é', 2)));
        assert_eq!(enc.read_code(bytes, 3), Some(('€', 3)));
        assert_eq!(enc.read_code(bytes, 6), Some(('😀', 4)));
        assert_eq!(enc.read_code(bytes, 10), None);
    }

    #[test]
    fn utf8_invalid_sequences() {
        let enc = TextEncoding::Utf8;
        assert_eq!(enc.read_code(&[0xFF], 0), Some((REPLACEMENT, 1)));
        assert_eq!(enc.read_code(&[0xE2, 0x82], 0), Some((REPLACEMENT, 1)));
        assert_eq!(enc.read_code(&[0xC0, 0x80], 0), Some((REPLACEMENT, 1)));
        // Overlong three-byte form of '/'.
        assert_eq!(enc.read_code(&[0xE0, 0x80, 0xAF], 0), Some((REPLACEMENT, 1)));
        // Encoded surrogate.
        assert_eq!(enc.read_code(&[0xED, 0xA0, 0x80], 0), Some((REPLACEMENT, 1)));
    }

    #[test]
    fn utf16_lone_surrogates() {
        let le = TextEncoding::Utf16Le;
        assert_eq!(le.read_code(&[0x00, 0xD8, 0x41, 0x00], 0), Some((REPLACEMENT, 2)));
        assert_eq!(le.read_code(&[0x00, 0xDC], 0), Some((REPLACEMENT, 2)));
        assert_eq!(le.read_code(&[0x41], 0), Some((REPLACEMENT, 1)));
    }

    #[test]
    fn next_code_start_utf8() {
        let bytes = "a€b".as_bytes();
        let enc = TextEncoding::Utf8;
        assert_eq!(enc.next_code_start(bytes, 0), 0);
        assert_eq!(enc.next_code_start(bytes, 2), 4);
        assert_eq!(enc.next_code_start(bytes, 3), 4);
        assert_eq!(enc.next_code_start(bytes, 9), 5);
    }

    #[test]
    fn next_code_start_utf16() {
        let enc = TextEncoding::Utf16Le;
        let bytes = enc.encode("a😀b");
        assert_eq!(enc.alignment(3), 1);
        assert_eq!(enc.next_code_start(&bytes, 1), 2);
        assert_eq!(enc.next_code_start(&bytes, 3), 6);
        assert_eq!(enc.next_code_start(&bytes, 4), 6);
    }

    #[test]
    fn decode_lossy_utf16() {
        let enc = TextEncoding::Utf16Be;
        assert_eq!(enc.decode_lossy(&enc.encode("héllo 😀")), "héllo 😀");
        assert_eq!(enc.decode_lossy(&[0xD8, 0x00]), "\u{FFFD}");
    }
}
