//! String literal escaping.

use std::fmt::{self, Write};

/// Whether `text` contains a quote, a backslash or a control character.
pub(crate) fn needs_escaping(text: &str) -> bool {
    text.chars().any(|ch| ch == '"' || ch == '\\' || ch.is_control())
}

/// Writes `text` with JSON escapes, without the surrounding quotes.
pub(crate) fn write_escaped(sink: &mut dyn Write, text: &str) -> fmt::Result {
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        let named = match ch {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\u{8}' => Some("\\b"),
            '\u{c}' => Some("\\f"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\t' => Some("\\t"),
            ch if ch.is_control() => None,
            _ => continue,
        };
        sink.write_str(&text[start..i])?;
        match named {
            Some(escape) => sink.write_str(escape)?,
            None => write!(sink, "\\u{:04x}", u32::from(ch))?,
        }
        start = i + ch.len_utf8();
    }
    sink.write_str(&text[start..])
}

/// `text` as a complete quoted literal.
pub(crate) fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    if needs_escaping(text) {
        // Writing into a String cannot fail.
        let _ = write_escaped(&mut out, text);
    } else {
        out.push_str(text);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_needs_no_escaping() {
        assert!(!needs_escaping("plain / text é"));
        assert!(needs_escaping("tab\there"));
        assert!(needs_escaping("\u{7f}"));
    }

    #[test]
    fn named_and_numeric_escapes() {
        assert_eq!(quoted("a\"b\\c\nd"), r#""a\"b\\c\nd""#);
        assert_eq!(quoted("\u{0}\u{1f}\u{8}\u{c}\r\t"), r#""\u0000\u001f\b\f\r\t""#);
        assert_eq!(quoted("\u{85}"), r#""\u0085""#);
        assert_eq!(quoted("a/b"), r#""a/b""#);
    }
}
