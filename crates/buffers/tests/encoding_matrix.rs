//! Encoding utility matrix: character reads, boundaries and re-encoding
//! across the three supported encodings.

use argo_buffers::{Reader, TextEncoding, REPLACEMENT};
use proptest::prelude::*;

const ALL: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Utf16Le,
    TextEncoding::Utf16Be,
];

fn read_all(bytes: &[u8], encoding: TextEncoding) -> String {
    let mut reader = Reader::new(bytes, encoding);
    let mut out = String::new();
    while let Some(ch) = reader.read() {
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Character reads
// ---------------------------------------------------------------------------

#[test]
fn reads_ascii_in_every_encoding() {
    for encoding in ALL {
        let bytes = encoding.encode("{\"a\": 1}");
        assert_eq!(read_all(&bytes, encoding), "{\"a\": 1}");
    }
}

#[test]
fn reads_astral_characters_as_one_char() {
    for encoding in ALL {
        let bytes = encoding.encode("😀");
        assert_eq!(encoding.read_code(&bytes, 0), Some(('😀', 4)));
    }
}

#[test]
fn code_lengths_match_encoding_units() {
    assert_eq!(TextEncoding::Utf8.read_code("é".as_bytes(), 0), Some(('é', 2)));
    let le = TextEncoding::Utf16Le.encode("é");
    assert_eq!(TextEncoding::Utf16Le.read_code(&le, 0), Some(('é', 2)));
    let be = TextEncoding::Utf16Be.encode("é");
    assert_eq!(be, vec![0x00, 0xE9]);
    assert_eq!(TextEncoding::Utf16Be.read_code(&be, 0), Some(('é', 2)));
}

#[test]
fn max_bmp_unit_reads_back() {
    for encoding in ALL {
        let bytes = encoding.encode("\u{FFFF}");
        assert_eq!(encoding.read_code(&bytes, 0).map(|(c, _)| c), Some('\u{FFFF}'));
    }
}

#[test]
fn malformed_input_is_replaced_and_progresses() {
    let bytes = [b'a', 0xFF, b'b'];
    assert_eq!(read_all(&bytes, TextEncoding::Utf8), format!("a{REPLACEMENT}b"));

    let be = [0xDC, 0x00, 0x00, 0x41];
    assert_eq!(read_all(&be, TextEncoding::Utf16Be), format!("{REPLACEMENT}A"));
}

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

#[test]
fn next_code_start_is_identity_on_boundaries() {
    let text = "a€😀b";
    for encoding in ALL {
        let bytes = encoding.encode(text);
        let mut x = 0;
        while let Some((_, len)) = encoding.read_code(&bytes, x) {
            assert_eq!(encoding.next_code_start(&bytes, x), x);
            x += len;
        }
        assert_eq!(encoding.next_code_start(&bytes, bytes.len()), bytes.len());
    }
}

#[test]
fn alignment_only_applies_to_utf16() {
    assert_eq!(TextEncoding::Utf8.alignment(3), 0);
    assert_eq!(TextEncoding::Utf16Le.alignment(3), 1);
    assert_eq!(TextEncoding::Utf16Be.alignment(4), 0);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn encode_then_read_is_lossless(text in "\\PC{0,40}") {
        for encoding in ALL {
            let bytes = encoding.encode(&text);
            prop_assert_eq!(&read_all(&bytes, encoding), &text);
            prop_assert_eq!(&encoding.decode_lossy(&bytes), &text);
        }
    }

    #[test]
    fn next_code_start_lands_on_a_boundary(text in "\\PC{1,20}", offset in 0usize..80) {
        for encoding in ALL {
            let bytes = encoding.encode(&text);
            let start = encoding.next_code_start(&bytes, offset);
            prop_assert!(start >= offset.min(bytes.len()));
            let rest = encoding.decode_lossy(&bytes[start..]);
            prop_assert!(text.ends_with(&rest));
        }
    }
}
