//! Decimal escape sequences in string literals.
//!
//! String literals keep `\ddd` escapes (exactly three decimal digits)
//! verbatim; they are translated into raw bytes when the string is written
//! out.

/// Replace every `\ddd` sequence with the byte `ddd` (modulo 256) and
/// return the resulting bytes. A backslash not followed by three digits is
/// kept as-is.
pub fn decode_escapes(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(d) = bytes.get(i + 1..i + 4).filter(|d| d.iter().all(u8::is_ascii_digit)) {
                let code = d
                    .iter()
                    .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
                out.push((code % 256) as u8);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(decode_escapes("hello"), b"hello");
        assert!(decode_escapes("").is_empty());
    }

    #[test]
    fn decodes_space_and_newline() {
        assert_eq!(decode_escapes("a\\032b"), b"a b");
        assert_eq!(decode_escapes("line\\010"), b"line\n");
        assert_eq!(decode_escapes("\\035\\092"), b"#\\");
    }

    #[test]
    fn escapes_are_raw_bytes() {
        // Two escapes spelling the UTF-8 encoding of 'é'.
        assert_eq!(decode_escapes("\\195\\169"), [195u8, 169]);
        assert_eq!(decode_escapes("\\233"), [233u8]);
        assert_eq!(decode_escapes("\\999"), [231u8]);
    }

    #[test]
    fn incomplete_escape_kept() {
        assert_eq!(decode_escapes("a\\03"), b"a\\03");
        assert_eq!(decode_escapes("\\"), b"\\");
        assert_eq!(decode_escapes("\\x41"), b"\\x41");
    }

    #[test]
    fn decoding_is_single_pass() {
        // \092 is a backslash; the following 065 must not be decoded again.
        assert_eq!(decode_escapes("\\092065"), b"\\065");
    }

    #[test]
    fn multibyte_text_around_escapes() {
        assert_eq!(decode_escapes("žluť\\032kůň"), "žluť kůň".as_bytes());
    }

    proptest! {
        /// Text without backslashes is passed through byte for byte.
        #[test]
        fn no_backslash_is_identity(s in "[^\\\\]*") {
            prop_assert_eq!(decode_escapes(&s), s.as_bytes());
        }
    }
}
