//! Heuristic detection of a stream's encoding from its first bytes.
//!
//! The ladder inspects at most the first four bytes, relying on the fact
//! that a well-formed document in this family of formats opens with a known
//! ASCII prologue (`<?xm`). Longer signatures are tried before shorter
//! ones so a UCS-4 pattern is never mistaken for UTF-16.

use crate::CharEncoding;

/// Guesses the encoding from the first bytes of a stream.
///
/// Checks, in order: UCS-4 byte-order signatures, the EBCDIC prologue, the
/// `<?xm` prologue in UTF-8 and both UTF-16 orders, the UTF-8 BOM, and the
/// bare UTF-16 BOMs. Returns [`CharEncoding::None`] when nothing matches
/// or the prefix is too short to tell; the caller then falls back to its
/// declared or default encoding.
pub fn detect_encoding(data: &[u8]) -> CharEncoding {
    if data.len() >= 4 {
        match [data[0], data[1], data[2], data[3]] {
            [0x00, 0x00, 0x00, 0x3C] => return CharEncoding::Ucs4Be,
            [0x3C, 0x00, 0x00, 0x00] => return CharEncoding::Ucs4Le,
            [0x00, 0x00, 0x3C, 0x00] => return CharEncoding::Ucs4Swapped2143,
            [0x00, 0x3C, 0x00, 0x00] => return CharEncoding::Ucs4Swapped3412,
            // "<?xm" in EBCDIC.
            [0x4C, 0x6F, 0xA7, 0x94] => return CharEncoding::Ebcdic,
            // "<?xm" in ASCII-compatible bytes.
            [0x3C, 0x3F, 0x78, 0x6D] => return CharEncoding::Utf8,
            // "<?" spread over 16-bit units.
            [0x3C, 0x00, 0x3F, 0x00] => return CharEncoding::Utf16Le,
            [0x00, 0x3C, 0x00, 0x3F] => return CharEncoding::Utf16Be,
            _ => {}
        }
    }
    if data.len() >= 3 && data[..3] == [0xEF, 0xBB, 0xBF] {
        return CharEncoding::Utf8;
    }
    if data.len() >= 2 {
        match [data[0], data[1]] {
            [0xFE, 0xFF] => return CharEncoding::Utf16Be,
            [0xFF, 0xFE] => return CharEncoding::Utf16Le,
            _ => {}
        }
    }
    CharEncoding::None
}

/// Length of the byte-order mark at the head of `data` for the given
/// encoding, or zero when none is present.
///
/// Used to skip the mark before feeding the stream to a decoder, since the
/// built-in UTF-16 decoders would otherwise pass U+FEFF through.
pub fn bom_length(encoding: CharEncoding, data: &[u8]) -> usize {
    match encoding {
        CharEncoding::Utf8 if data.starts_with(&[0xEF, 0xBB, 0xBF]) => 3,
        CharEncoding::Utf16Be if data.starts_with(&[0xFE, 0xFF]) => 2,
        CharEncoding::Utf16Le if data.starts_with(&[0xFF, 0xFE]) => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ucs4_signatures_win_over_utf16_boms() {
        assert_eq!(
            detect_encoding(&[0x00, 0x00, 0x00, 0x3C]),
            CharEncoding::Ucs4Be
        );
        assert_eq!(
            detect_encoding(&[0x3C, 0x00, 0x00, 0x00]),
            CharEncoding::Ucs4Le
        );
        assert_eq!(
            detect_encoding(&[0x00, 0x00, 0x3C, 0x00]),
            CharEncoding::Ucs4Swapped2143
        );
        assert_eq!(
            detect_encoding(&[0x00, 0x3C, 0x00, 0x00]),
            CharEncoding::Ucs4Swapped3412
        );
    }

    #[test]
    fn prologue_signatures() {
        assert_eq!(detect_encoding(b"<?xml version"), CharEncoding::Utf8);
        assert_eq!(
            detect_encoding(&[0x4C, 0x6F, 0xA7, 0x94]),
            CharEncoding::Ebcdic
        );
        assert_eq!(
            detect_encoding(&[0x3C, 0x00, 0x3F, 0x00]),
            CharEncoding::Utf16Le
        );
        assert_eq!(
            detect_encoding(&[0x00, 0x3C, 0x00, 0x3F]),
            CharEncoding::Utf16Be
        );
    }

    #[test]
    fn byte_order_marks() {
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, b'<']), CharEncoding::Utf8);
        assert_eq!(detect_encoding(&[0xFE, 0xFF, 0x00, 0x3C]), CharEncoding::Utf16Be);
        assert_eq!(detect_encoding(&[0xFF, 0xFE, 0x3C, 0x00]), CharEncoding::Utf16Le);
        // Two-byte BOMs are recognized even with nothing after them.
        assert_eq!(detect_encoding(&[0xFE, 0xFF]), CharEncoding::Utf16Be);
    }

    #[test]
    fn unknown_or_short_prefixes() {
        assert_eq!(detect_encoding(b"hello"), CharEncoding::None);
        assert_eq!(detect_encoding(&[0x3C]), CharEncoding::None);
        assert_eq!(detect_encoding(&[]), CharEncoding::None);
    }

    #[test]
    fn bom_lengths() {
        assert_eq!(bom_length(CharEncoding::Utf8, &[0xEF, 0xBB, 0xBF, b'a']), 3);
        assert_eq!(bom_length(CharEncoding::Utf16Le, &[0xFF, 0xFE, 0x41, 0x00]), 2);
        assert_eq!(bom_length(CharEncoding::Utf16Be, &[0xFE, 0xFF]), 2);
        assert_eq!(bom_length(CharEncoding::Utf8, b"plain"), 0);
        assert_eq!(bom_length(CharEncoding::Iso8859_1, &[0xFF, 0xFE]), 0);
    }
}
