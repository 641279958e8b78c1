//! Built-in stateless converter functions.
//!
//! Every converter here follows one contract, [`ConvertFn`]: given an output
//! slice and an optional input slice, convert as much as fits and report the
//! exact byte counts consumed and produced. Converters never hold state, so
//! a partial multi-byte sequence at the end of the input is simply left
//! unconsumed for the caller to retry once more bytes arrive.
//!
//! Passing `None` as the source is the flush/initialize call. Most
//! converters report zero progress for it; the undecorated UTF-16 encoder
//! uses it to emit its byte-order mark.

use crate::tables;

/// Byte counts reported by a single converter call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Input bytes accepted.
    pub consumed: usize,
    /// Output bytes written.
    pub produced: usize,
}

/// Failure modes of a single converter call.
///
/// `Malformed` and `Truncated` carry the progress made before the offending
/// sequence so the caller can keep the good prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvError {
    /// A byte sequence that can never be valid in the source encoding, or a
    /// code point the target encoding cannot represent.
    Malformed {
        /// Input bytes accepted before the bad sequence.
        consumed: usize,
        /// Output bytes written before the bad sequence.
        produced: usize,
    },
    /// The input ends in the middle of a multi-byte sequence.
    Truncated {
        /// Input bytes accepted before the incomplete sequence.
        consumed: usize,
        /// Output bytes written before the incomplete sequence.
        produced: usize,
    },
    /// Converter contract violation; should not happen.
    Internal,
}

/// Result of a single converter call.
pub type ConvResult = Result<Progress, ConvError>;

/// The uniform signature shared by all built-in converters.
///
/// `src` of `None` is the flush/initialize call.
pub type ConvertFn = fn(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult;

/// Decodes one UTF-8 scalar from the head of `buf`.
///
/// Returns the code point and its encoded length, or `None` when the head
/// is malformed or the buffer ends mid-sequence.
pub fn decode_utf8_char(buf: &[u8]) -> Option<(u32, usize)> {
    match read_utf8(buf) {
        Ok(Some(decoded)) => Some(decoded),
        _ => None,
    }
}

/// Reads one scalar from the head of a UTF-8 buffer.
///
/// `Ok(None)` means the buffer ends mid-sequence; `Err(())` means the head
/// byte or a continuation byte is invalid. Lead bytes above 0xF7 are
/// rejected; no further range validation is applied since the input is the
/// library's own internal UTF-8.
fn read_utf8(buf: &[u8]) -> Result<Option<(u32, usize)>, ()> {
    let Some(&lead) = buf.first() else {
        return Ok(None);
    };
    let (mut code, trailing) = match lead {
        0x00..=0x7F => return Ok(Some((u32::from(lead), 1))),
        0x80..=0xBF => return Err(()),
        0xC0..=0xDF => (u32::from(lead & 0x1F), 1),
        0xE0..=0xEF => (u32::from(lead & 0x0F), 2),
        0xF0..=0xF7 => (u32::from(lead & 0x07), 3),
        _ => return Err(()),
    };
    if buf.len() < 1 + trailing {
        return Ok(None);
    }
    for &b in &buf[1..=trailing] {
        if b & 0xC0 != 0x80 {
            return Err(());
        }
        code = (code << 6) | u32::from(b & 0x3F);
    }
    Ok(Some((code, 1 + trailing)))
}

/// UTF-8 to UTF-8 passthrough; exists so callers never special-case the
/// identity conversion.
pub fn utf8_passthrough(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    Ok(Progress {
        consumed: n,
        produced: n,
    })
}

/// Decodes 7-bit ASCII to UTF-8. Bytes 0x80 and above are malformed.
pub fn ascii_to_utf8(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() && produced < dst.len() {
        let b = src[consumed];
        if b >= 0x80 {
            return Err(ConvError::Malformed { consumed, produced });
        }
        dst[produced] = b;
        consumed += 1;
        produced += 1;
    }
    Ok(Progress { consumed, produced })
}

/// Encodes UTF-8 to 7-bit ASCII. Any code point at or above 0x80 is
/// unrepresentable and reported as malformed.
pub fn utf8_to_ascii(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() && produced < dst.len() {
        match read_utf8(&src[consumed..]) {
            Ok(Some((code, len))) => {
                if code >= 0x80 {
                    return Err(ConvError::Malformed { consumed, produced });
                }
                dst[produced] = code as u8;
                consumed += len;
                produced += 1;
            }
            Ok(None) => return Err(ConvError::Truncated { consumed, produced }),
            Err(()) => return Err(ConvError::Malformed { consumed, produced }),
        }
    }
    Ok(Progress { consumed, produced })
}

/// Decodes ISO-8859-1 to UTF-8. Every byte maps directly to the code point
/// of the same value, so this never fails.
pub fn latin1_to_utf8(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() {
        let b = src[consumed];
        if b < 0x80 {
            if produced >= dst.len() {
                break;
            }
            dst[produced] = b;
            produced += 1;
        } else {
            if produced + 2 > dst.len() {
                break;
            }
            dst[produced] = 0xC0 | (b >> 6);
            dst[produced + 1] = 0x80 | (b & 0x3F);
            produced += 2;
        }
        consumed += 1;
    }
    Ok(Progress { consumed, produced })
}

/// Encodes UTF-8 to ISO-8859-1. Code points above 0xFF are unrepresentable.
pub fn utf8_to_latin1(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() && produced < dst.len() {
        match read_utf8(&src[consumed..]) {
            Ok(Some((code, len))) => {
                if code > 0xFF {
                    return Err(ConvError::Malformed { consumed, produced });
                }
                dst[produced] = code as u8;
                consumed += len;
                produced += 1;
            }
            Ok(None) => return Err(ConvError::Truncated { consumed, produced }),
            Err(()) => return Err(ConvError::Malformed { consumed, produced }),
        }
    }
    Ok(Progress { consumed, produced })
}

/// Writes `code` as UTF-8 into `dst[at..]`, returning the encoded length,
/// or `None` when the space left is too small. `code` must already be
/// validated by the caller.
fn write_utf8(dst: &mut [u8], at: usize, code: u32) -> Option<usize> {
    let len = match code {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    };
    if at + len > dst.len() {
        return None;
    }
    match len {
        1 => dst[at] = code as u8,
        2 => {
            dst[at] = 0xC0 | (code >> 6) as u8;
            dst[at + 1] = 0x80 | (code & 0x3F) as u8;
        }
        3 => {
            dst[at] = 0xE0 | (code >> 12) as u8;
            dst[at + 1] = 0x80 | ((code >> 6) & 0x3F) as u8;
            dst[at + 2] = 0x80 | (code & 0x3F) as u8;
        }
        _ => {
            dst[at] = 0xF0 | (code >> 18) as u8;
            dst[at + 1] = 0x80 | ((code >> 12) & 0x3F) as u8;
            dst[at + 2] = 0x80 | ((code >> 6) & 0x3F) as u8;
            dst[at + 3] = 0x80 | (code & 0x3F) as u8;
        }
    }
    Some(len)
}

fn utf16_to_utf8(dst: &mut [u8], src: Option<&[u8]>, big_endian: bool) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    // A trailing odd byte stays unconsumed until its partner arrives.
    let usable = src.len() & !1;
    let unit = |at: usize| -> u32 {
        let pair = [src[at], src[at + 1]];
        u32::from(if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        })
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < usable {
        let c = unit(consumed);
        let (code, used) = if c & 0xFC00 == 0xD800 {
            // High surrogate: the low half may still be in flight.
            if consumed + 4 > usable {
                break;
            }
            let d = unit(consumed + 2);
            if d & 0xFC00 != 0xDC00 {
                return Err(ConvError::Malformed { consumed, produced });
            }
            ((((c & 0x3FF) << 10) | (d & 0x3FF)) + 0x10000, 4)
        } else if c & 0xFC00 == 0xDC00 {
            // Low surrogate with no preceding high half.
            return Err(ConvError::Malformed { consumed, produced });
        } else {
            (c, 2)
        };
        let Some(len) = write_utf8(dst, produced, code) else {
            break;
        };
        consumed += used;
        produced += len;
    }
    Ok(Progress { consumed, produced })
}

fn utf8_to_utf16(dst: &mut [u8], src: Option<&[u8]>, big_endian: bool) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let put = |dst: &mut [u8], at: usize, unit: u16| {
        let bytes = if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        };
        dst[at] = bytes[0];
        dst[at + 1] = bytes[1];
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() {
        match read_utf8(&src[consumed..]) {
            Ok(Some((code, len))) => {
                if code < 0x10000 {
                    if produced + 2 > dst.len() {
                        break;
                    }
                    put(dst, produced, code as u16);
                    produced += 2;
                } else if code < 0x110000 {
                    if produced + 4 > dst.len() {
                        break;
                    }
                    let c = code - 0x10000;
                    put(dst, produced, 0xD800 | (c >> 10) as u16);
                    put(dst, produced + 2, 0xDC00 | (c & 0x3FF) as u16);
                    produced += 4;
                } else {
                    return Err(ConvError::Malformed { consumed, produced });
                }
                consumed += len;
            }
            Ok(None) => break,
            Err(()) => return Err(ConvError::Malformed { consumed, produced }),
        }
    }
    Ok(Progress { consumed, produced })
}

/// Decodes UTF-16 little endian to UTF-8. Surrogate halves split across
/// chunks are left unconsumed; mismatched halves are malformed.
pub fn utf16le_to_utf8(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    utf16_to_utf8(dst, src, false)
}

/// Encodes UTF-8 to UTF-16 little endian.
pub fn utf8_to_utf16le(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    utf8_to_utf16(dst, src, false)
}

/// Decodes UTF-16 big endian to UTF-8.
pub fn utf16be_to_utf8(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    utf16_to_utf8(dst, src, true)
}

/// Encodes UTF-8 to UTF-16 big endian.
pub fn utf8_to_utf16be(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    utf8_to_utf16(dst, src, true)
}

/// Encodes UTF-8 to undecorated UTF-16: little endian with a leading BOM.
///
/// The BOM is written by the flush/initialize call (`src` of `None`); data
/// calls behave exactly like [`utf8_to_utf16le`].
pub fn utf8_to_utf16_with_bom(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
    match src {
        Some(_) => utf8_to_utf16(dst, src, false),
        None => {
            if dst.len() < 2 {
                return Ok(Progress::default());
            }
            dst[0] = 0xFF;
            dst[1] = 0xFE;
            Ok(Progress {
                consumed: 0,
                produced: 2,
            })
        }
    }
}

/// Decodes an eight-bit ISO-8859 charset to UTF-8 through its 128-entry
/// upper-half table. A table entry of zero marks an undefined byte.
fn iso8859_to_utf8(dst: &mut [u8], src: Option<&[u8]>, unicode: &[u16; 128]) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() {
        let b = src[consumed];
        let code = if b < 0x80 {
            u32::from(b)
        } else {
            let c = unicode[usize::from(b) - 0x80];
            if c == 0 {
                return Err(ConvError::Malformed { consumed, produced });
            }
            u32::from(c)
        };
        let Some(len) = write_utf8(dst, produced, code) else {
            break;
        };
        consumed += 1;
        produced += len;
    }
    Ok(Progress { consumed, produced })
}

/// Encodes UTF-8 to an eight-bit ISO-8859 charset through its two-level
/// transcoding table.
///
/// The table layout: `xlat[0..32]` indexes two-byte lead values,
/// `xlat[32..48]` indexes three-byte lead values, and each second level is
/// a 64-entry block starting at `48 + 64 * n` keyed by the continuation
/// bits. A zero result marks a code point the charset cannot represent.
fn utf8_to_iso8859(dst: &mut [u8], src: Option<&[u8]>, xlat: &[u8]) -> ConvResult {
    let Some(src) = src else {
        return Ok(Progress::default());
    };
    let mut consumed = 0;
    let mut produced = 0;
    while consumed < src.len() && produced < dst.len() {
        let rest = &src[consumed..];
        let lead = rest[0];
        let (byte, len) = match lead {
            0x00..=0x7F => (lead, 1),
            0x80..=0xBF => return Err(ConvError::Malformed { consumed, produced }),
            0xC0..=0xDF => {
                if rest.len() < 2 {
                    return Err(ConvError::Truncated { consumed, produced });
                }
                if rest[1] & 0xC0 != 0x80 {
                    return Err(ConvError::Malformed { consumed, produced });
                }
                let c1 = usize::from(rest[1] & 0x3F);
                let level1 = usize::from(xlat[usize::from(lead & 0x1F)]);
                (xlat[48 + c1 + level1 * 64], 2)
            }
            0xE0..=0xEF => {
                if rest.len() < 3 {
                    return Err(ConvError::Truncated { consumed, produced });
                }
                if rest[1] & 0xC0 != 0x80 || rest[2] & 0xC0 != 0x80 {
                    return Err(ConvError::Malformed { consumed, produced });
                }
                let c1 = usize::from(rest[1] & 0x3F);
                let c2 = usize::from(rest[2] & 0x3F);
                let level1 = usize::from(xlat[32 + usize::from(lead & 0x0F)]);
                let level2 = usize::from(xlat[48 + c1 + level1 * 64]);
                (xlat[48 + c2 + level2 * 64], 3)
            }
            // Nothing at or above U+10000 exists in these charsets.
            _ => return Err(ConvError::Malformed { consumed, produced }),
        };
        if byte == 0 && lead != 0 {
            return Err(ConvError::Malformed { consumed, produced });
        }
        dst[produced] = byte;
        consumed += len;
        produced += 1;
    }
    Ok(Progress { consumed, produced })
}

macro_rules! iso8859_converters {
    ($($num:literal: $dec:ident / $enc:ident => $uni:ident, $xlat:ident;)*) => {$(
        #[doc = concat!("Decodes ISO-8859-", stringify!($num), " to UTF-8.")]
        pub fn $dec(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
            iso8859_to_utf8(dst, src, &tables::$uni)
        }

        #[doc = concat!("Encodes UTF-8 to ISO-8859-", stringify!($num), ".")]
        pub fn $enc(dst: &mut [u8], src: Option<&[u8]>) -> ConvResult {
            utf8_to_iso8859(dst, src, &tables::$xlat)
        }
    )*};
}

iso8859_converters! {
    2: iso8859_2_to_utf8 / utf8_to_iso8859_2 => UNICODE_ISO8859_2, TRANSCODE_ISO8859_2;
    3: iso8859_3_to_utf8 / utf8_to_iso8859_3 => UNICODE_ISO8859_3, TRANSCODE_ISO8859_3;
    4: iso8859_4_to_utf8 / utf8_to_iso8859_4 => UNICODE_ISO8859_4, TRANSCODE_ISO8859_4;
    5: iso8859_5_to_utf8 / utf8_to_iso8859_5 => UNICODE_ISO8859_5, TRANSCODE_ISO8859_5;
    6: iso8859_6_to_utf8 / utf8_to_iso8859_6 => UNICODE_ISO8859_6, TRANSCODE_ISO8859_6;
    7: iso8859_7_to_utf8 / utf8_to_iso8859_7 => UNICODE_ISO8859_7, TRANSCODE_ISO8859_7;
    8: iso8859_8_to_utf8 / utf8_to_iso8859_8 => UNICODE_ISO8859_8, TRANSCODE_ISO8859_8;
    9: iso8859_9_to_utf8 / utf8_to_iso8859_9 => UNICODE_ISO8859_9, TRANSCODE_ISO8859_9;
    10: iso8859_10_to_utf8 / utf8_to_iso8859_10 => UNICODE_ISO8859_10, TRANSCODE_ISO8859_10;
    11: iso8859_11_to_utf8 / utf8_to_iso8859_11 => UNICODE_ISO8859_11, TRANSCODE_ISO8859_11;
    13: iso8859_13_to_utf8 / utf8_to_iso8859_13 => UNICODE_ISO8859_13, TRANSCODE_ISO8859_13;
    14: iso8859_14_to_utf8 / utf8_to_iso8859_14 => UNICODE_ISO8859_14, TRANSCODE_ISO8859_14;
    15: iso8859_15_to_utf8 / utf8_to_iso8859_15 => UNICODE_ISO8859_15, TRANSCODE_ISO8859_15;
    16: iso8859_16_to_utf8 / utf8_to_iso8859_16 => UNICODE_ISO8859_16, TRANSCODE_ISO8859_16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_decode_accepts_seven_bit() {
        let mut dst = [0u8; 16];
        let p = ascii_to_utf8(&mut dst, Some(b"hello")).unwrap();
        assert_eq!(p, Progress { consumed: 5, produced: 5 });
        assert_eq!(&dst[..5], b"hello");
    }

    #[test]
    fn ascii_decode_rejects_high_bytes() {
        let mut dst = [0u8; 16];
        let err = ascii_to_utf8(&mut dst, Some(b"ab\xc3\xa9")).unwrap_err();
        assert_eq!(err, ConvError::Malformed { consumed: 2, produced: 2 });
    }

    #[test]
    fn ascii_encode_rejects_non_ascii_scalar() {
        let mut dst = [0u8; 16];
        let err = utf8_to_ascii(&mut dst, Some("é".as_bytes())).unwrap_err();
        assert_eq!(err, ConvError::Malformed { consumed: 0, produced: 0 });
    }

    #[test]
    fn latin1_round_trip() {
        let mut utf8 = [0u8; 32];
        let p = latin1_to_utf8(&mut utf8, Some(b"caf\xe9 \xff")).unwrap();
        assert_eq!(p.consumed, 6);
        assert_eq!(&utf8[..p.produced], "café ÿ".as_bytes());

        let mut back = [0u8; 32];
        let p2 = utf8_to_latin1(&mut back, Some(&utf8[..p.produced])).unwrap();
        assert_eq!(&back[..p2.produced], b"caf\xe9 \xff");
    }

    #[test]
    fn latin1_decode_respects_output_space() {
        // "é" needs two UTF-8 bytes; one byte of room defers the character.
        let mut dst = [0u8; 1];
        let p = latin1_to_utf8(&mut dst, Some(b"\xe9")).unwrap();
        assert_eq!(p, Progress { consumed: 0, produced: 0 });
    }

    #[test]
    fn utf8_encode_to_latin1_truncated_input() {
        let mut dst = [0u8; 8];
        // Lead byte of a two-byte sequence with no continuation yet.
        let err = utf8_to_latin1(&mut dst, Some(b"a\xc3")).unwrap_err();
        assert_eq!(err, ConvError::Truncated { consumed: 1, produced: 1 });
    }

    #[test]
    fn utf16le_surrogate_pair() {
        let mut dst = [0u8; 8];
        // U+10000 as LE surrogates D800 DC00.
        let p = utf16le_to_utf8(&mut dst, Some(&[0x00, 0xD8, 0x00, 0xDC])).unwrap();
        assert_eq!(p, Progress { consumed: 4, produced: 4 });
        assert_eq!(&dst[..4], "\u{10000}".as_bytes());
    }

    #[test]
    fn utf16le_reversed_surrogates_are_malformed() {
        let mut dst = [0u8; 8];
        let err = utf16le_to_utf8(&mut dst, Some(&[0x00, 0xDC, 0x00, 0xD8])).unwrap_err();
        assert!(matches!(err, ConvError::Malformed { consumed: 0, .. }));
    }

    #[test]
    fn utf16le_defers_split_surrogate_and_odd_byte() {
        let mut dst = [0u8; 8];
        // High half only: wait for the low half.
        let p = utf16le_to_utf8(&mut dst, Some(&[0x41, 0x00, 0x00, 0xD8])).unwrap();
        assert_eq!(p, Progress { consumed: 2, produced: 1 });

        // Odd trailing byte: wait for its partner.
        let p = utf16le_to_utf8(&mut dst, Some(&[0x41, 0x00, 0x42])).unwrap();
        assert_eq!(p, Progress { consumed: 2, produced: 1 });
    }

    #[test]
    fn utf16be_round_trip_bmp_and_astral() {
        let text = "A\u{0416}\u{1F600}";
        let mut enc = [0u8; 16];
        let p = utf8_to_utf16be(&mut enc, Some(text.as_bytes())).unwrap();
        assert_eq!(p.consumed, text.len());
        assert_eq!(p.produced, 8);
        assert_eq!(&enc[..2], &[0x00, 0x41]);

        let mut dec = [0u8; 16];
        let p2 = utf16be_to_utf8(&mut dec, Some(&enc[..p.produced])).unwrap();
        assert_eq!(&dec[..p2.produced], text.as_bytes());
    }

    #[test]
    fn utf16_with_bom_primes_little_endian_mark() {
        let mut dst = [0u8; 8];
        let p = utf8_to_utf16_with_bom(&mut dst, None).unwrap();
        assert_eq!(p, Progress { consumed: 0, produced: 2 });
        assert_eq!(&dst[..2], &[0xFF, 0xFE]);

        let p = utf8_to_utf16_with_bom(&mut dst, Some(b"A")).unwrap();
        assert_eq!(p, Progress { consumed: 1, produced: 2 });
        assert_eq!(&dst[..2], &[0x41, 0x00]);
    }

    #[test]
    fn utf8_passthrough_copies_and_flushes_quietly() {
        let mut dst = [0u8; 4];
        let p = utf8_passthrough(&mut dst, Some(b"abcdef")).unwrap();
        assert_eq!(p, Progress { consumed: 4, produced: 4 });
        let p = utf8_passthrough(&mut dst, None).unwrap();
        assert_eq!(p, Progress::default());
    }

    #[test]
    fn iso8859_5_round_trip_cyrillic() {
        // 0xD4 is U+0434 CYRILLIC SMALL LETTER DE in ISO-8859-5.
        let mut utf8 = [0u8; 8];
        let p = iso8859_5_to_utf8(&mut utf8, Some(&[0xD4])).unwrap();
        assert_eq!(&utf8[..p.produced], "\u{0434}".as_bytes());

        let mut back = [0u8; 8];
        let p2 = utf8_to_iso8859_5(&mut back, Some(&utf8[..p.produced])).unwrap();
        assert_eq!(&back[..p2.produced], &[0xD4]);
    }

    #[test]
    fn iso8859_2_round_trip_latin2() {
        // 0xB1 is U+0105 LATIN SMALL LETTER A WITH OGONEK in ISO-8859-2.
        let mut utf8 = [0u8; 8];
        let p = iso8859_2_to_utf8(&mut utf8, Some(&[0x61, 0xB1])).unwrap();
        assert_eq!(&utf8[..p.produced], "a\u{0105}".as_bytes());

        let mut back = [0u8; 8];
        let p2 = utf8_to_iso8859_2(&mut back, Some(&utf8[..p.produced])).unwrap();
        assert_eq!(&back[..p2.produced], &[0x61, 0xB1]);
    }

    #[test]
    fn iso8859_15_euro_sign() {
        // 0xA4 maps to U+20AC in ISO-8859-15.
        let mut utf8 = [0u8; 8];
        let p = iso8859_15_to_utf8(&mut utf8, Some(&[0xA4])).unwrap();
        assert_eq!(&utf8[..p.produced], "\u{20AC}".as_bytes());

        let mut back = [0u8; 8];
        let p2 = utf8_to_iso8859_15(&mut back, Some(&utf8[..p.produced])).unwrap();
        assert_eq!(&back[..p2.produced], &[0xA4]);
    }

    #[test]
    fn iso8859_encode_rejects_unmapped_code_point() {
        // Cyrillic has no spot in Latin-2.
        let mut dst = [0u8; 8];
        let err = utf8_to_iso8859_2(&mut dst, Some("\u{0434}".as_bytes())).unwrap_err();
        assert!(matches!(err, ConvError::Malformed { .. }));
    }

    #[test]
    fn iso8859_6_rejects_undefined_byte() {
        // 0xA1 is undefined in ISO-8859-6.
        let mut dst = [0u8; 8];
        let err = iso8859_6_to_utf8(&mut dst, Some(&[0xA1])).unwrap_err();
        assert!(matches!(err, ConvError::Malformed { consumed: 0, .. }));
    }

    #[test]
    fn decode_utf8_char_reads_one_scalar() {
        assert_eq!(decode_utf8_char(b"A rest"), Some((0x41, 1)));
        assert_eq!(decode_utf8_char("д".as_bytes()), Some((0x434, 2)));
        assert_eq!(decode_utf8_char("\u{1F600}".as_bytes()), Some((0x1F600, 4)));
        assert_eq!(decode_utf8_char(&[0xC3]), None);
        assert_eq!(decode_utf8_char(&[0xFF, 0x80]), None);
    }
}
