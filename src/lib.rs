//! # Recode - Streaming Character Encoding Conversion
//!
//! A streaming, stateful text-transcoding library that sits between raw
//! encoded bytes and a UTF-8 internal representation, designed for parsers
//! and pipelines that receive input in arbitrarily sized chunks.
//!
//! ## Features
//!
//! - **Heuristic detection** of the encoding from the first bytes of a stream
//! - **Table-driven built-in converters** for ASCII, ISO-8859-1..16,
//!   UTF-16LE/BE and a UTF-8 passthrough
//! - **Pluggable backends** for any other encoding through a stateful
//!   converter trait
//! - **Chunked streaming** with partial multi-byte sequences deferred across
//!   buffer boundaries
//! - **Lossless-or-escaped output**: code points the target encoding cannot
//!   represent are written as numeric character references (`&#N;`) instead
//!   of failing the stream
//!
//! ## Quick Start
//!
//! ```rust
//! use recode::{ByteBuffer, Direction, EncodingRegistry, StreamDecoder};
//!
//! let registry = EncodingRegistry::new();
//! let handler = registry
//!     .open_handler("ISO-8859-1", Direction::Decode)
//!     .unwrap()
//!     .expect("Latin-1 is built in");
//!
//! let mut decoder = StreamDecoder::new(handler);
//! let mut raw = ByteBuffer::from(&b"caf\xe9"[..]);
//! let mut utf8 = ByteBuffer::new();
//! decoder.decode(&mut utf8, &mut raw).unwrap();
//! assert_eq!(utf8.data(), "caf\u{e9}".as_bytes());
//! ```

#![deny(missing_docs)]

use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod buffer;
pub mod codec;
pub mod detection;
pub mod handler;
pub mod stream;
mod tables;

pub use backend::{Converted, ConverterProvider, OpenError, RawStatus, StatefulConverter};
pub use buffer::ByteBuffer;
pub use codec::{ConvError, ConvResult, ConvertFn, Progress};
pub use detection::{bom_length, detect_encoding};
pub use handler::{
    ChunkOutcome, Direction, EncodingRegistry, Handler, RegisteredHandler, MAX_EXTRA_HANDLERS,
};
pub use stream::{StreamDecoder, StreamEncoder};

/// Result type for stream-level conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the consumer driving a conversion stream.
///
/// This is the small closed set reported across the library boundary; the
/// richer per-call outcome (complete / space exhausted / truncated /
/// malformed) stays inside the chunk loop as [`ChunkOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The name resolves to no built-in, registered, or
    /// backend-constructible handler. Fatal for the stream.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    /// A byte sequence does not decode under the claimed encoding.
    #[error("invalid byte sequence")]
    InvalidByteSequence,
    /// A conversion backend reported memory exhaustion.
    #[error("out of memory in conversion backend")]
    OutOfMemory,
    /// Inconsistent handler state or a converter contract violation.
    /// Programming error, not recoverable.
    #[error("internal encoding conversion error")]
    Internal,
}

/// Well-known character encodings, plus the two pseudo-kinds [`None`]
/// (nothing detected or declared) and [`Error`] (name not recognized).
///
/// Encodings not listed here are still reachable through the by-name path
/// of [`EncodingRegistry::open_handler`].
///
/// [`None`]: CharEncoding::None
/// [`Error`]: CharEncoding::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CharEncoding {
    /// Name not recognized by [`EncodingRegistry::parse_encoding_name`].
    Error,
    /// No encoding detected or declared.
    None,
    /// UTF-8.
    Utf8,
    /// UTF-16 little endian.
    Utf16Le,
    /// UTF-16 big endian.
    Utf16Be,
    /// UCS-4 little endian.
    Ucs4Le,
    /// UCS-4 big endian.
    Ucs4Be,
    /// UCS-4 in the unusual 2143 byte order.
    Ucs4Swapped2143,
    /// UCS-4 in the unusual 3412 byte order.
    Ucs4Swapped3412,
    /// EBCDIC (any code page).
    Ebcdic,
    /// UCS-2.
    Ucs2,
    /// ISO-8859-1 (Latin-1), Western European.
    Iso8859_1,
    /// ISO-8859-2 (Latin-2), Central European.
    Iso8859_2,
    /// ISO-8859-3 (Latin-3), South European.
    Iso8859_3,
    /// ISO-8859-4 (Latin-4), North European.
    Iso8859_4,
    /// ISO-8859-5, Cyrillic.
    Iso8859_5,
    /// ISO-8859-6, Arabic.
    Iso8859_6,
    /// ISO-8859-7, Greek.
    Iso8859_7,
    /// ISO-8859-8, Hebrew.
    Iso8859_8,
    /// ISO-8859-9 (Latin-5), Turkish.
    Iso8859_9,
    /// ISO-2022-JP, Japanese.
    Iso2022Jp,
    /// Shift-JIS, Japanese.
    ShiftJis,
    /// EUC-JP, Japanese.
    EucJp,
    /// US-ASCII (7-bit).
    Ascii,
}

impl CharEncoding {
    /// The canonical display name for this kind, or `None` for kinds that
    /// have no stable textual rendering (`Error`, `None`, and `Ascii`,
    /// which renders as plain UTF-8 compatible text).
    ///
    /// Both UTF-16 kinds report the undecorated `"UTF-16"` and every UCS-4
    /// byte order reports `"ISO-10646-UCS-4"`, matching how encoding
    /// declarations are written back out.
    pub fn canonical_name(self) -> Option<&'static str> {
        match self {
            CharEncoding::Error | CharEncoding::None | CharEncoding::Ascii => None,
            CharEncoding::Utf8 => Some("UTF-8"),
            CharEncoding::Utf16Le | CharEncoding::Utf16Be => Some("UTF-16"),
            CharEncoding::Ebcdic => Some("EBCDIC"),
            CharEncoding::Ucs4Le
            | CharEncoding::Ucs4Be
            | CharEncoding::Ucs4Swapped2143
            | CharEncoding::Ucs4Swapped3412 => Some("ISO-10646-UCS-4"),
            CharEncoding::Ucs2 => Some("ISO-10646-UCS-2"),
            CharEncoding::Iso8859_1 => Some("ISO-8859-1"),
            CharEncoding::Iso8859_2 => Some("ISO-8859-2"),
            CharEncoding::Iso8859_3 => Some("ISO-8859-3"),
            CharEncoding::Iso8859_4 => Some("ISO-8859-4"),
            CharEncoding::Iso8859_5 => Some("ISO-8859-5"),
            CharEncoding::Iso8859_6 => Some("ISO-8859-6"),
            CharEncoding::Iso8859_7 => Some("ISO-8859-7"),
            CharEncoding::Iso8859_8 => Some("ISO-8859-8"),
            CharEncoding::Iso8859_9 => Some("ISO-8859-9"),
            CharEncoding::Iso2022Jp => Some("ISO-2022-JP"),
            CharEncoding::ShiftJis => Some("Shift-JIS"),
            CharEncoding::EucJp => Some("EUC-JP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(CharEncoding::Utf8.canonical_name(), Some("UTF-8"));
        assert_eq!(CharEncoding::Utf16Le.canonical_name(), Some("UTF-16"));
        assert_eq!(CharEncoding::Utf16Be.canonical_name(), Some("UTF-16"));
        assert_eq!(
            CharEncoding::Ucs4Swapped2143.canonical_name(),
            Some("ISO-10646-UCS-4")
        );
        assert_eq!(CharEncoding::Iso8859_5.canonical_name(), Some("ISO-8859-5"));
        assert_eq!(CharEncoding::ShiftJis.canonical_name(), Some("Shift-JIS"));
    }

    #[test]
    fn kinds_without_stable_names() {
        assert_eq!(CharEncoding::Error.canonical_name(), None);
        assert_eq!(CharEncoding::None.canonical_name(), None);
        assert_eq!(CharEncoding::Ascii.canonical_name(), None);
    }

    #[test]
    fn error_display() {
        let err = Error::UnsupportedEncoding("KOI8-R".to_string());
        assert_eq!(err.to_string(), "unsupported encoding: KOI8-R");
        assert_eq!(
            Error::InvalidByteSequence.to_string(),
            "invalid byte sequence"
        );
    }
}
