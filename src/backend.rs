//! Pluggable conversion backends.
//!
//! Encodings without a built-in converter are served by a backend: a
//! factory ([`ConverterProvider`]) that opens stateful converter objects
//! ([`StatefulConverter`]) for a given encoding name and direction. This is
//! the seam an iconv- or ICU-style engine plugs into; the library itself
//! ships no bindings, only the trait contract and its translation into the
//! uniform chunk outcome.

use crate::codec::Progress;
use crate::handler::Direction;

/// Raw completion status reported by a backend converter call.
///
/// Backends report status and byte counts separately; the streaming layer
/// folds both into [`ChunkOutcome`](crate::ChunkOutcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawStatus {
    /// All input was converted.
    Complete,
    /// The output slice filled up before the input ran out.
    SpaceExhausted,
    /// The input ends mid-sequence; the partial bytes were left unconsumed.
    TruncatedInput,
    /// The input contains a sequence invalid in the source encoding.
    MalformedInput,
}

/// Result of a single backend converter call: byte counts plus status.
#[derive(Debug, Clone, Copy)]
pub struct Converted {
    /// Bytes consumed and produced by this call.
    pub progress: Progress,
    /// How the call ended.
    pub status: RawStatus,
}

/// Why a backend could not open a converter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    /// The backend does not know this encoding. The lookup chain moves on
    /// to the next provider.
    #[error("encoding not supported by this backend")]
    Unsupported,
    /// The backend could not allocate its conversion state. Fatal.
    #[error("backend out of memory")]
    OutOfMemory,
    /// Any other backend failure. Fatal.
    #[error("backend system error: {0}")]
    System(String),
}

/// A stateful converter between one encoding and UTF-8, opened for a single
/// direction and owned by exactly one handler.
///
/// Unlike the built-in stateless functions, a backend converter may carry
/// shift state between calls, so the same object must see every chunk of
/// one stream in order, and must not be reused for a second stream: there
/// is no portable way to reset retained state. That is a caller
/// obligation, not something the adapter enforces. Dropping the converter
/// releases the backend state.
pub trait StatefulConverter: Send {
    /// Converts as much of `src` into `dst` as fits, reporting byte counts
    /// and a completion status.
    ///
    /// An empty `src` is the flush/initialize call; converters with shift
    /// state may emit a reset sequence, everything else reports zero
    /// progress with [`RawStatus::Complete`].
    fn convert(&mut self, dst: &mut [u8], src: &[u8]) -> crate::Result<Converted>;
}

impl std::fmt::Debug for dyn StatefulConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StatefulConverter")
    }
}

/// A factory for stateful converters, consulted as the last step of the
/// handler lookup chain.
pub trait ConverterProvider: Send + Sync {
    /// Short name used in lookup trace logs.
    fn name(&self) -> &str;

    /// Opens a converter between `encoding` and UTF-8 in the given
    /// direction.
    ///
    /// [`OpenError::Unsupported`] lets the chain try the next provider;
    /// the other variants abort the lookup.
    fn open(
        &self,
        encoding: &str,
        direction: Direction,
    ) -> Result<Box<dyn StatefulConverter>, OpenError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A provider backed by the built-in Latin-1 functions, enough to
    //! exercise the backend path without a real conversion engine.

    use super::*;
    use crate::codec::{self, ConvError};

    pub struct Latin1Provider {
        pub advertised: &'static str,
    }

    struct Latin1Converter {
        direction: Direction,
    }

    impl StatefulConverter for Latin1Converter {
        fn convert(&mut self, dst: &mut [u8], src: &[u8]) -> crate::Result<Converted> {
            let f = match self.direction {
                Direction::Decode => codec::latin1_to_utf8,
                Direction::Encode => codec::utf8_to_latin1,
            };
            match f(dst, Some(src)) {
                Ok(progress) => {
                    let status = if progress.consumed < src.len() {
                        if progress.produced > 0 {
                            RawStatus::SpaceExhausted
                        } else {
                            RawStatus::TruncatedInput
                        }
                    } else {
                        RawStatus::Complete
                    };
                    Ok(Converted { progress, status })
                }
                Err(ConvError::Malformed { consumed, produced }) => Ok(Converted {
                    progress: Progress { consumed, produced },
                    status: RawStatus::MalformedInput,
                }),
                Err(ConvError::Truncated { consumed, produced }) => Ok(Converted {
                    progress: Progress { consumed, produced },
                    status: RawStatus::TruncatedInput,
                }),
                Err(ConvError::Internal) => Err(crate::Error::Internal),
            }
        }
    }

    impl ConverterProvider for Latin1Provider {
        fn name(&self) -> &str {
            "latin1-test"
        }

        fn open(
            &self,
            encoding: &str,
            direction: Direction,
        ) -> Result<Box<dyn StatefulConverter>, OpenError> {
            if encoding.eq_ignore_ascii_case(self.advertised) {
                Ok(Box::new(Latin1Converter { direction }))
            } else {
                Err(OpenError::Unsupported)
            }
        }
    }

    #[test]
    fn provider_opens_only_its_encoding() {
        let provider = Latin1Provider { advertised: "X-TEST-LATIN1" };
        assert!(provider.open("X-TEST-LATIN1", Direction::Decode).is_ok());
        assert_eq!(
            provider.open("KOI8-R", Direction::Decode).unwrap_err(),
            OpenError::Unsupported
        );
    }

    #[test]
    fn converter_reports_raw_status() {
        let provider = Latin1Provider { advertised: "X-TEST-LATIN1" };
        let mut conv = provider.open("X-TEST-LATIN1", Direction::Decode).unwrap();

        let mut dst = [0u8; 16];
        let out = conv.convert(&mut dst, b"caf\xe9").unwrap();
        assert_eq!(out.status, RawStatus::Complete);
        assert_eq!(out.progress.consumed, 4);
        assert_eq!(&dst[..out.progress.produced], "café".as_bytes());

        // One byte of room for a two-byte character.
        let mut tiny = [0u8; 1];
        let out = conv.convert(&mut tiny, b"\xe9").unwrap();
        assert_eq!(out.status, RawStatus::TruncatedInput);
        assert_eq!(out.progress, Progress::default());
    }
}
