//! Streaming conversion front-ends.
//!
//! [`StreamDecoder`] and [`StreamEncoder`] drive a [`Handler`] over
//! [`ByteBuffer`]s: they grow the output, loop while the converter is only
//! out of space, consume accepted input from the front, and keep the
//! cumulative accounting. The encoder additionally recovers from code
//! points the target cannot represent by writing a numeric character
//! reference (`&#N;`) and continuing.

use log::debug;

use crate::buffer::ByteBuffer;
use crate::codec::decode_utf8_char;
use crate::handler::{ChunkOutcome, Handler};
use crate::Error;

/// Output growth step while a converter keeps asking for space.
const OUTPUT_GROW: usize = 4096;

/// Input accepted per encode call; keeps one call's working set bounded.
const MAX_INPUT_PER_CALL: usize = 64 * 1024;

/// Output written per encode call.
const MAX_OUTPUT_PER_CALL: usize = 256 * 1024;

/// Character-reference substitutions allowed in one encode call, so a
/// stream of unrepresentable input cannot loop unboundedly.
const MAX_SUBSTITUTIONS: usize = 4096;

/// Streaming decoder from an external encoding to UTF-8.
///
/// Feed raw bytes into the input buffer in any chunking; accepted bytes
/// are consumed from its front and a trailing partial sequence stays put
/// until more input arrives.
pub struct StreamDecoder {
    handler: Handler,
    raw_consumed: u64,
}

impl StreamDecoder {
    /// Wraps a handler opened for [`Direction::Decode`](crate::Direction::Decode).
    pub fn new(handler: Handler) -> Self {
        Self {
            handler,
            raw_consumed: 0,
        }
    }

    /// The encoding being decoded.
    pub fn encoding_name(&self) -> &str {
        self.handler.name()
    }

    /// Total raw bytes accepted over the life of this decoder, saturating
    /// at the counter's maximum instead of wrapping.
    pub fn raw_consumed(&self) -> u64 {
        self.raw_consumed
    }

    /// Decodes everything currently acceptable from `input` into `out`,
    /// returning the UTF-8 bytes appended by this call.
    ///
    /// A malformed sequence fails the call only when it produced nothing;
    /// otherwise the good prefix is kept and the very next call reports
    /// the error.
    pub fn decode(&mut self, out: &mut ByteBuffer, input: &mut ByteBuffer) -> crate::Result<usize> {
        let mut total = 0;
        loop {
            if input.is_empty() {
                break;
            }
            if out.avail() < OUTPUT_GROW {
                out.grow(OUTPUT_GROW);
            }
            let room = out.avail();
            let outcome = out.append_with(room, |dst| {
                match self.handler.decode_chunk(dst, input.data()) {
                    Ok(outcome) => (outcome.progress().produced, Ok(outcome)),
                    Err(e) => (0, Err(e)),
                }
            })?;
            let progress = outcome.progress();
            input.consume(progress.consumed);
            self.raw_consumed = self.raw_consumed.saturating_add(progress.consumed as u64);
            total += progress.produced;
            match outcome {
                ChunkOutcome::NeedSpace(_) => continue,
                ChunkOutcome::Consumed(_) => break,
                ChunkOutcome::Malformed(p) => {
                    if p.produced == 0 {
                        return Err(Error::InvalidByteSequence);
                    }
                    break;
                }
            }
        }
        Ok(total)
    }
}

/// Streaming encoder from UTF-8 to an external encoding.
pub struct StreamEncoder {
    handler: Handler,
}

impl StreamEncoder {
    /// Wraps a handler opened for [`Direction::Encode`](crate::Direction::Encode).
    pub fn new(handler: Handler) -> Self {
        Self { handler }
    }

    /// The encoding being produced.
    pub fn encoding_name(&self) -> &str {
        self.handler.name()
    }

    /// Runs the flush/initialize call, giving the encoder its one chance
    /// to emit a byte-order mark before any data. Returns the bytes
    /// appended.
    pub fn prime(&mut self, out: &mut ByteBuffer) -> crate::Result<usize> {
        if out.avail() < OUTPUT_GROW {
            out.grow(OUTPUT_GROW);
        }
        let room = out.avail();
        let outcome = out.append_with(room, |dst| match self.handler.encode_chunk(dst, None) {
            Ok(outcome) => (outcome.progress().produced, Ok(outcome)),
            Err(e) => (0, Err(e)),
        })?;
        Ok(outcome.progress().produced)
    }

    /// Encodes everything currently acceptable from `input` into `out`,
    /// returning the bytes appended by this call.
    ///
    /// Code points the target encoding cannot represent are replaced with
    /// `&#N;` references, up to a per-call bound; the reference itself
    /// failing to encode is an internal error. A scalar split at the end
    /// of the input stays in the buffer until the rest of it arrives.
    pub fn encode(&mut self, out: &mut ByteBuffer, input: &mut ByteBuffer) -> crate::Result<usize> {
        let mut total = 0;
        let mut substitutions = 0;
        loop {
            let toconv = input.len().min(MAX_INPUT_PER_CALL);
            if toconv == 0 {
                break;
            }
            if toconv * 4 >= out.avail() {
                out.grow(toconv * 4);
            }
            let room = out.avail().min(MAX_OUTPUT_PER_CALL);
            let outcome = out.append_with(room, |dst| {
                match self.handler.encode_chunk(dst, Some(&input.data()[..toconv])) {
                    Ok(outcome) => (outcome.progress().produced, Ok(outcome)),
                    Err(e) => (0, Err(e)),
                }
            })?;
            let progress = outcome.progress();
            input.consume(progress.consumed);
            total += progress.produced;
            match outcome {
                ChunkOutcome::NeedSpace(_) => continue,
                ChunkOutcome::Consumed(_) => break,
                ChunkOutcome::Malformed(_) => {
                    substitutions += 1;
                    if substitutions > MAX_SUBSTITUTIONS {
                        return Err(Error::Internal);
                    }
                    let Some((code, len)) = decode_utf8_char(input.data()) else {
                        // The pivot buffer itself is broken.
                        if total == 0 {
                            return Err(Error::InvalidByteSequence);
                        }
                        break;
                    };
                    debug!(
                        "substituting character reference for U+{code:04X} in {}",
                        self.handler.name()
                    );
                    let charref = format!("&#{code};");
                    let produced = self.encode_reference(out, charref.as_bytes())?;
                    input.consume(len);
                    total += produced;
                }
            }
        }
        Ok(total)
    }

    /// Encodes one character reference, requiring it to be accepted whole.
    fn encode_reference(&mut self, out: &mut ByteBuffer, charref: &[u8]) -> crate::Result<usize> {
        if out.avail() < charref.len() * 4 {
            out.grow(charref.len() * 4);
        }
        let room = out.avail();
        let outcome = out.append_with(room, |dst| {
            match self.handler.encode_chunk(dst, Some(charref)) {
                Ok(outcome) => (outcome.progress().produced, Ok(outcome)),
                Err(e) => (0, Err(e)),
            }
        })?;
        match outcome {
            ChunkOutcome::Consumed(p) if p.consumed == charref.len() => Ok(p.produced),
            // A reference is plain ASCII; any target that cannot take it
            // whole is broken.
            _ => Err(Error::Internal),
        }
    }
}

/// One-shot decode of a buffered prefix, used before a stream is fully
/// set up. Grows the output once and converts a single chunk.
#[deprecated(note = "use StreamDecoder::decode")]
pub fn decode_first_line(
    handler: &mut Handler,
    out: &mut ByteBuffer,
    input: &mut ByteBuffer,
) -> crate::Result<usize> {
    let toconv = input.len();
    if toconv == 0 {
        return Ok(0);
    }
    if out.avail() < toconv * 2 {
        out.grow(toconv * 2);
    }
    let room = out.avail();
    let outcome = out.append_with(room, |dst| match handler.decode_chunk(dst, input.data()) {
        Ok(outcome) => (outcome.progress().produced, Ok(outcome)),
        Err(e) => (0, Err(e)),
    })?;
    let progress = outcome.progress();
    input.consume(progress.consumed);
    if let ChunkOutcome::Malformed(p) = outcome {
        if p.produced == 0 {
            return Err(Error::InvalidByteSequence);
        }
    }
    Ok(progress.produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Direction, EncodingRegistry};

    fn open(name: &str, direction: Direction) -> Handler {
        EncodingRegistry::new()
            .open_handler(name, direction)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn decode_whole_buffer() {
        let mut decoder = StreamDecoder::new(open("ISO-8859-1", Direction::Decode));
        let mut input = ByteBuffer::from(&b"na\xefve"[..]);
        let mut out = ByteBuffer::new();
        let n = decoder.decode(&mut out, &mut input).unwrap();
        assert_eq!(out.data(), "naïve".as_bytes());
        assert_eq!(n, out.len());
        assert!(input.is_empty());
        assert_eq!(decoder.raw_consumed(), 5);
    }

    #[test]
    fn decode_across_arbitrary_chunk_splits() {
        // U+0416 as UTF-16LE split between two chunks.
        let bytes = [0x41, 0x00, 0x16, 0x04, 0x42, 0x00];
        for split in 0..=bytes.len() {
            let mut decoder = StreamDecoder::new(open("UTF-16LE", Direction::Decode));
            let mut input = ByteBuffer::new();
            let mut out = ByteBuffer::new();

            input.push_bytes(&bytes[..split]);
            decoder.decode(&mut out, &mut input).unwrap();
            input.push_bytes(&bytes[split..]);
            decoder.decode(&mut out, &mut input).unwrap();

            assert_eq!(out.data(), "A\u{0416}B".as_bytes(), "split at {split}");
            assert_eq!(decoder.raw_consumed(), 6);
        }
    }

    #[test]
    fn decode_reports_malformed_input() {
        let mut decoder = StreamDecoder::new(open("ASCII", Direction::Decode));
        let mut input = ByteBuffer::from(&b"ok\xff"[..]);
        let mut out = ByteBuffer::new();

        // First call keeps the good prefix.
        let n = decoder.decode(&mut out, &mut input).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out.data(), b"ok");

        // Retrying with no progress surfaces the error.
        let err = decoder.decode(&mut out, &mut input).unwrap_err();
        assert_eq!(err, Error::InvalidByteSequence);
    }

    #[test]
    fn encode_prime_writes_utf16_bom() {
        let mut encoder = StreamEncoder::new(open("UTF-16", Direction::Encode));
        let mut out = ByteBuffer::new();
        let n = encoder.prime(&mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out.data(), &[0xFF, 0xFE]);

        let mut input = ByteBuffer::from("A".as_bytes().to_vec());
        encoder.encode(&mut out, &mut input).unwrap();
        assert_eq!(out.data(), &[0xFF, 0xFE, 0x41, 0x00]);
    }

    #[test]
    fn encode_prime_is_quiet_for_decorated_orders() {
        let mut encoder = StreamEncoder::new(open("UTF-16BE", Direction::Encode));
        let mut out = ByteBuffer::new();
        assert_eq!(encoder.prime(&mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn encode_defers_scalar_split_across_chunks() {
        // "é" arrives one UTF-8 byte at a time.
        let mut encoder = StreamEncoder::new(open("ISO-8859-1", Direction::Encode));
        let mut input = ByteBuffer::from(&b"a\xc3"[..]);
        let mut out = ByteBuffer::new();

        let n = encoder.encode(&mut out, &mut input).unwrap();
        assert_eq!(n, 1);
        assert_eq!(out.data(), b"a");
        assert_eq!(input.data(), &[0xC3]);

        input.push_bytes(&[0xA9]);
        encoder.encode(&mut out, &mut input).unwrap();
        assert_eq!(out.data(), b"a\xe9");
        assert!(input.is_empty());
    }

    #[test]
    fn encode_substitutes_character_references() {
        let mut encoder = StreamEncoder::new(open("ASCII", Direction::Encode));
        let mut input = ByteBuffer::from("a\u{0434}b".as_bytes().to_vec());
        let mut out = ByteBuffer::new();
        let n = encoder.encode(&mut out, &mut input).unwrap();
        assert_eq!(out.data(), b"a&#1076;b");
        assert_eq!(n, out.len());
        assert!(input.is_empty());
    }

    #[test]
    fn encode_substitutes_repeatedly() {
        let mut encoder = StreamEncoder::new(open("ISO-8859-1", Direction::Encode));
        let mut input = ByteBuffer::from("\u{0416}x\u{20AC}".as_bytes().to_vec());
        let mut out = ByteBuffer::new();
        encoder.encode(&mut out, &mut input).unwrap();
        assert_eq!(out.data(), b"&#1046;x&#8364;");
    }

    #[test]
    fn encode_round_trip_iso8859_5() {
        let mut encoder = StreamEncoder::new(open("ISO-8859-5", Direction::Encode));
        let mut input = ByteBuffer::from("\u{0434}\u{0430}".as_bytes().to_vec());
        let mut out = ByteBuffer::new();
        encoder.encode(&mut out, &mut input).unwrap();
        assert_eq!(out.data(), &[0xD4, 0xD0]);
    }

    #[test]
    fn first_line_decode_converts_one_chunk() {
        #[allow(deprecated)]
        {
            let mut handler = open("ISO-8859-1", Direction::Decode);
            let mut input = ByteBuffer::from(&b"\xe9t\xe9"[..]);
            let mut out = ByteBuffer::new();
            let n = decode_first_line(&mut handler, &mut out, &mut input).unwrap();
            assert_eq!(out.data(), "été".as_bytes());
            assert_eq!(n, 5);
        }
    }
}
