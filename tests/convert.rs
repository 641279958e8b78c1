//! End-to-end conversion through the public API: detection, handler
//! lookup, and both streaming directions over the UTF-8 pivot.

use recode::{
    bom_length, detect_encoding, ByteBuffer, CharEncoding, Direction, EncodingRegistry, Error,
    StreamDecoder, StreamEncoder,
};

fn open(registry: &EncodingRegistry, name: &str, direction: Direction) -> recode::Handler {
    registry
        .open_handler(name, direction)
        .unwrap()
        .unwrap_or_else(|| panic!("expected a handler for {name}"))
}

#[test]
fn latin1_to_iso8859_5_via_pivot_with_substitution() {
    let registry = EncodingRegistry::new();

    // "café" in Latin-1; 'é' has no spot in ISO-8859-5.
    let mut raw = ByteBuffer::from(&b"caf\xe9"[..]);
    let mut pivot = ByteBuffer::new();
    let mut decoder = StreamDecoder::new(open(&registry, "ISO-8859-1", Direction::Decode));
    decoder.decode(&mut pivot, &mut raw).unwrap();
    assert_eq!(pivot.data(), "café".as_bytes());

    let mut out = ByteBuffer::new();
    let mut encoder = StreamEncoder::new(open(&registry, "ISO-8859-5", Direction::Encode));
    encoder.prime(&mut out).unwrap();
    encoder.encode(&mut out, &mut pivot).unwrap();
    assert_eq!(out.data(), b"caf&#233;");
}

#[test]
fn utf16le_document_decodes_identically_at_every_chunk_boundary() {
    let registry = EncodingRegistry::new();
    let text = "<?xml version=\"1.0\"?>\u{0416}\u{10348}";
    let mut bytes = Vec::new();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    for split in 0..=bytes.len() {
        let mut decoder = StreamDecoder::new(open(&registry, "UTF-16LE", Direction::Decode));
        let mut input = ByteBuffer::new();
        let mut pivot = ByteBuffer::new();

        input.push_bytes(&bytes[..split]);
        decoder.decode(&mut pivot, &mut input).unwrap();
        input.push_bytes(&bytes[split..]);
        decoder.decode(&mut pivot, &mut input).unwrap();

        assert_eq!(pivot.data(), text.as_bytes(), "split at {split}");
        assert!(input.is_empty());
        assert_eq!(decoder.raw_consumed(), bytes.len() as u64);
    }
}

#[test]
fn detection_feeds_kind_lookup() {
    let registry = EncodingRegistry::new();

    let doc = [0x3C, 0x00, 0x3F, 0x00, 0x78, 0x00, 0x6D, 0x00];
    let detected = detect_encoding(&doc);
    assert_eq!(detected, CharEncoding::Utf16Le);

    let handler = registry
        .lookup_kind(detected, Direction::Decode)
        .unwrap()
        .unwrap();
    assert_eq!(handler.name(), "UTF-16LE");

    let mut decoder = StreamDecoder::new(handler);
    let mut input = ByteBuffer::from(&doc[..]);
    let mut pivot = ByteBuffer::new();
    decoder.decode(&mut pivot, &mut input).unwrap();
    assert_eq!(pivot.data(), b"<?xm");
}

#[test]
fn bom_is_stripped_before_decoding() {
    let registry = EncodingRegistry::new();
    let bytes = [0xFF, 0xFE, 0x41, 0x00, 0x42, 0x00];
    let detected = detect_encoding(&bytes);
    assert_eq!(detected, CharEncoding::Utf16Le);

    let skip = bom_length(detected, &bytes);
    assert_eq!(skip, 2);

    let mut input = ByteBuffer::from(&bytes[skip..]);
    let mut pivot = ByteBuffer::new();
    let mut decoder = StreamDecoder::new(
        registry
            .lookup_kind(detected, Direction::Decode)
            .unwrap()
            .unwrap(),
    );
    decoder.decode(&mut pivot, &mut input).unwrap();
    assert_eq!(pivot.data(), b"AB");
}

#[test]
fn undecorated_utf16_round_trip_carries_a_bom() {
    let registry = EncodingRegistry::new();

    let mut pivot = ByteBuffer::from("hi".as_bytes().to_vec());
    let mut encoded = ByteBuffer::new();
    let mut encoder = StreamEncoder::new(open(&registry, "UTF-16", Direction::Encode));
    encoder.prime(&mut encoded).unwrap();
    encoder.encode(&mut encoded, &mut pivot).unwrap();
    assert_eq!(encoded.data(), &[0xFF, 0xFE, 0x68, 0x00, 0x69, 0x00]);

    // Coming back, the BOM decodes as U+FEFF unless stripped first.
    let bytes = encoded.into_vec();
    let detected = detect_encoding(&bytes);
    let skip = bom_length(detected, &bytes);
    let mut input = ByteBuffer::from(&bytes[skip..]);
    let mut back = ByteBuffer::new();
    let mut decoder = StreamDecoder::new(open(&registry, "UTF-16", Direction::Decode));
    decoder.decode(&mut back, &mut input).unwrap();
    assert_eq!(back.data(), b"hi");
}

#[test]
fn ascii_range_is_identity_for_every_iso8859_charset() {
    let registry = EncodingRegistry::new();
    let ascii: Vec<u8> = (0x00..=0x7F).collect();

    for n in [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 14, 15, 16] {
        let name = format!("ISO-8859-{n}");

        let mut decoder = StreamDecoder::new(open(&registry, &name, Direction::Decode));
        let mut input = ByteBuffer::from(ascii.clone());
        let mut pivot = ByteBuffer::new();
        decoder.decode(&mut pivot, &mut input).unwrap();
        assert_eq!(pivot.data(), &ascii[..], "{name} decode");

        let mut encoder = StreamEncoder::new(open(&registry, &name, Direction::Encode));
        let mut out = ByteBuffer::new();
        encoder.encode(&mut out, &mut pivot).unwrap();
        assert_eq!(out.data(), &ascii[..], "{name} encode");
    }
}

#[test]
fn aliases_reach_builtin_handlers() {
    let mut registry = EncodingRegistry::new();
    registry.add_alias("ISO-8859-2", "LATIN-2");

    let mut decoder = StreamDecoder::new(open(&registry, "latin-2", Direction::Decode));
    let mut input = ByteBuffer::from(&[0xB1u8][..]);
    let mut pivot = ByteBuffer::new();
    decoder.decode(&mut pivot, &mut input).unwrap();
    assert_eq!(pivot.data(), "\u{0105}".as_bytes());
}

#[test]
fn utf8_source_needs_no_handler() {
    let registry = EncodingRegistry::new();
    assert!(registry
        .open_handler("UTF-8", Direction::Decode)
        .unwrap()
        .is_none());
}

#[test]
fn unknown_encoding_is_a_lookup_error_not_a_panic() {
    let registry = EncodingRegistry::new();
    let err = registry
        .open_handler("X-NO-SUCH-CHARSET", Direction::Decode)
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnsupportedEncoding("X-NO-SUCH-CHARSET".to_string())
    );
}

#[test]
fn ascii_stream_with_bad_byte_fails_cleanly() {
    let registry = EncodingRegistry::new();
    let mut decoder = StreamDecoder::new(open(&registry, "US-ASCII", Direction::Decode));
    let mut input = ByteBuffer::from(&b"fine until \x80 here"[..]);
    let mut pivot = ByteBuffer::new();

    // The good prefix survives the first call.
    decoder.decode(&mut pivot, &mut input).unwrap();
    assert_eq!(pivot.data(), b"fine until ");

    let err = decoder.decode(&mut pivot, &mut input).unwrap_err();
    assert_eq!(err, Error::InvalidByteSequence);
}

#[test]
fn large_buffer_forces_output_growth() {
    let registry = EncodingRegistry::new();
    // 64 KiB of Latin-1 high bytes doubles in UTF-8.
    let raw = vec![0xE9u8; 64 * 1024];
    let mut input = ByteBuffer::from(raw);
    let mut pivot = ByteBuffer::new();
    let mut decoder = StreamDecoder::new(open(&registry, "ISO-8859-1", Direction::Decode));
    let produced = decoder.decode(&mut pivot, &mut input).unwrap();
    assert_eq!(produced, 128 * 1024);
    assert!(input.is_empty());
    assert_eq!(decoder.raw_consumed(), 64 * 1024);
}
