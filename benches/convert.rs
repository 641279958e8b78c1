use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use recode::{ByteBuffer, Direction, EncodingRegistry, StreamDecoder, StreamEncoder};

fn latin1_sample(len: usize) -> Vec<u8> {
    // Mixed ASCII and upper-half bytes, the common case for Latin-1 text.
    (0..len)
        .map(|i| if i % 4 == 0 { 0xE9 } else { b'a' + (i % 26) as u8 })
        .collect()
}

fn utf16le_sample(len_units: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(len_units * 2);
    for unit in "The quick brown fox jumps over the lazy dog. Жд"
        .encode_utf16()
        .cycle()
        .take(len_units)
    {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

fn bench_decode(c: &mut Criterion) {
    let registry = EncodingRegistry::new();
    let mut group = c.benchmark_group("decode");

    let latin1 = latin1_sample(64 * 1024);
    group.throughput(Throughput::Bytes(latin1.len() as u64));
    group.bench_function("latin1_64k", |b| {
        b.iter(|| {
            let handler = registry
                .open_handler("ISO-8859-1", Direction::Decode)
                .unwrap()
                .unwrap();
            let mut decoder = StreamDecoder::new(handler);
            let mut input = ByteBuffer::from(latin1.clone());
            let mut out = ByteBuffer::with_capacity(latin1.len() * 2);
            decoder.decode(&mut out, &mut input).unwrap();
            black_box(out.len())
        })
    });

    let utf16 = utf16le_sample(32 * 1024);
    group.throughput(Throughput::Bytes(utf16.len() as u64));
    group.bench_function("utf16le_64k", |b| {
        b.iter(|| {
            let handler = registry
                .open_handler("UTF-16LE", Direction::Decode)
                .unwrap()
                .unwrap();
            let mut decoder = StreamDecoder::new(handler);
            let mut input = ByteBuffer::from(utf16.clone());
            let mut out = ByteBuffer::with_capacity(utf16.len() * 2);
            decoder.decode(&mut out, &mut input).unwrap();
            black_box(out.len())
        })
    });

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let registry = EncodingRegistry::new();
    let mut group = c.benchmark_group("encode");

    let text: String = "résumé naïve café ".repeat(4 * 1024);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("utf8_to_latin1", |b| {
        b.iter(|| {
            let handler = registry
                .open_handler("ISO-8859-1", Direction::Encode)
                .unwrap()
                .unwrap();
            let mut encoder = StreamEncoder::new(handler);
            let mut input = ByteBuffer::from(text.as_bytes().to_vec());
            let mut out = ByteBuffer::with_capacity(text.len());
            encoder.prime(&mut out).unwrap();
            encoder.encode(&mut out, &mut input).unwrap();
            black_box(out.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
