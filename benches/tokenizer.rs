use binary_stylometry::patterns::{ngram_profiles, tokenize, Dictionary, NGramRange};
use binary_stylometry::{FormatTable, OpcodeTable};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FORMATS: &str = "00aaaaaa\n01bbbccc\n10dddddd\n11eeffgg";
const DICTIONARY: &str = "00xxxxxx\n01xxxyyy\n\n10zzzzzz\n11aabbcc\n\n01pppqqq\n01qqqppp\n\n00rrrrrr";

fn program(len: usize) -> Vec<u8> {
    // xorshift keeps the stream deterministic without extra dependencies
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let formats = FormatTable::parse(FORMATS).unwrap();
    let data = program(64 * 1024);
    c.bench_function("decode 64k", |b| b.iter(|| formats.decode(black_box(&data))));
}

fn bench_tokenize(c: &mut Criterion) {
    let formats = FormatTable::parse(FORMATS).unwrap();
    let opcodes = OpcodeTable::new();
    let dictionary = Dictionary::parse(DICTIONARY, &formats, &opcodes).unwrap();
    let stream = formats.decode(&program(64 * 1024)).instructions;
    c.bench_function("tokenize 64k", |b| {
        b.iter(|| tokenize(black_box(&stream), &dictionary, &opcodes))
    });
}

fn bench_ngrams(c: &mut Criterion) {
    let formats = FormatTable::parse(FORMATS).unwrap();
    let opcodes = OpcodeTable::new();
    let stream = formats.decode(&program(8 * 1024)).instructions;
    c.bench_function("ngrams 8k 3..=12", |b| {
        b.iter(|| ngram_profiles(black_box(&stream), NGramRange::default(), &opcodes))
    });
}

criterion_group!(benches, bench_decode, bench_tokenize, bench_ngrams);
criterion_main!(benches);
