use criterion::{Criterion, black_box, criterion_group, criterion_main};

use cyrconv::{Encoding, EncodingDetector, Translator};

fn sample_text() -> String {
    "Съешь же ещё этих мягких французских булок, да выпей чаю. ".repeat(2000)
}

fn bench_decode_encode(c: &mut Criterion) {
    let utf8 = sample_text().into_bytes();
    let cp1251 = Translator::new(Some(Encoding::UTF8), Encoding::WINDOWS_1251)
        .convert(&utf8)
        .unwrap();

    c.bench_function("utf8_to_cp1251", |b| {
        let translator = Translator::new(Some(Encoding::UTF8), Encoding::WINDOWS_1251);
        b.iter(|| translator.convert(black_box(&utf8)).unwrap())
    });

    c.bench_function("cp1251_to_utf16le", |b| {
        let translator = Translator::new(Some(Encoding::WINDOWS_1251), Encoding::UTF16LE);
        b.iter(|| translator.convert(black_box(&cp1251)).unwrap())
    });

    c.bench_function("utf8_to_koi8r", |b| {
        let translator = Translator::new(Some(Encoding::UTF8), Encoding::KOI8_R);
        b.iter(|| translator.convert(black_box(&utf8)).unwrap())
    });
}

fn bench_detection(c: &mut Criterion) {
    let utf8 = sample_text().into_bytes();
    let detector = EncodingDetector::new();

    c.bench_function("detect_utf8", |b| {
        b.iter(|| detector.detect(black_box(&utf8)))
    });
}

criterion_group!(benches, bench_decode_encode, bench_detection);
criterion_main!(benches);
