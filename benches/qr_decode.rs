use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qr_decode::{Decoder, Image, decode_grayscale};
use qrcode::{Color, EcLevel, QrCode, Version};

/// Render a symbol at `module_px` pixels per module with a 4 module quiet zone
fn rendered(data: &str, version: i16, module_px: usize) -> (Vec<u8>, usize) {
    let code = QrCode::with_version(data, Version::Normal(version), EcLevel::M).unwrap();
    let width = code.width();
    let side = (width + 8) * module_px;
    let mut pixels = vec![255u8; side * side];
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color == Color::Dark {
            let px = (i % width + 4) * module_px;
            let py = (i / width + 4) * module_px;
            for row in py..py + module_px {
                pixels[row * side + px..row * side + px + module_px].fill(0);
            }
        }
    }
    (pixels, side)
}

fn bench_decode_versions(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_version");
    for version in [1i16, 4, 10, 25] {
        let (pixels, side) = rendered("https://example.com/benchmark", version, 4);
        group.bench_with_input(BenchmarkId::from_parameter(version), &version, |b, _| {
            b.iter(|| decode_grayscale(black_box(&pixels), side, side))
        });
    }
    group.finish();
}

fn bench_decode_miss(c: &mut Criterion) {
    let blank = vec![255u8; 640 * 480];
    c.bench_function("decode_blank_640x480", |b| {
        b.iter(|| decode_grayscale(black_box(&blank), 640, 480))
    });
}

fn bench_decode_batch(c: &mut Criterion) {
    let rendered: Vec<(Vec<u8>, usize)> = (0..16)
        .map(|i| rendered(&format!("batch item {i}"), 3, 4))
        .collect();
    let images: Vec<Image<'_>> = rendered
        .iter()
        .map(|(pixels, side)| Image::gray(pixels, *side, *side).unwrap())
        .collect();
    let decoder = Decoder::default();
    c.bench_function("decode_batch_16", |b| {
        b.iter(|| decoder.decode_batch(black_box(&images)))
    });
}

criterion_group!(
    benches,
    bench_decode_versions,
    bench_decode_miss,
    bench_decode_batch
);
criterion_main!(benches);
