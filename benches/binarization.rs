use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qr_decode::config::DEFAULT_THRESHOLD_OFFSETS;
use qr_decode::utils::binarization::adaptive_binarize;
use qr_decode::utils::grayscale::rgb_to_grayscale;

/// Frame sizes a camera or still decoder typically sees
const FRAMES: [(usize, usize); 3] = [(640, 480), (1280, 720), (1920, 1080)];

/// Diagonal gradient with a dark checker, so the local means vary
fn frame(width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let base = 64 + ((x + y) * 128 / (width + height)) as u8;
            let checker = (x / 12 + y / 12) % 2 == 0;
            gray[y * width + x] = if checker { base / 3 } else { base };
        }
    }
    gray
}

/// One binarization per default threshold offset, as the decode retry does
fn bench_adaptive_retry_offsets(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_binarize_offsets");
    for (width, height) in FRAMES {
        let gray = frame(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &gray,
            |b, gray| {
                b.iter(|| {
                    for offset in DEFAULT_THRESHOLD_OFFSETS {
                        black_box(adaptive_binarize(black_box(gray), width, height, offset));
                    }
                })
            },
        );
    }
    group.finish();
}

fn bench_rgb_frame_to_bitmap(c: &mut Criterion) {
    let (width, height) = FRAMES[1];
    let rgb: Vec<u8> = frame(width, height).iter().flat_map(|&g| [g, g, g]).collect();
    c.bench_function("rgb_to_bitmap_1280x720", |b| {
        b.iter(|| {
            let gray = rgb_to_grayscale(black_box(&rgb));
            adaptive_binarize(&gray, width, height, 0)
        })
    });
}

criterion_group!(benches, bench_adaptive_retry_offsets, bench_rgb_frame_to_bitmap);
criterion_main!(benches);
