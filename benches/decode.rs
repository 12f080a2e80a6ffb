use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::ffi::{c_int, c_void};
use std::hint::black_box;
use vcfbuf::{decode_with, make_buffer, Buffer};

/// htslib-shaped decoder: grow with realloc if needed, then fill `needed` values
unsafe fn fill(dst: *mut *mut i32, ndst: *mut c_int, needed: c_int) -> c_int {
    if *ndst < needed {
        let grown = libc::realloc(*dst as *mut c_void, needed as usize * 4) as *mut i32;
        if grown.is_null() {
            return -4;
        }
        *dst = grown;
        *ndst = needed;
    }
    for i in 0..needed {
        *(*dst).add(i as usize) = i;
    }
    needed
}

/// Reusing one buffer across calls versus allocating per call
fn bench_buffer_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_buffer");

    for n_values in [2, 64, 4096] {
        group.throughput(Throughput::Elements(n_values as u64));

        group.bench_with_input(BenchmarkId::new("reused", n_values), &n_values, |b, &n| {
            let mut buf: Buffer<i32> = make_buffer(1).unwrap();
            b.iter(|| {
                let outcome = unsafe { decode_with(&mut buf, |d, cap| fill(d, cap, n)) };
                black_box(outcome.unwrap())
            })
        });

        group.bench_with_input(BenchmarkId::new("fresh", n_values), &n_values, |b, &n| {
            b.iter(|| {
                let mut buf: Buffer<i32> = make_buffer(1).unwrap();
                let outcome = unsafe { decode_with(&mut buf, |d, cap| fill(d, cap, n)) };
                black_box(outcome.unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_buffer_reuse);
criterion_main!(benches);
