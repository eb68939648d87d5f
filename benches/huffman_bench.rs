use huffpack::{compress, decompress, Entry};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

fn sample_text(len: usize) -> Vec<u8> {
    let words = b"the quick brown fox jumps over the lazy dog while huffman codes the rest ";
    words.iter().copied().cycle().take(len).collect()
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    for &len in &[4 * 1024, 256 * 1024] {
        let files = vec![Entry::new("text.txt", sample_text(len))];
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("text_{len}"), |b| b.iter(|| compress(&files).unwrap()));
    }
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    for &len in &[4 * 1024, 256 * 1024] {
        let files = vec![Entry::new("text.txt", sample_text(len))];
        let container = compress(&files).unwrap();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("text_{len}"), |b| {
            b.iter(|| decompress(&container).unwrap())
        });
    }
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
