//! isom 性能基准测试.
//!
//! 覆盖 esds 构建/解析与 ADTS 头部解析路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use isom::codec::{Mpeg4AudioConfig, read_adts_header};
use isom::core::{ByteReader, ByteWriter};
use isom::format::{read_elem_stream_desc_aac, write_elem_stream_desc_aac};

fn aac_config() -> Mpeg4AudioConfig {
    Mpeg4AudioConfig {
        object_type: 2,
        sample_rate: 44100,
        channel_count: 2,
        ..Default::default()
    }
}

fn bench_esds_write(c: &mut Criterion) {
    let config = aac_config();
    c.bench_function("esds_write_aac", |b| {
        b.iter(|| {
            let mut w = ByteWriter::new();
            write_elem_stream_desc_aac(&mut w, black_box(&config)).unwrap();
            w.into_inner()
        });
    });
}

fn bench_esds_read(c: &mut Criterion) {
    let mut w = ByteWriter::new();
    write_elem_stream_desc_aac(&mut w, &aac_config()).unwrap();
    let esds = w.into_inner();
    c.bench_function("esds_read_aac", |b| {
        b.iter(|| {
            let mut r = ByteReader::new(black_box(&esds));
            read_elem_stream_desc_aac(&mut r).unwrap()
        });
    });
}

fn bench_adts_header(c: &mut Criterion) {
    let header = [0xFF, 0xF1, 0x50, 0x80, 0x01, 0xFF, 0xFC];
    c.bench_function("adts_header_read", |b| {
        b.iter(|| read_adts_header(black_box(&header)).unwrap());
    });
}

criterion_group!(benches, bench_esds_write, bench_esds_read, bench_adts_header);
criterion_main!(benches);
