use criterion::{black_box, criterion_group, criterion_main, Criterion};
use macbin::crc::{bit_reverse, CRC32_ISO_HDLC, KERMIT, XMODEM};
use macbin::header::{offsets, Header, HEADER_SIZE};

fn bench_checksum(c: &mut Criterion) {
    let data = vec![0xA5u8; 64 * 1024];

    c.bench_function("xmodem_64k", |b| b.iter(|| XMODEM.checksum(black_box(&data))));
    c.bench_function("kermit_64k", |b| b.iter(|| KERMIT.checksum(black_box(&data))));
    c.bench_function("crc32_64k", |b| b.iter(|| CRC32_ISO_HDLC.checksum(black_box(&data))));
    c.bench_function("bit_reverse_u32", |b| b.iter(|| bit_reverse(black_box(0x6959_7565u32))));
}

fn bench_header_decode(c: &mut Criterion) {
    let mut block = [0u8; HEADER_SIZE];
    block[offsets::NAME_LEN] = 5;
    block[offsets::NAME..offsets::NAME + 5].copy_from_slice(b"Bench");
    block[offsets::FILE_TYPE..offsets::FILE_TYPE + 4].copy_from_slice(b"TEXT");
    block[offsets::DATA_LEN..offsets::DATA_LEN + 4].copy_from_slice(&4096u32.to_be_bytes());
    let crc = XMODEM.checksum(&block[..offsets::CRC]);
    block[offsets::CRC..offsets::CRC + 2].copy_from_slice(&crc.to_be_bytes());

    c.bench_function("header_decode", |b| b.iter(|| Header::decode(black_box(&block)).unwrap()));
}

criterion_group!(benches, bench_checksum, bench_header_decode);
criterion_main!(benches);
