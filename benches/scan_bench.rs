use criterion::{black_box, criterion_group, criterion_main, Criterion};
use odl::catalog::CatalogReport;
use odl::container::ContainerReader;
use odl::locate::locate;

const BLOCK_SIGNATURE: [u8; 8] = [0xCC, 0xDD, 0xEE, 0xFF, 0, 0, 0, 0];

fn header_bytes() -> Vec<u8> {
    let mut h = Vec::with_capacity(256);
    h.extend_from_slice(b"EBFGONED");
    h.extend_from_slice(&3u32.to_le_bytes());
    h.resize(256, 0);
    h
}

fn record_v3(code_file: &str, function: &str, flags: u32, params: &[u8]) -> Vec<u8> {
    let data_len = 36 + code_file.len() + function.len() + params.len();
    let mut r = Vec::new();
    r.extend_from_slice(&BLOCK_SIGNATURE);
    r.extend_from_slice(&1_690_000_000_000u64.to_le_bytes());
    r.extend_from_slice(&[0u8; 8]);
    r.extend_from_slice(&(data_len as u32).to_le_bytes());
    r.extend_from_slice(&[0u8; 4]);
    r.extend_from_slice(&[0u8; 16]);
    r.extend_from_slice(&[0u8; 8]);
    r.extend_from_slice(&(code_file.len() as u32).to_le_bytes());
    r.extend_from_slice(code_file.as_bytes());
    r.extend_from_slice(&flags.to_le_bytes());
    r.extend_from_slice(&(function.len() as u32).to_le_bytes());
    r.extend_from_slice(function.as_bytes());
    r.extend_from_slice(params);
    r
}

/// 1000 records over 10 code files / 100 functions, 256-byte params each.
fn synthetic_container() -> Vec<u8> {
    let params = vec![0x5Au8; 256];
    let mut file = header_bytes();
    for i in 0..1000 {
        let code_file = format!("module_{}.cpp", i % 10);
        let function = format!("Function{}", i % 100);
        file.extend_from_slice(&record_v3(&code_file, &function, (i % 8) as u32, &params));
    }
    file
}

fn bench_catalog(c: &mut Criterion) {
    let file = synthetic_container();

    c.bench_function("catalog_1000_records", |b| {
        b.iter(|| {
            let mut reader = ContainerReader::open(black_box(&file[..])).unwrap();
            CatalogReport::build(&mut reader).unwrap()
        })
    });
}

fn bench_locate_miss(c: &mut Criterion) {
    let file = synthetic_container();

    // worst case: no identity matches, the whole container is scanned
    c.bench_function("locate_miss_1000_records", |b| {
        b.iter(|| {
            let mut reader = ContainerReader::open(black_box(&file[..])).unwrap();
            locate(&mut reader, "absent.cpp", "Nothing", 0).unwrap()
        })
    });
}

criterion_group!(benches, bench_catalog, bench_locate_miss);
criterion_main!(benches);
