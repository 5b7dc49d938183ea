// Criterion benchmarks for the imelink-common protocol layer
//
// Run benchmarks with:
//   cargo bench -p imelink-common

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use imelink_common::protocol::{Parcel, RemoteException};

const DESCRIPTOR: &str = "imelink.ImeClientCallback";

fn bench_parcel_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("parcel_encode");

    group.bench_function("set_ime_display_request", |b| {
        b.iter(|| {
            let mut data = Parcel::new();
            data.write_interface_token(black_box(DESCRIPTOR));
            data.write_i32(black_box(2));
            data
        });
    });

    group.bench_function("success_reply", |b| {
        b.iter(|| {
            let mut reply = Parcel::new();
            reply.write_no_exception();
            reply.write_i32(black_box(2));
            reply
        });
    });

    group.bench_function("exception_reply", |b| {
        let exception = RemoteException::illegal_argument("display id out of range");
        b.iter(|| {
            let mut reply = Parcel::new();
            reply.write_exception(black_box(&exception));
            reply
        });
    });

    group.finish();
}

fn bench_parcel_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("parcel_decode");

    let mut request = Parcel::new();
    request.write_interface_token(DESCRIPTOR);
    request.write_i32(2);
    let request = request.into_bytes();

    group.bench_function("set_ime_display_request", |b| {
        b.iter(|| {
            let mut data = Parcel::from_bytes(black_box(request.clone()));
            data.enforce_interface(DESCRIPTOR).unwrap();
            data.read_i32().unwrap()
        });
    });

    let mut reply = Parcel::new();
    reply.write_no_exception();
    let reply = reply.into_bytes();

    group.bench_function("success_reply", |b| {
        b.iter(|| {
            let mut reply = Parcel::from_bytes(black_box(reply.clone()));
            reply.read_exception().unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parcel_encode, bench_parcel_decode);
criterion_main!(benches);
