use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use sweph_bridge::resolver::{resolve, Operation, Primitive};
use sweph_bridge::session::{self, Session};
use sweph_bridge::SandboxModule;

const J2000: f64 = 2451545.0;

fn bench_calc_ut(c: &mut Criterion) {
    let mut group = c.benchmark_group("calc_ut");
    let mut session = Session::builtin();

    for (name, ipl) in [("sun", 0), ("moon", 1), ("jupiter", 5)] {
        group.bench_with_input(BenchmarkId::new("body", name), &ipl, |b, &ipl| {
            b.iter(|| session.calc_ut(black_box(J2000), ipl, 258));
        });
    }

    group.finish();
}

fn bench_houses(c: &mut Criterion) {
    let mut group = c.benchmark_group("houses");
    let mut session = Session::builtin();

    for hsys in [b'P', b'R', b'C', b'E'] {
        let label = (hsys as char).to_string();
        group.bench_with_input(BenchmarkId::new("system", label), &hsys, |b, &hsys| {
            b.iter(|| session.houses(black_box(J2000), 52.0, 13.4, hsys));
        });
    }

    group.finish();
}

fn bench_eclipse_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("eclipse_search");
    let mut session = Session::builtin();

    group.bench_function("next_lunar", |b| {
        b.iter(|| session.lun_eclipse_when(black_box(J2000), 2, 0, false));
    });
    group.bench_function("previous_solar", |b| {
        b.iter(|| session.sol_eclipse_when_glob(black_box(J2000), 2, 0, true));
    });

    group.finish();
}

fn bench_marshalling(c: &mut Criterion) {
    let mut group = c.benchmark_group("marshalling");

    let args = [Primitive::Real(J2000), Primitive::Int(0)];
    group.bench_function("resolve_calc_ut", |b| {
        b.iter(|| resolve(Operation::CalcUt, black_box(&args)));
    });

    let module = SandboxModule::with_session(session::shared(Session::builtin()));
    let json_args = [json!(J2000), json!(52.0), json!(13.4)];
    group.bench_function("sandbox_houses", |b| {
        b.iter(|| module.call("houses", black_box(&json_args)));
    });

    let request = r#"{"op": "calc_ut", "args": [2451545.0, 1]}"#;
    group.bench_function("sandbox_handle", |b| {
        b.iter(|| module.handle(black_box(request)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_calc_ut,
    bench_houses,
    bench_eclipse_search,
    bench_marshalling
);
criterion_main!(benches);
