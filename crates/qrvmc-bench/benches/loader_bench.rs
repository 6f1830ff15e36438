//! End-to-end loader benchmarks over the in-memory library.

use std::ffi::{c_char, c_int};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qrvmc_abi::{FakeLibrary, Loader, QrvmcVm};
use qrvmc_core::ABI_VERSION;
use qrvmc_core::abi::SET_OPTION_SUCCESS;

unsafe extern "C" fn bench_destroy(vm: *mut QrvmcVm) {
    // SAFETY: allocated by `bench_create`.
    drop(unsafe { Box::from_raw(vm) });
}

unsafe extern "C" fn bench_set_option(
    _vm: *mut QrvmcVm,
    _name: *const c_char,
    _value: *const c_char,
) -> c_int {
    SET_OPTION_SUCCESS
}

unsafe extern "C" fn bench_create() -> *mut QrvmcVm {
    Box::into_raw(Box::new(QrvmcVm {
        abi_version: ABI_VERSION,
        name: c"bench".as_ptr(),
        version: c"0.0.0".as_ptr(),
        destroy: Some(bench_destroy),
        execute: None,
        get_capabilities: None,
        set_option: Some(bench_set_option),
    }))
}

const PATH: &str = "/opt/vms/libbench-vm.so";

fn bench_load_and_create(c: &mut Criterion) {
    let loader = Loader::new(FakeLibrary::new(PATH, "qrvmc_create_bench_vm", bench_create));
    let fallback = Loader::new(FakeLibrary::new(PATH, "qrvmc_create", bench_create));
    let mut group = c.benchmark_group("load_and_create");

    group.bench_function("derived_symbol", |b| {
        b.iter(|| black_box(loader.load_and_create(black_box(PATH))));
    });
    group.bench_function("fallback_symbol", |b| {
        b.iter(|| black_box(fallback.load_and_create(black_box(PATH))));
    });
    group.finish();
}

fn bench_load_and_configure(c: &mut Criterion) {
    let loader = Loader::new(FakeLibrary::new(PATH, "qrvmc_create_bench_vm", bench_create));
    let counts: &[usize] = &[0, 4, 32];
    let mut group = c.benchmark_group("load_and_configure");

    for &count in counts {
        let mut config = PATH.to_string();
        for i in 0..count {
            config.push_str(&format!(",o{i}={i}"));
        }
        group.bench_with_input(BenchmarkId::new("options", count), &config, |b, cfg| {
            b.iter(|| black_box(loader.load_and_configure(black_box(cfg))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_load_and_create, bench_load_and_configure);
criterion_main!(benches);
