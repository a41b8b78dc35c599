//! Build script for sweph-sys
//!
//! Locates the Swiss Ephemeris C library (`libswe`). A missing library is not
//! fatal: the constants in this crate are usable on their own, and only
//! consumers that actually call the `swe_*` functions need it at link time.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SWEPH_LIB_DIR");
    println!("cargo:rerun-if-env-changed=SWEPH_SRC_DIR");

    // Strategy 1: pre-built library via environment variable
    if let Ok(lib_dir) = env::var("SWEPH_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", lib_dir);
        println!("cargo:rustc-link-lib=swe");
        link_system_deps();
        return;
    }

    // Strategy 2: compile the C sources
    #[cfg(feature = "bundled")]
    {
        if build_from_source() {
            return;
        }
    }

    // Strategy 3: pkg-config
    if try_pkg_config() {
        return;
    }

    // Strategy 4: common install locations
    let search_paths = [
        "/usr/local/lib",
        "/usr/lib",
        "/usr/lib/x86_64-linux-gnu",
        "/usr/lib/aarch64-linux-gnu",
        "/opt/homebrew/lib",
    ];

    for path in &search_paths {
        let found = ["libswe.so", "libswe.a", "libswe.dylib"]
            .iter()
            .any(|name| PathBuf::from(path).join(name).exists());
        if found {
            println!("cargo:rustc-link-search=native={}", path);
            println!("cargo:rustc-link-lib=swe");
            link_system_deps();
            return;
        }
    }

    println!("cargo:warning=libswe not found; only the constants of sweph-sys are usable.");
    println!("cargo:warning=Set SWEPH_LIB_DIR, install libswe, or enable the 'bundled' feature with SWEPH_SRC_DIR.");
}

fn try_pkg_config() -> bool {
    for name in ["libswe", "swisseph"] {
        if pkg_config::Config::new().probe(name).is_ok() {
            println!("cargo:info=Found {} via pkg-config", name);
            return true;
        }
    }
    false
}

#[cfg(feature = "bundled")]
fn build_from_source() -> bool {
    let Ok(src_dir) = env::var("SWEPH_SRC_DIR") else {
        println!("cargo:warning=feature 'bundled' requires SWEPH_SRC_DIR");
        return false;
    };
    let src_dir = PathBuf::from(src_dir);

    let sources = [
        "swecl.c", "swedate.c", "swehel.c", "swehouse.c", "swejpl.c", "swemmoon.c",
        "swemplan.c", "sweph.c", "swephlib.c",
    ];
    let missing: Vec<_> = sources
        .iter()
        .filter(|file| !src_dir.join(file).exists())
        .collect();
    if !missing.is_empty() {
        println!(
            "cargo:warning=SWEPH_SRC_DIR {} is missing {:?}",
            src_dir.display(),
            missing
        );
        return false;
    }

    let mut build = cc::Build::new();
    build.include(&src_dir).warnings(false);
    for file in &sources {
        build.file(src_dir.join(file));
        println!("cargo:rerun-if-changed={}", src_dir.join(file).display());
    }
    build.compile("swe");

    link_system_deps();
    true
}

fn link_system_deps() {
    // The engine uses libm and, on Linux, dlopen for JPL files
    #[cfg(target_os = "linux")]
    {
        println!("cargo:rustc-link-lib=dylib=m");
        println!("cargo:rustc-link-lib=dylib=dl");
    }
}
