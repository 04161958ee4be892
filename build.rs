//! Build script for FitTrack
//!
//! Bumps the local build counter and embeds build metadata into the binaries.

use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter_path = Path::new("build_number.txt");

    let previous: u64 = fs::read_to_string(counter_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let build_number = previous + 1;

    // A read-only checkout still builds; the counter just stays put
    if let Err(e) = fs::write(counter_path, build_number.to_string()) {
        println!("cargo:warning=could not persist build number: {}", e);
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=FITTRACK_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=FITTRACK_BUILD_TIMESTAMP={}", timestamp);
}
