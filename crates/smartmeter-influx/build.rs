//! Bakes the build date into the binary for `--version`.
//!
//! Release builds set `SMARTMETER_BUILD_DATE`; everything else reports
//! `<unknown>`.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=SMARTMETER_BUILD_DATE");

    let build_date = env::var("SMARTMETER_BUILD_DATE")
        .ok()
        .filter(|date| !date.trim().is_empty())
        .unwrap_or_else(|| "<unknown>".to_string());

    println!("cargo:rustc-env=SMARTMETER_BUILD_INFO={}", build_date.trim());
}
