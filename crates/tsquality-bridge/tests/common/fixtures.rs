//! Test fixture loading utilities

use std::path::PathBuf;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load a CSV fixture
#[allow(dead_code)]
pub fn load_csv_fixture(name: &str) -> String {
    load_fixture(&format!("csv/{}", name))
}

/// Path of a CSV fixture
#[allow(dead_code)]
pub fn csv_fixture_path(name: &str) -> PathBuf {
    fixture_path(&format!("csv/{}", name))
}

/// Relative float comparison for values that went through `f32`
#[allow(dead_code)]
pub fn approx_eq(actual: f32, expected: f64) -> bool {
    let actual = f64::from(actual);
    if expected == 0.0 {
        actual.abs() < 1e-6
    } else {
        ((actual - expected) / expected).abs() < 1e-6
    }
}
