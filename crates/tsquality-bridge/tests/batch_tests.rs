//! Multi-file batch tests

mod common;

use std::path::PathBuf;

use common::fixtures::{csv_fixture_path, fixture_path};
use tsquality_bridge::charts::chart_pairs;
use tsquality_bridge::testing::StubModule;
use tsquality_bridge::{analyse_files, Bridge, BridgeConfig, BridgeError};

fn bridge() -> Bridge<StubModule> {
    Bridge::new(StubModule::new(), BridgeConfig::default()).unwrap()
}

#[tokio::test]
async fn test_results_keep_input_order_and_names() {
    let mut bridge = bridge();
    let paths = vec![
        csv_fixture_path("sensor_crlf.csv"),
        csv_fixture_path("reference.csv"),
        csv_fixture_path("ragged.csv"),
    ];

    let reports = analyse_files(&mut bridge, paths).await.unwrap();

    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["sensor_crlf.csv", "reference.csv", "ragged.csv"]);
    for report in &reports {
        let result = report.outcome.as_ref().unwrap();
        assert_eq!(result.name, report.name);
    }

    // Column counts identify which file each result came from
    let columns: Vec<usize> = reports
        .iter()
        .map(|r| r.outcome.as_ref().unwrap().num_columns())
        .collect();
    assert_eq!(columns, [2, 2, 3]);
}

#[tokio::test]
async fn test_failing_files_do_not_abort_siblings() {
    let mut bridge = bridge();
    let paths = vec![
        csv_fixture_path("header_only.csv"),
        PathBuf::from("/nonexistent/missing.csv"),
        csv_fixture_path("reference.csv"),
        csv_fixture_path("blank_rows.csv"),
    ];

    let reports = analyse_files(&mut bridge, paths).await.unwrap();
    assert_eq!(reports.len(), 4);

    assert!(matches!(
        reports[0].outcome,
        Err(BridgeError::InvalidDataset { .. })
    ));
    assert!(matches!(
        reports[1].outcome,
        Err(BridgeError::AcquisitionFailure { .. })
    ));
    assert!(reports[2].is_ok());
    assert!(matches!(
        reports[3].outcome,
        Err(BridgeError::InvalidDataset { .. })
    ));

    let module = bridge.module();
    assert_eq!(module.allocations(), module.releases());
    assert_eq!(module.live_regions(), 0);
}

#[tokio::test]
async fn test_non_csv_paths_are_skipped() {
    let mut bridge = bridge();
    let paths = vec![fixture_path("notes.txt"), csv_fixture_path("reference.csv")];

    let reports = analyse_files(&mut bridge, paths).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "reference.csv");
}

#[tokio::test]
async fn test_batch_without_csv_files_fails() {
    let mut bridge = bridge();
    let err = analyse_files(&mut bridge, vec![fixture_path("notes.txt")])
        .await
        .unwrap_err();
    assert_eq!(err, BridgeError::NoCsvFiles);
    assert_eq!(bridge.module().allocation_requests(), 0);
}

#[tokio::test]
async fn test_batch_over_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for (i, rows) in [3usize, 5, 1].iter().enumerate() {
        let mut text = String::from("time,value\n");
        for r in 0..*rows {
            text.push_str(&format!("2023-01-{:02},{}\n", r + 1, r * 10));
        }
        let path = dir.path().join(format!("file{i}.csv"));
        std::fs::write(&path, text).unwrap();
        paths.push(path);
    }

    let reports = analyse_files(&mut bridge(), paths).await.unwrap();

    // Terminated last line: header terminator counts as a row
    let rows: Vec<usize> = reports
        .iter()
        .map(|r| r.outcome.as_ref().unwrap().row_count)
        .collect();
    assert_eq!(rows, [4, 6, 2]);
}

#[tokio::test]
async fn test_chart_pairs_for_batch() {
    let mut bridge = bridge();
    let reports = analyse_files(
        &mut bridge,
        vec![
            csv_fixture_path("reference.csv"),
            csv_fixture_path("sensor_crlf.csv"),
        ],
    )
    .await
    .unwrap();

    let pairs: Vec<_> = reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .flat_map(chart_pairs)
        .collect();

    assert_eq!(pairs.len(), 4);
    assert_eq!(pairs[0].file_name, "reference.csv");
    assert_eq!(pairs[3].file_name, "sensor_crlf.csv");
    assert_eq!(pairs[3].column, 1);
}
