//! Rendering of batch outcomes

use std::fmt::Write;

use tsquality_bridge::charts::{chart_pairs, ChartPair};
use tsquality_bridge::{BridgeError, FileReport};

/// User-facing notice for every file that produced no result
pub fn notices(reports: &[FileReport]) -> Vec<String> {
    reports
        .iter()
        .filter_map(|report| match &report.outcome {
            Ok(_) => None,
            Err(BridgeError::AcquisitionFailure { message, .. }) => {
                Some(format!("{}: could not be read ({})", report.name, message))
            }
            Err(e) => Some(format!("{}: bad data ({})", report.name, e)),
        })
        .collect()
}

/// Quality table for every successful file
pub fn summary(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let Ok(result) = &report.outcome else {
            continue;
        };

        let _ = writeln!(out, "{} ({} rows)", result.name, result.row_count);
        for column in &result.columns {
            let q = &column.quality.scores;
            let _ = writeln!(
                out,
                "  column {}: completeness {:.3}  consistency {:.3}  timeliness {:.3}  validity {:.3}",
                column.index, q.completeness, q.consistency, q.timeliness, q.validity
            );
        }
    }
    out
}

/// Chart pairs of every successful file, in input order
pub fn charts(reports: &[FileReport]) -> Vec<ChartPair> {
    reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .flat_map(chart_pairs)
        .collect()
}

/// Chart pairs as pretty-printed JSON
pub fn chart_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&charts(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tsquality_bridge::testing::StubModule;
    use tsquality_bridge::{Bridge, BridgeConfig};

    fn reports() -> Vec<FileReport> {
        let mut bridge = Bridge::new(StubModule::new(), BridgeConfig::default()).unwrap();
        let good = bridge.analyse("good.csv", "t,a,b\n1,2,3\n2,3,4");
        let bad = bridge.analyse("bad.csv", "t");
        vec![
            FileReport {
                name: "good.csv".to_string(),
                path: PathBuf::from("good.csv"),
                outcome: good,
            },
            FileReport {
                name: "bad.csv".to_string(),
                path: PathBuf::from("bad.csv"),
                outcome: bad,
            },
            FileReport {
                name: "gone.csv".to_string(),
                path: PathBuf::from("gone.csv"),
                outcome: Err(BridgeError::AcquisitionFailure {
                    path: PathBuf::from("gone.csv"),
                    message: "not found".to_string(),
                }),
            },
        ]
    }

    #[test]
    fn test_notices_only_for_failures() {
        let notices = notices(&reports());
        assert_eq!(notices.len(), 2);
        assert!(notices[0].starts_with("bad.csv: bad data"));
        assert_eq!(notices[1], "gone.csv: could not be read (not found)");
    }

    #[test]
    fn test_summary_lists_columns() {
        let text = summary(&reports());
        assert!(text.starts_with("good.csv (2 rows)"));
        assert!(text.contains("column 1: completeness 1.000"));
        assert!(!text.contains("bad.csv"));
    }

    #[test]
    fn test_chart_json_has_one_pair_per_column() {
        let json: serde_json::Value = serde_json::from_str(&chart_json(&reports()).unwrap()).unwrap();
        let pairs = json.as_array().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0]["file_name"], "good.csv");
        assert_eq!(pairs[1]["line"][1]["label"], "new_values");
    }
}
