//! Chart-ready data for analysis results
//!
//! Each value column becomes one [`ChartPair`]: a bar series of the four
//! quality ratios (`{name, value}`) and a line chart comparing the origin
//! and corrected series (`{time, value}`).

use serde::{Deserialize, Serialize};

use crate::types::{AnalysisResult, ColumnAnalysis, QualityScores, SeriesPoint};

/// Label of the origin line series
pub const ORIGIN_LABEL: &str = "original";

/// Label of the corrected line series
pub const CORRECTED_LABEL: &str = "new_values";

/// One bar of the quality chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarDatum {
    pub name: String,
    pub value: f32,
}

/// One labelled line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub label: String,
    pub data: Vec<SeriesPoint>,
}

/// Quality bars and series comparison for one column of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPair {
    pub file_name: String,
    pub column: usize,
    pub bar: Vec<BarDatum>,
    pub line: Vec<LineSeries>,
}

impl ChartPair {
    pub fn for_column(file_name: &str, column: &ColumnAnalysis) -> Self {
        Self {
            file_name: file_name.to_string(),
            column: column.index,
            bar: bar_data(&column.quality.scores),
            line: vec![
                LineSeries {
                    label: ORIGIN_LABEL.to_string(),
                    data: column.origin.clone(),
                },
                LineSeries {
                    label: CORRECTED_LABEL.to_string(),
                    data: column.corrected.clone(),
                },
            ],
        }
    }
}

/// Bars in display order
pub fn bar_data(scores: &QualityScores) -> Vec<BarDatum> {
    [
        ("Completeness", scores.completeness),
        ("Consistency", scores.consistency),
        ("Timeliness", scores.timeliness),
        ("Validity", scores.validity),
    ]
    .into_iter()
    .map(|(name, value)| BarDatum {
        name: name.to_string(),
        value,
    })
    .collect()
}

/// One chart pair per column of a result
pub fn chart_pairs(result: &AnalysisResult) -> Vec<ChartPair> {
    result
        .columns
        .iter()
        .map(|column| ChartPair::for_column(&result.name, column))
        .collect()
}
