//! Decoded analysis records
//!
//! These are the structured forms of the flat float regions the analysis
//! module fills in. They only exist after a successful invocation.

use serde::{Deserialize, Serialize};

/// Number of `f32` fields in one quality record
pub const QUALITY_FIELDS: usize = 4;

/// Number of `f32` fields in one series point
pub const POINT_FIELDS: usize = 2;

/// Four quality ratios for one column, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub completeness: f32,
    pub consistency: f32,
    pub timeliness: f32,
    pub validity: f32,
}

impl QualityScores {
    /// Build from one stride of the quality region
    ///
    /// Field order is completeness, consistency, timeliness, validity.
    pub fn from_stride(stride: &[f32]) -> Self {
        assert_eq!(
            stride.len(),
            QUALITY_FIELDS,
            "quality stride must hold {QUALITY_FIELDS} floats"
        );
        Self {
            completeness: stride[0],
            consistency: stride[1],
            timeliness: stride[2],
            validity: stride[3],
        }
    }

    /// Fields in region order
    pub fn to_array(self) -> [f32; QUALITY_FIELDS] {
        [
            self.completeness,
            self.consistency,
            self.timeliness,
            self.validity,
        ]
    }
}

/// Quality record for one column
///
/// `scores` comes from the transformed data, `values` from the origin
/// (untransformed) data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub scores: QualityScores,
    pub values: QualityScores,
}

/// A single `(time, value)` sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: f32,
    pub value: f32,
}

impl SeriesPoint {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Decoded output for one value column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis {
    /// Zero-based value column index (the time column is not counted)
    pub index: usize,

    /// Quality ratios for this column
    pub quality: QualityMetrics,

    /// Series as supplied
    pub origin: Vec<SeriesPoint>,

    /// Series as transformed by the analysis routine; index-aligned with
    /// `origin`
    pub corrected: Vec<SeriesPoint>,
}

/// Full result for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Display name of the file that produced this result
    pub name: String,

    /// Row count the series were decoded with
    pub row_count: usize,

    /// One entry per discovered value column
    pub columns: Vec<ColumnAnalysis>,
}

impl AnalysisResult {
    /// Number of value columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get a column by index
    pub fn column(&self, index: usize) -> Option<&ColumnAnalysis> {
        self.columns.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_stride() {
        let q = QualityScores::from_stride(&[0.9, 0.8, 0.7, 0.6]);
        assert_eq!(q.completeness, 0.9);
        assert_eq!(q.consistency, 0.8);
        assert_eq!(q.timeliness, 0.7);
        assert_eq!(q.validity, 0.6);
        assert_eq!(q.to_array(), [0.9, 0.8, 0.7, 0.6]);
    }

    #[test]
    #[should_panic(expected = "quality stride")]
    fn test_quality_short_stride_panics() {
        QualityScores::from_stride(&[1.0, 1.0]);
    }

    #[test]
    fn test_result_serializes() {
        let result = AnalysisResult {
            name: "a.csv".to_string(),
            row_count: 1,
            columns: vec![ColumnAnalysis {
                index: 0,
                quality: QualityMetrics::default(),
                origin: vec![SeriesPoint::new(1.0, 2.0)],
                corrected: vec![SeriesPoint::new(1.0, 2.5)],
            }],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"name\":\"a.csv\""));
        assert!(json.contains("\"corrected\":[{\"time\":1.0,\"value\":2.5}]"));
    }
}
