//! Result decoding
//!
//! Turns the four populated output regions into per-column records.
//!
//! # Layout
//!
//! - Quality regions: `max_columns` strides of 4 floats
//!   `[completeness, consistency, timeliness, validity]`.
//! - Point regions: `row_count * max_columns` strides of 2 floats
//!   `[time, value]`, grouped by column, then row. The pair for
//!   `(column, row)` starts at float `(column * row_count + row) * 2`.

use crate::error::BridgeResult;
use crate::memory::{BufferScope, MarshalledBuffers};
use crate::module::ForeignModule;
use crate::scan::RawDataset;
use crate::types::{
    AnalysisResult, ColumnAnalysis, QualityMetrics, QualityScores, SeriesPoint, POINT_FIELDS,
    QUALITY_FIELDS,
};

/// Decode the output regions of an accepted analysis call
///
/// Must only be called after the invoker reported success.
pub fn decode<M: ForeignModule + ?Sized>(
    scope: &BufferScope<'_, M>,
    buffers: &MarshalledBuffers,
    dataset: &RawDataset,
    name: &str,
) -> BridgeResult<AnalysisResult> {
    let quality = scope.read_f32s(buffers.quality)?;
    let origin_quality = scope.read_f32s(buffers.origin_quality)?;
    let origin_points = scope.read_f32s(buffers.origin_points)?;
    let corrected_points = scope.read_f32s(buffers.corrected_points)?;

    Ok(decode_floats(
        &quality,
        &origin_quality,
        &origin_points,
        &corrected_points,
        dataset.row_count(),
        dataset.max_columns(),
        name,
    ))
}

/// Decode already-copied float regions
///
/// # Panics
///
/// Panics if any slice does not have exactly the length implied by
/// `row_count` and `max_columns`.
pub fn decode_floats(
    quality: &[f32],
    origin_quality: &[f32],
    origin_points: &[f32],
    corrected_points: &[f32],
    row_count: usize,
    max_columns: usize,
    name: &str,
) -> AnalysisResult {
    let quality_len = max_columns * QUALITY_FIELDS;
    let points_len = row_count * max_columns * POINT_FIELDS;
    assert_eq!(quality.len(), quality_len, "quality region length mismatch");
    assert_eq!(
        origin_quality.len(),
        quality_len,
        "origin quality region length mismatch"
    );
    assert_eq!(
        origin_points.len(),
        points_len,
        "origin points region length mismatch"
    );
    assert_eq!(
        corrected_points.len(),
        points_len,
        "corrected points region length mismatch"
    );

    let columns: Vec<ColumnAnalysis> = (0..max_columns)
        .map(|column| {
            let q = column * QUALITY_FIELDS..(column + 1) * QUALITY_FIELDS;
            let origin = column_series(origin_points, column, row_count);
            let corrected = column_series(corrected_points, column, row_count);
            assert_eq!(origin.len(), row_count);
            assert_eq!(corrected.len(), row_count);

            ColumnAnalysis {
                index: column,
                quality: QualityMetrics {
                    scores: QualityScores::from_stride(&quality[q.clone()]),
                    values: QualityScores::from_stride(&origin_quality[q]),
                },
                origin,
                corrected,
            }
        })
        .collect();

    tracing::debug!(
        file = name,
        columns = columns.len(),
        row_count,
        "decoded analysis output"
    );

    AnalysisResult {
        name: name.to_string(),
        row_count,
        columns,
    }
}

fn column_series(points: &[f32], column: usize, row_count: usize) -> Vec<SeriesPoint> {
    (0..row_count)
        .map(|row| {
            let at = (column * row_count + row) * POINT_FIELDS;
            SeriesPoint::new(points[at], points[at + 1])
        })
        .collect()
}
