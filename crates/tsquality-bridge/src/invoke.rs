//! Analysis invocation

use crate::error::{BridgeError, BridgeResult};
use crate::memory::{BufferScope, MarshalledBuffers};
use crate::module::{AnalyzeCall, ForeignModule};
use crate::scan::RawDataset;

/// Outcome reported by the analysis entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSignal {
    /// Output regions are populated; carries the raw return value
    Accepted(i64),
    /// The dataset was rejected; outputs must not be read
    Rejected(i64),
}

impl AnalysisSignal {
    /// Interpret a raw return value
    pub fn from_raw(raw: i64) -> Self {
        if raw > 0 {
            AnalysisSignal::Accepted(raw)
        } else {
            AnalysisSignal::Rejected(raw)
        }
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, AnalysisSignal::Accepted(_))
    }
}

/// Build the entry point arguments for marshalled regions
pub fn analyze_call(
    buffers: &MarshalledBuffers,
    dataset: &RawDataset,
    header: bool,
    separator: u8,
) -> BridgeResult<AnalyzeCall> {
    let input_len = u32::try_from(dataset.len())
        .map_err(|_| BridgeError::DatasetTooLarge { len: dataset.len() })?;

    Ok(AnalyzeCall {
        input: buffers.input.address,
        input_len,
        header,
        separator,
        quality: buffers.quality.address,
        origin_quality: buffers.origin_quality.address,
        origin_points: buffers.origin_points.address,
        corrected_points: buffers.corrected_points.address,
    })
}

/// Call the analysis entry point once
///
/// A rejection is returned as [`BridgeError::InvalidDataset`]; the caller's
/// scope then releases every region without decoding.
pub fn invoke<M: ForeignModule + ?Sized>(
    scope: &mut BufferScope<'_, M>,
    buffers: &MarshalledBuffers,
    dataset: &RawDataset,
    header: bool,
    separator: u8,
) -> BridgeResult<AnalysisSignal> {
    let call = analyze_call(buffers, dataset, header, separator)?;
    let signal = AnalysisSignal::from_raw(scope.module_mut().analyze(&call));

    match signal {
        AnalysisSignal::Accepted(raw) => {
            tracing::debug!(signal = raw, "analysis accepted dataset");
            Ok(signal)
        }
        AnalysisSignal::Rejected(raw) => {
            tracing::warn!(signal = raw, "analysis rejected dataset");
            Err(BridgeError::invalid(format!(
                "analysis routine returned {raw}"
            )))
        }
    }
}
