//! Foreign memory regions and their lifecycle
//!
//! Every region the bridge requests from the module is owned by a
//! [`BufferScope`]. Regions are only ever released when the scope is
//! dropped, which happens on every exit path of a file's pipeline: normal
//! return, early `?` return, or unwinding. A region can therefore not be
//! released twice, and nothing can read it after release because the
//! scope that owns the reads is gone.
//!
//! [`marshal`] is the buffer marshaller: it sizes and requests the five
//! regions of one analysis call and writes the encoded input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::module::{Address, ForeignModule, NULL_ADDRESS};
use crate::scan::RawDataset;
use crate::types::{POINT_FIELDS, QUALITY_FIELDS};

/// Size of one float in the output regions
pub const F32_SIZE: usize = std::mem::size_of::<f32>();

/// What a region holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionRole {
    /// Encoded input bytes
    Input,
    /// Quality floats for the transformed data
    Quality,
    /// Quality floats for the origin data
    OriginQuality,
    /// Origin `(time, value)` pairs
    OriginPoints,
    /// Corrected `(time, value)` pairs
    CorrectedPoints,
}

impl fmt::Display for RegionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionRole::Input => "input",
            RegionRole::Quality => "quality",
            RegionRole::OriginQuality => "origin quality",
            RegionRole::OriginPoints => "origin points",
            RegionRole::CorrectedPoints => "corrected points",
        };
        f.write_str(name)
    }
}

/// A contiguous region in the module's memory
///
/// This is a plain descriptor. Ownership lives in the [`BufferScope`]
/// that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignBuffer {
    pub address: Address,
    pub len: usize,
    pub role: RegionRole,
}

/// Lifecycle guard for every region of one analysis call
pub struct BufferScope<'m, M: ForeignModule + ?Sized> {
    module: &'m mut M,
    live: Vec<ForeignBuffer>,
}

impl<'m, M: ForeignModule + ?Sized> BufferScope<'m, M> {
    /// Open a scope over a module
    pub fn new(module: &'m mut M) -> Self {
        Self {
            module,
            live: Vec::new(),
        }
    }

    /// Request a region of `len` bytes
    ///
    /// On failure nothing is added to the scope. Regions obtained earlier
    /// are still released when the scope drops.
    pub fn allocate(&mut self, len: usize, role: RegionRole) -> BridgeResult<ForeignBuffer> {
        let address = self.module.allocate(len);
        if address == NULL_ADDRESS {
            tracing::warn!(size = len, %role, "foreign allocation failed");
            return Err(BridgeError::AllocationFailure { size: len, role });
        }

        assert!(
            !self.live.iter().any(|b| b.address == address),
            "allocator returned live address {address:#x} for {role} region"
        );

        let buffer = ForeignBuffer { address, len, role };
        tracing::debug!(address, size = len, %role, "allocated foreign region");
        self.live.push(buffer);
        Ok(buffer)
    }

    /// Write bytes at the start of a live region
    pub fn write(&mut self, buffer: ForeignBuffer, bytes: &[u8]) -> BridgeResult<()> {
        self.assert_live(buffer);
        assert!(
            bytes.len() <= buffer.len,
            "writing {} bytes into {} byte {} region",
            bytes.len(),
            buffer.len,
            buffer.role
        );
        self.module.write(buffer.address, bytes)
    }

    /// Zero every byte of a live region
    pub fn zero(&mut self, buffer: ForeignBuffer) -> BridgeResult<()> {
        self.write(buffer, &vec![0u8; buffer.len])
    }

    /// Copy a live region out of module memory
    pub fn read_bytes(&self, buffer: ForeignBuffer) -> BridgeResult<Vec<u8>> {
        self.assert_live(buffer);
        let mut out = vec![0u8; buffer.len];
        self.module.read(buffer.address, &mut out)?;
        Ok(out)
    }

    /// Reinterpret a live region as little-endian `f32`s
    pub fn read_f32s(&self, buffer: ForeignBuffer) -> BridgeResult<Vec<f32>> {
        assert_eq!(
            buffer.len % F32_SIZE,
            0,
            "{} region is not a whole number of floats",
            buffer.role
        );
        let bytes = self.read_bytes(buffer)?;
        Ok(bytes
            .chunks_exact(F32_SIZE)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// The module this scope allocates from
    pub fn module_mut(&mut self) -> &mut M {
        &mut *self.module
    }

    /// Regions currently owned by this scope
    pub fn live(&self) -> &[ForeignBuffer] {
        &self.live
    }

    fn assert_live(&self, buffer: ForeignBuffer) {
        assert!(
            self.live.contains(&buffer),
            "{} region at {:#x} is not owned by this scope",
            buffer.role,
            buffer.address
        );
    }
}

impl<M: ForeignModule + ?Sized> Drop for BufferScope<'_, M> {
    fn drop(&mut self) {
        for buffer in self.live.drain(..).rev() {
            self.module.release(buffer.address);
            tracing::debug!(
                address = buffer.address,
                role = %buffer.role,
                "released foreign region"
            );
        }
    }
}

/// The five regions of one analysis call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshalledBuffers {
    pub input: ForeignBuffer,
    pub quality: ForeignBuffer,
    pub origin_quality: ForeignBuffer,
    pub origin_points: ForeignBuffer,
    pub corrected_points: ForeignBuffer,
}

/// Byte sizes of the regions for a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSizes {
    pub input: usize,
    pub quality: usize,
    pub points: usize,
}

impl RegionSizes {
    /// Sizes for a dataset
    pub fn for_dataset(dataset: &RawDataset) -> BridgeResult<Self> {
        Self::new(dataset.len(), dataset.row_count(), dataset.max_columns())
    }

    /// Compute sizes from raw dimensions
    ///
    /// Fails with [`BridgeError::DatasetTooLarge`] when the input does not
    /// fit the entry point's 32-bit length parameter or a region size
    /// overflows.
    pub fn new(input_len: usize, row_count: usize, max_columns: usize) -> BridgeResult<Self> {
        let too_large = || BridgeError::DatasetTooLarge { len: input_len };

        u32::try_from(input_len).map_err(|_| too_large())?;
        let quality = max_columns
            .checked_mul(QUALITY_FIELDS * F32_SIZE)
            .ok_or_else(too_large)?;
        let points = row_count
            .checked_mul(max_columns)
            .and_then(|n| n.checked_mul(POINT_FIELDS * F32_SIZE))
            .ok_or_else(too_large)?;

        Ok(Self {
            input: input_len,
            quality,
            points,
        })
    }
}

/// Allocate the regions for `dataset` and write its encoded bytes
///
/// Output regions are zero-filled so cells the analysis routine leaves
/// untouched decode as zero.
pub fn marshal<M: ForeignModule + ?Sized>(
    scope: &mut BufferScope<'_, M>,
    dataset: &RawDataset,
) -> BridgeResult<MarshalledBuffers> {
    let sizes = RegionSizes::for_dataset(dataset)?;

    let input = scope.allocate(sizes.input, RegionRole::Input)?;
    scope.write(input, dataset.bytes())?;

    let quality = scope.allocate(sizes.quality, RegionRole::Quality)?;
    let origin_quality = scope.allocate(sizes.quality, RegionRole::OriginQuality)?;
    let origin_points = scope.allocate(sizes.points, RegionRole::OriginPoints)?;
    let corrected_points = scope.allocate(sizes.points, RegionRole::CorrectedPoints)?;

    for output in [quality, origin_quality, origin_points, corrected_points] {
        scope.zero(output)?;
    }

    Ok(MarshalledBuffers {
        input,
        quality,
        origin_quality,
        origin_points,
        corrected_points,
    })
}
