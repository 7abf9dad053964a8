//! Contract of the precompiled analysis module
//!
//! The module owns a linear memory, an allocator over it, and a single
//! analysis entry point that takes flat addresses. The bridge only talks
//! to it through [`ForeignModule`], so a native shared library and the
//! in-process stub are interchangeable.

/// Byte address inside the module's memory. `0` is never a valid region.
pub type Address = usize;

/// Null address returned by a failing allocator
pub const NULL_ADDRESS: Address = 0;

/// Arguments of one call to the analysis entry point
///
/// Field order matches the entry point's parameter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeCall {
    /// Encoded input bytes
    pub input: Address,
    /// Number of encoded input bytes
    pub input_len: u32,
    /// Whether the first line is a header row
    pub header: bool,
    /// Field separator byte
    pub separator: u8,
    /// `max_columns` x 4 floats, transformed data
    pub quality: Address,
    /// `max_columns` x 4 floats, origin data
    pub origin_quality: Address,
    /// `row_count * max_columns` `(time, value)` pairs as supplied
    pub origin_points: Address,
    /// `row_count * max_columns` `(time, value)` pairs after transformation
    pub corrected_points: Address,
}

/// A loaded analysis module
///
/// Implementations are not required to be thread-safe. One bridge
/// invocation uses the module at a time.
pub trait ForeignModule {
    /// Request `size` bytes; returns [`NULL_ADDRESS`] on failure
    fn allocate(&mut self, size: usize) -> Address;

    /// Return a region obtained from [`ForeignModule::allocate`]
    fn release(&mut self, address: Address);

    /// Copy `bytes` into module memory at `address`
    fn write(&mut self, address: Address, bytes: &[u8]) -> crate::BridgeResult<()>;

    /// Copy `out.len()` bytes from module memory at `address`
    fn read(&self, address: Address, out: &mut [u8]) -> crate::BridgeResult<()>;

    /// Run the analysis entry point
    ///
    /// A value `> 0` signals success (either `true` or a row count);
    /// anything else means the dataset was rejected.
    fn analyze(&mut self, call: &AnalyzeCall) -> i64;

    /// Short name used in log output
    fn name(&self) -> &str {
        "analysis module"
    }
}
