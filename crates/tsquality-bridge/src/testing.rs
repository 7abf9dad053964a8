//! In-process stand-in for the analysis module
//!
//! [`StubModule`] owns a growable linear memory with a bump allocator and
//! tracks every live region, so tests can check that allocate and release
//! calls balance and that nothing touches memory outside a live region.
//! Releasing an address twice panics.

use std::collections::BTreeMap;

use crate::error::{BridgeError, BridgeResult};
use crate::memory::F32_SIZE;
use crate::module::{Address, AnalyzeCall, ForeignModule, NULL_ADDRESS};
use crate::types::{QualityScores, POINT_FIELDS, QUALITY_FIELDS};

const ALIGN: usize = 8;

/// Behaviour of the stub's analysis entry point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StubRoutine {
    /// Parse the encoded input and echo its coordinates
    ///
    /// Every column gets the same quality records. Corrected values are
    /// the origin values plus `corrected_offset`. Returns the number of
    /// parsed data rows.
    Echo {
        quality: QualityScores,
        origin_quality: QualityScores,
        corrected_offset: f32,
    },
    /// Always report an invalid dataset
    Reject,
    /// Panic inside the entry point
    Fault,
}

/// Stub analysis module
#[derive(Debug)]
pub struct StubModule {
    memory: Vec<u8>,
    next: Address,
    live: BTreeMap<Address, usize>,
    requests: usize,
    allocations: usize,
    releases: usize,
    fail_at: Option<usize>,
    calls: Vec<AnalyzeCall>,
    routine: StubRoutine,
}

impl Default for StubModule {
    fn default() -> Self {
        Self::new()
    }
}

impl StubModule {
    /// Echoing stub with perfect quality scores
    pub fn new() -> Self {
        let perfect = QualityScores {
            completeness: 1.0,
            consistency: 1.0,
            timeliness: 1.0,
            validity: 1.0,
        };
        Self::with_routine(StubRoutine::Echo {
            quality: perfect,
            origin_quality: perfect,
            corrected_offset: 0.0,
        })
    }

    /// Echoing stub with the given quality records
    pub fn echo(quality: QualityScores, origin_quality: QualityScores) -> Self {
        Self::with_routine(StubRoutine::Echo {
            quality,
            origin_quality,
            corrected_offset: 0.0,
        })
    }

    /// Stub that rejects every dataset
    pub fn rejecting() -> Self {
        Self::with_routine(StubRoutine::Reject)
    }

    pub fn with_routine(routine: StubRoutine) -> Self {
        Self {
            memory: vec![0; ALIGN],
            next: ALIGN,
            live: BTreeMap::new(),
            requests: 0,
            allocations: 0,
            releases: 0,
            fail_at: None,
            calls: Vec::new(),
            routine,
        }
    }

    /// Make the `n`th allocation request (1-based) return a null address
    pub fn fail_allocation_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Shift corrected values of an echo routine by `offset`
    pub fn with_corrected_offset(mut self, offset: f32) -> Self {
        if let StubRoutine::Echo {
            corrected_offset, ..
        } = &mut self.routine
        {
            *corrected_offset = offset;
        }
        self
    }

    /// Successful allocations so far
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Releases so far
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Allocation requests so far, including failed ones
    pub fn allocation_requests(&self) -> usize {
        self.requests
    }

    /// Regions allocated and not yet released
    pub fn live_regions(&self) -> usize {
        self.live.len()
    }

    /// Every call made to the analysis entry point
    pub fn calls(&self) -> &[AnalyzeCall] {
        &self.calls
    }

    fn region_len(&self, address: Address) -> Option<usize> {
        self.live.get(&address).copied()
    }

    fn check_range(&self, address: Address, len: usize) -> BridgeResult<()> {
        let inside = self
            .live
            .range(..=address)
            .next_back()
            .map(|(&start, &size)| address + len <= start + size)
            .unwrap_or(false);

        if inside {
            Ok(())
        } else {
            Err(BridgeError::OutOfBounds { address, len })
        }
    }

    fn write_f32s(&mut self, address: Address, values: &[f32]) -> BridgeResult<()> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.write(address, &bytes)
    }

    fn run_echo(
        &mut self,
        call: &AnalyzeCall,
        quality: QualityScores,
        origin_quality: QualityScores,
        corrected_offset: f32,
    ) -> BridgeResult<i64> {
        let quality_len = self.region_len(call.quality).unwrap_or(0);
        let points_len = self.region_len(call.origin_points).unwrap_or(0);
        let columns = quality_len / (QUALITY_FIELDS * F32_SIZE);
        if columns == 0 {
            return Ok(0);
        }
        let rows = points_len / (POINT_FIELDS * F32_SIZE) / columns;

        let mut input = vec![0u8; call.input_len as usize];
        self.read(call.input, &mut input)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(call.header)
            .delimiter(call.separator)
            .flexible(true)
            .from_reader(input.as_slice());

        let mut origin = vec![0.0f32; rows * columns * POINT_FIELDS];
        let mut corrected = origin.clone();
        let mut parsed = 0;

        for record in reader.records() {
            let Ok(record) = record else {
                return Ok(0);
            };
            if parsed >= rows {
                break;
            }

            let time = parse_field(record.get(0));
            for column in 0..columns {
                let value = parse_field(record.get(column + 1));
                let at = (column * rows + parsed) * POINT_FIELDS;
                origin[at] = time;
                origin[at + 1] = value;
                corrected[at] = time;
                corrected[at + 1] = value + corrected_offset;
            }
            parsed += 1;
        }

        if parsed == 0 {
            return Ok(0);
        }

        let quality_floats: Vec<f32> = (0..columns).flat_map(|_| quality.to_array()).collect();
        let origin_quality_floats: Vec<f32> = (0..columns)
            .flat_map(|_| origin_quality.to_array())
            .collect();

        self.write_f32s(call.quality, &quality_floats)?;
        self.write_f32s(call.origin_quality, &origin_quality_floats)?;
        self.write_f32s(call.origin_points, &origin)?;
        self.write_f32s(call.corrected_points, &corrected)?;

        Ok(parsed as i64)
    }
}

fn parse_field(field: Option<&str>) -> f32 {
    field
        .and_then(|s| s.trim().parse::<f32>().ok())
        .unwrap_or(0.0)
}

impl ForeignModule for StubModule {
    fn allocate(&mut self, size: usize) -> Address {
        self.requests += 1;
        if self.fail_at == Some(self.requests) {
            return NULL_ADDRESS;
        }

        let address = self.next;
        let reserved = size.max(1).div_ceil(ALIGN) * ALIGN;
        self.next += reserved;
        if self.memory.len() < self.next {
            self.memory.resize(self.next, 0);
        }

        self.live.insert(address, size);
        self.allocations += 1;
        address
    }

    fn release(&mut self, address: Address) {
        assert!(
            self.live.remove(&address).is_some(),
            "release of {address:#x} which is not a live region"
        );
        self.releases += 1;
    }

    fn write(&mut self, address: Address, bytes: &[u8]) -> BridgeResult<()> {
        self.check_range(address, bytes.len())?;
        self.memory[address..address + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn read(&self, address: Address, out: &mut [u8]) -> BridgeResult<()> {
        self.check_range(address, out.len())?;
        out.copy_from_slice(&self.memory[address..address + out.len()]);
        Ok(())
    }

    fn analyze(&mut self, call: &AnalyzeCall) -> i64 {
        self.calls.push(*call);
        let routine = self.routine;
        match routine {
            StubRoutine::Echo {
                quality,
                origin_quality,
                corrected_offset,
            } => self
                .run_echo(call, quality, origin_quality, corrected_offset)
                .unwrap_or(0),
            StubRoutine::Reject => 0,
            StubRoutine::Fault => panic!("stub analysis routine fault"),
        }
    }

    fn name(&self) -> &str {
        "stub module"
    }
}
