//! Analysis module loaded from a native shared library
//!
//! The library must export an allocator pair and the analysis entry point
//! with C linkage:
//!
//! ```c
//! void *malloc(size_t size);
//! void free(void *ptr);
//! unsigned process(const char *data, unsigned len, bool header, char sep,
//!                  float *quality, float *origin_quality,
//!                  float *origin_points, float *corrected_points);
//! ```
//!
//! Symbol names are configurable through [`ModuleConfig`]. Addresses are
//! plain process pointers, so module memory is the host's own address
//! space.

use std::ffi::{c_char, c_uint};
use std::path::Path;
use std::ptr;

use libloading::{Library, Symbol};

use crate::config::ModuleConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::module::{Address, AnalyzeCall, ForeignModule, NULL_ADDRESS};

type FnAllocate = unsafe extern "C" fn(size: usize) -> *mut u8;

type FnRelease = unsafe extern "C" fn(ptr: *mut u8);

type FnAnalyze = unsafe extern "C" fn(
    data: *const c_char,
    len: c_uint,
    header: bool,
    separator: c_char,
    quality: *mut f32,
    origin_quality: *mut f32,
    origin_points: *mut f32,
    corrected_points: *mut f32,
) -> c_uint;

/// A loaded shared library implementing the analysis contract
pub struct SharedLibraryModule {
    allocate: FnAllocate,
    release: FnRelease,
    analyze: FnAnalyze,
    name: String,
    // Keeps the function pointers above valid
    _library: Library,
}

impl SharedLibraryModule {
    /// Load the library at `path` and resolve the configured symbols
    pub fn open(path: &Path, config: &ModuleConfig) -> BridgeResult<Self> {
        let library = unsafe { Library::new(path) }
            .map_err(|e| BridgeError::ModuleLoad(format!("{}: {}", path.display(), e)))?;

        let allocate = unsafe { load_symbol::<FnAllocate>(&library, &config.allocate_symbol)? };
        let release = unsafe { load_symbol::<FnRelease>(&library, &config.release_symbol)? };
        let analyze = unsafe { load_symbol::<FnAnalyze>(&library, &config.analyze_symbol)? };

        tracing::info!(path = %path.display(), "loaded analysis module");

        Ok(Self {
            allocate,
            release,
            analyze,
            name: path.display().to_string(),
            _library: library,
        })
    }
}

/// Resolve `name` and copy the function pointer out of the symbol
///
/// # Safety
/// `T` must match the exported symbol's real signature.
unsafe fn load_symbol<T: Copy>(library: &Library, name: &str) -> BridgeResult<T> {
    let symbol: Symbol<'_, T> = library
        .get(name.as_bytes())
        .map_err(|e| BridgeError::ModuleLoad(format!("symbol `{}`: {}", name, e)))?;
    Ok(*symbol)
}

impl ForeignModule for SharedLibraryModule {
    fn allocate(&mut self, size: usize) -> Address {
        unsafe { (self.allocate)(size) as Address }
    }

    fn release(&mut self, address: Address) {
        unsafe { (self.release)(address as *mut u8) }
    }

    fn write(&mut self, address: Address, bytes: &[u8]) -> BridgeResult<()> {
        if address == NULL_ADDRESS {
            return Err(BridgeError::OutOfBounds {
                address,
                len: bytes.len(),
            });
        }
        // The caller's scope guarantees `address` heads a live region of at
        // least `bytes.len()` bytes.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), address as *mut u8, bytes.len()) };
        Ok(())
    }

    fn read(&self, address: Address, out: &mut [u8]) -> BridgeResult<()> {
        if address == NULL_ADDRESS {
            return Err(BridgeError::OutOfBounds {
                address,
                len: out.len(),
            });
        }
        unsafe { ptr::copy_nonoverlapping(address as *const u8, out.as_mut_ptr(), out.len()) };
        Ok(())
    }

    fn analyze(&mut self, call: &AnalyzeCall) -> i64 {
        let rows = unsafe {
            (self.analyze)(
                call.input as *const c_char,
                call.input_len,
                call.header,
                call.separator as c_char,
                call.quality as *mut f32,
                call.origin_quality as *mut f32,
                call.origin_points as *mut f32,
                call.corrected_points as *mut f32,
            )
        };
        i64::from(rows)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
