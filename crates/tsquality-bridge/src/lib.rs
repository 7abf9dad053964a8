//! tsquality-bridge - host side of the time-series quality analysis module
//!
//! The scoring algorithm lives in a precompiled module with a flat,
//! pointer-based calling convention. This crate gets host text into that
//! module's memory in the right shape, calls it, and decodes its float
//! output back into records:
//!
//! - **normalize**: rewrites `YYYY-MM-DD` tokens to epoch milliseconds
//! - **scan**: counts rows and value columns, strips carriage returns
//! - **memory**: region lifecycle guard and buffer marshalling
//! - **invoke**: calls the analysis entry point
//! - **decode**: stride-correct decoding of the output regions
//! - **bridge**: the composed per-file pipeline
//! - **batch**: concurrent file acquisition for several files
//!
//! # Example
//!
//! ```
//! use tsquality_bridge::{Bridge, BridgeConfig};
//! use tsquality_bridge::testing::StubModule;
//!
//! let mut bridge = Bridge::new(StubModule::new(), BridgeConfig::default()).unwrap();
//! let result = bridge
//!     .analyse("demo.csv", "time,value\n2023-01-01,1\n2023-01-02,3")
//!     .unwrap();
//!
//! assert_eq!(result.num_columns(), 1);
//! assert_eq!(result.columns[0].origin.len(), 2);
//! assert_eq!(bridge.module().live_regions(), 0);
//! ```

pub mod batch;
pub mod bridge;
pub mod charts;
pub mod config;
pub mod decode;
pub mod error;
pub mod invoke;
pub mod memory;
pub mod module;
pub mod normalize;
pub mod scan;
pub mod types;

#[cfg(feature = "shlib")]
pub mod shlib;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use batch::{analyse_files, FileReport};
pub use bridge::Bridge;
pub use config::{AppConfig, BridgeConfig, ModuleConfig};
pub use error::{BridgeError, BridgeResult, ConfigError};
pub use module::{Address, AnalyzeCall, ForeignModule};
pub use scan::RawDataset;
pub use types::*;

#[cfg(feature = "shlib")]
pub use shlib::SharedLibraryModule;
