//! Per-file analysis pipeline
//!
//! normalize -> scan -> marshal -> invoke -> decode, with every foreign
//! region owned by one [`BufferScope`] for the duration of the call.

use crate::config::BridgeConfig;
use crate::error::ConfigError;
use crate::decode::decode;
use crate::error::{BridgeError, BridgeResult};
use crate::invoke::invoke;
use crate::memory::{marshal, BufferScope};
use crate::module::ForeignModule;
use crate::normalize::normalize_dates;
use crate::scan::RawDataset;
use crate::types::AnalysisResult;

/// Bridge between host text and one analysis module instance
pub struct Bridge<M: ForeignModule> {
    module: M,
    config: BridgeConfig,
    separator: u8,
}

impl<M: ForeignModule> Bridge<M> {
    /// Create a bridge over an already loaded module
    ///
    /// Fails when the configured separator is not a single ASCII byte.
    pub fn new(module: M, config: BridgeConfig) -> Result<Self, ConfigError> {
        let separator = config.separator_byte()?;
        Ok(Self {
            module,
            config,
            separator,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    /// Give back the module
    pub fn into_module(self) -> M {
        self.module
    }

    /// Analyse one file's text
    ///
    /// Returns a complete result or an error, never a partial result. All
    /// regions requested for this call have been released when this
    /// returns, on success and on failure.
    pub fn analyse(&mut self, name: &str, text: &str) -> BridgeResult<AnalysisResult> {
        let span = tracing::info_span!("analyse", file = name);
        let _enter = span.enter();

        let separator = self.separator;
        let normalized = normalize_dates(text);
        let dataset = RawDataset::scan(&normalized, separator);

        if dataset.row_count() == 0 {
            tracing::warn!("no data rows");
            return Err(BridgeError::invalid("no data rows"));
        }
        if self.config.header && dataset.header_only() {
            tracing::warn!("header without data rows");
            return Err(BridgeError::invalid("no data rows"));
        }
        if dataset.max_columns() == 0 {
            tracing::warn!("no value columns");
            return Err(BridgeError::invalid("no value columns"));
        }

        let mut scope = BufferScope::new(&mut self.module);
        let buffers = marshal(&mut scope, &dataset)?;
        invoke(&mut scope, &buffers, &dataset, self.config.header, separator)?;
        let result = decode(&scope, &buffers, &dataset, name)?;

        tracing::info!(
            columns = result.num_columns(),
            rows = result.row_count,
            "analysis complete"
        );
        Ok(result)
    }
}
