//! Config module: options controlling how filter groups are compiled.

use serde::{Serialize, Deserialize};
use crate::CqlFilterError;

pub const DEFAULT_MAX_GROUP_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Child groups nested deeper than this are dropped.
    pub max_group_depth: usize,
    /// Log groups whose parent group does not exist.
    pub report_orphans: bool,
    /// Memoize compiled output per layer.
    pub cache: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            report_orphans: true,
            cache: false,
        }
    }
}

impl CompileOptions {
    pub fn builder() -> CompileOptionsBuilder {
        CompileOptionsBuilder::new()
    }

    pub fn from_json(json: &str) -> Result<Self, CqlFilterError> {
        let options: CompileOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), CqlFilterError> {
        if self.max_group_depth == 0 {
            return Err(CqlFilterError::InvalidOptions("maxGroupDepth must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CompileOptionsBuilder {
    options: CompileOptions,
}

impl CompileOptionsBuilder {
    pub fn new() -> Self {
        Self { options: CompileOptions::default() }
    }
    pub fn max_group_depth(mut self, depth: usize) -> Self {
        self.options.max_group_depth = depth;
        self
    }
    pub fn report_orphans(mut self, report: bool) -> Self {
        self.options.report_orphans = report;
        self
    }
    pub fn cache(mut self, cache: bool) -> Self {
        self.options.cache = cache;
        self
    }
    pub fn build(self) -> Result<CompileOptions, CqlFilterError> {
        self.options.validate()?;
        Ok(self.options)
    }
}
