//! Filter module: compiles a snapshot of filter groups into one output per layer.
//!
//! This module provides the FilterEngine, the CompiledFilter output type and the
//! OutputFormat selector.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};
use crate::cache::CompileCache;
use crate::compiler::TreeCompiler;
use crate::config::CompileOptions;
use crate::cql::CqlRenderer;
use crate::cql2json::Cql2JsonRenderer;
use crate::expr::{Predicate, PropertyCollector, Renderer};
use crate::types::{FilterGroup, LayerId};
use crate::CqlFilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "CQL")]
    Cql,
    #[serde(rename = "CQL2JSON")]
    Cql2Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Cql => write!(f, "CQL"),
            OutputFormat::Cql2Json => write!(f, "CQL2JSON"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CqlFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CQL" => Ok(OutputFormat::Cql),
            "CQL2JSON" | "CQL2-JSON" => Ok(OutputFormat::Cql2Json),
            other => Err(CqlFilterError::InvalidFormat(other.to_string())),
        }
    }
}

/// A compiled filter in the requested output format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompiledFilter {
    Cql(String),
    Cql2Json(Value),
}

impl CompiledFilter {
    pub fn render(pred: &Predicate, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Cql => CompiledFilter::Cql(CqlRenderer.render(pred)),
            OutputFormat::Cql2Json => CompiledFilter::Cql2Json(Cql2JsonRenderer.render(pred)),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            CompiledFilter::Cql(_) => OutputFormat::Cql,
            CompiledFilter::Cql2Json(_) => OutputFormat::Cql2Json,
        }
    }

    pub fn as_cql(&self) -> Option<&str> {
        match self {
            CompiledFilter::Cql(s) => Some(s),
            CompiledFilter::Cql2Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            CompiledFilter::Cql(_) => None,
            CompiledFilter::Cql2Json(v) => Some(v),
        }
    }
}

/// Compiles filter groups per layer. Holds no state besides its options and optional cache,
/// so one engine can be shared across threads.
#[derive(Debug, Default)]
pub struct FilterEngine {
    options: CompileOptions,
    cache: Option<CompileCache>,
}

impl FilterEngine {
    /// Creates an engine. A `max_group_depth` of 0 is raised to 1, so root groups always
    /// compile even when the options skipped [`CompileOptions::validate`].
    pub fn new(mut options: CompileOptions) -> Self {
        if options.max_group_depth == 0 {
            warn!("maxGroupDepth of 0 raised to 1");
            options.max_group_depth = 1;
        }
        let cache = options.cache.then(CompileCache::new);
        Self { options, cache }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&CompileCache> {
        self.cache.as_ref()
    }

    /// Union of the layer ids referenced by any group.
    pub fn layer_ids(groups: &[FilterGroup]) -> BTreeSet<LayerId> {
        groups.iter().flat_map(|g| g.layer_ids.iter().copied()).collect()
    }

    /// Groups whose `parent_group` names no group in the snapshot. They are unreachable and
    /// never contribute to any output.
    pub fn orphaned_groups(groups: &[FilterGroup]) -> Vec<&FilterGroup> {
        let ids: HashSet<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        groups
            .iter()
            .filter(|g| g.parent_group.as_deref().map_or(false, |p| !ids.contains(p)))
            .collect()
    }

    /// Compiles the predicate tree for one layer without rendering it.
    pub fn predicate_for_layer(&self, groups: &[FilterGroup], layer_id: LayerId) -> Option<Predicate> {
        TreeCompiler::compile(groups, layer_id, &self.options)
    }

    /// Compiles and renders the filter for one layer.
    pub fn compile_layer(&self, groups: &[FilterGroup], layer_id: LayerId, format: OutputFormat) -> Option<CompiledFilter> {
        let key = self.cache.as_ref().and_then(|_| CompileCache::key(groups, layer_id, format));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                return hit;
            }
        }

        let compiled = self.predicate_for_layer(groups, layer_id).map(|pred| {
            let mut collector = PropertyCollector::default();
            pred.walk(&mut collector);
            debug!(
                layer_id,
                %format,
                nodes = pred.node_count(),
                properties = ?collector.properties,
                "compiled layer filter"
            );
            CompiledFilter::render(&pred, format)
        });

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, compiled.clone());
        }
        compiled
    }

    /// Compiles every layer referenced by `groups`. Layers without any constraint are absent
    /// from the result.
    pub fn compile(&self, groups: &[FilterGroup], format: OutputFormat) -> BTreeMap<LayerId, CompiledFilter> {
        if self.options.report_orphans {
            for orphan in Self::orphaned_groups(groups) {
                warn!(
                    group_id = %orphan.id,
                    parent_group = ?orphan.parent_group,
                    "filter group references a missing parent and is ignored"
                );
            }
        }
        Self::layer_ids(groups)
            .into_iter()
            .filter_map(|layer_id| self.compile_layer(groups, layer_id, format).map(|out| (layer_id, out)))
            .collect()
    }
}

/// Compiles `groups` for every referenced layer with default options.
pub fn compile(groups: &[FilterGroup], format: OutputFormat) -> BTreeMap<LayerId, CompiledFilter> {
    FilterEngine::default().compile(groups, format)
}
