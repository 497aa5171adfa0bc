//! Cache module: memoizes compiled output per layer.
//!
//! Compilation is referentially transparent, so output can be reused whenever the groups
//! applicable to a layer serialize identically. The key is that serialization plus the layer
//! id and output format.

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::trace;
use crate::filter::{CompiledFilter, OutputFormat};
use crate::types::{FilterGroup, LayerId};

const MAX_ENTRIES: usize = 1024;

#[derive(Debug, Default)]
pub struct CompileCache {
    entries: RwLock<HashMap<String, Option<CompiledFilter>>>,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for compiling `groups` for `layer_id`. Only the groups applicable to the
    /// layer take part. `None` if the groups cannot be serialized.
    pub fn key(groups: &[FilterGroup], layer_id: LayerId, format: OutputFormat) -> Option<String> {
        let relevant: Vec<&FilterGroup> = groups.iter().filter(|g| g.applies_to(layer_id)).collect();
        let json = serde_json::to_string(&relevant).ok()?;
        Some(format!("{}:{}:{}", layer_id, format, json))
    }

    /// Cached result for `key`. The outer `Option` is the hit/miss; the inner one is the
    /// compiled output, which may itself be absent.
    pub fn get(&self, key: &str) -> Option<Option<CompiledFilter>> {
        let entries = self.entries.read().ok()?;
        let hit = entries.get(key).cloned();
        trace!(hit = hit.is_some(), "compile cache lookup");
        hit
    }

    pub fn insert(&self, key: String, value: Option<CompiledFilter>) {
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= MAX_ENTRIES {
                trace!(entries = entries.len(), "compile cache full, clearing");
                entries.clear();
            }
            entries.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalOperator;

    #[test]
    fn test_key_ignores_other_layers() {
        let a = vec![
            FilterGroup::new("g1", LogicalOperator::And).layer(1),
            FilterGroup::new("g2", LogicalOperator::Or).layer(2),
        ];
        let b = vec![
            FilterGroup::new("g1", LogicalOperator::And).layer(1),
            FilterGroup::new("g2", LogicalOperator::And).layer(2),
        ];
        assert_eq!(
            CompileCache::key(&a, 1, OutputFormat::Cql),
            CompileCache::key(&b, 1, OutputFormat::Cql)
        );
        assert_ne!(
            CompileCache::key(&a, 2, OutputFormat::Cql),
            CompileCache::key(&b, 2, OutputFormat::Cql)
        );
        assert_ne!(
            CompileCache::key(&a, 1, OutputFormat::Cql),
            CompileCache::key(&a, 1, OutputFormat::Cql2Json)
        );
    }

    #[test]
    fn test_insert_get_clear() {
        let cache = CompileCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("k"), None);
        cache.insert("k".to_string(), Some(CompiledFilter::Cql("(a IS NULL)".to_string())));
        cache.insert("empty".to_string(), None);
        assert_eq!(cache.get("k"), Some(Some(CompiledFilter::Cql("(a IS NULL)".to_string()))));
        assert_eq!(cache.get("empty"), Some(None));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
