//! Context module: per-layer state for walking the group forest.
//!
//! The forest stays a flat slice; children are found through an index from parent id to
//! child groups. The context also tracks visited groups by address, so a cyclic
//! `parent_group` chain cannot recurse forever while distinct groups sharing an id are still
//! compiled.

use std::collections::{HashMap, HashSet};
use crate::config::CompileOptions;
use crate::types::{FilterGroup, LayerId};

#[derive(Debug)]
pub struct CompileContext<'a> {
    layer_id: LayerId,
    options: &'a CompileOptions,
    roots: Vec<&'a FilterGroup>,
    children: HashMap<&'a str, Vec<&'a FilterGroup>>,
    visited: HashSet<*const FilterGroup>,
}

impl<'a> CompileContext<'a> {
    /// Indexes the groups of `groups` that apply to `layer_id`.
    pub fn new(groups: &'a [FilterGroup], layer_id: LayerId, options: &'a CompileOptions) -> Self {
        let mut roots = Vec::new();
        let mut children: HashMap<&'a str, Vec<&'a FilterGroup>> = HashMap::new();
        for group in groups.iter().filter(|g| g.applies_to(layer_id)) {
            match group.parent_group.as_deref() {
                None => roots.push(group),
                Some(parent) => children.entry(parent).or_default().push(group),
            }
        }
        Self { layer_id, options, roots, children, visited: HashSet::new() }
    }

    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    pub fn options(&self) -> &CompileOptions {
        self.options
    }

    pub fn roots(&self) -> &[&'a FilterGroup] {
        &self.roots
    }

    /// Child groups of `group_id` that apply to this layer, in input order.
    pub fn children_of(&self, group_id: &str) -> Vec<&'a FilterGroup> {
        self.children.get(group_id).cloned().unwrap_or_default()
    }

    /// Marks a group as entered. Returns `false` if this same group was already entered during
    /// this walk.
    pub fn enter(&mut self, group: &'a FilterGroup) -> bool {
        self.visited.insert(group as *const FilterGroup)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalOperator;

    fn forest() -> Vec<FilterGroup> {
        vec![
            FilterGroup::new("root", LogicalOperator::And).layer(1),
            FilterGroup::new("child", LogicalOperator::Or).layer(1).parent("root"),
            FilterGroup::new("other-layer", LogicalOperator::Or).layer(2).parent("root"),
            FilterGroup::new("second-root", LogicalOperator::Or).layer(1).layer(2),
        ]
    }

    #[test]
    fn test_roots_and_children() {
        let groups = forest();
        let options = CompileOptions::default();
        let ctx = CompileContext::new(&groups, 1, &options);
        let roots: Vec<_> = ctx.roots().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(roots, vec!["root", "second-root"]);
        let children: Vec<_> = ctx.children_of("root").iter().map(|g| g.id.as_str()).collect();
        assert_eq!(children, vec!["child"]);
        assert!(ctx.children_of("child").is_empty());
    }

    #[test]
    fn test_enter_tracks_visits() {
        let groups = forest();
        let options = CompileOptions::default();
        let mut ctx = CompileContext::new(&groups, 1, &options);
        assert!(ctx.enter(&groups[0]));
        assert!(!ctx.enter(&groups[0]));
        assert_eq!(ctx.visited_count(), 1);
    }

    #[test]
    fn test_enter_distinguishes_groups_sharing_an_id() {
        let groups = vec![
            FilterGroup::new("dup", LogicalOperator::And).layer(1),
            FilterGroup::new("dup", LogicalOperator::Or).layer(1),
        ];
        let options = CompileOptions::default();
        let mut ctx = CompileContext::new(&groups, 1, &options);
        assert!(ctx.enter(&groups[0]));
        assert!(ctx.enter(&groups[1]));
        assert_eq!(ctx.visited_count(), 2);
    }
}
