//! Compiler module: compiles the filter group forest of one layer into a single predicate.
//!
//! Each group combines its filters and the predicates of its child groups with the group's
//! operator. Independent root groups are always AND-combined.

use tracing::{debug, warn};
use crate::attribute::compile_attribute;
use crate::config::CompileOptions;
use crate::context::CompileContext;
use crate::expr::Predicate;
use crate::spatial::compile_spatial;
use crate::types::{Filter, FilterGroup, FilterKind, LayerId, LogicalOperator};

pub struct TreeCompiler;

impl TreeCompiler {
    /// Compiles every group applicable to `layer_id`. `None` when nothing constrains the layer.
    pub fn compile(groups: &[FilterGroup], layer_id: LayerId, options: &CompileOptions) -> Option<Predicate> {
        let mut ctx = CompileContext::new(groups, layer_id, options);
        let roots = ctx.roots().to_vec();
        let preds: Vec<Predicate> = roots
            .into_iter()
            .filter_map(|root| compile_group(&mut ctx, root, 1))
            .collect();
        debug!(layer_id, groups = ctx.visited_count(), predicates = preds.len(), "compiled filter tree");
        Predicate::combine(LogicalOperator::And, preds)
    }
}

/// Compiles a single filter for `layer_id`, ignoring its `disabled` flag.
pub fn compile_filter(filter: &Filter, layer_id: LayerId) -> Option<Predicate> {
    match &filter.kind {
        FilterKind::Attribute(attr) => compile_attribute(attr),
        FilterKind::Spatial(spatial) => compile_spatial(spatial, layer_id),
    }
}

fn is_active(filter: &Filter) -> bool {
    if filter.disabled {
        debug!(filter_id = %filter.id, "skipping disabled filter");
        return false;
    }
    if let FilterKind::Attribute(attr) = &filter.kind {
        if attr.is_empty_numeric() {
            debug!(filter_id = %filter.id, "skipping numeric filter without values");
            return false;
        }
    }
    true
}

fn compile_group<'a>(ctx: &mut CompileContext<'a>, group: &'a FilterGroup, depth: usize) -> Option<Predicate> {
    if !ctx.enter(group) {
        warn!(group_id = %group.id, "group reached twice, skipping cycle");
        return None;
    }
    let layer_id = ctx.layer_id();

    let active: Vec<&Filter> = group.filters.iter().filter(|f| is_active(f)).collect();
    let (generated, originals): (Vec<&Filter>, Vec<&Filter>) =
        active.into_iter().partition(|f| f.generated_by().is_some());

    let mut preds = Vec::new();
    for original in originals {
        let alternatives: Vec<Predicate> = compile_filter(original, layer_id)
            .into_iter()
            .chain(
                generated
                    .iter()
                    .filter(|g| g.generated_by() == Some(original.id.as_str()))
                    .filter_map(|g| compile_filter(g, layer_id)),
            )
            .collect();
        if let Some(pred) = Predicate::combine(LogicalOperator::Or, alternatives) {
            preds.push(pred);
        }
    }

    let children = ctx.children_of(&group.id);
    if !children.is_empty() {
        if depth >= ctx.options().max_group_depth {
            warn!(group_id = %group.id, depth, "group nesting too deep, dropping child groups");
        } else {
            for child in children {
                if let Some(pred) = compile_group(ctx, child, depth + 1) {
                    preds.push(pred);
                }
            }
        }
    }

    Predicate::combine(group.operator, preds)
}
