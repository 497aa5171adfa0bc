//! Spatial module: compiles a spatial filter into intersection predicates for one layer.

use tracing::{debug, warn};
use crate::expr::{Predicate, SpatialValue};
use crate::geometry::Geometry;
use crate::types::{LayerId, LogicalOperator, SpatialFilter};
use crate::wkt::{is_circle, parse_circle, parse_wkt};

/// The geometry operands of a spatial filter: the base geometries (collected and optionally
/// buffered) first, then one buffered point per circle.
pub fn spatial_values(filter: &SpatialFilter) -> Vec<SpatialValue> {
    let buffer = filter.buffer.filter(|d| *d != 0.0);
    let mut base: Vec<Geometry> = Vec::new();
    let mut circles: Vec<SpatialValue> = Vec::new();

    for entry in &filter.geometries {
        if is_circle(&entry.geometry) {
            match parse_circle(&entry.geometry) {
                Some(circle) => circles.push(SpatialValue::Buffer {
                    geometry: Geometry::Point(circle.center),
                    distance: circle.radius + buffer.unwrap_or(0.0),
                }),
                None => warn!(geometry_id = %entry.id, wkt = %entry.geometry, "dropping unparsable circle"),
            }
        } else {
            match parse_wkt(&entry.geometry) {
                Some(geometry) => base.push(geometry),
                None => warn!(geometry_id = %entry.id, wkt = %entry.geometry, "dropping unparsable geometry"),
            }
        }
    }

    let mut values = Vec::with_capacity(circles.len() + 1);
    let collected = match base.len() {
        0 => None,
        1 => base.pop(),
        _ => Some(Geometry::GeometryCollection(base)),
    };
    if let Some(geometry) = collected {
        values.push(match buffer {
            Some(distance) => SpatialValue::Buffer { geometry, distance },
            None => SpatialValue::Geometry(geometry),
        });
    }
    values.extend(circles);
    values
}

/// Compiles a spatial filter for `layer_id`: every geometry operand intersected against every
/// geometry column the layer exposes, OR-combined. `None` when the layer has no geometry
/// column in this filter or no geometry parsed.
pub fn compile_spatial(filter: &SpatialFilter, layer_id: LayerId) -> Option<Predicate> {
    let columns = filter.columns_for(layer_id);
    if columns.is_empty() {
        debug!(layer_id, "spatial filter has no geometry column for layer");
        return None;
    }
    let values = spatial_values(filter);
    let mut preds = Vec::with_capacity(values.len() * columns.len());
    for value in &values {
        for column in &columns {
            preds.push(Predicate::Intersects { property: column.to_string(), value: value.clone() });
        }
    }
    Predicate::combine(LogicalOperator::Or, preds)
}
