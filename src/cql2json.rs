//! CQL2-JSON module: renders predicates as CQL2-JSON values.

use serde_json::{json, Value};
use crate::expr::{Literal, Predicate, Renderer, SpatialValue};
use crate::geometry::json_number;

#[derive(Debug, Clone, Copy, Default)]
pub struct Cql2JsonRenderer;

impl Renderer for Cql2JsonRenderer {
    type Output = Value;

    fn render(&self, pred: &Predicate) -> Value {
        to_cql2_json(pred)
    }
}

/// Renders `pred` as a CQL2-JSON expression.
pub fn to_cql2_json(pred: &Predicate) -> Value {
    match pred {
        Predicate::And(args) => op("and", args.iter().map(to_cql2_json).collect()),
        Predicate::Or(args) => op("or", args.iter().map(to_cql2_json).collect()),
        Predicate::Not(inner) => op("not", vec![to_cql2_json(inner)]),
        Predicate::Compare { op: cmp, property, value } => {
            op(cmp.symbol(), vec![prop(property), literal(value)])
        }
        Predicate::Between { property, lower, upper } => {
            op("between", vec![prop(property), literal(lower), literal(upper)])
        }
        Predicate::Like { property, pattern, case_insensitive } => {
            op("like", vec![prop(property), Value::from(pattern.as_str()), Value::Bool(*case_insensitive)])
        }
        Predicate::In { property, values } => {
            op("in", vec![prop(property), Value::Array(values.iter().map(literal).collect())])
        }
        Predicate::IsNull { property } => op("isNull", vec![prop(property)]),
        Predicate::Intersects { property, value } => op("s_intersects", vec![prop(property), spatial(value)]),
    }
}

fn op(name: &str, args: Vec<Value>) -> Value {
    json!({ "op": name, "args": args })
}

fn prop(property: &str) -> Value {
    json!({ "property": property })
}

fn spatial(value: &SpatialValue) -> Value {
    match value {
        SpatialValue::Geometry(geometry) => geometry.to_geojson(),
        SpatialValue::Buffer { geometry, distance } => json!({
            "function": "buffer",
            "args": [geometry.to_geojson(), json_number(*distance)],
        }),
    }
}

fn literal(value: &Literal) -> Value {
    match value {
        Literal::String(s) => Value::from(s.as_str()),
        Literal::Number(n) => json_number(*n),
        Literal::Bool(b) => Value::Bool(*b),
    }
}
