//! CQL module: renders predicates as CQL text.
//!
//! Every node is parenthesized. Negations that CQL can express inline (`IS NOT NULL`,
//! `NOT BETWEEN`, `NOT LIKE`, `NOT ILIKE`, `NOT IN`) are folded into the node.

use crate::expr::{Literal, Predicate, Renderer, SpatialValue};
use crate::geometry::format_number;

#[derive(Debug, Clone, Copy, Default)]
pub struct CqlRenderer;

impl Renderer for CqlRenderer {
    type Output = String;

    fn render(&self, pred: &Predicate) -> String {
        to_cql(pred)
    }
}

/// Renders `pred` as a CQL filter string.
pub fn to_cql(pred: &Predicate) -> String {
    match pred {
        Predicate::And(args) => join(args, " AND "),
        Predicate::Or(args) => join(args, " OR "),
        Predicate::Not(inner) => render_not(inner),
        Predicate::Compare { op, property, value } => {
            format!("({} {} {})", property, op.symbol(), literal(value))
        }
        Predicate::Between { .. }
        | Predicate::Like { .. }
        | Predicate::In { .. }
        | Predicate::IsNull { .. } => format!("({})", negatable(pred, false)),
        Predicate::Intersects { property, value } => {
            format!("(INTERSECTS({}, {}))", property, spatial(value))
        }
    }
}

fn render_not(inner: &Predicate) -> String {
    match inner {
        Predicate::Between { .. }
        | Predicate::Like { .. }
        | Predicate::In { .. }
        | Predicate::IsNull { .. } => format!("({})", negatable(inner, true)),
        _ => format!("(NOT {})", to_cql(inner)),
    }
}

// Body (without the outer parentheses) of a node with an inline negated form.
fn negatable(pred: &Predicate, negated: bool) -> String {
    let not = if negated { "NOT " } else { "" };
    match pred {
        Predicate::Between { property, lower, upper } => {
            format!("{} {}BETWEEN {} AND {}", property, not, literal(lower), literal(upper))
        }
        Predicate::Like { property, pattern, case_insensitive } => {
            let op = if *case_insensitive { "ILIKE" } else { "LIKE" };
            format!("{} {}{} {}", property, not, op, quote(pattern))
        }
        Predicate::In { property, values } => {
            let values: Vec<String> = values.iter().map(literal).collect();
            format!("{} {}IN ({})", property, not, values.join(","))
        }
        Predicate::IsNull { property } => format!("{} IS {}NULL", property, not),
        other => to_cql(other),
    }
}

fn join(args: &[Predicate], separator: &str) -> String {
    let parts: Vec<String> = args.iter().map(to_cql).collect();
    format!("({})", parts.join(separator))
}

fn spatial(value: &SpatialValue) -> String {
    match value {
        SpatialValue::Geometry(geometry) => geometry.to_wkt(),
        SpatialValue::Buffer { geometry, distance } => {
            format!("BUFFER({}, {})", geometry.to_wkt(), format_number(*distance))
        }
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::String(s) => quote(s),
        Literal::Number(n) => format_number(*n),
        Literal::Bool(b) => b.to_string(),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
