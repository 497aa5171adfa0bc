//! Expression (AST) module: the compiled predicate tree shared by both renderers.
//!
//! This module provides the Predicate type and related AST node types, plus the composition
//! helpers used by the compilers.

use crate::geometry::Geometry;
use crate::types::LogicalOperator;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        op: ComparisonOp,
        property: String,
        value: Literal,
    },
    Between {
        property: String,
        lower: Literal,
        upper: Literal,
    },
    Like {
        property: String,
        pattern: String,
        case_insensitive: bool,
    },
    In {
        property: String,
        values: Vec<Literal>,
    },
    IsNull {
        property: String,
    },
    Intersects {
        property: String,
        value: SpatialValue,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    /// The operator symbol, identical in CQL text and CQL2-JSON.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
}

/// The right-hand side of a spatial intersection.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialValue {
    Geometry(Geometry),
    Buffer { geometry: Geometry, distance: f64 },
}

impl Predicate {
    /// Combines `preds` with `op`: `None` when empty, the lone predicate unwrapped, otherwise
    /// an `And`/`Or` node.
    pub fn combine(op: LogicalOperator, mut preds: Vec<Predicate>) -> Option<Predicate> {
        match preds.len() {
            0 => None,
            1 => preds.pop(),
            _ => Some(match op {
                LogicalOperator::And => Predicate::And(preds),
                LogicalOperator::Or => Predicate::Or(preds),
            }),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// Wraps in `Not` when `invert` is set.
    pub fn negate_if(self, invert: bool) -> Predicate {
        if invert {
            self.negate()
        } else {
            self
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Predicate::And(args) | Predicate::Or(args) => 1 + args.iter().map(Predicate::node_count).sum::<usize>(),
            Predicate::Not(inner) => 1 + inner.node_count(),
            _ => 1,
        }
    }
}

/// Serializes a predicate tree into one output encoding.
pub trait Renderer {
    type Output;

    fn render(&self, pred: &Predicate) -> Self::Output;
}

// Visitor trait for traversing the predicate tree
pub trait PredicateVisitor {
    fn visit(&mut self, pred: &Predicate);
}

impl Predicate {
    /// Depth-first, pre-order walk.
    pub fn walk<V: PredicateVisitor>(&self, visitor: &mut V) {
        visitor.visit(self);
        match self {
            Predicate::And(args) | Predicate::Or(args) => {
                for arg in args {
                    arg.walk(visitor);
                }
            }
            Predicate::Not(inner) => inner.walk(visitor),
            _ => {}
        }
    }
}

/// Collects the property names referenced by a predicate, in first-seen order.
#[derive(Debug, Default)]
pub struct PropertyCollector {
    pub properties: Vec<String>,
}

impl PredicateVisitor for PropertyCollector {
    fn visit(&mut self, pred: &Predicate) {
        let property = match pred {
            Predicate::Compare { property, .. }
            | Predicate::Between { property, .. }
            | Predicate::Like { property, .. }
            | Predicate::In { property, .. }
            | Predicate::IsNull { property }
            | Predicate::Intersects { property, .. } => property,
            _ => return,
        };
        if !self.properties.iter().any(|p| p == property) {
            self.properties.push(property.clone());
        }
    }
}
