//! Condition tables: comparison operators for condition codes and their logical complements.

use crate::expr::ComparisonOp;
use crate::types::Condition;

/// Each comparison operator paired with its complement. Every operator appears exactly once
/// on the left-hand side.
pub const INVERSIONS: [(ComparisonOp, ComparisonOp); 6] = [
    (ComparisonOp::Eq, ComparisonOp::Neq),
    (ComparisonOp::Neq, ComparisonOp::Eq),
    (ComparisonOp::Lt, ComparisonOp::Gte),
    (ComparisonOp::Gte, ComparisonOp::Lt),
    (ComparisonOp::Gt, ComparisonOp::Lte),
    (ComparisonOp::Lte, ComparisonOp::Gt),
];

/// Looks up the logical complement of `op`.
pub fn inverted(op: ComparisonOp) -> ComparisonOp {
    INVERSIONS
        .iter()
        .find(|(from, _)| *from == op)
        .map(|(_, to)| *to)
        .unwrap_or(op)
}

/// The comparison operator a plain comparison condition maps to, if any.
///
/// `AFTER`/`BEFORE` share the numeric operators so that their inversion goes through the
/// same table.
pub fn comparison_for(condition: Condition) -> Option<ComparisonOp> {
    match condition {
        Condition::Equal => Some(ComparisonOp::Eq),
        Condition::NotEqual => Some(ComparisonOp::Neq),
        Condition::Less | Condition::Before => Some(ComparisonOp::Lt),
        Condition::Greater | Condition::After => Some(ComparisonOp::Gt),
        Condition::LessOrEqual => Some(ComparisonOp::Lte),
        Condition::GreaterOrEqual => Some(ComparisonOp::Gte),
        _ => None,
    }
}

/// Resolves the operator to emit for a comparison condition, applying the inversion table
/// when the filter is inverted.
pub fn resolve_comparison(condition: Condition, invert: bool) -> Option<ComparisonOp> {
    let op = comparison_for(condition)?;
    Some(if invert { inverted(op) } else { op })
}
