//! cqlfilter: compiles hierarchical filter groups into backend query predicates.
//!
//! A snapshot of user-authored filter groups (attribute and spatial filters, nested by a
//! parent-group reference) is compiled per layer into a single predicate tree, which is then
//! rendered either as a CQL text string or as a CQL2-JSON value.
//!
//! # Architecture
//! - Input model (groups, filters, conditions)
//! - WKT parsing into GeoJSON-shaped geometries
//! - Attribute and spatial predicate compilation
//! - Filter tree compilation over the group forest
//! - Rendering to CQL text or CQL2-JSON
//! - Orchestration across all referenced layers, with optional memoization

mod types;
mod conditions;
mod geometry;
mod wkt;
mod expr;
mod attribute;
mod spatial;
mod context;
mod compiler;
mod cql;
mod cql2json;
mod filter;
mod cache;
mod config;

pub use types::*;
pub use conditions::*;
pub use geometry::*;
pub use wkt::*;
pub use expr::*;
pub use attribute::*;
pub use spatial::*;
pub use context::*;
pub use compiler::*;
pub use cql::*;
pub use cql2json::*;
pub use filter::*;
pub use cache::*;
pub use config::*;

use thiserror::Error;

/// Unified error type for cqlfilter operations.
///
/// Compilation itself never fails; these cover loading inputs and choosing an output format.
#[derive(Debug, Error)]
pub enum CqlFilterError {
    #[error("Invalid output format: {0}")]
    InvalidFormat(String),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
