//! Geometry module: GeoJSON-shaped geometry values and their WKT/GeoJSON serializations.

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// GeoJSON object for this geometry. Integral coordinates are emitted as integers.
    pub fn to_geojson(&self) -> Value {
        match self {
            Geometry::GeometryCollection(parts) => json!({
                "type": self.type_name(),
                "geometries": parts.iter().map(Geometry::to_geojson).collect::<Vec<_>>(),
            }),
            _ => json!({
                "type": self.type_name(),
                "coordinates": self.coordinates_json(),
            }),
        }
    }

    fn coordinates_json(&self) -> Value {
        match self {
            Geometry::Point(c) => coord_json(c),
            Geometry::LineString(cs) | Geometry::MultiPoint(cs) => coords_json(cs),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                Value::Array(rings.iter().map(|r| coords_json(r)).collect())
            }
            Geometry::MultiPolygon(polys) => Value::Array(
                polys
                    .iter()
                    .map(|p| Value::Array(p.iter().map(|r| coords_json(r)).collect()))
                    .collect(),
            ),
            Geometry::GeometryCollection(_) => Value::Null,
        }
    }

    /// WKT text for this geometry, in the same dialect the parser reads.
    pub fn to_wkt(&self) -> String {
        match self {
            Geometry::Point(c) => format!("POINT({})", coord_wkt(c)),
            Geometry::LineString(cs) => format!("LINESTRING({})", coords_wkt(cs)),
            Geometry::Polygon(rings) => format!("POLYGON({})", rings_wkt(rings)),
            Geometry::MultiPoint(cs) => format!("MULTIPOINT({})", coords_wkt(cs)),
            Geometry::MultiLineString(lines) => format!("MULTILINESTRING({})", rings_wkt(lines)),
            Geometry::MultiPolygon(polys) => {
                let parts: Vec<String> = polys.iter().map(|p| format!("({})", rings_wkt(p))).collect();
                format!("MULTIPOLYGON({})", parts.join(", "))
            }
            Geometry::GeometryCollection(parts) => {
                let parts: Vec<String> = parts.iter().map(Geometry::to_wkt).collect();
                format!("GEOMETRYCOLLECTION({})", parts.join(", "))
            }
        }
    }
}

fn coord_json(c: &Coord) -> Value {
    Value::Array(vec![json_number(c.x), json_number(c.y)])
}

fn coords_json(cs: &[Coord]) -> Value {
    Value::Array(cs.iter().map(coord_json).collect())
}

fn coord_wkt(c: &Coord) -> String {
    format!("{} {}", format_number(c.x), format_number(c.y))
}

fn coords_wkt(cs: &[Coord]) -> String {
    cs.iter().map(coord_wkt).collect::<Vec<_>>().join(", ")
}

fn rings_wkt(rings: &[Vec<Coord>]) -> String {
    rings.iter().map(|r| format!("({})", coords_wkt(r))).collect::<Vec<_>>().join(", ")
}

// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn as_integer(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

/// Formats a number for query text: integral values without a fractional part.
pub fn format_number(n: f64) -> String {
    match as_integer(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

/// JSON number for `n`: integral values become JSON integers.
pub fn json_number(n: f64) -> Value {
    match as_integer(n) {
        Some(i) => Value::from(i),
        None => Value::from(n),
    }
}
