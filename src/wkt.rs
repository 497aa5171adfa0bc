//! WKT module: a small hand-written parser for the WKT dialect used by drawn filter geometries.
//!
//! Supported keywords are `POINT`, `LINESTRING`, `POLYGON`, `MULTIPOINT`, `MULTILINESTRING` and
//! `MULTIPOLYGON`, matched case-sensitively. Coordinates are 2-D; Z/M values, `EMPTY` and EWKT
//! `SRID=` prefixes are not supported and yield `None`. The non-standard `CIRCLE(x y r)` token is
//! handled by [`parse_circle`].

use crate::geometry::{Coord, Geometry};

/// A parsed `CIRCLE(x y r)` token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Coord,
    pub radius: f64,
}

/// Parses a WKT string. Returns `None` for an unrecognized keyword or malformed body.
pub fn parse_wkt(input: &str) -> Option<Geometry> {
    let input = input.trim();
    let open = input.find('(')?;
    let keyword = input[..open].trim_end();
    let body = outer_body(input)?;
    match keyword {
        "POINT" => parse_coord(body).map(Geometry::Point),
        "LINESTRING" => parse_coords(body).map(Geometry::LineString),
        "POLYGON" => parse_rings(body).map(Geometry::Polygon),
        "MULTIPOINT" => parse_multipoint(body).map(Geometry::MultiPoint),
        "MULTILINESTRING" => parse_rings(body).map(Geometry::MultiLineString),
        "MULTIPOLYGON" => {
            let polygons = top_level_groups(body)?
                .into_iter()
                .map(parse_rings)
                .collect::<Option<Vec<_>>>()?;
            if polygons.is_empty() {
                None
            } else {
                Some(Geometry::MultiPolygon(polygons))
            }
        }
        _ => None,
    }
}

/// Whether `input` is a `CIRCLE(...)` token rather than plain WKT.
pub fn is_circle(input: &str) -> bool {
    input.trim_start().starts_with("CIRCLE")
}

/// Parses `CIRCLE(x y r)`.
pub fn parse_circle(input: &str) -> Option<Circle> {
    let input = input.trim();
    let open = input.find('(')?;
    if input[..open].trim_end() != "CIRCLE" {
        return None;
    }
    let body = outer_body(input)?;
    let mut parts = body.split_whitespace();
    let x = parts.next().and_then(parse_number)?;
    let y = parts.next().and_then(parse_number)?;
    let radius = parts.next().and_then(parse_number)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Circle { center: Coord::new(x, y), radius })
}

/// Text between the first `(` and the last `)`.
fn outer_body(input: &str) -> Option<&str> {
    let start = input.find('(')?;
    let end = input.rfind(')')?;
    if end <= start {
        return None;
    }
    Some(&input[start + 1..end])
}

/// Splits `input` into its top-level parenthesized groups, returning the text inside each.
///
/// Walks the string once with a depth counter: a capture starts when depth goes 0 -> 1 and
/// is emitted when depth returns to 0. Unbalanced parentheses yield `None`.
fn top_level_groups(input: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in input.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    groups.push(&input[start..i]);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    Some(groups)
}

// `NaN` and `inf` parse as f64 but have no WKT or GeoJSON encoding.
fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_coord(pair: &str) -> Option<Coord> {
    let mut parts = pair.split_whitespace();
    let x = parts.next().and_then(parse_number)?;
    let y = parts.next().and_then(parse_number)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coord::new(x, y))
}

fn parse_coords(body: &str) -> Option<Vec<Coord>> {
    let coords = body.split(',').map(parse_coord).collect::<Option<Vec<_>>>()?;
    if coords.is_empty() {
        None
    } else {
        Some(coords)
    }
}

// Accepts both `MULTIPOINT(1 2, 3 4)` and `MULTIPOINT((1 2), (3 4))`.
fn parse_multipoint(body: &str) -> Option<Vec<Coord>> {
    body.split(',')
        .map(|p| parse_coord(p.trim().trim_start_matches('(').trim_end_matches(')')))
        .collect()
}

fn parse_rings(body: &str) -> Option<Vec<Vec<Coord>>> {
    let rings = top_level_groups(body)?
        .into_iter()
        .map(parse_coords)
        .collect::<Option<Vec<_>>>()?;
    if rings.is_empty() {
        None
    } else {
        Some(rings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_wkt("POINT(1 2)"), Some(Geometry::Point(c(1.0, 2.0))));
        assert_eq!(parse_wkt("POINT (1.5 -2)"), Some(Geometry::Point(c(1.5, -2.0))));
    }

    #[test]
    fn test_parse_linestring() {
        assert_eq!(
            parse_wkt("LINESTRING(0 0, 1 1, 2 0)"),
            Some(Geometry::LineString(vec![c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0)]))
        );
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let wkt = "POLYGON((0 0, 10 0, 10 10, 0 0), (2 2, 3 2, 3 3, 2 2))";
        assert_eq!(
            parse_wkt(wkt),
            Some(Geometry::Polygon(vec![
                vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 0.0)],
                vec![c(2.0, 2.0), c(3.0, 2.0), c(3.0, 3.0), c(2.0, 2.0)],
            ]))
        );
    }

    #[test]
    fn test_parse_multipoint_forms() {
        let expected = Some(Geometry::MultiPoint(vec![c(1.0, 2.0), c(3.0, 4.0)]));
        assert_eq!(parse_wkt("MULTIPOINT(1 2, 3 4)"), expected);
        assert_eq!(parse_wkt("MULTIPOINT((1 2), (3 4))"), expected);
    }

    #[test]
    fn test_parse_multilinestring() {
        assert_eq!(
            parse_wkt("MULTILINESTRING((0 0, 1 1), (2 2, 3 3))"),
            Some(Geometry::MultiLineString(vec![
                vec![c(0.0, 0.0), c(1.0, 1.0)],
                vec![c(2.0, 2.0), c(3.0, 3.0)],
            ]))
        );
    }

    #[test]
    fn test_parse_multipolygon() {
        let wkt = "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5), (5.2 5.2, 5.4 5.2, 5.4 5.4, 5.2 5.2)))";
        match parse_wkt(wkt) {
            Some(Geometry::MultiPolygon(polys)) => {
                assert_eq!(polys.len(), 2);
                assert_eq!(polys[0].len(), 1);
                assert_eq!(polys[1].len(), 2);
                assert_eq!(polys[1][1][0], c(5.2, 5.2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_malformed() {
        assert_eq!(parse_wkt("TRIANGLE((0 0, 1 0, 0 1, 0 0))"), None);
        assert_eq!(parse_wkt("point(1 2)"), None);
        assert_eq!(parse_wkt("POINT(a b)"), None);
        assert_eq!(parse_wkt("POINT(1 2 3)"), None);
        assert_eq!(parse_wkt("POINT(NaN 1)"), None);
        assert_eq!(parse_wkt("LINESTRING(0 0, inf 1)"), None);
        assert_eq!(parse_wkt("POINT EMPTY"), None);
        assert_eq!(parse_wkt("POLYGON((0 0, 1 1)"), None);
        assert_eq!(parse_wkt("SRID=4326;POINT(1 2)"), None);
        assert_eq!(parse_wkt(""), None);
    }

    #[test]
    fn test_depth_scan() {
        assert_eq!(top_level_groups("(a), (b (c)), (d)"), Some(vec!["a", "b (c)", "d"]));
        assert_eq!(top_level_groups("(a))"), None);
        assert_eq!(top_level_groups("((a)"), None);
    }

    #[test]
    fn test_parse_circle() {
        assert!(is_circle("CIRCLE(1 2 3)"));
        assert!(!is_circle("POINT(1 2)"));
        assert_eq!(parse_circle("CIRCLE(1 2 3)"), Some(Circle { center: c(1.0, 2.0), radius: 3.0 }));
        assert_eq!(parse_circle("CIRCLE(1 2)"), None);
        assert_eq!(parse_circle("CIRCLE(1 2 x)"), None);
        assert_eq!(parse_circle("CIRCLE(1 2 inf)"), None);
        assert_eq!(parse_circle("CIRCLE(NaN 2 3)"), None);
    }

    #[test]
    fn test_roundtrip() {
        for wkt in [
            "POINT(1 2)",
            "LINESTRING(0 0, 1.5 1, 2 0)",
            "POLYGON((0 0, 10 0, 10 10, 0 0))",
            "MULTIPOINT(1 2, 3 4)",
            "MULTILINESTRING((0 0, 1 1), (2 2, 3 3))",
            "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
        ] {
            let geom = parse_wkt(wkt).unwrap();
            assert_eq!(geom.to_wkt(), wkt);
            assert_eq!(parse_wkt(&geom.to_wkt()), Some(geom));
        }
    }
}
