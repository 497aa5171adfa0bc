//! Attribute module: compiles a single attribute filter into a predicate node.
//!
//! Inversion is resolved per condition kind: plain numeric and date comparisons swap to the
//! complementary operator, boolean conditions flip the emitted literal, and everything else
//! (between, like, in, null) is wrapped in `Not`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};
use crate::conditions::resolve_comparison;
use crate::expr::{ComparisonOp, Literal, Predicate};
use crate::types::{AttributeFilter, AttributeType, Condition};

/// Compiles one attribute filter. Returns `None` when the filter contributes nothing: an
/// unrecognized (type, condition) pair, missing values, or values that do not parse.
pub fn compile_attribute(filter: &AttributeFilter) -> Option<Predicate> {
    let invert = filter.invert_condition;
    match filter.condition {
        Condition::Null => {
            return Some(Predicate::IsNull { property: filter.attribute.clone() }.negate_if(invert));
        }
        Condition::UniqueValues => return compile_in(filter),
        _ => {}
    }

    let ty = filter.attribute_type;
    if ty.is_geometry() {
        debug!(attribute = %filter.attribute, "geometry attributes only support NULL checks");
        return None;
    }
    if ty.is_numeric() {
        compile_numeric(filter)
    } else if ty.is_temporal() {
        compile_temporal(filter)
    } else {
        match ty {
            AttributeType::String => compile_string(filter),
            AttributeType::Boolean => compile_boolean(filter),
            _ => None,
        }
    }
}

fn compile_in(filter: &AttributeFilter) -> Option<Predicate> {
    let ty = filter.attribute_type;
    let values: Vec<Literal> = filter
        .value
        .iter()
        .filter_map(|v| {
            if ty.is_numeric() {
                let parsed = parse_number(v);
                if parsed.is_none() {
                    warn!(attribute = %filter.attribute, value = %v, "dropping non-numeric IN value");
                }
                parsed.map(Literal::Number)
            } else {
                Some(Literal::String(v.clone()))
            }
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(Predicate::In { property: filter.attribute.clone(), values }.negate_if(filter.invert_condition))
}

fn compile_numeric(filter: &AttributeFilter) -> Option<Predicate> {
    if filter.condition == Condition::Between {
        let (lower, upper) = match filter.value.as_slice() {
            [lower, upper, ..] => (numeric_value(filter, lower)?, numeric_value(filter, upper)?),
            _ => return None,
        };
        return Some(
            Predicate::Between {
                property: filter.attribute.clone(),
                lower: Literal::Number(lower),
                upper: Literal::Number(upper),
            }
            .negate_if(filter.invert_condition),
        );
    }
    if matches!(filter.condition, Condition::Before | Condition::After) {
        return None;
    }
    let op = resolve_comparison(filter.condition, filter.invert_condition)?;
    let value = numeric_value(filter, filter.value.first()?)?;
    Some(compare(filter, op, Literal::Number(value)))
}

fn compile_string(filter: &AttributeFilter) -> Option<Predicate> {
    let value = filter.value.first()?;
    let pattern = match filter.condition {
        Condition::Equals => value.clone(),
        Condition::Like => format!("%{}%", value),
        Condition::StartsWith => format!("{}%", value),
        Condition::EndsWith => format!("%{}", value),
        _ => return None,
    };
    Some(
        Predicate::Like {
            property: filter.attribute.clone(),
            pattern,
            case_insensitive: !filter.case_sensitive,
        }
        .negate_if(filter.invert_condition),
    )
}

fn compile_temporal(filter: &AttributeFilter) -> Option<Predicate> {
    match filter.condition {
        Condition::On => {
            let day = day_value(filter, filter.value.first()?)?;
            Some(day_between(filter, day, day))
        }
        Condition::Between => {
            let (start, end) = match filter.value.as_slice() {
                [start, end, ..] => (day_value(filter, start)?, day_value(filter, end)?),
                _ => return None,
            };
            Some(day_between(filter, start, end))
        }
        Condition::After | Condition::Before => {
            let op = resolve_comparison(filter.condition, filter.invert_condition)?;
            let raw = filter.value.first()?;
            let timestamp = match normalize_timestamp(raw) {
                Some(ts) => ts,
                None => {
                    warn!(attribute = %filter.attribute, value = %raw, "dropping unparsable date value");
                    return None;
                }
            };
            Some(compare(filter, op, Literal::String(timestamp)))
        }
        _ => None,
    }
}

fn compile_boolean(filter: &AttributeFilter) -> Option<Predicate> {
    let literal = match filter.condition {
        Condition::True => true,
        Condition::False => false,
        _ => return None,
    };
    Some(compare(filter, ComparisonOp::Eq, Literal::Bool(literal != filter.invert_condition)))
}

fn compare(filter: &AttributeFilter, op: ComparisonOp, value: Literal) -> Predicate {
    Predicate::Compare { op, property: filter.attribute.clone(), value }
}

fn day_between(filter: &AttributeFilter, start: NaiveDate, end: NaiveDate) -> Predicate {
    Predicate::Between {
        property: filter.attribute.clone(),
        lower: Literal::String(start_of_day(start)),
        upper: Literal::String(end_of_day(end)),
    }
    .negate_if(filter.invert_condition)
}

fn numeric_value(filter: &AttributeFilter, raw: &str) -> Option<f64> {
    let parsed = parse_number(raw);
    if parsed.is_none() {
        warn!(attribute = %filter.attribute, value = %raw, "dropping unparsable numeric value");
    }
    parsed
}

fn day_value(filter: &AttributeFilter, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_day(raw);
    if parsed.is_none() {
        warn!(attribute = %filter.attribute, value = %raw, "dropping unparsable date value");
    }
    parsed
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Calendar day of a date or timestamp value, in the value's own offset.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Normalizes a date or timestamp to a UTC `YYYY-MM-DDTHH:MM:SSZ` string. Plain dates and
/// zone-less timestamps are taken as UTC.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let utc = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc).naive_utc()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        dt
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?
    };
    Some(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn start_of_day(day: NaiveDate) -> String {
    format!("{}T00:00:00Z", day.format("%Y-%m-%d"))
}

fn end_of_day(day: NaiveDate) -> String {
    format!("{}T23:59:59Z", day.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(p: &str) -> String {
        p.to_string()
    }

    #[test]
    fn test_string_like_patterns() {
        let cases = [
            (Condition::Equals, "value"),
            (Condition::Like, "%value%"),
            (Condition::StartsWith, "value%"),
            (Condition::EndsWith, "%value"),
        ];
        for (cond, pattern) in cases {
            let f = AttributeFilter::new("attribute", AttributeType::String, cond).value("value");
            assert_eq!(
                compile_attribute(&f),
                Some(Predicate::Like { property: prop("attribute"), pattern: pattern.to_string(), case_insensitive: true })
            );
        }
    }

    #[test]
    fn test_string_case_sensitive_and_inverted() {
        let f = AttributeFilter::new("a", AttributeType::String, Condition::Like)
            .value("x")
            .case_sensitive()
            .inverted();
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Like { property: prop("a"), pattern: "%x%".into(), case_insensitive: false }.negate())
        );
    }

    #[test]
    fn test_string_without_value() {
        let f = AttributeFilter::new("a", AttributeType::String, Condition::Like);
        assert_eq!(compile_attribute(&f), None);
    }

    #[test]
    fn test_numeric_between() {
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::Between).values(["10", "20"]);
        let between = Predicate::Between { property: prop("n"), lower: Literal::Number(10.0), upper: Literal::Number(20.0) };
        assert_eq!(compile_attribute(&f), Some(between.clone()));
        assert_eq!(compile_attribute(&f.inverted()), Some(between.negate()));
    }

    #[test]
    fn test_numeric_between_needs_two_values() {
        let f = AttributeFilter::new("n", AttributeType::Number, Condition::Between).value("10");
        assert_eq!(compile_attribute(&f), None);
    }

    #[test]
    fn test_numeric_comparison_uses_inversion_table() {
        let f = AttributeFilter::new("n", AttributeType::Double, Condition::Less).value("4.5");
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Compare { op: ComparisonOp::Lt, property: prop("n"), value: Literal::Number(4.5) })
        );
        assert_eq!(
            compile_attribute(&f.inverted()),
            Some(Predicate::Compare { op: ComparisonOp::Gte, property: prop("n"), value: Literal::Number(4.5) })
        );
    }

    #[test]
    fn test_numeric_unparsable_or_empty() {
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::Equal).value("abc");
        assert_eq!(compile_attribute(&f), None);
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::Equal);
        assert_eq!(compile_attribute(&f), None);
    }

    #[test]
    fn test_null_condition() {
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::Null);
        assert_eq!(compile_attribute(&f), Some(Predicate::IsNull { property: prop("n") }));
        assert_eq!(compile_attribute(&f.inverted()), Some(Predicate::IsNull { property: prop("n") }.negate()));
    }

    #[test]
    fn test_unique_values_coercion() {
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::UniqueValues).values(["1", "x", "2.5"]);
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::In { property: prop("n"), values: vec![Literal::Number(1.0), Literal::Number(2.5)] })
        );
        let f = AttributeFilter::new("s", AttributeType::String, Condition::UniqueValues).values(["a", "b"]).inverted();
        assert_eq!(
            compile_attribute(&f),
            Some(
                Predicate::In { property: prop("s"), values: vec![Literal::String("a".into()), Literal::String("b".into())] }
                    .negate()
            )
        );
        let f = AttributeFilter::new("s", AttributeType::String, Condition::UniqueValues);
        assert_eq!(compile_attribute(&f), None);
    }

    #[test]
    fn test_date_on_is_same_day_between() {
        let f = AttributeFilter::new("d", AttributeType::Date, Condition::On).value("2024-01-15");
        let expected = Predicate::Between {
            property: prop("d"),
            lower: Literal::String("2024-01-15T00:00:00Z".into()),
            upper: Literal::String("2024-01-15T23:59:59Z".into()),
        };
        assert_eq!(compile_attribute(&f), Some(expected.clone()));
        assert_eq!(compile_attribute(&f.inverted()), Some(expected.negate()));
    }

    #[test]
    fn test_date_between_normalizes_days() {
        let f = AttributeFilter::new("d", AttributeType::Timestamp, Condition::Between)
            .values(["2024-01-01T13:45:00Z", "2024-01-31"]);
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Between {
                property: prop("d"),
                lower: Literal::String("2024-01-01T00:00:00Z".into()),
                upper: Literal::String("2024-01-31T23:59:59Z".into()),
            })
        );
    }

    #[test]
    fn test_date_after_before_swap_operator() {
        let f = AttributeFilter::new("d", AttributeType::Date, Condition::After).value("2024-03-01");
        let ts = Literal::String("2024-03-01T00:00:00Z".into());
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Compare { op: ComparisonOp::Gt, property: prop("d"), value: ts.clone() })
        );
        assert_eq!(
            compile_attribute(&f.inverted()),
            Some(Predicate::Compare { op: ComparisonOp::Lte, property: prop("d"), value: ts.clone() })
        );
        let f = AttributeFilter::new("d", AttributeType::Date, Condition::Before).value("2024-03-01").inverted();
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Compare { op: ComparisonOp::Gte, property: prop("d"), value: ts })
        );
    }

    #[test]
    fn test_date_unparsable() {
        let f = AttributeFilter::new("d", AttributeType::Date, Condition::On).value("yesterday");
        assert_eq!(compile_attribute(&f), None);
    }

    #[test]
    fn test_boolean_flips_literal() {
        let f = AttributeFilter::new("b", AttributeType::Boolean, Condition::True);
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Compare { op: ComparisonOp::Eq, property: prop("b"), value: Literal::Bool(true) })
        );
        assert_eq!(
            compile_attribute(&f.inverted()),
            Some(Predicate::Compare { op: ComparisonOp::Eq, property: prop("b"), value: Literal::Bool(false) })
        );
        let f = AttributeFilter::new("b", AttributeType::Boolean, Condition::False).inverted();
        assert_eq!(
            compile_attribute(&f),
            Some(Predicate::Compare { op: ComparisonOp::Eq, property: prop("b"), value: Literal::Bool(true) })
        );
    }

    #[test]
    fn test_unrecognized_pairs() {
        let f = AttributeFilter::new("s", AttributeType::String, Condition::Greater).value("x");
        assert_eq!(compile_attribute(&f), None);
        let f = AttributeFilter::new("b", AttributeType::Boolean, Condition::Like).value("x");
        assert_eq!(compile_attribute(&f), None);
        let f = AttributeFilter::new("g", AttributeType::Polygon, Condition::Equals).value("x");
        assert_eq!(compile_attribute(&f), None);
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::After).value("1");
        assert_eq!(compile_attribute(&f), None);
        let f = AttributeFilter::new("n", AttributeType::Integer, Condition::Unknown).value("1");
        assert_eq!(compile_attribute(&f), None);
    }

    #[test]
    fn test_geometry_null_check() {
        let f = AttributeFilter::new("the_geom", AttributeType::Geometry, Condition::Null).inverted();
        assert_eq!(compile_attribute(&f), Some(Predicate::IsNull { property: prop("the_geom") }.negate()));
    }

    #[test]
    fn test_geometry_comparisons_contribute_nothing() {
        for cond in [Condition::Equal, Condition::Between, Condition::Like, Condition::True] {
            let f = AttributeFilter::new("the_geom", AttributeType::MultiPolygon, cond).values(["1", "2"]);
            assert_eq!(compile_attribute(&f), None);
        }
    }

    #[test]
    fn test_normalize_timestamp_offsets() {
        assert_eq!(normalize_timestamp("2024-01-01T02:00:00+02:00").as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(normalize_timestamp("2024-01-01T10:30:00").as_deref(), Some("2024-01-01T10:30:00Z"));
        assert_eq!(normalize_timestamp("not a date"), None);
        assert_eq!(parse_day("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
