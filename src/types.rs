//! Types module: the input data model of the filter engine.
//!
//! Filter groups form a flat forest linked by `parent_group`; each group carries attribute
//! and spatial filters. All types are plain values deserialized from the UI state snapshot.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};
use crate::CqlFilterError;

pub type LayerId = i64;
pub type GroupId = String;
pub type FilterId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    String,
    Integer,
    Number,
    Double,
    Boolean,
    Date,
    Timestamp,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    Geometry,
    #[serde(other)]
    Unknown,
}

impl AttributeType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::Integer | AttributeType::Number | AttributeType::Double)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, AttributeType::Date | AttributeType::Timestamp)
    }

    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            AttributeType::Point
                | AttributeType::LineString
                | AttributeType::Polygon
                | AttributeType::MultiPoint
                | AttributeType::MultiLineString
                | AttributeType::MultiPolygon
                | AttributeType::Geometry
        )
    }
}

/// Condition codes as sent by the filter UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<>")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "BETWEEN")]
    Between,
    #[serde(rename = "EQUALS")]
    Equals,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "STARTS_WITH")]
    StartsWith,
    #[serde(rename = "ENDS_WITH")]
    EndsWith,
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "AFTER")]
    After,
    #[serde(rename = "BEFORE")]
    Before,
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "UNIQUE_VALUES", alias = "IN")]
    UniqueValues,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFilter {
    pub attribute: String,
    pub attribute_type: AttributeType,
    pub condition: Condition,
    #[serde(default)]
    pub invert_condition: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by_filter_id: Option<FilterId>,
}

impl AttributeFilter {
    pub fn new(attribute: impl Into<String>, attribute_type: AttributeType, condition: Condition) -> Self {
        Self {
            attribute: attribute.into(),
            attribute_type,
            condition,
            invert_condition: false,
            case_sensitive: false,
            value: Vec::new(),
            generated_by_filter_id: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value.push(value.into());
        self
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn inverted(mut self) -> Self {
        self.invert_condition = true;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn generated_by(mut self, filter_id: impl Into<FilterId>) -> Self {
        self.generated_by_filter_id = Some(filter_id.into());
        self
    }

    /// Numeric filters without values carry no constraint, unless the condition needs none.
    pub fn is_empty_numeric(&self) -> bool {
        self.attribute_type.is_numeric()
            && self.value.is_empty()
            && !matches!(self.condition, Condition::Null | Condition::UniqueValues)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryColumn {
    pub layer_id: LayerId,
    #[serde(default)]
    pub column: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryEntry {
    pub id: String,
    /// WKT text, or the `CIRCLE(x y r)` extension.
    pub geometry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialFilter {
    #[serde(default)]
    pub geometry_columns: Vec<GeometryColumn>,
    #[serde(default)]
    pub geometries: Vec<GeometryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<f64>,
}

impl SpatialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(mut self, id: impl Into<String>, wkt: impl Into<String>) -> Self {
        self.geometries.push(GeometryEntry { id: id.into(), geometry: wkt.into() });
        self
    }

    pub fn columns<I, S>(mut self, layer_id: LayerId, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.geometry_columns.push(GeometryColumn {
            layer_id,
            column: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn buffer(mut self, distance: f64) -> Self {
        self.buffer = Some(distance);
        self
    }

    /// All geometry columns configured for `layer_id`, in declaration order.
    pub fn columns_for(&self, layer_id: LayerId) -> Vec<&str> {
        self.geometry_columns
            .iter()
            .filter(|c| c.layer_id == layer_id)
            .flat_map(|c| c.column.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum FilterKind {
    Attribute(AttributeFilter),
    Spatial(SpatialFilter),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: FilterId,
    #[serde(default)]
    pub disabled: bool,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl Filter {
    pub fn attribute(id: impl Into<FilterId>, filter: AttributeFilter) -> Self {
        Self { id: id.into(), disabled: false, kind: FilterKind::Attribute(filter) }
    }

    pub fn spatial(id: impl Into<FilterId>, filter: SpatialFilter) -> Self {
        Self { id: id.into(), disabled: false, kind: FilterKind::Spatial(filter) }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn generated_by(&self) -> Option<&str> {
        match &self.kind {
            FilterKind::Attribute(a) => a.generated_by_filter_id.as_deref(),
            FilterKind::Spatial(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub id: GroupId,
    #[serde(default)]
    pub layer_ids: BTreeSet<LayerId>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    pub operator: LogicalOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<GroupId>,
}

impl FilterGroup {
    pub fn new(id: impl Into<GroupId>, operator: LogicalOperator) -> Self {
        Self {
            id: id.into(),
            layer_ids: BTreeSet::new(),
            filters: Vec::new(),
            operator,
            parent_group: None,
        }
    }

    pub fn layer(mut self, layer_id: LayerId) -> Self {
        self.layer_ids.insert(layer_id);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn parent(mut self, parent: impl Into<GroupId>) -> Self {
        self.parent_group = Some(parent.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_group.is_none()
    }

    pub fn applies_to(&self, layer_id: LayerId) -> bool {
        self.layer_ids.contains(&layer_id)
    }

    /// Parses a snapshot of filter groups from its JSON form.
    pub fn list_from_json(json: &str) -> Result<Vec<FilterGroup>, CqlFilterError> {
        Ok(serde_json::from_str(json)?)
    }
}
