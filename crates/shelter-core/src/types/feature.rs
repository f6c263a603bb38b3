//! Raw ArcGIS feature types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One feature from an ArcGIS feature-service query response.
///
/// The attribute names are owned by the upstream layer and vary between
/// datasets, so attributes are kept as an untyped JSON map. Features are
/// transient: they only exist between fetch and transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    /// Attribute mapping (field name to scalar value)
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: Map<String, Value>,

    /// Point geometry, if the layer carries one
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: Option<Geometry>,
}

impl RawFeature {
    /// Creates a feature from attributes only.
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            geometry: None,
        }
    }

    /// Sets the point geometry.
    pub fn with_geometry(mut self, x: f64, y: f64) -> Self {
        self.geometry = Some(Geometry {
            x: Some(x),
            y: Some(y),
        });
        self
    }

    /// Looks up a raw attribute value by exact field name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// ArcGIS point geometry (`x` is longitude, `y` is latitude for WGS84 layers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Longitude
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub x: Option<f64>,

    /// Latitude
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub y: Option<f64>,
}

/// Anything but an object reads as no attributes.
fn lenient_attributes<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// Anything but an object (WKT strings, coordinate arrays, null) reads as
/// no geometry.
fn lenient_geometry<'de, D>(deserializer: D) -> Result<Option<Geometry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Accepts numbers and numeric strings; anything else becomes `None`
/// instead of failing the whole response.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
