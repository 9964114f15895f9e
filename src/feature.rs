use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single vector feature: an attribute bag plus an opaque geometry.
///
/// Geometry is carried through untouched for the map engine; nothing on
/// the server side ever interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    // GeoJSON allows "properties": null
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Value,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl Feature {
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// Attribute value projected to display text.
    ///
    /// Strings pass through as-is; integral numbers render without a
    /// fractional part (GeoJSON has no integer type, so `120.0` must
    /// show as `120`); anything else falls back to its JSON rendering.
    pub fn attr_text(&self, key: &str) -> Option<String> {
        match self.attr(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(i.to_string());
                }
                // GeoJSON has no integer type, so whole numbers usually
                // arrive as floats; render those without the fraction.
                match n.as_f64() {
                    Some(f)
                        if f.is_finite()
                            && f.fract() == 0.0
                            && f >= i64::MIN as f64
                            && f < i64::MAX as f64 =>
                    {
                        Some((f as i64).to_string())
                    }
                    _ => Some(n.to_string()),
                }
            }
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}

/// A parsed GeoJSON FeatureCollection. Read-only after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }
}
