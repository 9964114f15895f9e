use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::feature::Feature;

/// Stroke width applied to every category unless a table overrides it.
pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// Rendering parameters for one feature's geometry.
///
/// `color: None` is the documented degenerate case for a category with
/// no table entry; the map engine decides how to draw "no color".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub color: Option<String>,
    pub width: u32,
}

/// Immutable category label -> stroke color mapping for one dataset.
///
/// Replaces the branch-per-category style function of earlier versions
/// with configuration data, so the unmatched-category fallback is an
/// explicit value instead of a fall-through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStyleTable {
    /// Feature attribute holding the category label.
    pub category_attr: String,
    pub width: u32,
    pub colors: BTreeMap<String, String>,
}

impl CategoryStyleTable {
    pub fn new(category_attr: impl Into<String>) -> Self {
        Self {
            category_attr: category_attr.into(),
            width: DEFAULT_STROKE_WIDTH,
            colors: BTreeMap::new(),
        }
    }

    pub fn with_color(mut self, category: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(category.into(), color.into());
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolves the rendering style for one feature.
    ///
    /// Exact string match on the category attribute. A missing attribute,
    /// a non-string value, or a label without a table entry all degrade
    /// to an undefined-color descriptor; nothing here can fail.
    pub fn resolve(&self, feature: &Feature) -> StyleDescriptor {
        let color = feature
            .attr(&self.category_attr)
            .and_then(|v| v.as_str())
            .and_then(|category| self.colors.get(category))
            .cloned();
        StyleDescriptor {
            color,
            width: self.width,
        }
    }
}
