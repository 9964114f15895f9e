use serde::{Deserialize, Serialize};

use crate::feature::Feature;

/// One popup line: a label, the feature attribute to read, and an
/// optional unit suffix (e.g. "Km.").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupField {
    pub label: String,
    pub attr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl PopupField {
    pub fn new(label: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attr: attr.into(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Ordered field list describing how to project a feature into popup
/// rows. Fixed at configuration time; one spec per dataset variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopupSpec {
    pub title: String,
    pub fields: Vec<PopupField>,
}

impl PopupSpec {
    pub fn new(title: impl Into<String>, fields: Vec<PopupField>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupRow {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Transient popup state. Superseded wholesale by the next click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PopupViewState {
    Hidden,
    Shown {
        coordinate: [f64; 2],
        rows: Vec<PopupRow>,
    },
}

impl PopupViewState {
    pub fn is_shown(&self) -> bool {
        matches!(self, PopupViewState::Shown { .. })
    }
}

/// Formats popup content for a clicked feature.
///
/// No feature under the pointer yields `Hidden`. Otherwise every spec
/// field produces exactly one row, in spec order; an attribute the
/// feature lacks becomes an empty value rather than an error. The
/// coordinate is the click coordinate supplied by the caller, never
/// derived from the feature.
pub fn format(feature: Option<&Feature>, coordinate: [f64; 2], spec: &PopupSpec) -> PopupViewState {
    let Some(feature) = feature else {
        return PopupViewState::Hidden;
    };

    let rows = spec
        .fields
        .iter()
        .map(|field| PopupRow {
            label: field.label.clone(),
            value: feature.attr_text(&field.attr).unwrap_or_default(),
            unit: field.unit.clone(),
        })
        .collect();

    PopupViewState::Shown { coordinate, rows }
}

/// Renders shown popup rows as the popup content block.
pub fn render_html(title: &str, rows: &[PopupRow]) -> String {
    let mut html = format!("<h3>{}</h3>\n", escape_html(title));
    for row in rows {
        html.push_str("<p><b>");
        html.push_str(&escape_html(&row.label));
        html.push_str("</b>: ");
        html.push_str(&escape_html(&row.value));
        if let Some(unit) = &row.unit {
            html.push(' ');
            html.push_str(&escape_html(unit));
        }
        html.push_str("</p>\n");
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
