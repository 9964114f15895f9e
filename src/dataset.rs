use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::feature::FeatureCollection;
use crate::popup::{PopupField, PopupSpec};
use crate::style::CategoryStyleTable;

/// Initial map view: center as [lat, lng], plus a panning extent
/// [south, west, north, east] the map engine constrains itself to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub center: [f64; 2],
    pub zoom: u8,
    pub extent: [f64; 4],
}

/// A base map definition. URLs here are configuration handed to the map
/// engine; the server never fetches or validates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BaseLayer {
    Osm {
        title: String,
        visible: bool,
    },
    Wms {
        title: String,
        url: String,
        layers: String,
        attribution: String,
        visible: bool,
    },
}

/// Everything that distinguishes one dataset variant: where its data
/// lives, how to style it, and what its popup shows. The engine itself
/// is variant-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub id: String,
    pub title: String,
    pub data_file: String,
    pub view: ViewConfig,
    pub base_layers: Vec<BaseLayer>,
    pub style_table: CategoryStyleTable,
    pub popup: PopupSpec,
}

/// A dataset config together with its loaded features.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub config: DatasetConfig,
    pub features: FeatureCollection,
}

impl Dataset {
    pub fn load(config: DatasetConfig, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(&config.data_file);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
        let features: FeatureCollection = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))?;
        Ok(Self { config, features })
    }
}

/// The three base maps shared by both variants: OSM plus the two IGN
/// WMS services of the original site.
fn spanish_base_layers() -> Vec<BaseLayer> {
    vec![
        BaseLayer::Osm {
            title: "OpenStreetMap".to_string(),
            visible: true,
        },
        BaseLayer::Wms {
            title: "PNOA".to_string(),
            url: "https://www.ign.es/wms-inspire/pnoa-ma?".to_string(),
            layers: "OI.OrthoimageCoverage".to_string(),
            attribution: "PNOA &copy; Instituto Geográfico Nacional".to_string(),
            visible: false,
        },
        BaseLayer::Wms {
            title: "MTN50".to_string(),
            url: "https://www.ign.es/wms/primera-edicion-mtn".to_string(),
            layers: "MTN50".to_string(),
            attribution: "MTN50 &copy; Instituto Geográfico Nacional".to_string(),
            visible: false,
        },
    ]
}

/// Camino de Santiago pilgrimage routes, grouped by route family.
pub fn pilgrimage_routes() -> DatasetConfig {
    let style_table = CategoryStyleTable::new("agrupacion")
        .with_color("Camino Francés", "yellow")
        .with_color("Caminos Andaluces", "green")
        .with_color("Caminos Catalanes", "blue")
        .with_color("Caminos de Galicia", "deeppink")
        .with_color("Caminos del Norte", "fuchsia")
        .with_color("Caminos del Centro", "orange")
        .with_color("Caminos del Este", "gray")
        .with_color("Caminos del Sureste", "red")
        .with_color("Caminos Insulares", "cyan")
        .with_color("Caminos Portugueses", "brown")
        .with_color("Chemins vers Via des Piemonts", "maroon")
        .with_color("Chemins vers Via Turonensis", "#1f6b75")
        .with_color("Voie des Piemonts", "darkgreen")
        .with_color("Voie Turonensis - Paris", "#78b90f")
        .with_color("Via Tolosana Arles", "darkolivegreen");

    let popup = PopupSpec::new(
        "Información",
        vec![
            PopupField::new("Nombre", "nombre"),
            PopupField::new("Longitud", "longitud").with_unit("Km."),
            PopupField::new("URL", "url_info"),
            PopupField::new("Agrupación", "agrupacion"),
            PopupField::new("País", "pais"),
        ],
    );

    DatasetConfig {
        id: "caminos".to_string(),
        title: "Caminos de Santiago".to_string(),
        data_file: "caminos_santiago.geojson".to_string(),
        view: ViewConfig {
            center: [42.5, -3.7],
            zoom: 6,
            extent: [35.5, -10.0, 48.5, 4.5],
        },
        base_layers: spanish_base_layers(),
        style_table,
        popup,
    }
}

/// Watercourse network, styled by stream class.
pub fn watercourses() -> DatasetConfig {
    let style_table = CategoryStyleTable::new("clase")
        .with_color("Río", "#1f78b4")
        .with_color("Arroyo", "#a6cee3")
        .with_color("Canal", "#33a02c")
        .with_color("Rambla", "#b2df8a")
        .with_color("Acequia", "#fb9a99");

    let popup = PopupSpec::new(
        "Información",
        vec![
            PopupField::new("Nombre", "nombre"),
            PopupField::new("Nombre alternativo", "nombre_alt"),
            PopupField::new("Clase", "clase"),
            PopupField::new("Coordenadas", "coordenadas"),
        ],
    );

    DatasetConfig {
        id: "rios".to_string(),
        title: "Ríos y arroyos".to_string(),
        data_file: "rios.geojson".to_string(),
        view: ViewConfig {
            center: [43.0, -8.2],
            zoom: 9,
            extent: [41.8, -9.5, 43.9, -6.7],
        },
        base_layers: spanish_base_layers(),
        style_table,
        popup,
    }
}

pub fn variant_by_id(id: &str) -> Option<DatasetConfig> {
    all_variants().into_iter().find(|v| v.id == id)
}

pub fn all_variants() -> Vec<DatasetConfig> {
    vec![pilgrimage_routes(), watercourses()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;
    use serde_json::json;

    #[test]
    fn variants_are_resolvable_by_id() {
        assert_eq!(variant_by_id("caminos").unwrap().title, "Caminos de Santiago");
        assert_eq!(variant_by_id("rios").unwrap().title, "Ríos y arroyos");
        assert!(variant_by_id("no_such_dataset").is_none());
    }

    #[test]
    fn pilgrimage_table_covers_all_route_families() {
        let config = pilgrimage_routes();
        assert_eq!(config.style_table.colors.len(), 15);
        assert_eq!(config.style_table.category_attr, "agrupacion");
        assert_eq!(
            config.style_table.colors.get("Camino Francés").map(String::as_str),
            Some("yellow")
        );
    }

    #[test]
    fn popup_specs_keep_documented_field_order() {
        let caminos = pilgrimage_routes();
        let fields: Vec<&str> = caminos.popup.fields.iter().map(|f| f.attr.as_str()).collect();
        assert_eq!(fields, ["nombre", "longitud", "url_info", "agrupacion", "pais"]);
        assert_eq!(caminos.popup.fields[1].unit.as_deref(), Some("Km."));

        let rios = watercourses();
        let fields: Vec<&str> = rios.popup.fields.iter().map(|f| f.attr.as_str()).collect();
        assert_eq!(fields, ["nombre", "nombre_alt", "clase", "coordenadas"]);
    }

    #[test]
    fn both_variants_share_the_base_layer_stack() {
        for config in all_variants() {
            assert_eq!(config.base_layers.len(), 3);
            // Exactly one base layer starts visible.
            let visible = config
                .base_layers
                .iter()
                .filter(|l| match l {
                    BaseLayer::Osm { visible, .. } | BaseLayer::Wms { visible, .. } => *visible,
                })
                .count();
            assert_eq!(visible, 1);
        }
    }

    #[test]
    fn variant_tables_style_their_own_features() {
        let rios = watercourses();
        let stream: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "clase": "Río", "nombre": "Mandeo" },
            "geometry": null
        }))
        .unwrap();
        let style = rios.style_table.resolve(&stream);
        assert_eq!(style.color.as_deref(), Some("#1f78b4"));
        assert_eq!(style.width, 2);
    }
}
