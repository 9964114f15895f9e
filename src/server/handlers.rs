use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use super::state::AppState;
use crate::dataset::{BaseLayer, ViewConfig};
use crate::feature::FeatureCollection;
use crate::map_page;
use crate::popup::{self, PopupViewState};
use crate::settings::Settings;

// HTTP API Handlers

pub async fn index_html(State(state): State<AppState>) -> Html<String> {
    map_page::get_map_html(&state.dataset.config)
}

#[derive(Serialize)]
pub struct LegendEntry {
    pub category: String,
    pub color: String,
}

#[derive(Serialize)]
pub struct MapConfig {
    pub title: String,
    pub view: ViewConfig,
    pub base_layers: Vec<BaseLayer>,
    pub legend: Vec<LegendEntry>,
}

/// Map configuration for the frontend: view, base layers and the
/// legend derived from the style table.
pub async fn get_config(State(state): State<AppState>) -> Json<MapConfig> {
    let config = &state.dataset.config;
    let legend = config
        .style_table
        .categories()
        .map(|(category, color)| LegendEntry {
            category: category.to_string(),
            color: color.to_string(),
        })
        .collect();

    Json(MapConfig {
        title: config.title.clone(),
        view: config.view.clone(),
        base_layers: config.base_layers.clone(),
        legend,
    })
}

/// The dataset as GeoJSON with each feature's resolved style embedded
/// in its properties, generated on demand per request.
pub async fn get_features(State(state): State<AppState>) -> Json<FeatureCollection> {
    let mut collection = state.dataset.features.clone();
    for (index, feature) in collection.features.iter_mut().enumerate() {
        let style = state.dataset.config.style_table.resolve(feature);
        let props = feature.properties.get_or_insert_with(Map::new);
        props.insert("_index".to_string(), json!(index));
        if let Some(color) = style.color {
            props.insert("_style_color".to_string(), json!(color));
        }
        props.insert("_style_width".to_string(), json!(style.width));
    }
    Json(collection)
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub feature_index: Option<usize>,
    pub coordinate: [f64; 2],
}

#[derive(Serialize)]
pub struct PopupResponse {
    #[serde(flatten)]
    pub view: PopupViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

fn popup_response(state: &AppState, view: PopupViewState) -> PopupResponse {
    let html = match &view {
        PopupViewState::Shown { rows, .. } => Some(popup::render_html(
            &state.dataset.config.popup.title,
            rows,
        )),
        PopupViewState::Hidden => None,
    };
    PopupResponse { view, html }
}

/// One pointer click. An index that resolves to no feature (absent or
/// out of range) is treated exactly like a click on empty map.
pub async fn post_click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> Result<Json<PopupResponse>, StatusCode> {
    let feature = request
        .feature_index
        .and_then(|index| state.dataset.features.get(index));

    let mut controller = state
        .popup
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let view = controller.click(feature, request.coordinate).clone();
    drop(controller);

    Ok(Json(popup_response(&state, view)))
}

/// Explicit close from the popup's own close control.
pub async fn post_close(
    State(state): State<AppState>,
) -> Result<Json<PopupResponse>, StatusCode> {
    let mut controller = state
        .popup
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let view = controller.close().clone();
    drop(controller);

    Ok(Json(popup_response(&state, view)))
}

/// Current popup state, so a page reload restores what was open.
pub async fn get_popup(
    State(state): State<AppState>,
) -> Result<Json<PopupResponse>, StatusCode> {
    let view = state
        .popup
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .state()
        .clone();

    Ok(Json(popup_response(&state, view)))
}

pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<Settings>, StatusCode> {
    let settings = state
        .settings
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .clone();
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub port: Option<u16>,
    pub dataset: Option<String>,
    pub data_dir: Option<String>,
}

/// Persists settings changes. Dataset and port changes take effect on
/// the next start.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Settings>, StatusCode> {
    let mut settings = state
        .settings
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(port) = update.port {
        settings.port = port;
    }
    if let Some(dataset) = update.dataset {
        settings.dataset = dataset;
    }
    if let Some(data_dir) = update.data_dir {
        settings.data_dir = data_dir;
    }

    settings.save().map_err(|e| {
        tracing::error!("Failed to save settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(settings.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{self, Dataset};
    use crate::interaction::PopupController;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    fn test_state() -> AppState {
        let config = dataset::pilgrimage_routes();
        let features: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "nombre": "Camino X",
                    "longitud": 120,
                    "agrupacion": "Camino Francés"
                },
                "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }
            }]
        }))
        .unwrap();
        let popup_spec = config.popup.clone();
        AppState {
            dataset: Arc::new(Dataset { config, features }),
            popup: Arc::new(Mutex::new(PopupController::new(popup_spec))),
            settings: Arc::new(Mutex::new(Settings::default())),
        }
    }

    #[tokio::test]
    async fn features_carry_resolved_style_properties() {
        let state = test_state();
        let Json(collection) = get_features(State(state)).await;
        let props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(props.get("_style_color"), Some(&json!("yellow")));
        assert_eq!(props.get("_style_width"), Some(&json!(2)));
        assert_eq!(props.get("_index"), Some(&json!(0)));
    }

    #[tokio::test]
    async fn click_hit_then_close_round_trip() {
        let state = test_state();

        let request = ClickRequest {
            feature_index: Some(0),
            coordinate: [42.0, -3.7],
        };
        let Json(response) = post_click(State(state.clone()), Json(request)).await.unwrap();
        assert!(response.view.is_shown());
        let html = response.html.unwrap();
        assert!(html.contains("<h3>Información</h3>"));
        assert!(html.contains("<p><b>Longitud</b>: 120 Km.</p>"));

        let Json(response) = post_close(State(state)).await.unwrap();
        assert_eq!(response.view, PopupViewState::Hidden);
        assert!(response.html.is_none());
    }

    #[tokio::test]
    async fn out_of_range_index_behaves_like_a_miss() {
        let state = test_state();
        let request = ClickRequest {
            feature_index: Some(99),
            coordinate: [0.0, 0.0],
        };
        let Json(response) = post_click(State(state), Json(request)).await.unwrap();
        assert_eq!(response.view, PopupViewState::Hidden);
    }

    #[tokio::test]
    async fn config_legend_lists_every_category() {
        let state = test_state();
        let table_len = state.dataset.config.style_table.colors.len();
        let Json(config) = get_config(State(state)).await;
        assert_eq!(config.legend.len(), table_len);
        assert_eq!(config.base_layers.len(), 3);
    }

    #[test]
    fn popup_response_serializes_with_flattened_state() {
        let state = test_state();
        let response = popup_response(&state, PopupViewState::Hidden);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value.get("state"), Some(&Value::String("hidden".to_string())));
        assert!(value.get("html").is_none());
    }
}
