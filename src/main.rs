use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// Import modules
mod dataset;
mod feature;
mod interaction;
mod map_page;
mod popup;
mod server;
mod settings;
mod style;

use dataset::Dataset;
use interaction::PopupController;
use server::{start_server, AppState};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("Failed to load settings")?;

    let Some(config) = dataset::variant_by_id(&settings.dataset) else {
        let known: Vec<String> = dataset::all_variants().into_iter().map(|v| v.id).collect();
        bail!(
            "Unknown dataset '{}' (available: {})",
            settings.dataset,
            known.join(", ")
        );
    };

    info!("Loading dataset '{}' ({})", config.title, config.id);
    let dataset = Dataset::load(config, Path::new(&settings.data_dir))
        .context("Failed to load dataset")?;
    info!("Loaded {} features from {}", dataset.features.len(), dataset.config.data_file);
    if dataset.features.is_empty() {
        warn!("Dataset contains no features; the map will be empty");
    }

    warn_uncovered_categories(&dataset);

    let popup_spec = dataset.config.popup.clone();
    let port = settings.port;
    let app_state = AppState {
        dataset: Arc::new(dataset),
        popup: Arc::new(Mutex::new(PopupController::new(popup_spec))),
        settings: Arc::new(Mutex::new(settings)),
    };

    start_server(app_state, port).await
}

/// Logs category values present in the data but absent from the style
/// table. Those features still render, with an undefined color.
fn warn_uncovered_categories(dataset: &Dataset) {
    let table = &dataset.config.style_table;
    let mut uncovered: Vec<&str> = dataset
        .features
        .features
        .iter()
        .filter_map(|f| f.attr(&table.category_attr))
        .filter_map(|v| v.as_str())
        .filter(|category| !table.colors.contains_key(*category))
        .collect();
    uncovered.sort_unstable();
    uncovered.dedup();

    for category in uncovered {
        warn!("No style entry for category '{}'", category);
    }
}
