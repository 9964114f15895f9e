use std::sync::{Arc, Mutex};

use crate::dataset::Dataset;
use crate::interaction::PopupController;
use crate::settings::Settings;

// Application state for sharing the loaded dataset, popup state machine
// and settings across handlers
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub popup: Arc<Mutex<PopupController>>,
    pub settings: Arc<Mutex<Settings>>,
}
