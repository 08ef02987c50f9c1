//! Riego - Garden Watering Log
//!
//! Keeps per-plant watering schedules and a watering history, and derives
//! which plants need water today.

use serde::{Deserialize, Serialize};

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod seed;
pub mod state;
pub mod watering;

use config::Settings;
use state::AppState;

/// Get application info
pub fn get_app_info() -> AppInfo {
    AppInfo {
        name: "Riego".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Garden Watering Log".to_string(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Load the garden and print the watering dashboard as JSON.
pub fn run() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let info = get_app_info();
    log::info!("{} {} - {}", info.name, info.version, info.description);

    let settings = Settings::from_env()?;
    let app_state = AppState::load(&settings)?;

    let dashboard = commands::get_watering_dashboard(&app_state).map_err(anyhow::Error::msg)?;
    log::info!(
        "{} plants need water, {} due today",
        dashboard.needing_water.len(),
        dashboard.due_today.len()
    );
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    Ok(())
}
