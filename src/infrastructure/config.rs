use serde::{Deserialize, Serialize};

use crate::application::card_type::CardDefaults;

const ENV_PREFIX: &str = "CARD_CANVAS";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub dashboard: DashboardSettings,
    pub data: DataSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    pub server: ServerSettings,
    #[serde(default)]
    pub cards: CardDefaults,
}

/// Page chrome handed to the front end as is
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct DashboardSettings {
    pub title: String,
    pub subtitle: String,
    pub logo: Option<String>,
    pub grid_compact_type: String,
    pub grid_row_height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    pub main: String,
    pub positions: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LayoutSettings {
    /// Layout file; layouts are kept in memory only when unset
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

/// Load `config/dashboard.toml` (optional) layered with `CARD_CANVAS__*`
/// environment variables, e.g. `CARD_CANVAS__SERVER__BIND=127.0.0.1:9000`
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/dashboard")
}

pub fn load_app_config_from(file: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("dashboard.title", "Marathon Dashboard")?
        .set_default("dashboard.subtitle", "Dashboard for marathon data")?
        .set_default("dashboard.grid_compact_type", "vertical")?
        .set_default("dashboard.grid_row_height", 100)?
        .set_default("data.main", "data/main.json")?
        .set_default("data.positions", "data/positions.json")?
        .set_default("server.bind", "0.0.0.0:8080")?
        .add_source(config::File::with_name(file).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
