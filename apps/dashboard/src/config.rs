use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub seed_path: Option<PathBuf>,
    pub initial_user: String,
    pub currency: String,
    pub log_filter: String,
    pub activity_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_path: None,
            initial_user: "U1".into(),
            currency: "QR".into(),
            log_filter: "info".into(),
            activity_limit: 5,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    seed_path: Option<PathBuf>,
    initial_user: Option<String>,
    currency: Option<String>,
    log_filter: Option<String>,
    activity_limit: Option<usize>,
}

/// Defaults, then `path` if it exists and parses, then environment overrides.
pub fn load_settings(path: &Path) -> Settings {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => {
                // logging is not up yet; the filter may come from this file
                eprintln!("ignoring malformed config '{}': {err}", path.display());
            }
        }
    }

    if let Some(v) = env("DASHBOARD_SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }
    if let Some(v) = env("APP__SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env("DASHBOARD_USER") {
        settings.initial_user = v;
    }
    if let Some(v) = env("APP__USER") {
        settings.initial_user = v;
    }

    if let Some(v) = env("APP__CURRENCY") {
        settings.currency = v;
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("APP__ACTIVITY_LIMIT") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.activity_limit = parsed;
        }
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.seed_path {
        settings.seed_path = Some(v);
    }
    if let Some(v) = file_cfg.initial_user {
        settings.initial_user = v;
    }
    if let Some(v) = file_cfg.currency {
        settings.currency = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.activity_limit {
        settings.activity_limit = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
