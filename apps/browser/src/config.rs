use std::{fs, io, path::Path};

use client_core::ClientSettings;
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    search_result_cap: Option<usize>,
    search_index_limit: Option<u32>,
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            if let Err(err) = apply_file_overrides(&mut settings, &raw) {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "config: ignoring malformed settings file"
                );
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config: settings file unreadable");
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file.search_result_cap {
        settings.search_result_cap = v;
    }
    if let Some(v) = file.search_index_limit {
        settings.search_index_limit = v;
    }
    Ok(())
}

/// `APP__*` names win over `CATALOG_*` names. Unparseable numbers are ignored.
pub fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CATALOG_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    for key in ["CATALOG_PAGE_SIZE", "APP__PAGE_SIZE"] {
        if let Some(parsed) = lookup(key).and_then(|v| v.parse().ok()) {
            settings.page_size = parsed;
        }
    }
    for key in ["CATALOG_DEBOUNCE_MS", "APP__DEBOUNCE_MS"] {
        if let Some(parsed) = lookup(key).and_then(|v| v.parse().ok()) {
            settings.debounce_ms = parsed;
        }
    }
    for key in ["CATALOG_SEARCH_RESULT_CAP", "APP__SEARCH_RESULT_CAP"] {
        if let Some(parsed) = lookup(key).and_then(|v| v.parse().ok()) {
            settings.search_result_cap = parsed;
        }
    }
    for key in ["CATALOG_SEARCH_INDEX_LIMIT", "APP__SEARCH_INDEX_LIMIT"] {
        if let Some(parsed) = lookup(key).and_then(|v| v.parse().ok()) {
            settings.search_index_limit = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
