use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn file_overrides_replace_only_present_keys() {
    let mut settings = ClientSettings::default();
    apply_file_overrides(
        &mut settings,
        "base_url = \"http://localhost:9000\"\npage_size = 50\n",
    )
    .expect("parse");

    assert_eq!(settings.base_url, "http://localhost:9000");
    assert_eq!(settings.page_size, 50);
    assert_eq!(settings.debounce_ms, ClientSettings::default().debounce_ms);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = ClientSettings::default();
    assert!(apply_file_overrides(&mut settings, "bind_addr = \"0.0.0.0\"").is_err());
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn app_prefixed_env_wins_over_catalog_prefix() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("CATALOG_BASE_URL", "http://a.test"),
            ("APP__BASE_URL", "http://b.test"),
            ("CATALOG_PAGE_SIZE", "10"),
            ("APP__DEBOUNCE_MS", "150"),
        ]),
    );

    assert_eq!(settings.base_url, "http://b.test");
    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.debounce_ms, 150);
}

#[test]
fn env_overrides_the_search_index_limit() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[("CATALOG_SEARCH_INDEX_LIMIT", "1500")]),
    );
    assert_eq!(settings.search_index_limit, 1500);

    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("CATALOG_SEARCH_INDEX_LIMIT", "1500"),
            ("APP__SEARCH_INDEX_LIMIT", "3000"),
        ]),
    );
    assert_eq!(settings.search_index_limit, 3000);
}

#[test]
fn unparseable_env_numbers_are_ignored() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[("CATALOG_PAGE_SIZE", "lots"), ("APP__SEARCH_RESULT_CAP", "-1")]),
    );
    assert_eq!(settings.page_size, 20);
    assert_eq!(settings.search_result_cap, 20);
}

#[test]
fn load_settings_reads_file_when_present() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("catalog_browser_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(CONFIG_FILE);
    fs::write(&path, "search_index_limit = 2000\n").expect("write config");

    let settings = load_settings(&path);
    assert_eq!(settings.search_index_limit, 2000);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let settings = load_settings(Path::new("definitely/not/here/catalog.toml"));
    assert_eq!(settings.search_index_limit, ClientSettings::default().search_index_limit);
}
