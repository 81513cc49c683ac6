use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    /// Matches resolved into full entries per settled search.
    pub search_result_cap: usize,
    /// `limit` used when downloading the reference index for search.
    pub search_index_limit: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            page_size: 20,
            debounce_ms: 300,
            search_result_cap: 20,
            search_index_limit: 10_000,
        }
    }
}

impl ClientSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
