use async_trait::async_trait;
use shared::{
    domain::{EntityReference, EntitySummary, LocalizationRecord, ReferencePage},
    error::CatalogError,
};

mod controller;
pub mod detail;
pub mod list;
pub mod rest;
pub mod search;
pub mod sequence;
pub mod settings;

pub use detail::{DetailController, DetailSnapshot};
pub use list::{ListController, ListSnapshot};
pub use rest::CatalogClient;
pub use search::{SearchController, SearchPhase, SearchSnapshot};
pub use settings::ClientSettings;

/// Read-only access to the remote catalog. No implementation retries; that
/// decision belongs to the controllers' callers.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_references(
        &self,
        page_size: u32,
        offset: u32,
    ) -> Result<ReferencePage, CatalogError>;

    /// Fails with [`CatalogError::NotFound`] when the remote has no such entry.
    async fn fetch_summary(&self, key: &str) -> Result<EntitySummary, CatalogError>;

    async fn fetch_localization(&self, key: &str) -> Result<LocalizationRecord, CatalogError>;

    /// Resolves every reference, all or nothing. Output order follows input
    /// order whatever order the individual requests complete in.
    async fn fetch_many_summaries(
        &self,
        references: &[EntityReference],
    ) -> Result<Vec<EntitySummary>, CatalogError>;

    async fn search_references(&self, query: &str) -> Result<Vec<EntityReference>, CatalogError>;
}

/// Keeps the references whose name contains `query`, trimmed and compared
/// case-insensitively. Index order is preserved.
pub fn filter_references(references: Vec<EntityReference>, query: &str) -> Vec<EntityReference> {
    let needle = query.trim().to_lowercase();
    references
        .into_iter()
        .filter(|reference| reference.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
