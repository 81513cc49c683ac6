use anyhow::{bail, Context};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{EntityReference, EntitySummary, LocalizationRecord, ReferencePage},
    error::CatalogError,
    protocol::{ListResponse, PokemonPayload, SpeciesPayload},
};
use tracing::debug;
use url::Url;

use crate::{filter_references, settings::ClientSettings, CatalogApi};

/// HTTP client for the remote catalog. Holds no state besides its
/// connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    search_index_limit: u32,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_settings(&ClientSettings {
            base_url: base_url.to_string(),
            ..ClientSettings::default()
        })
    }

    pub fn with_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let raw = settings.base_url.trim();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .with_context(|| format!("invalid catalog base url '{raw}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("catalog base url '{raw}' cannot carry a path");
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            search_index_limit: settings.search_index_limit,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn list_url(&self, limit: u32, offset: Option<u32>) -> Url {
        let mut url = self.endpoint(&["pokemon"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.to_string());
            if let Some(offset) = offset {
                query.append_pair("offset", &offset.to_string());
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!(url, "rest: GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| CatalogError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::transport(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| CatalogError::Network(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| CatalogError::Decode(format!("{url}: {err}")))
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_references(
        &self,
        page_size: u32,
        offset: u32,
    ) -> Result<ReferencePage, CatalogError> {
        let url = self.list_url(page_size, Some(offset));
        let listing: ListResponse = self.get_json(url.as_str()).await?;
        Ok(listing.into())
    }

    async fn fetch_summary(&self, key: &str) -> Result<EntitySummary, CatalogError> {
        let url = self.endpoint(&["pokemon", key]);
        match self.get_json::<PokemonPayload>(url.as_str()).await {
            Ok(payload) => Ok(payload.into()),
            Err(CatalogError::Transport { status: 404 }) => Err(CatalogError::not_found(key)),
            Err(err) => Err(err),
        }
    }

    async fn fetch_localization(&self, key: &str) -> Result<LocalizationRecord, CatalogError> {
        let url = self.endpoint(&["pokemon-species", key]);
        let species: SpeciesPayload = self.get_json(url.as_str()).await?;
        Ok(species.into())
    }

    async fn fetch_many_summaries(
        &self,
        references: &[EntityReference],
    ) -> Result<Vec<EntitySummary>, CatalogError> {
        debug!(count = references.len(), "rest: resolving references");
        let payloads = try_join_all(
            references
                .iter()
                .map(|reference| self.get_json::<PokemonPayload>(&reference.url)),
        )
        .await?;
        Ok(payloads.into_iter().map(EntitySummary::from).collect())
    }

    async fn search_references(&self, query: &str) -> Result<Vec<EntityReference>, CatalogError> {
        let url = self.list_url(self.search_index_limit, None);
        let index: ListResponse = self.get_json(url.as_str()).await?;
        let references = ReferencePage::from(index).references;
        Ok(filter_references(references, query))
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
