use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use futures::future::try_join_all;
use shared::{
    domain::{
        Ability, BaseStat, EntityId, EntityReference, EntitySummary, EntityType,
        LocalizationRecord, LocalizedName, LocalizedText, ReferencePage, SpriteUrls,
    },
    error::CatalogError,
};

use crate::{filter_references, CatalogApi};

pub(crate) const FAKE_BASE_URL: &str = "https://catalog.test/api/v2";

pub(crate) fn reference(id: u32, name: &str) -> EntityReference {
    EntityReference::new(name, format!("{FAKE_BASE_URL}/pokemon/{id}/"))
}

pub(crate) fn summary(id: u32, name: &str) -> EntitySummary {
    EntitySummary {
        id: EntityId(id),
        name: name.to_string(),
        types: vec![EntityType {
            type_name: "normal".into(),
        }],
        abilities: vec![Ability {
            ability_name: "run-away".into(),
            is_hidden: false,
        }],
        stats: vec![BaseStat {
            stat_name: "hp".into(),
            base_value: 40,
        }],
        height: 4,
        weight: 60,
        base_experience: Some(100),
        sprites: SpriteUrls::default(),
    }
}

/// In-memory catalog. Every call is keyed (`list:<offset>`, `summary:<key>`,
/// `species:<key>`, `resolve:<name>`, `search:<query>`) and can be delayed or
/// failed per key. Calls are recorded when they start and again when they
/// finish, so a cancelled call shows up only in `started`.
pub(crate) struct FakeCatalog {
    names: Vec<String>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashMap<String, CatalogError>>,
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub(crate) fn from_names(names: Vec<String>) -> Self {
        Self {
            names,
            delays: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            started: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_names(names: &[&str]) -> Self {
        Self::from_names(names.iter().map(|name| name.to_string()).collect())
    }

    pub(crate) fn sized(total: u32) -> Self {
        Self::from_names((1..=total).map(|id| format!("entry-{id}")).collect())
    }

    pub(crate) fn starters() -> Self {
        Self::with_names(&[
            "bulbasaur",
            "ivysaur",
            "venusaur",
            "charmander",
            "charmeleon",
            "charizard",
            "squirtle",
        ])
    }

    pub(crate) fn set_delay(&self, call: &str, delay: Duration) {
        self.delays
            .lock()
            .expect("lock")
            .insert(call.to_string(), delay);
    }

    pub(crate) fn set_failure(&self, call: &str, err: CatalogError) {
        self.failures
            .lock()
            .expect("lock")
            .insert(call.to_string(), err);
    }

    pub(crate) fn clear_failure(&self, call: &str) {
        self.failures.lock().expect("lock").remove(call);
    }

    pub(crate) fn started(&self, prefix: &str) -> Vec<String> {
        Self::matching(&self.started, prefix)
    }

    pub(crate) fn finished(&self, prefix: &str) -> Vec<String> {
        Self::matching(&self.finished, prefix)
    }

    fn matching(calls: &Mutex<Vec<String>>, prefix: &str) -> Vec<String> {
        calls
            .lock()
            .expect("lock")
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn references(&self) -> Vec<EntityReference> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| reference(index as u32 + 1, name))
            .collect()
    }

    async fn call(&self, call: String) -> Result<(), CatalogError> {
        self.started.lock().expect("lock").push(call.clone());
        let delay = self.delays.lock().expect("lock").get(&call).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().expect("lock").get(&call).cloned();
        self.finished.lock().expect("lock").push(call);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn lookup(&self, key: &str) -> Option<(u32, String)> {
        if let Ok(id) = key.parse::<u32>() {
            let name = self.names.get(id.checked_sub(1)? as usize)?;
            return Some((id, name.clone()));
        }
        self.names
            .iter()
            .position(|name| name == key)
            .map(|index| (index as u32 + 1, key.to_string()))
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_references(
        &self,
        page_size: u32,
        offset: u32,
    ) -> Result<ReferencePage, CatalogError> {
        self.call(format!("list:{offset}")).await?;
        let total = self.names.len();
        let start = (offset as usize).min(total);
        let end = (start + page_size as usize).min(total);
        Ok(ReferencePage {
            total_count: total as u32,
            references: self.references()[start..end].to_vec(),
            has_more: end < total,
        })
    }

    async fn fetch_summary(&self, key: &str) -> Result<EntitySummary, CatalogError> {
        self.call(format!("summary:{key}")).await?;
        let (id, name) = self.lookup(key).ok_or_else(|| CatalogError::not_found(key))?;
        Ok(summary(id, &name))
    }

    async fn fetch_localization(&self, key: &str) -> Result<LocalizationRecord, CatalogError> {
        self.call(format!("species:{key}")).await?;
        let (_, name) = self.lookup(key).ok_or_else(|| CatalogError::transport(404))?;
        Ok(LocalizationRecord {
            display_names: vec![LocalizedName {
                language_tag: "ja-Hrkt".into(),
                name: format!("{name}-ja"),
            }],
            descriptions: vec![LocalizedText {
                language_tag: "en".into(),
                text: format!("About {name}."),
            }],
        })
    }

    async fn fetch_many_summaries(
        &self,
        references: &[EntityReference],
    ) -> Result<Vec<EntitySummary>, CatalogError> {
        try_join_all(references.iter().map(|reference| async move {
            self.call(format!("resolve:{}", reference.name)).await?;
            let id = reference
                .id()
                .ok_or_else(|| CatalogError::Decode(reference.url.clone()))?;
            Ok::<_, CatalogError>(summary(id.0, &reference.name))
        }))
        .await
    }

    async fn search_references(&self, query: &str) -> Result<Vec<EntityReference>, CatalogError> {
        self.call(format!("search:{query}")).await?;
        Ok(filter_references(self.references(), query))
    }
}
