use serde::{Deserialize, Serialize};
use url::Url;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

id_newtype!(EntityId);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer into the remote index, not yet resolved to a full entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub name: String,
    pub url: String,
}

impl EntityReference {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Numeric id carried in the `/pokemon/<id>/` segment of the reference url.
    pub fn id(&self) -> Option<EntityId> {
        let url = Url::parse(&self.url).ok()?;
        let mut segments = url.path_segments()?;
        segments.find(|segment| *segment == "pokemon")?;
        let raw = segments.next()?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok().map(EntityId)
    }
}

/// One page of the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePage {
    pub total_count: u32,
    pub references: Vec<EntityReference>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub ability_name: String,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStat {
    pub stat_name: String,
    pub base_value: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteUrls {
    pub front: Option<String>,
    pub back: Option<String>,
    pub front_alt: Option<String>,
    pub back_alt: Option<String>,
}

/// Fully resolved catalog entry. Height is in decimetres, weight in hectograms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: EntityId,
    pub name: String,
    pub types: Vec<EntityType>,
    pub abilities: Vec<Ability>,
    pub stats: Vec<BaseStat>,
    pub height: u32,
    pub weight: u32,
    pub base_experience: Option<u32>,
    pub sprites: SpriteUrls,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub language_tag: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language_tag: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationRecord {
    pub display_names: Vec<LocalizedName>,
    pub descriptions: Vec<LocalizedText>,
}

impl LocalizationRecord {
    pub fn display_name(&self, language_tag: &str) -> Option<&str> {
        self.display_names
            .iter()
            .find(|entry| entry.language_tag == language_tag)
            .map(|entry| entry.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// First description in `language_tag`, with line and form feeds flattened to spaces.
    pub fn description(&self, language_tag: &str) -> Option<String> {
        self.descriptions
            .iter()
            .find(|entry| entry.language_tag == language_tag)
            .map(|entry| entry.text.replace(['\n', '\u{c}'], " "))
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub page_index: u32,
    pub page_size: u32,
    pub total_count: u32,
    pub has_more: bool,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            total_count: 0,
            has_more: true,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_count.div_ceil(self.page_size)
    }

    pub fn offset(&self) -> u32 {
        self.page_index.saturating_mul(self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn next_index(&self) -> Option<u32> {
        self.has_more.then_some(self.page_index + 1)
    }

    pub fn prev_index(&self) -> Option<u32> {
        self.page_index.checked_sub(1)
    }

    /// `Some(page)` when `page` addresses an existing page of the last known total.
    pub fn checked_index(&self, page: u32) -> Option<u32> {
        (page < self.total_pages()).then_some(page)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub raw_query: String,
    pub settled_query: String,
}
