//! Response bodies of the remote catalog API. Only the consumed fields are
//! modelled; everything else in the payloads is ignored.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Ability, BaseStat, EntityId, EntityReference, EntitySummary, EntityType, LocalizationRecord,
    LocalizedName, LocalizedText, ReferencePage, SpriteUrls,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<NamedResource>,
}

impl From<ListResponse> for ReferencePage {
    fn from(value: ListResponse) -> Self {
        Self {
            total_count: value.count,
            has_more: value.next.is_some(),
            references: value
                .results
                .into_iter()
                .map(|resource| EntityReference::new(resource.name, resource.url))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEntry {
    pub base_stat: u8,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpritesPayload {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub back_default: Option<String>,
    #[serde(default)]
    pub front_shiny: Option<String>,
    #[serde(default)]
    pub back_shiny: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonPayload {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    pub height: u32,
    pub weight: u32,
    #[serde(default)]
    pub base_experience: Option<u32>,
    #[serde(default)]
    pub sprites: SpritesPayload,
}

impl From<PokemonPayload> for EntitySummary {
    fn from(value: PokemonPayload) -> Self {
        Self {
            id: EntityId(value.id),
            name: value.name,
            types: value
                .types
                .into_iter()
                .map(|slot| EntityType {
                    type_name: slot.kind.name,
                })
                .collect(),
            abilities: value
                .abilities
                .into_iter()
                .map(|slot| Ability {
                    ability_name: slot.ability.name,
                    is_hidden: slot.is_hidden,
                })
                .collect(),
            stats: value
                .stats
                .into_iter()
                .map(|entry| BaseStat {
                    stat_name: entry.stat.name,
                    base_value: entry.base_stat,
                })
                .collect(),
            height: value.height,
            weight: value.weight,
            base_experience: value.base_experience,
            sprites: SpriteUrls {
                front: value.sprites.front_default,
                back: value.sprites.back_default,
                front_alt: value.sprites.front_shiny,
                back_alt: value.sprites.back_shiny,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesName {
    pub name: String,
    pub language: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesPayload {
    #[serde(default)]
    pub names: Vec<SpeciesName>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

impl From<SpeciesPayload> for LocalizationRecord {
    fn from(value: SpeciesPayload) -> Self {
        Self {
            display_names: value
                .names
                .into_iter()
                .map(|entry| LocalizedName {
                    language_tag: entry.language.name,
                    name: entry.name,
                })
                .collect(),
            descriptions: value
                .flavor_text_entries
                .into_iter()
                .map(|entry| LocalizedText {
                    language_tag: entry.language.name,
                    text: entry.flavor_text,
                })
                .collect(),
        }
    }
}
