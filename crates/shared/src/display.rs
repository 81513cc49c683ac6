//! Derived display values. Pure functions of an entry's fields; nothing here
//! touches the network.

use crate::domain::EntityId;

pub const ARTWORK_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";
pub const ANIMATED_SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/versions/generation-v/black-white/animated";

pub const DISPLAY_NAME_LANGUAGE: &str = "ja-Hrkt";
pub const DESCRIPTION_LANGUAGE: &str = "ja";
pub const FALLBACK_DESCRIPTION_LANGUAGE: &str = "en";

pub fn artwork_url(id: EntityId) -> String {
    format!("{ARTWORK_BASE_URL}/{}.png", id.0)
}

pub fn animated_sprite_url(id: EntityId) -> String {
    format!("{ANIMATED_SPRITE_BASE_URL}/{}.gif", id.0)
}

/// `#025` style label, padded to at least three digits.
pub fn format_id(id: EntityId) -> String {
    format!("#{:03}", id.0)
}

pub fn format_height(decimetres: u32) -> String {
    format!("{:.1} m", f64::from(decimetres) / 10.0)
}

pub fn format_weight(hectograms: u32) -> String {
    format!("{:.1} kg", f64::from(hectograms) / 10.0)
}
