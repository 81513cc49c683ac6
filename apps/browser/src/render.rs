//! Plain-text rendering of controller snapshots.

use std::fmt::Write as _;

use shared::{
    display::{
        artwork_url, format_height, format_id, format_weight, DISPLAY_NAME_LANGUAGE,
        FALLBACK_DESCRIPTION_LANGUAGE,
    },
    domain::{EntitySummary, LocalizationRecord, PageState},
};

pub fn render_card(entity: &EntitySummary) -> String {
    let types: Vec<_> = entity.types.iter().map(|t| t.type_name.as_str()).collect();
    format!("{} {} [{}]", format_id(entity.id), entity.name, types.join("/"))
}

pub fn render_page(page: &PageState, entities: &[EntitySummary]) -> String {
    let mut out = format!(
        "Page {}/{} ({} entries)\n",
        page.page_index + 1,
        page.total_pages().max(1),
        page.total_count
    );
    for entity in entities {
        let _ = writeln!(out, "  {}", render_card(entity));
    }
    out
}

pub fn render_results(query: &str, results: &[EntitySummary]) -> String {
    if results.is_empty() {
        return format!("No entries match \"{query}\"\n");
    }
    let mut out = format!("{} matches for \"{query}\"\n", results.len());
    for entity in results {
        let _ = writeln!(out, "  {}", render_card(entity));
    }
    out
}

pub fn render_detail(
    entity: &EntitySummary,
    localization: Option<&LocalizationRecord>,
    language_tag: &str,
) -> String {
    let mut out = render_card(entity);
    out.push('\n');

    if let Some(name) = localization.and_then(|l| l.display_name(DISPLAY_NAME_LANGUAGE)) {
        let _ = writeln!(out, "  {name}");
    }
    let _ = writeln!(out, "  height: {}", format_height(entity.height));
    let _ = writeln!(out, "  weight: {}", format_weight(entity.weight));
    if let Some(experience) = entity.base_experience {
        let _ = writeln!(out, "  base experience: {experience}");
    }

    let abilities: Vec<_> = entity
        .abilities
        .iter()
        .map(|a| {
            if a.is_hidden {
                format!("{} (hidden)", a.ability_name)
            } else {
                a.ability_name.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "  abilities: {}", abilities.join(", "));

    for stat in &entity.stats {
        let _ = writeln!(
            out,
            "  {:<16}{:>4} {}",
            stat.stat_name,
            stat.base_value,
            "#".repeat(usize::from(stat.base_value) / 10)
        );
    }
    let _ = writeln!(out, "  artwork: {}", artwork_url(entity.id));

    let description = localization.and_then(|l| {
        l.description(language_tag)
            .or_else(|| l.description(FALLBACK_DESCRIPTION_LANGUAGE))
    });
    if let Some(description) = description {
        let _ = writeln!(out, "\n  {description}");
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
