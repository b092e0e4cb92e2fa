use crate::models::Unit;
use crate::parsers::helpers::element_text;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static UNIT_TILE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.tile.tile-clickable[data-section]").unwrap());
static TOOLTIP: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-original-title]").unwrap());
static TITLE_ATTR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[title]").unwrap());
static UNIT_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".photo-tile-text h3, .tile-text h3").unwrap());

/// Parses the unit tiles of a course page.
///
/// The header tile (section 0) and tiles without a numeric section are never
/// returned. A unit is marked gradable when its tooltip announces an
/// assignment ("Tarefa") or a quiz ("Questionário").
pub fn parse_units_from_html(html: &str) -> Vec<Unit> {
    let document = Html::parse_document(html);

    document
        .select(&UNIT_TILE)
        .filter_map(|tile| {
            let section = tile
                .value()
                .attr("data-section")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|s| *s != 0)?;

            let name = tile
                .select(&UNIT_NAME)
                .next()
                .map(element_text)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Unidade {section}"));

            let tooltip = tooltip_of(tile).unwrap_or_default();
            debug!("Tooltip for section {}: {}", section, tooltip);

            Some(Unit {
                section,
                name,
                has_gradable_activities: announces_gradable_activities(&tooltip),
            })
        })
        .collect()
}

fn tooltip_of(tile: ElementRef<'_>) -> Option<String> {
    if let Some(text) = tile.value().attr("data-original-title") {
        return Some(text.to_string());
    }
    if let Some(text) = tile
        .select(&TOOLTIP)
        .next()
        .and_then(|e| e.value().attr("data-original-title"))
    {
        return Some(text.to_string());
    }
    tile.value()
        .attr("title")
        .or_else(|| {
            tile.select(&TITLE_ATTR)
                .next()
                .and_then(|e| e.value().attr("title"))
        })
        .map(str::to_string)
}

pub fn announces_gradable_activities(tooltip: &str) -> bool {
    if tooltip.contains("Tarefa:") || tooltip.contains("Questionário:") {
        return true;
    }
    let lowered = tooltip.to_lowercase();
    lowered.contains("tarefa") || lowered.contains("questionário")
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURSE_PAGE: &str = r#"
    <ul class="tiles">
      <li class="tile tile-clickable" data-section="0">
        <a data-original-title="Tarefa: Boas-vindas"><div class="tile-text"><h3>Apresentação</h3></div></a>
      </li>
      <li class="tile tile-clickable" data-section="1">
        <a data-original-title="Tarefa: Lista 1&lt;br&gt;Arquivo: Slides">
          <div class="photo-tile-text"><h3>Unidade 1 - Limites</h3></div></a>
      </li>
      <li class="tile tile-clickable" data-section="2">
        <a data-original-title="Arquivo: Leitura complementar">
          <div class="photo-tile-text"><h3>Unidade 2 - Derivadas</h3></div></a>
      </li>
      <li class="tile tile-clickable" data-section="3">
        <a title="2 questionários"><div class="tile-text"></div></a>
      </li>
      <li class="tile tile-clickable" data-section="resumo"><a data-original-title="Tarefa: x"></a></li>
    </ul>"#;

    #[test]
    fn section_zero_is_never_a_unit() {
        let units = parse_units_from_html(COURSE_PAGE);
        assert!(units.iter().all(|u| u.section != 0));
    }

    #[test]
    fn classifies_units_by_tooltip() {
        let units = parse_units_from_html(COURSE_PAGE);
        assert_eq!(
            units,
            vec![
                Unit {
                    section: 1,
                    name: "Unidade 1 - Limites".to_string(),
                    has_gradable_activities: true,
                },
                Unit {
                    section: 2,
                    name: "Unidade 2 - Derivadas".to_string(),
                    has_gradable_activities: false,
                },
                Unit {
                    section: 3,
                    name: "Unidade 3".to_string(),
                    has_gradable_activities: true,
                },
            ]
        );
    }

    #[test]
    fn gradable_tokens() {
        assert!(announces_gradable_activities("Questionário: Prova 1"));
        assert!(announces_gradable_activities("Entregar a TAREFA até sexta"));
        assert!(!announces_gradable_activities("Página: Plano de ensino"));
        assert!(!announces_gradable_activities(""));
    }
}
