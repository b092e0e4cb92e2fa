//! Small extraction routines shared by the page parsers.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub(crate) const UNNAMED_ACTIVITY: &str = "Atividade sem nome";

const LATE_SUBMISSION_MARKERS: [&str; 3] = [
    "envio de tarefa fora do prazo",
    "envio de tarefa fora de prazo",
    "fora do prazo",
];

static TITLE_SELECTORS: LazyLock<[Selector; 4]> = LazyLock::new(|| {
    [
        Selector::parse(".instancename").unwrap(),
        Selector::parse(".activityname").unwrap(),
        Selector::parse("span.instancename").unwrap(),
        Selector::parse(".activity-title").unwrap(),
    ]
});

static CLOSING_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)será fechado em").unwrap());

/// Text of an element with its text nodes joined by spaces and whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn usable_title(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    (candidate.chars().count() > 2).then(|| candidate.to_string())
}

/// Resolves an activity title, trying the dedicated name element, the link
/// text, the link's `title`/`aria-label`, and the first non-blank line of the
/// element's text, in that order.
pub(crate) fn activity_title(element: ElementRef<'_>, link: Option<ElementRef<'_>>) -> String {
    for selector in TITLE_SELECTORS.iter() {
        if let Some(title) = element
            .select(selector)
            .next()
            .and_then(|name| usable_title(&element_text(name)))
        {
            return title;
        }
    }

    if let Some(link) = link {
        if let Some(title) = usable_title(&element_text(link)) {
            return title;
        }
        let attribute = link
            .value()
            .attr("title")
            .or_else(|| link.value().attr("aria-label"));
        if let Some(title) = attribute.and_then(usable_title) {
            return title;
        }
    }

    let raw_text = element.text().collect::<String>();
    raw_text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(usable_title)
        .unwrap_or_else(|| UNNAMED_ACTIVITY.to_string())
}

/// Late-submission links are administrative entries, not real activities.
pub(crate) fn is_late_submission(title: &str) -> bool {
    let title = title.to_lowercase();
    LATE_SUBMISSION_MARKERS.iter().any(|m| title.contains(m))
}

/// The part of a quiz sentence after "será fechado em", if the phrase is present.
pub(crate) fn after_closing_phrase(text: &str) -> Option<&str> {
    let found = CLOSING_PHRASE.find_iter(text).last()?;
    Some(text[found.end()..].trim())
}

pub(crate) fn contains_closing_phrase(text: &str) -> bool {
    CLOSING_PHRASE.is_match(text)
}

/// Walks every text node of the document in order, skipping script and style content.
pub(crate) fn text_nodes(document: &Html) -> impl Iterator<Item = (&str, ElementRef<'_>)> {
    document.root_element().descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let parent = node.parent().and_then(ElementRef::wrap)?;
        if matches!(parent.value().name(), "script" | "style") {
            return None;
        }
        Some((&**text, parent))
    })
}

/// The first `<td>` after `cell` within the same row.
pub(crate) fn next_sibling_cell(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "td")
}

/// The first element named `tag` that follows `anchor` in document order.
pub(crate) fn next_element_named<'a>(
    document: &'a Html,
    anchor: ElementRef<'a>,
    tag: &str,
) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == tag)
}
