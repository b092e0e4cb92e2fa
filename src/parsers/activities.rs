use crate::models::{Activity, ActivityKind, Unit};
use crate::parsers::helpers::{activity_title, is_late_submission};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Selectors tried in order on a unit page. Link selectors come first so an
/// activity matched by both a link and its list item keeps the link's title.
static SECTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"a[href*="mod/assign"]"#,
        r#"a[href*="mod/quiz"]"#,
        r#"a[href*="mod/workshop"]"#,
        r#"a[href*="mod/feedback"]"#,
        "li.activity.assign",
        "li.activity.quiz",
        "li.activity.workshop",
        ".modtype_assign",
        ".modtype_quiz",
        ".modtype_workshop",
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

static MODULE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="mod/"]"#).unwrap());

/// Module names that mark a gradable link in the broad unit-page scan.
const GRADABLE_MODULES: [&str; 4] = ["assign", "quiz", "workshop", "feedback"];

/// Module path segments accepted by the course main-page fallback.
const KNOWN_MODULE_PATHS: [&str; 7] = [
    "mod/assign",
    "mod/quiz",
    "mod/workshop",
    "mod/feedback",
    "mod/forum",
    "mod/folder",
    "mod/page",
];

/// An activity link found on a page, before its due date is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLink {
    pub title: String,
    /// Absolute activity URL.
    pub url: String,
    pub kind: ActivityKind,
}

impl ActivityLink {
    pub fn into_activity(self, due_date: Option<NaiveDate>, unit: Option<&Unit>) -> Activity {
        Activity {
            title: self.title,
            url: self.url,
            kind: self.kind,
            due_date,
            unit_name: unit.map(|u| u.name.clone()),
            unit_number: unit.map(|u| u.section),
        }
    }
}

/// Activity URLs already emitted during one course crawl.
#[derive(Debug, Default)]
pub struct SeenUrls(HashSet<String>);

impl SeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url`, returning `false` if it was already recorded.
    pub fn insert(&mut self, url: &str) -> bool {
        self.0.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Extracts the activities listed on a unit page.
///
/// The specific selectors run first; only when they produce nothing is every
/// module link with a gradable module name considered.
pub fn parse_section_activities(html: &str, page_url: &Url, seen: &mut SeenUrls) -> Vec<ActivityLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for selector in SECTION_SELECTORS.iter() {
        for element in document.select(selector) {
            let link = if element.value().name() == "a" {
                Some(element)
            } else {
                element.select(&MODULE_LINK).next()
            };
            let Some(link) = link else {
                continue;
            };
            if let Some(activity) = candidate(element, link, page_url, seen) {
                links.push(activity);
            }
        }
    }

    if links.is_empty() {
        debug!("No activity matched the unit selectors on {}, scanning all module links", page_url);
        for link in document.select(&MODULE_LINK) {
            let href = link.value().attr("href").unwrap_or_default();
            if !GRADABLE_MODULES.iter().any(|m| href.contains(m)) {
                continue;
            }
            if let Some(activity) = candidate(link, link, page_url, seen) {
                links.push(activity);
            }
        }
    }

    links
}

/// Fallback for courses whose tiles announce nothing gradable: scans the
/// course page itself for links to known module types.
pub fn parse_main_page_activities(html: &str, page_url: &Url, seen: &mut SeenUrls) -> Vec<ActivityLink> {
    let document = Html::parse_document(html);

    let links: Vec<ActivityLink> = document
        .select(&MODULE_LINK)
        .filter(|link| {
            let href = link.value().attr("href").unwrap_or_default();
            KNOWN_MODULE_PATHS.iter().any(|m| href.contains(m))
        })
        .filter_map(|link| candidate(link, link, page_url, seen))
        .collect();

    debug!("Main page of {} yielded {} activity links", page_url, links.len());
    links
}

fn candidate(
    element: ElementRef<'_>,
    link: ElementRef<'_>,
    page_url: &Url,
    seen: &mut SeenUrls,
) -> Option<ActivityLink> {
    let href = link.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    let url = page_url.join(href).ok()?.to_string();
    if !seen.insert(&url) {
        return None;
    }

    let title = activity_title(element, Some(link));
    if is_late_submission(&title) {
        debug!("Skipping late-submission entry: {}", title);
        return None;
    }

    let kind = ActivityKind::from_url(&url);
    Some(ActivityLink { title, url, kind })
}
