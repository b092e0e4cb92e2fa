//! Due-date extraction from an activity page.
//!
//! The page is run through an ordered table of strategies. Each one captures
//! a span of text and hands it to [`parse_due_date`]; the first strategy whose
//! text parses wins. The later strategies are looser and can pick up
//! unrelated numbers, which is why the order is fixed.

use crate::parsers::date::parse_due_date;
use crate::parsers::helpers::{
    after_closing_phrase, contains_closing_phrase, element_text, next_element_named,
    next_sibling_cell, text_nodes,
};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// One way of locating a due date on an activity page.
pub struct DueDateStrategy {
    pub name: &'static str,
    /// Whether the strategy should run for the given activity URL.
    pub applies: fn(&str) -> bool,
    pub extract: fn(&Html) -> Option<NaiveDate>,
}

/// Strategies in priority order.
pub static STRATEGIES: [DueDateStrategy; 5] = [
    DueDateStrategy {
        name: "quiz close",
        applies: is_quiz_url,
        extract: quiz_close_date,
    },
    DueDateStrategy {
        name: "due date table",
        applies: always,
        extract: due_date_table,
    },
    DueDateStrategy {
        name: "submission status",
        applies: always,
        extract: submission_status,
    },
    DueDateStrategy {
        name: "deadline keyword",
        applies: always,
        extract: deadline_keyword,
    },
    DueDateStrategy {
        name: "table sweep",
        applies: always,
        extract: table_sweep,
    },
];

const DUE_DATE_LABEL: &str = "Data de entrega";
const SUBMISSION_STATUS: &str = "Status de envio";
const TABLE_KEYWORDS: [&str; 5] = ["prazo", "vencimento", "até", "entrega", "data"];

static QUIZ_INFO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.box.quizinfo").unwrap());
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static LABEL_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3, h4").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static DEADLINE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)aceitará envios|prazo|até|vencimento|entrega").unwrap());

fn is_quiz_url(url: &str) -> bool {
    url.contains("mod/quiz")
}

fn always(_: &str) -> bool {
    true
}

/// Runs the strategy chain over an activity page.
pub fn parse_due_date_from_html(html: &str, activity_url: &str) -> Option<NaiveDate> {
    let document = Html::parse_document(html);

    let found = STRATEGIES
        .iter()
        .filter(|strategy| (strategy.applies)(activity_url))
        .find_map(|strategy| {
            let date = (strategy.extract)(&document)?;
            debug!("Due date {} found by the {} strategy", date, strategy.name);
            Some(date)
        });

    if found.is_none() {
        debug!("No due date found for: {}", activity_url);
    }
    found
}

fn quiz_close_date(document: &Html) -> Option<NaiveDate> {
    for info_box in document.select(&QUIZ_INFO) {
        for paragraph in info_box.select(&PARAGRAPH) {
            let text = element_text(paragraph);
            if let Some(date) = after_closing_phrase(&text).and_then(parse_due_date) {
                return Some(date);
            }
        }
    }

    // Some themes render the closing sentence outside the info box.
    let (text, _) = text_nodes(document).find(|(text, _)| contains_closing_phrase(text))?;
    after_closing_phrase(text).and_then(parse_due_date)
}

fn due_date_table(document: &Html) -> Option<NaiveDate> {
    let from_sibling = document
        .select(&LABEL_CELL)
        .filter(|cell| element_text(*cell) == DUE_DATE_LABEL)
        .filter_map(next_sibling_cell)
        .find_map(|value| parse_due_date(&element_text(value)));
    if from_sibling.is_some() {
        return from_sibling;
    }

    for row in document.select(&ROW) {
        if !element_text(row).contains(DUE_DATE_LABEL) {
            continue;
        }
        let cells: Vec<ElementRef<'_>> = row.select(&LABEL_CELL).collect();
        for (i, cell) in cells.iter().enumerate() {
            if !element_text(*cell).contains(DUE_DATE_LABEL) {
                continue;
            }
            if let Some(date) = cells
                .get(i + 1)
                .and_then(|value| parse_due_date(&element_text(*value)))
            {
                return Some(date);
            }
        }
    }

    None
}

fn submission_status(document: &Html) -> Option<NaiveDate> {
    let heading = document
        .select(&HEADING)
        .find(|h| element_text(*h).contains(SUBMISSION_STATUS))?;
    let container = next_element_named(document, heading, "div")?;
    parse_due_date(&element_text(container))
}

fn deadline_keyword(document: &Html) -> Option<NaiveDate> {
    let (_, parent) = text_nodes(document).find(|(text, _)| DEADLINE_KEYWORD.is_match(text))?;
    parse_due_date(&element_text(parent))
}

fn table_sweep(document: &Html) -> Option<NaiveDate> {
    document.select(&TABLE).find_map(|table| {
        let text = element_text(table);
        let lowered = text.to_lowercase();
        if TABLE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            parse_due_date(&text)
        } else {
            None
        }
    })
}
