use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Which capture groups hold the date parts for a given pattern.
#[derive(Clone, Copy)]
enum Layout {
    /// day, month name, year at the given group indices.
    NamedMonth { day: usize, month: usize, year: usize },
    /// day, month, year as numbers.
    DayMonthYear,
    /// year, month, day as numbers.
    YearMonthDay,
}

struct DatePattern {
    regex: Regex,
    layout: Layout,
}

impl DatePattern {
    fn new(pattern: &str, layout: Layout) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            layout,
        }
    }
}

static DATE_PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    vec![
        // domingo, 9 Nov 2025, 23:59
        DatePattern::new(
            r"(?i)(\w+),\s*(\d{1,2})\s+(\w+)\s+(\d{4}),\s*(\d{1,2}):(\d{2})",
            Layout::NamedMonth { day: 2, month: 3, year: 4 },
        ),
        // 9 Nov 2025, 23:59
        DatePattern::new(
            r"(?i)(\d{1,2})\s+(\w+)\s+(\d{4}),\s*(\d{1,2}):(\d{2})",
            Layout::NamedMonth { day: 1, month: 2, year: 3 },
        ),
        // 9 de novembro de 2025
        DatePattern::new(
            r"(?i)(\d{1,2})\s+de\s+(\w+)\s+de\s+(\d{4})",
            Layout::NamedMonth { day: 1, month: 2, year: 3 },
        ),
        // 9 novembro 2025
        DatePattern::new(
            r"(?i)(\d{1,2})\s+(\w+)\s+(\d{4})",
            Layout::NamedMonth { day: 1, month: 2, year: 3 },
        ),
        DatePattern::new(r"(\d{1,2})/(\d{1,2})/(\d{4})", Layout::DayMonthYear),
        DatePattern::new(r"(\d{1,2})-(\d{1,2})-(\d{4})", Layout::DayMonthYear),
        DatePattern::new(r"(\d{4})-(\d{1,2})-(\d{1,2})", Layout::YearMonthDay),
    ]
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

const MONTHS: [(&str, &str, u32); 12] = [
    ("janeiro", "jan", 1),
    ("fevereiro", "fev", 2),
    ("março", "mar", 3),
    ("abril", "abr", 4),
    ("maio", "mai", 5),
    ("junho", "jun", 6),
    ("julho", "jul", 7),
    ("agosto", "ago", 8),
    ("setembro", "set", 9),
    ("outubro", "out", 10),
    ("novembro", "nov", 11),
    ("dezembro", "dez", 12),
];

const DEADLINE_KEYWORDS: [&str; 5] = ["até", "prazo", "entrega", "vencimento", "aceitará envios"];

/// Looks up a Portuguese month by full name or three-letter abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(full, abbr, _)| name == *full || name == *abbr)
        .map(|(_, _, number)| *number)
}

/// Converts free-form Portuguese deadline text into a calendar date.
///
/// Structural patterns are tried first, in a fixed order; every match of one
/// pattern is attempted before moving to the next. A match whose month name is
/// unknown or whose numbers are out of range is skipped.
///
/// As a last resort, when the text mentions a deadline keyword and holds at
/// least three numbers, the first three are read as day, month and year. That
/// heuristic can pick the wrong numbers on unexpected layouts.
///
/// ```
/// use chrono::NaiveDate;
/// use unatrack_core::parse_due_date;
///
/// assert_eq!(
///     parse_due_date("domingo, 9 Nov 2025, 23:59"),
///     NaiveDate::from_ymd_opt(2025, 11, 9)
/// );
/// assert_eq!(parse_due_date("9 Xyz 2025"), None);
/// ```
pub fn parse_due_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for pattern in DATE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            if let Some(date) = date_from_captures(&caps, pattern.layout) {
                return Some(date);
            }
        }
    }

    let lowered = text.to_lowercase();
    if DEADLINE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        let numbers: Vec<&str> = NUMBER.find_iter(text).map(|m| m.as_str()).take(3).collect();
        if let [day, month, year] = numbers[..] {
            let year = if year.len() == 2 {
                format!("20{year}")
            } else {
                year.to_string()
            };
            if let Some(date) = ymd(&year, month, day) {
                return Some(date);
            }
        }
    }

    debug!("Could not parse a date from: {}", text);
    None
}

fn date_from_captures(caps: &Captures<'_>, layout: Layout) -> Option<NaiveDate> {
    match layout {
        Layout::NamedMonth { day, month, year } => {
            let month = month_number(caps.get(month)?.as_str())?;
            let day = caps.get(day)?.as_str().parse().ok()?;
            let year = caps.get(year)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        Layout::DayMonthYear => ymd(&caps[3], &caps[2], &caps[1]),
        Layout::YearMonthDay => ymd(&caps[1], &caps[2], &caps[3]),
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
