use crate::sync::StoredActivity;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 3;

/// An activity that should be included in a due-date reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertItem {
    pub title: String,
    pub course_name: String,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
}

/// A user's lookahead preference, where an unset or zero value means the default.
pub fn lookahead_or_default(days: Option<u32>) -> u32 {
    days.filter(|d| *d > 0).unwrap_or(DEFAULT_LOOKAHEAD_DAYS)
}

/// Selects the activities due within `[today, today + lookahead_days]` that are
/// neither completed nor already alerted, earliest first.
pub fn pending_alerts(
    activities: &[StoredActivity],
    today: NaiveDate,
    lookahead_days: u32,
) -> Vec<AlertItem> {
    let horizon = today
        .checked_add_days(Days::new(lookahead_days.into()))
        .unwrap_or(NaiveDate::MAX);

    let mut items: Vec<AlertItem> = activities
        .iter()
        .filter(|a| !a.completed && !a.alert_sent)
        .filter_map(|a| {
            let due_date = a.due_date?;
            (today..=horizon).contains(&due_date).then(|| AlertItem {
                title: a.title.clone(),
                course_name: a.course_name.clone(),
                due_date,
                days_until_due: (due_date - today).num_days(),
            })
        })
        .collect();

    items.sort_by_key(|item| item.due_date);
    items
}

/// Subject line of the reminder email for `count` activities.
pub fn alert_subject(count: usize) -> String {
    if count > 1 {
        format!("UnaTrack: {count} atividades próximas do vencimento")
    } else {
        format!("UnaTrack: {count} atividade próxima do vencimento")
    }
}
