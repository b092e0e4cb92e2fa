use crate::error::{Result, ScraperError};
use crate::parsers::helpers::element_text;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

static LOGIN_TOKEN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="logintoken"]"#).unwrap());
static HIDDEN_INPUTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[type="hidden"]"#).unwrap());
static ERROR_BOXES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "div.alert-danger, div.error, div.alert, div.notification, span.error, span.alert, span.notification",
    )
    .unwrap()
});

const LOGOUT_LINK: &str = "login/logout.php";

/// Extracts the one-time anti-forgery token from the login form.
///
/// When the field is missing, every hidden input on the page is logged so a
/// markup change can be diagnosed from the logs alone.
pub fn parse_login_token(html: &str) -> Result<String> {
    let document = Html::parse_document(html);

    if let Some(token) = document
        .select(&LOGIN_TOKEN)
        .next()
        .and_then(|input| input.value().attr("value"))
    {
        return Ok(token.to_string());
    }

    warn!("Could not find the 'logintoken' field on the login page");
    for input in document.select(&HIDDEN_INPUTS) {
        warn!(
            "Hidden input found: {} = {}",
            input.value().attr("name").unwrap_or("<unnamed>"),
            input.value().attr("value").unwrap_or("")
        );
    }

    Err(ScraperError::TokenNotFound)
}

/// The portal sometimes redirects elsewhere after a good login, so either
/// landing on the dashboard or seeing a logout link counts as success.
pub fn is_logged_in(final_url: &Url, body: &str) -> bool {
    let path = final_url.path();
    path == "/my" || path.starts_with("/my/") || body.contains(LOGOUT_LINK)
}

pub fn is_login_page(url: &Url) -> bool {
    url.path().contains("/login")
}

/// Human-readable messages from the error boxes of a failed login response.
pub fn parse_login_errors(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut messages: Vec<String> = Vec::new();

    for element in document.select(&ERROR_BOXES) {
        let text = element_text(element);
        if !text.is_empty() && !messages.contains(&text) {
            messages.push(text);
        }
    }

    messages
}
