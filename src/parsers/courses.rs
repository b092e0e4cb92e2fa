use crate::models::Course;
use crate::parsers::helpers::element_text;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

static NAV_DRAWER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#nav-drawer").unwrap());
static DROPDOWN_MENU: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.dropdown-menu").unwrap());
static COURSE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="course/view.php?id="]"#).unwrap());
static MEDIA_BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.media-body").unwrap());

/// Section heading rendered with the same markup as the course links.
const SECTION_HEADING: &str = "Minhas disciplinas";

/// Parses the dashboard to list the enrolled courses.
///
/// Courses come from the navigation drawer; when it holds none, the dropdown
/// menus are scanned instead. Returns an empty list when neither matches.
pub fn parse_courses_from_html(html: &str) -> Vec<Course> {
    let document = Html::parse_document(html);

    let mut courses = Vec::new();
    for drawer in document.select(&NAV_DRAWER) {
        collect_courses(drawer, &mut courses, |link| {
            link.select(&MEDIA_BODY).next().map(element_text)
        });
    }

    if courses.is_empty() {
        debug!("No courses in the navigation drawer, trying the dropdown menus");
        for menu in document.select(&DROPDOWN_MENU) {
            collect_courses(menu, &mut courses, |link| Some(element_text(link)));
        }
    }

    info!("Found {} courses on the dashboard", courses.len());
    courses
}

fn collect_courses<F>(container: ElementRef<'_>, courses: &mut Vec<Course>, label: F)
where
    F: Fn(ElementRef<'_>) -> Option<String>,
{
    for link in container.select(&COURSE_LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(name) = label(link).filter(|n| !n.is_empty() && n != SECTION_HEADING) else {
            continue;
        };
        if courses.iter().any(|c| c.href.as_deref() == Some(href)) {
            continue;
        }
        courses.push(Course::new(name, Some(href.to_string())));
    }
}
