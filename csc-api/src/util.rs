use itertools::Itertools;
use scraper::ElementRef;

pub const BASE_DOMAIN: &str = "my.compscicenter.ru";
pub const BASE_URL: &str = "https://my.compscicenter.ru";
pub const ASSIGNMENTS_PATH: &str = "/teaching/assignments";
pub const SUBMISSIONS_PATH: &str = "/submissions";
pub const SESSION_COOKIE: &str = "cscsessionid";

pub fn csc_url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

/// Prefix shared by every submission permalink linked from an assignment page.
pub fn submissions_url_prefix() -> String {
    csc_url(&format!("{ASSIGNMENTS_PATH}{SUBMISSIONS_PATH}"))
}

/// Text content of an element with runs of whitespace collapsed to single spaces.
pub fn text(el: ElementRef) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().join(" ")
}

/// Space-joined [`text`] of every element, empty when there are none.
pub fn joined_text<'a>(els: impl Iterator<Item = ElementRef<'a>>) -> String {
    els.map(text).filter(|content| !content.is_empty()).join(" ")
}
