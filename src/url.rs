//! Generates output URLs by executing a path template against a placeholder
//! mapping and normalizing the result.

use crate::template::{Payload, Result, Templater};

/// Executes `template` against `placeholders` and normalizes the result (see
/// [`normalize`]). Has no side effects: the same inputs always produce the same
/// path.
pub fn generate(
    templater: &dyn Templater,
    template: &str,
    placeholders: &Payload,
) -> Result<String> {
    let raw = templater.render("url", template, placeholders)?;
    Ok(normalize(&raw))
}

/// Normalizes a slash-separated path: runs of `/` collapse into one, and
/// segments made up only of `.` characters are dropped.
///
/// ```
/// assert_eq!("/a/b", kiln::url::normalize("//a///b"));
/// assert_eq!("/2020/x.html", kiln::url::normalize("/./2020/../x.html"));
/// ```
pub fn normalize(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed
        .split('/')
        .filter(|segment| !is_dots(segment))
        .collect::<Vec<&str>>()
        .join("/")
}

fn is_dots(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c == '.')
}
