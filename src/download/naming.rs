//! File names for downloaded content.

use std::sync::LazyLock;

use http::HeaderMap;
use http::header::CONTENT_DISPOSITION;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;
use uuid::Uuid;

/// `filename*=charset'lang'percent-encoded` (RFC 5987).
static EXTENDED_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*filename\*\s*=\s*[^']*'[^']*'([^;\s]+)")
        .expect("extended filename pattern is valid")
});

/// `filename="quoted"` or `filename=token`.
static PLAIN_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^;\s]+))"#)
        .expect("filename pattern is valid")
});

/// Characters replaced in file names because common filesystems reject them.
const RESERVED: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Extracts the file name from a `Content-Disposition` header.
///
/// `filename*` takes precedence over `filename`. Directory components
/// are stripped.
#[must_use]
pub fn filename_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?;
    let value = String::from_utf8_lossy(value.as_bytes());

    let extended = EXTENDED_FILENAME
        .captures(&value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| sanitize(&percent_decode_str(m.as_str()).decode_utf8_lossy()));
    if extended.is_some() {
        return extended;
    }

    let caps = PLAIN_FILENAME.captures(&value)?;
    match (caps.get(1), caps.get(2)) {
        (Some(quoted), _) => sanitize(&quoted.as_str().replace("\\\"", "\"").replace("\\\\", "\\")),
        (None, Some(token)) => sanitize(token.as_str()),
        (None, None) => None,
    }
}

/// Derives a file name from the last non-empty URL path segment.
#[must_use]
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|segment| !segment.is_empty())?;
    sanitize(&percent_decode_str(segment).decode_utf8_lossy())
}

/// Generates a unique file name.
#[must_use]
pub fn random_filename() -> String {
    format!("download-{}", Uuid::new_v4().simple())
}

/// Picks the file name for a download: `Content-Disposition`, then the
/// URL path, then a random name.
#[must_use]
pub fn resolve_filename(headers: &HeaderMap, url: &Url) -> String {
    filename_from_headers(headers)
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(random_filename)
}

/// Returns the `index`-th candidate for `name`.
///
/// Index 0 is the name itself; later indexes insert `(index)` before the
/// extension.
///
/// ```
/// use resilient_http::download::candidate_name;
///
/// assert_eq!(candidate_name("report.pdf", 0), "report.pdf");
/// assert_eq!(candidate_name("report.pdf", 2), "report(2).pdf");
/// assert_eq!(candidate_name("README", 1), "README(1)");
/// ```
#[must_use]
pub fn candidate_name(name: &str, index: u32) -> String {
    if index == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}({index}){}", &name[..dot], &name[dot..]),
        _ => format!("{name}({index})"),
    }
}

/// Reduces `raw` to a bare, usable file name.
fn sanitize(raw: &str) -> Option<String> {
    let last = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}
