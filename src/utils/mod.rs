//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Parse a base URL, making sure relative joins keep its last path segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&normalized)?)
}

/// Append path segments to a base URL, percent-encoding each one.
///
/// Empty, `.` and `..` segments cannot address a resource and are rejected.
pub fn join_segments(base: &Url, segments: &[String]) -> Result<Url> {
    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || s.as_str() == "." || s.as_str() == "..")
    {
        return Err(AppError::validation(format!("invalid path segment {bad:?}")));
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("{base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Shorten a response body for log and error messages.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
