use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::domain::QualityTier;

/// Outcome of the lexical URL check. No network call is made; a URL that
/// passes here but does not resolve yields a clean server error later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlCheck {
    Valid,
    Empty,
    InvalidDomain,
}

const ALLOWED_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "instagram.com"];

/// Checks that a candidate URL points at an allow-listed media host.
///
/// The scheme and a `www.` prefix are optional and the host match is
/// case-insensitive. At least one path segment is required after the host,
/// so a bare `youtube.com` is rejected.
pub fn validate_media_url(candidate: &str) -> UrlCheck {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return UrlCheck::Empty;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = match Url::parse(&with_scheme) {
        Ok(url) => url,
        Err(_) => return UrlCheck::InvalidDomain,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return UrlCheck::InvalidDomain;
    }

    let host = match parsed.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return UrlCheck::InvalidDomain,
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if !ALLOWED_HOSTS.contains(&host) {
        return UrlCheck::InvalidDomain;
    }

    let has_path_segment = parsed
        .path_segments()
        .map(|mut segments| segments.any(|s| !s.is_empty()))
        .unwrap_or(false);
    if !has_path_segment {
        return UrlCheck::InvalidDomain;
    }

    UrlCheck::Valid
}

/// Extracts the `filename=` token from a Content-Disposition header value.
/// Quotes around the name are optional. Returns `None` on anything
/// malformed; this function never fails.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let re = Regex::new(r#"filename="?([^";]+)"?"#).ok()?;
    let caps = re.captures(value)?;
    let name = caps[1].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Derives the save name for a download: the server-provided disposition
/// name when present, otherwise a unique synthesized one.
pub fn resolve_filename(disposition: Option<&str>, quality: QualityTier) -> String {
    disposition
        .and_then(filename_from_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_filename(quality))
}

fn fallback_filename(quality: QualityTier) -> String {
    format!("video_{}_{}.mp4", quality.wire_value(), Uuid::new_v4())
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Human-readable byte count for the admin cache panel.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = (bytes as f64).log(1024.0).floor().min(3.0) as usize;
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    if exponent == 0 {
        format!("{} {}", bytes, UNITS[exponent])
    } else {
        format!("{:.2} {}", value, UNITS[exponent])
    }
}
