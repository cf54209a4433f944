//! Helpers for source video URLs: the accepted scheme rule and creator
//! information read out of short-video links.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// `http://` or `https://` followed by a non-empty host.
static HTTP_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)https?://([^\s/?#@]*@)?[^\s/?#@:]+").expect("valid regex")
});

/// Matches the `/@handle` path segment of a TikTok profile or video URL.
static TIKTOK_HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/@([a-zA-Z0-9._]+)").expect("valid regex"));

/// `validator` rule for source URLs: only `http` and `https` with a host.
///
/// Other schemes (`ftp:`, `mailto:`, `javascript:`) parse as URLs but can
/// never point at a video the inference service can fetch.
pub fn http_url(url: &str) -> Result<(), ValidationError> {
    if HTTP_URL_RE.is_match(url.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("http_url")
            .with_message(Cow::Borrowed("must be an http or https URL")))
    }
}

/// Extract the TikTok username (without `@`) from a URL.
///
/// Short links such as `https://vm.tiktok.com/ZMxxx/` carry no handle and
/// yield `None`.
pub fn extract_tiktok_username(url: &str) -> Option<String> {
    TIKTOK_HANDLE_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Ensure a username carries a leading `@` for display.
pub fn format_username(username: &str) -> Option<String> {
    if username.is_empty() {
        None
    } else if username.starts_with('@') {
        Some(username.to_string())
    } else {
        Some(format!("@{username}"))
    }
}

/// Display handle (`@name`) of the creator behind a video URL, if any.
pub fn creator_handle(url: &str) -> Option<String> {
    extract_tiktok_username(url).and_then(|name| format_username(&name))
}
