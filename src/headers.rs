// ABOUTME: Builds the header set attached to every outbound API request
// ABOUTME: Carries the credential verbatim plus a browser-like client fingerprint

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT,
};
use serde_json::json;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";
const LOCALE: &str = "en-US";

/// Base64 JSON describing the client, as sent by the official web client.
pub fn super_properties() -> String {
    let properties = json!({
        "os": "Windows",
        "browser": "Chrome",
        "device": "",
        "system_locale": LOCALE,
        "has_client_mods": false,
        "browser_user_agent": BROWSER_USER_AGENT,
        "browser_version": "135.0.0.0",
        "os_version": "10",
        "referrer": "",
        "referring_domain": "",
        "referrer_current": "",
        "referring_domain_current": "",
        "release_channel": "stable",
        "client_build_number": 389004,
        "client_event_source": null,
    });
    STANDARD.encode(properties.to_string())
}

pub fn build_headers(token: &str) -> Result<HeaderMap> {
    let mut authorization = HeaderValue::from_str(token)
        .context("DISCORD_TOKEN contains characters not allowed in a header")?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        HeaderName::from_static("x-discord-locale"),
        HeaderValue::from_static(LOCALE),
    );
    headers.insert(
        HeaderName::from_static("x-super-properties"),
        HeaderValue::from_str(&super_properties()).context("Invalid super properties header")?,
    );
    Ok(headers)
}
