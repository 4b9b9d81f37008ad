// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, REFERER};

use crate::error::{AppError, Result};
use crate::models::FetchConfig;

/// Create a configured asynchronous HTTP client.
///
/// Blog hosts (Naver in particular) reject feed requests that don't look
/// like a browser, so the browser-ish headers are sent on every request.
pub fn create_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    headers.insert(REFERER, header_value(&config.referer)?);
    headers.insert(CONNECTION, HeaderValue::from_static("close"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Fetch a URL once, accepting only a 2xx response with a non-empty body.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(url, format!("HTTP {}", status.as_u16())));
    }
    let body = response.bytes().await?;
    if body.is_empty() {
        return Err(AppError::fetch(
            url,
            format!("HTTP {} with empty body", status.as_u16()),
        ));
    }
    Ok(body.to_vec())
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("Invalid header value {value:?}: {e}")))
}
