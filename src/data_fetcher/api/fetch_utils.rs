//! PxWeb POST helper with retry logic and status code handling

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::queries::PxQuery;
use crate::constants::retry;
use crate::data_fetcher::jsonstat::Dataset;
use crate::error::AppError;
use crate::table::Table;

/// Posts a query to a PxWeb table and decodes the JSON-stat answer into a table.
///
/// This function:
/// - Sends the query as `application/json`
/// - Retries rate limits (429), server errors and network failures with exponential backoff
/// - Respects Retry-After headers for rate limiting
/// - Maps PxWeb status codes to specific errors (404 query/URL, 403 cell limit,
///   429 rate limit, 503 time-out)
/// - Treats an empty body or an empty JSON document as "no data"
///
/// # Arguments
/// * `client` - HTTP client for making requests
/// * `url` - Table URL
/// * `query` - Query body
///
/// # Returns
/// * `Result<Table, AppError>` - Long-format table or error
#[instrument(skip(client, query))]
pub async fn post_query(client: &Client, url: &str, query: &PxQuery) -> Result<Table, AppError> {
    info!("Sending query to {url}");

    let mut attempt = 0u32;
    let mut backoff = Duration::from_millis(retry::INITIAL_BACKOFF_MS);
    let response = loop {
        let (failure, retry_after) = match client.post(url).json(query).send().await {
            Ok(resp) if resp.status().is_success() => break resp,
            Ok(resp) => {
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                (status_error(resp.status(), url), retry_after)
            }
            Err(e) => (request_error(e, url), None),
        };

        if !failure.is_retryable() || attempt >= retry::MAX_RETRIES {
            error!("Query failed for {}: {}", url, failure);
            return Err(failure);
        }

        let wait = retry_after.unwrap_or(backoff);
        warn!(
            "{}. Retrying in {:?} (attempt {}/{})",
            failure,
            wait,
            attempt + 1,
            retry::MAX_RETRIES
        );
        tokio::time::sleep(wait).await;
        attempt += 1;
        backoff = backoff.saturating_mul(2);
    };

    info!("Status: {}", response.status());

    let response_text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response text from URL {}: {}", url, e);
            return Err(AppError::ApiFetch(e));
        }
    };

    debug!("Response length: {} bytes", response_text.len());

    decode_response(&response_text, url)
}

/// Maps a non-success PxWeb status to its error.
fn status_error(status: StatusCode, url: &str) -> AppError {
    let status_code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");
    match status_code {
        403 => AppError::api_cell_limit(url),
        404 => AppError::api_not_found(url),
        429 => AppError::api_rate_limit(reason, url),
        400..=499 => AppError::api_client_error(status_code, reason, url),
        502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
        _ => AppError::api_server_error(status_code, reason, url),
    }
}

fn request_error(e: reqwest::Error, url: &str) -> AppError {
    if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    }
}

/// Decodes a PxWeb response body into a long-format table.
pub fn decode_response(body: &str, url: &str) -> Result<Table, AppError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(AppError::api_no_data("Response body is empty", url));
    }

    let document: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);
            error!(
                "Response text (first 200 chars): {}",
                trimmed.chars().take(200).collect::<String>()
            );
            return Err(AppError::api_malformed_json(e.to_string(), url));
        }
    };

    let is_empty = match &document {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        warn!("API returned no data (URL: {url})");
        return Err(AppError::api_no_data("Response document is empty", url));
    }

    let dataset = match Dataset::from_value(document) {
        Ok(ds) => ds,
        Err(AppError::ApiParse(e)) => {
            return Err(AppError::api_unexpected_structure(e.to_string(), url));
        }
        Err(e) => return Err(e),
    };

    let table = dataset.to_table()?;
    info!(
        "Data received: {} rows, columns {:?}",
        table.len(),
        table.columns()
    );
    Ok(table)
}
