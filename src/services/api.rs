//! HTTP client for the habit bot API
//!
//! Endpoints:
//! - `GET {base}/api/users/{user}/habit` -> `{"habits": [{"id": .., "text": ..}]}`
//! - `GET {base}/api/users/{user}/calendar[?habit_id=..]` -> `{"YYYY-MM-DD": "status"}`

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::types::{FetchError, Habit, HabitId, HabitListResponse, StatusMap, UserId};

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Header/query pair that skips the ngrok free-tier interstitial page
const TUNNEL_SKIP_KEY: &str = "ngrok-skip-browser-warning";
const TUNNEL_SKIP_VALUE: &str = "69420";

/// Length of the body excerpt shown for non-JSON responses
const PREVIEW_CHARS: usize = 80;

/// Source of habit lists and day-status maps
pub trait CalendarSource: Send + Sync {
    /// Habits for `user`. Never fails: any error yields an empty list.
    fn fetch_habits(&self, user: UserId) -> Vec<Habit>;

    /// Day statuses for `user`, scoped to `habit` when given
    fn fetch_status_map(
        &self,
        user: UserId,
        habit: Option<&HabitId>,
    ) -> std::result::Result<StatusMap, FetchError>;
}

/// `CalendarSource` backed by the bot's HTTP API
pub struct HttpCalendarSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCalendarSource {
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Unknown(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> std::result::Result<reqwest::blocking::Response, FetchError> {
        if self.base_url.is_empty() {
            return Err(FetchError::ApiUnconfigured);
        }
        tracing::debug!(url = %url, "GET");
        self.client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(TUNNEL_SKIP_KEY, TUNNEL_SKIP_VALUE)
            .send()
            .map_err(classify_transport_error)
    }

    fn try_fetch_habits(&self, user: UserId) -> std::result::Result<Vec<Habit>, FetchError> {
        let response = self.get(&habits_url(&self.base_url, user))?;
        if !response.status().is_success() {
            return Err(FetchError::Http {
                status: response.status().as_u16(),
                reason: reason_phrase(response.status()),
            });
        }
        let list: HabitListResponse = response
            .json()
            .map_err(|e| FetchError::Unknown(format!("JSON parse error: {}", e)))?;
        Ok(list.habits)
    }
}

impl CalendarSource for HttpCalendarSource {
    fn fetch_habits(&self, user: UserId) -> Vec<Habit> {
        match self.try_fetch_habits(user) {
            Ok(habits) => habits,
            Err(e) => {
                tracing::warn!(error = %e, "habit list fetch failed, showing no habits");
                Vec::new()
            }
        }
    }

    fn fetch_status_map(
        &self,
        user: UserId,
        habit: Option<&HabitId>,
    ) -> std::result::Result<StatusMap, FetchError> {
        let response = self.get(&calendar_url(&self.base_url, user, habit))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.text().map_err(classify_transport_error)?;

        parse_calendar_response(status.as_u16(), &reason_phrase(status), &content_type, &body)
    }
}

fn reason_phrase(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("").to_string()
}

/// Append the tunnel bypass pair to a URL
fn with_tunnel_param(url: String) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, sep, TUNNEL_SKIP_KEY, TUNNEL_SKIP_VALUE)
}

pub fn habits_url(base_url: &str, user: UserId) -> String {
    with_tunnel_param(format!("{}/api/users/{}/habit", base_url, user))
}

pub fn calendar_url(base_url: &str, user: UserId, habit: Option<&HabitId>) -> String {
    let mut endpoint = format!("{}/api/users/{}/calendar", base_url, user);
    if let Some(habit) = habit {
        let encoded: String =
            url::form_urlencoded::byte_serialize(habit.as_str().as_bytes()).collect();
        endpoint.push_str("?habit_id=");
        endpoint.push_str(&encoded);
    }
    with_tunnel_param(endpoint)
}

fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        FetchError::TransportUnreachable
    } else {
        FetchError::Unknown(e.to_string())
    }
}

/// First characters of a body with whitespace runs collapsed
fn body_preview(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let preview: String = collapsed.chars().take(PREVIEW_CHARS).collect();
    if preview.is_empty() {
        preview
    } else {
        format!("{}…", preview)
    }
}

/// Classify a calendar response.
///
/// Content type is checked before the status code: a tunnel error page is
/// reported as "not JSON" even when it carries a 4xx/5xx status.
pub fn parse_calendar_response(
    status: u16,
    reason: &str,
    content_type: &str,
    body: &str,
) -> std::result::Result<StatusMap, FetchError> {
    if !content_type.contains("application/json") {
        return Err(FetchError::NonJsonResponse {
            preview: body_preview(body),
        });
    }
    if !(200..300).contains(&status) {
        return Err(FetchError::Http {
            status,
            reason: reason.to_string(),
        });
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Unknown(format!("JSON parse error: {}", e)))?;
    StatusMap::from_json_value(value).map_err(FetchError::Unknown)
}
