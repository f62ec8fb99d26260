//! Rate-limit headers
//!
//! HubSpot reports the remaining budget, the window size and the window
//! length in milliseconds on every response, errors included. The reset time
//! is therefore relative: it is computed as `now + interval`.

use chrono::{DateTime, Duration, Utc};
use hubspot_sync_domain::RateLimitInfo;
use reqwest::header::HeaderMap;
use tracing::warn;

pub const REMAINING_HEADER: &str = "X-HubSpot-RateLimit-Remaining";
pub const MAX_HEADER: &str = "X-HubSpot-RateLimit-Max";
pub const INTERVAL_MS_HEADER: &str = "X-HubSpot-RateLimit-Interval-Milliseconds";

/// Read the rate-limit headers of a response.
///
/// Missing or malformed headers leave the corresponding field zero-valued.
pub fn extract_rate_limit(headers: &HeaderMap) -> RateLimitInfo {
    extract_rate_limit_at(headers, Utc::now())
}

/// Same as [`extract_rate_limit`] with an explicit clock.
pub fn extract_rate_limit_at(headers: &HeaderMap, now: DateTime<Utc>) -> RateLimitInfo {
    let remaining = header_i64(headers, REMAINING_HEADER).unwrap_or_default();
    let limit = header_i64(headers, MAX_HEADER).unwrap_or_default();
    let reset_at = header_i64(headers, INTERVAL_MS_HEADER)
        .and_then(|interval| now.checked_add_signed(Duration::milliseconds(interval)));

    RateLimitInfo { limit, remaining, reset_at }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    let raw = headers.get(name)?;

    let parsed = raw.to_str().ok().and_then(|value| value.trim().parse::<i64>().ok());
    if parsed.is_none() {
        warn!(header = name, value = ?raw, "ignoring malformed rate-limit header");
    }
    parsed
}
