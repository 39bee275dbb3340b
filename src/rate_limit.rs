use chrono::{offset::Utc, DateTime, Duration};
use reqwest::header::HeaderMap;
use std::{
    fmt,
    time::{self, SystemTime},
};

/// Requests allowed in the current short window.
pub const RATE_LIMIT: &str = "x-rate-limit-limit";
/// Requests left in the current short window.
pub const RATE_REMAINING: &str = "x-rate-limit-remaining";
/// When the current short window rolls over, in UNIX seconds.
pub const RATE_RESET: &str = "x-rate-limit-reset";

// `HeaderMap` lookups are case-insensitive; the API sends these as
// `X-App-Limit-24hour-Limit` and so on.
pub const DAILY_APP_RATE_LIMIT: &str = "x-app-limit-24hour-limit";
pub const DAILY_APP_RATE_REMAINING: &str = "x-app-limit-24hour-remaining";
pub const DAILY_APP_RATE_RESET: &str = "x-app-limit-24hour-reset";
pub const DAILY_USER_RATE_LIMIT: &str = "x-user-limit-24hour-limit";
pub const DAILY_USER_RATE_REMAINING: &str = "x-user-limit-24hour-remaining";
pub const DAILY_USER_RATE_RESET: &str = "x-user-limit-24hour-reset";

/// A point in time, as the number of seconds elapsed since 1970-01-01T00:00:00Z.
///
/// The API sends reset times this way. Values past `u32::MAX` (year 2106) are not accepted by the
/// header parsers, which keeps [`Epoch::time`] total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u32);

impl Epoch {
    pub const fn new(secs: u32) -> Self {
        Epoch(secs)
    }

    /// Seconds since the UNIX epoch.
    pub fn secs(self) -> u32 {
        self.0
    }

    /// The instant this epoch designates.
    ///
    /// ```
    /// # use rstweet::rate_limit::Epoch;
    /// let reset = Epoch::new(1_690_000_000);
    /// assert_eq!(reset.time().timestamp(), 1_690_000_000);
    /// ```
    pub fn time(self) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(i64::from(self.0))
    }
}

impl From<u32> for Epoch {
    fn from(secs: u32) -> Self {
        Epoch(secs)
    }
}

impl From<Epoch> for DateTime<Utc> {
    fn from(e: Epoch) -> Self {
        e.time()
    }
}

impl From<Epoch> for SystemTime {
    fn from(e: Epoch) -> Self {
        time::UNIX_EPOCH + time::Duration::from_secs(u64::from(e.0))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short-window rate limit, read from the `x-rate-limit-*` headers of a response.
///
/// There is no "unknown" state: when a header is missing or unreadable, no `RateLimit` exists at
/// all. A `remaining` of zero really means the quota is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateLimit {
    /// Requests allowed in the window.
    pub limit: u32,
    /// Requests left in the window.
    pub remaining: u32,
    /// When the window rolls over.
    pub reset: Epoch,
}

impl RateLimit {
    /// Reads the short-window headers. Returns `None` unless all three are present and numeric.
    ///
    /// ```
    /// # use rstweet::rate_limit::{Epoch, RateLimit};
    /// use reqwest::header::{HeaderMap, HeaderValue};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-rate-limit-limit", HeaderValue::from_static("300"));
    /// headers.insert("x-rate-limit-remaining", HeaderValue::from_static("299"));
    /// assert_eq!(RateLimit::from_headers(&headers), None);
    ///
    /// headers.insert("x-rate-limit-reset", HeaderValue::from_static("1690000000"));
    /// assert_eq!(
    ///     RateLimit::from_headers(&headers),
    ///     Some(RateLimit { limit: 300, remaining: 299, reset: Epoch::new(1690000000) })
    /// );
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let (limit, remaining, reset) =
            window_from_headers(headers, [RATE_LIMIT, RATE_REMAINING, RATE_RESET])?;

        Some(RateLimit {
            limit,
            remaining,
            reset,
        })
    }
}

/// The application's 24 hour quota, read from the `X-App-Limit-24hour-*` headers.
///
/// Unrelated to [`DailyUserRateLimit`], even though both look the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DailyAppRateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub reset: Epoch,
}

impl DailyAppRateLimit {
    /// Reads the app-level daily headers. Returns `None` unless all three are present and numeric.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let (limit, remaining, reset) = window_from_headers(
            headers,
            [
                DAILY_APP_RATE_LIMIT,
                DAILY_APP_RATE_REMAINING,
                DAILY_APP_RATE_RESET,
            ],
        )?;

        Some(DailyAppRateLimit {
            limit,
            remaining,
            reset,
        })
    }
}

/// The authenticated user's 24 hour quota, read from the `X-User-Limit-24hour-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DailyUserRateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub reset: Epoch,
}

impl DailyUserRateLimit {
    /// Reads the user-level daily headers. Returns `None` unless all three are present and numeric.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let (limit, remaining, reset) = window_from_headers(
            headers,
            [
                DAILY_USER_RATE_LIMIT,
                DAILY_USER_RATE_REMAINING,
                DAILY_USER_RATE_RESET,
            ],
        )?;

        Some(DailyUserRateLimit {
            limit,
            remaining,
            reset,
        })
    }
}

/// Reads a `[limit, remaining, reset]` triple, all or nothing.
fn window_from_headers(headers: &HeaderMap, keys: [&str; 3]) -> Option<(u32, u32, Epoch)> {
    let [limit, remaining, reset] = keys;

    Some((
        header_u32(headers, limit)?,
        header_u32(headers, remaining)?,
        Epoch(header_u32(headers, reset)?),
    ))
}

fn header_u32(headers: &HeaderMap, key: &str) -> Option<u32> {
    let value = headers.get(key)?;

    match value.to_str().ok().and_then(|s| s.parse().ok()) {
        Some(n) => Some(n),
        None => {
            tracing::trace!(header = key, ?value, "ignoring unparseable rate limit header");
            None
        }
    }
}
