//! Wrapper crate for the [Twitter API v2](https://developer.twitter.com/en/docs/twitter-api).
//!
//! ## Usage
//!
//! First, create a [`Client`] pointing at the API host, with a User-Agent for your project and
//! something to authorize requests with:
//!
//! ```no_run
//! # use rstweet::client::{BearerToken, Client};
//! # fn main() -> Result<(), rstweet::error::Error> {
//! let client = Client::new("https://api.twitter.com", "MyProject/1.0")?
//!     .with_authorizer(BearerToken::new("AAAA..."));
//! # Ok(()) }
//! ```
//!
//! ## Rate limits
//!
//! Every endpoint has a rate limit over a short window (15 minutes), reported by the
//! `x-rate-limit-limit`, `x-rate-limit-remaining` and `x-rate-limit-reset` headers of each
//! response. Some endpoints also cap usage over 24 hours, per app and per user, reported in the
//! `x-app-limit-24hour-*` and `x-user-limit-24hour-*` headers.
//!
//! `rstweet` reads these headers on every response. Successful responses carry them next to the
//! decoded value, and every error coming from an API response carries the short window limit of
//! that response. When an error has been wrapped by your own error types, you can still get it
//! back as long as the wrappers keep their cause:
//!
//! ```
//! use rstweet::error::rate_limit_from_error;
//!
//! fn report(err: &(dyn std::error::Error + 'static)) {
//!     match rate_limit_from_error(err) {
//!         Some(limit) => eprintln!("{} ({} left, resets at {})", err, limit.remaining, limit.reset.time()),
//!         None => eprintln!("{}", err),
//!     }
//! }
//! ```
//!
//! A rate limit is only ever complete: if any of the three headers is missing or garbled, there is
//! no rate limit at all rather than one with made up values. `rstweet` doesn't wait or retry on
//! its own; what to do with the numbers is up to you.
//!
//! [`Client`]: client/struct.Client.html

/// Client related structures.
pub mod client;

/// Error management.
pub mod error;

/// Rate limit headers.
pub mod rate_limit;

/// Space search.
pub mod space;
