use crate::rate_limit::RateLimit;
use reqwest::StatusCode;
use serde::Deserialize;
use std::{error::Error as StdError, fmt};
use thiserror::Error;

/// Result type for `rstweet`, using [`rstweet::error::Error`].
///
/// [`rstweet::error::Error`]: enum.Error.html
pub type Result<T> = ::std::result::Result<T, Error>;

/// Enum for `rstweet` errors.
///
/// The first three variants are failed API responses. Each keeps the rate limit read from that
/// response, available through [`Error::rate_limit`] or [`rate_limit_from_error`].
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with an error status and a structured error body.
    #[error(transparent)]
    Api(#[from] ErrorResponse),
    /// The API answered with an error status and a body that isn't a structured error.
    #[error(transparent)]
    Http(#[from] HttpError),
    /// The API answered with a success status, but the body isn't what was expected.
    #[error(transparent)]
    ResponseDecode(#[from] ResponseDecodeError),
    /// An argument given to an endpoint is invalid. No request was made.
    #[error("invalid argument {0}: {1}")]
    InvalidArgument(&'static str, String),
    /// The request couldn't be sent.
    #[error("couldn't send request: {0}")]
    CannotSendRequest(#[source] reqwest::Error),
    /// The client couldn't be created. Contains a description of the error.
    #[error("couldn't create client: {0}")]
    CannotCreateClient(String),
}

impl Error {
    /// The rate limit of the response that caused this error, if it had one.
    pub fn rate_limit(&self) -> Option<&RateLimit> {
        self.response_rate_limit().flatten()
    }

    /// `Some` if this is one of the response kinds, holding whatever it embeds.
    fn response_rate_limit(&self) -> Option<Option<&RateLimit>> {
        match self {
            Error::Api(e) => Some(e.rate_limit()),
            Error::Http(e) => Some(e.rate_limit()),
            Error::ResponseDecode(e) => Some(e.rate_limit()),
            Error::InvalidArgument(..)
            | Error::CannotSendRequest(_)
            | Error::CannotCreateClient(_) => None,
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Error {
        Error::CannotCreateClient(format!("Invalid header value: {}", e))
    }
}

/// Looks for a rate limit in `err` and everything that caused it.
///
/// The chain is followed through [`std::error::Error::source`], so any wrapper that keeps its
/// cause (a `#[source]` field, `anyhow::Context`, ...) is seen through. The first API response
/// error found decides: its rate limit is returned, or `None` if that response had none. Errors
/// further down the chain are not looked at.
///
/// ```
/// # use rstweet::error::rate_limit_from_error;
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "not from the API");
/// assert!(rate_limit_from_error(&err).is_none());
/// ```
pub fn rate_limit_from_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a RateLimit> {
    let mut link = Some(err);

    while let Some(e) = link {
        if let Some(rate_limit) = response_rate_limit(e) {
            return rate_limit;
        }

        link = e.source();
    }

    None
}

fn response_rate_limit<'a>(e: &'a (dyn StdError + 'static)) -> Option<Option<&'a RateLimit>> {
    if let Some(e) = e.downcast_ref::<Error>() {
        e.response_rate_limit()
    } else if let Some(e) = e.downcast_ref::<ErrorResponse>() {
        Some(e.rate_limit())
    } else if let Some(e) = e.downcast_ref::<HttpError>() {
        Some(e.rate_limit())
    } else if let Some(e) = e.downcast_ref::<ResponseDecodeError>() {
        Some(e.rate_limit())
    } else {
        None
    }
}

/// One entry of the `errors` array of an API error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorObj {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Error body the API sends along with an error status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    status: u16,
    #[serde(default)]
    errors: Vec<ErrorObj>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(skip)]
    rate_limit: Option<RateLimit>,
}

impl ErrorResponse {
    /// Decodes an error body, keeping the status and rate limit of the response it came with.
    ///
    /// Returns `None` if `body` isn't a JSON object matching the error schema, e.g. an HTML page
    /// from a proxy.
    pub fn from_body(
        status: StatusCode,
        body: &str,
        rate_limit: Option<RateLimit>,
    ) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;

        if !value.is_object() {
            return None;
        }

        let decoded: ErrorResponse = serde_json::from_value(value).ok()?;

        Some(ErrorResponse {
            status: status.as_u16(),
            rate_limit,
            ..decoded
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn errors(&self) -> &[ErrorObj] {
        &self.errors
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// The problem type URI, e.g. `https://api.twitter.com/2/problems/usage-capped`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}", self.status)?;

        if !self.title.is_empty() {
            write!(f, ": {}", self.title)?;
        }

        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }

        for e in &self.errors {
            match (e.title.is_empty(), e.message.is_empty()) {
                (false, _) => write!(f, "; {}", e.title)?,
                (true, false) => write!(f, "; {}", e.message)?,
                (true, true) => {}
            }
        }

        Ok(())
    }
}

impl StdError for ErrorResponse {}

/// An error status whose body couldn't be read as a structured error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP error {status} from {url}")]
pub struct HttpError {
    status: StatusCode,
    url: String,
    body: String,
    rate_limit: Option<RateLimit>,
}

impl HttpError {
    pub fn new(
        status: StatusCode,
        url: impl Into<String>,
        body: impl Into<String>,
        rate_limit: Option<RateLimit>,
    ) -> Self {
        HttpError {
            status,
            url: url.into(),
            body: body.into(),
            rate_limit,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }
}

/// A success response whose body couldn't be read or decoded.
///
/// The cause, usually a `serde_json::Error` or a `reqwest::Error`, is its
/// [`source`](std::error::Error::source).
#[derive(Debug, Error)]
#[error("couldn't decode {name} response")]
pub struct ResponseDecodeError {
    name: &'static str,
    source: Box<dyn StdError + Send + Sync>,
    rate_limit: Option<RateLimit>,
}

impl ResponseDecodeError {
    pub fn new(
        name: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
        rate_limit: Option<RateLimit>,
    ) -> Self {
        ResponseDecodeError {
            name,
            source: source.into(),
            rate_limit,
        }
    }

    /// Name of the response that was expected.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }
}
