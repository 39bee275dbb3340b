use super::error::{Error, ErrorResponse, HttpError, ResponseDecodeError, Result};
use super::rate_limit::{DailyAppRateLimit, DailyUserRateLimit, RateLimit};

use derivative::Derivative;

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    RequestBuilder, StatusCode,
};

use serde::{de::DeserializeOwned, Serialize};

use std::{fmt, sync::Arc, time::Duration};

use tracing::debug;

use url::Url;

/// Adds credentials to every request made by a [`Client`].
pub trait Authorizer: Send + Sync {
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder;
}

/// OAuth 2.0 bearer token, sent as `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken(token.into())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl Authorizer for BearerToken {
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.0)
    }
}

/// A successfully decoded response, with the rate limits it was sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub value: T,
    pub rate_limit: Option<RateLimit>,
    pub daily_app_rate_limit: Option<DailyAppRateLimit>,
    pub daily_user_rate_limit: Option<DailyUserRateLimit>,
}

/// Client struct.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Client {
    client: reqwest::Client,
    url: Url,
    timeout: Option<Duration>,

    #[derivative(Debug = "ignore")]
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl Client {
    /// Create a new client for the API at `url` (e.g. `https://api.twitter.com`), with the
    /// specified value for the User-Agent header.
    pub fn new(url: &str, user_agent: impl AsRef<[u8]>) -> Result<Self> {
        if user_agent.as_ref() == b"" {
            return Err(Error::CannotCreateClient(String::from(
                "User Agent mustn't be empty",
            )));
        }

        let mut url = Url::parse(url)
            .map_err(|e| Error::CannotCreateClient(format!("Invalid url: {}", e)))?;

        // Endpoints are joined relative to the base, so a path prefix must end with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_bytes(user_agent.as_ref())?,
        );

        match reqwest::Client::builder().default_headers(headers).build() {
            Ok(c) => Ok(Client {
                client: c,
                url,
                timeout: None,
                authorizer: None,
            }),
            Err(e) => Err(Error::CannotCreateClient(format!("{:?}", e))),
        }
    }

    /// Authorize every request with `authorizer`.
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Give up on requests taking longer than `timeout`. There is no timeout by default.
    pub fn with_timeout<T: Into<Option<Duration>>>(mut self, timeout: T) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Sends a GET request to `endpoint` and decodes the JSON response as `T`.
    ///
    /// `name` identifies the expected response in a [`ResponseDecodeError`]. Any API error
    /// carries the short-window [`RateLimit`] of the response; successes carry the daily limits
    /// too.
    pub async fn get_json_endpoint_query<Q, T>(
        &self,
        endpoint: &str,
        query: &Q,
        name: &'static str,
    ) -> Result<ApiResponse<T>>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint)?;

        let mut req = self.client.get(url.clone()).query(query);

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        if let Some(authorizer) = &self.authorizer {
            req = authorizer.authorize(req);
        }

        let res = req.send().await.map_err(Error::CannotSendRequest)?;
        let status = res.status();
        let headers = res.headers().clone();

        let body = match res.text().await {
            Ok(body) => body,
            Err(e) => return Err(unreadable_response(status, &headers, url.as_str(), e, name)),
        };

        read_response(status, &headers, url.as_str(), &body, name)
    }

    /// `endpoint` under the base url, keeping any path the base url has.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| Error::InvalidArgument("endpoint", e.to_string()))
    }
}

/// Builds the error for a response whose headers arrived but whose body couldn't be read.
fn unreadable_response(
    status: StatusCode,
    headers: &HeaderMap,
    url: &str,
    e: reqwest::Error,
    name: &'static str,
) -> Error {
    let rate_limit = RateLimit::from_headers(headers);

    debug!(%status, url, error = %e, "unreadable response body");

    if status.is_success() {
        ResponseDecodeError::new(name, e, rate_limit).into()
    } else {
        HttpError::new(status, url, "", rate_limit).into()
    }
}

/// Sorts a response into a decoded value or one of the API error kinds.
///
/// The short-window rate limit is read here, while the headers are still around, and goes into
/// whichever error is built.
fn read_response<T: DeserializeOwned>(
    status: StatusCode,
    headers: &HeaderMap,
    url: &str,
    body: &str,
    name: &'static str,
) -> Result<ApiResponse<T>> {
    let rate_limit = RateLimit::from_headers(headers);

    if status.is_success() {
        return match serde_json::from_str(body) {
            Ok(value) => Ok(ApiResponse {
                value,
                rate_limit,
                daily_app_rate_limit: DailyAppRateLimit::from_headers(headers),
                daily_user_rate_limit: DailyUserRateLimit::from_headers(headers),
            }),
            Err(e) => {
                debug!(%status, url, name, error = %e, "undecodable response");
                Err(ResponseDecodeError::new(name, e, rate_limit).into())
            }
        };
    }

    match ErrorResponse::from_body(status, body, rate_limit) {
        Some(e) => {
            debug!(%status, url, title = e.title(), "API error response");
            Err(e.into())
        }
        None => {
            debug!(%status, url, "unstructured error response");
            Err(HttpError::new(status, url, body, rate_limit).into())
        }
    }
}
