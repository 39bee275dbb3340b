use chrono::{DateTime, Utc};

use crate::client::Client;
use crate::error::{Error, ErrorObj, Result as RsTweetResult};
use crate::rate_limit::RateLimit;

use serde::{Deserialize, Serialize};

use serde_with::formats::CommaSeparator;
use serde_with::serde_as;

use std::fmt;

/// Fields that can be requested for a [`Space`], through `space.fields`.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SpaceField {
    HostIds,
    CreatedAt,
    CreatorId,
    Id,
    Lang,
    InvitedUserIds,
    ParticipantCount,
    SpeakerIds,
    StartedAt,
    EndedAt,
    SubscriberCount,
    TopicIds,
    State,
    Title,
    UpdatedAt,
    ScheduledStart,
    IsTicketed,
}

impl SpaceField {
    fn as_str(self) -> &'static str {
        match self {
            Self::HostIds => "host_ids",
            Self::CreatedAt => "created_at",
            Self::CreatorId => "creator_id",
            Self::Id => "id",
            Self::Lang => "lang",
            Self::InvitedUserIds => "invited_user_ids",
            Self::ParticipantCount => "participant_count",
            Self::SpeakerIds => "speaker_ids",
            Self::StartedAt => "started_at",
            Self::EndedAt => "ended_at",
            Self::SubscriberCount => "subscriber_count",
            Self::TopicIds => "topic_ids",
            Self::State => "state",
            Self::Title => "title",
            Self::UpdatedAt => "updated_at",
            Self::ScheduledStart => "scheduled_start",
            Self::IsTicketed => "is_ticketed",
        }
    }
}

impl fmt::Display for SpaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a [`Space`]. [`SpaceState::All`] is only meaningful as a search filter.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SpaceState {
    All,
    Live,
    Scheduled,
    Ended,
}

/// A live audio conversation.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
#[non_exhaustive]
pub struct Space {
    pub id: String,
    #[serde(default)]
    pub state: Option<SpaceState>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub host_ids: Vec<String>,
    #[serde(default)]
    pub speaker_ids: Vec<String>,
    #[serde(default)]
    pub invited_user_ids: Vec<String>,
    #[serde(default)]
    pub topic_ids: Vec<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub participant_count: Option<u64>,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub is_ticketed: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data part of a spaces search response.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Clone)]
pub struct SpacesRaw {
    #[serde(default, rename = "data")]
    pub spaces: Vec<Space>,
    /// Errors about individual results. The request itself succeeded.
    #[serde(default)]
    pub errors: Vec<ErrorObj>,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Clone, Copy)]
pub struct SpacesSearchMeta {
    pub result_count: u64,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SpacesSearchResponse {
    pub raw: SpacesRaw,
    pub meta: Option<SpacesSearchMeta>,
    pub rate_limit: Option<RateLimit>,
}

type CommaSeparated<T> = serde_with::StringWithSeparator<CommaSeparator, T>;

/// Options for [`Client::spaces_search`].
///
/// ```
/// # use rstweet::space::{SpacesSearchOpts, SpaceField, SpaceState};
/// let opts = SpacesSearchOpts::new()
///     .state(SpaceState::Live)
///     .space_fields([SpaceField::HostIds, SpaceField::Title])
///     .max_results(10);
/// ```
#[serde_as]
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct SpacesSearchOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<SpaceState>,

    #[serde_as(as = "CommaSeparated<SpaceField>")]
    #[serde(rename = "space.fields", skip_serializing_if = "Vec::is_empty")]
    space_fields: Vec<SpaceField>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u8>,
}

impl SpacesSearchOpts {
    /// Create a new instance of `SpacesSearchOpts` with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return spaces in this state. The API defaults to [`SpaceState::All`].
    pub fn state<T: Into<Option<SpaceState>>>(mut self, state: T) -> Self {
        self.state = state.into();
        self
    }

    /// Fields to include in each returned [`Space`].
    pub fn space_fields<I: IntoIterator<Item = SpaceField>>(mut self, fields: I) -> Self {
        self.space_fields = fields.into_iter().collect();
        self
    }

    /// Number of results to return, between 1 and 100.
    pub fn max_results<T: Into<Option<u8>>>(mut self, max_results: T) -> Self {
        self.max_results = max_results.into();
        self
    }
}

impl Client {
    /// Search live or scheduled spaces by title.
    ///
    /// ```no_run
    /// # use rstweet::client::{BearerToken, Client};
    /// # use rstweet::space::{SpaceField, SpacesSearchOpts};
    /// # #[tokio::main]
    /// # async fn main() -> rstweet::error::Result<()> {
    /// let client = Client::new("https://api.twitter.com", "MyProject/1.0")?
    ///     .with_authorizer(BearerToken::new("AAAA..."));
    ///
    /// let opts = SpacesSearchOpts::new().space_fields([SpaceField::Title]);
    ///
    /// match client.spaces_search("rust", opts).await {
    ///     Ok(res) => println!("{} spaces", res.raw.spaces.len()),
    ///     Err(e) => match e.rate_limit() {
    ///         Some(limit) => println!("{}, {} left until {}", e, limit.remaining, limit.reset.time()),
    ///         None => println!("{}", e),
    ///     },
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn spaces_search(
        &self,
        query: &str,
        opts: SpacesSearchOpts,
    ) -> RsTweetResult<SpacesSearchResponse> {
        #[derive(Serialize)]
        struct Params<'a> {
            query: &'a str,
            #[serde(flatten)]
            opts: &'a SpacesSearchOpts,
        }

        #[derive(Deserialize)]
        struct Body {
            #[serde(flatten)]
            raw: SpacesRaw,
            #[serde(default)]
            meta: Option<SpacesSearchMeta>,
        }

        if query.is_empty() {
            return Err(Error::InvalidArgument(
                "query",
                String::from("a query is required"),
            ));
        }

        let res = self
            .get_json_endpoint_query::<_, Body>(
                "/2/spaces/search",
                &Params {
                    query,
                    opts: &opts,
                },
                "spaces search",
            )
            .await?;

        Ok(SpacesSearchResponse {
            raw: res.value.raw,
            meta: res.value.meta,
            rate_limit: res.rate_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BearerToken;
    use crate::error::rate_limit_from_error;
    use crate::rate_limit::Epoch;
    use chrono::TimeZone;
    use mockito::{mock, Matcher};

    #[test]
    fn build_opts() {
        let opts = SpacesSearchOpts::new()
            .state(SpaceState::Live)
            .space_fields([SpaceField::HostIds, SpaceField::Title])
            .max_results(10);

        assert_eq!(
            opts,
            SpacesSearchOpts {
                state: Some(SpaceState::Live),
                space_fields: vec![SpaceField::HostIds, SpaceField::Title],
                max_results: Some(10),
            }
        );
    }

    #[test]
    fn space_field_names_match_serde() {
        for field in [
            SpaceField::HostIds,
            SpaceField::ParticipantCount,
            SpaceField::ScheduledStart,
            SpaceField::IsTicketed,
        ] {
            assert_eq!(
                serde_json::to_value(field).unwrap(),
                serde_json::Value::String(field.to_string())
            );
        }
    }

    #[tokio::test]
    async fn search() {
        let _m = mock("GET", "/2/spaces/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "rust lang".into()),
                Matcher::UrlEncoded("state".into(), "live".into()),
                Matcher::UrlEncoded("space.fields".into(), "host_ids,title".into()),
            ]))
            .match_header("authorization", "Bearer token")
            .with_header("x-rate-limit-limit", "300")
            .with_header("x-rate-limit-remaining", "299")
            .with_header("x-rate-limit-reset", "1690000000")
            .with_body(
                r#"{
                    "data": [
                        {
                            "id": "1DXxyRYNejbKM",
                            "state": "live",
                            "title": "hello rust lang",
                            "host_ids": ["2244994945"],
                            "topic_ids": ["848920371311001600"],
                            "subscriber_count": 12,
                            "updated_at": "2023-07-22T10:00:00.000Z"
                        }
                    ],
                    "meta": {"result_count": 1}
                }"#,
            )
            .create();

        let client = Client::new(&mockito::server_url(), b"rstweet/unit_test")
            .unwrap()
            .with_authorizer(BearerToken::new("token"));

        let res = client
            .spaces_search(
                "rust lang",
                SpacesSearchOpts::new()
                    .state(SpaceState::Live)
                    .space_fields([SpaceField::HostIds, SpaceField::Title]),
            )
            .await
            .unwrap();

        assert_eq!(res.meta, Some(SpacesSearchMeta { result_count: 1 }));
        assert_eq!(res.raw.spaces.len(), 1);
        assert_eq!(res.raw.spaces[0].id, "1DXxyRYNejbKM");
        assert_eq!(res.raw.spaces[0].state, Some(SpaceState::Live));
        assert_eq!(res.raw.spaces[0].host_ids, vec!["2244994945".to_string()]);
        assert_eq!(res.raw.spaces[0].topic_ids, vec!["848920371311001600".to_string()]);
        assert_eq!(res.raw.spaces[0].subscriber_count, Some(12));
        assert_eq!(
            res.raw.spaces[0].updated_at,
            Some(Utc.with_ymd_and_hms(2023, 7, 22, 10, 0, 0).unwrap())
        );
        assert!(res.raw.spaces[0].invited_user_ids.is_empty());
        assert_eq!(res.raw.spaces[0].ended_at, None);
        assert_eq!(
            res.rate_limit,
            Some(RateLimit {
                limit: 300,
                remaining: 299,
                reset: Epoch::new(1690000000),
            })
        );
    }

    #[tokio::test]
    async fn search_no_result() {
        let _m = mock("GET", "/2/spaces/search")
            .match_query(Matcher::UrlEncoded("query".into(), "nothing here".into()))
            .with_body(r#"{"meta":{"result_count":0}}"#)
            .create();

        let client = Client::new(&mockito::server_url(), b"rstweet/unit_test").unwrap();
        let res = client
            .spaces_search("nothing here", SpacesSearchOpts::new())
            .await
            .unwrap();

        assert_eq!(res.raw, SpacesRaw::default());
        assert_eq!(res.meta, Some(SpacesSearchMeta { result_count: 0 }));
        assert_eq!(res.rate_limit, None);
    }

    #[tokio::test]
    async fn search_rate_limited() {
        let _m = mock("GET", "/2/spaces/search")
            .match_query(Matcher::UrlEncoded("query".into(), "busy".into()))
            .with_status(429)
            .with_header("x-rate-limit-limit", "300")
            .with_header("x-rate-limit-remaining", "0")
            .with_header("x-rate-limit-reset", "1690000900")
            .with_body(r#"{"title":"Too Many Requests","detail":"Too Many Requests","type":"about:blank","status":429}"#)
            .create();

        let client = Client::new(&mockito::server_url(), b"rstweet/unit_test").unwrap();
        let err = client
            .spaces_search("busy", SpacesSearchOpts::new())
            .await
            .unwrap_err();

        let limit = rate_limit_from_error(&err).unwrap();
        assert_eq!(limit.remaining, 0);
        assert_eq!(limit.reset.time().timestamp(), 1690000900);
    }

    #[tokio::test]
    async fn search_requires_query() {
        let client = Client::new("http://127.0.0.1:9", b"rstweet/unit_test").unwrap();

        assert!(matches!(
            client.spaces_search("", SpacesSearchOpts::new()).await,
            Err(Error::InvalidArgument("query", _))
        ));
    }
}
