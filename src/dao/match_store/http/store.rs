use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::dao::{
    match_store::MatchStore,
    models::{
        AdviceResult, AnalyzeMatchRequest, BuildRecord, MatchRecord, PlayerIdentity,
        RankInfoEntry,
    },
    storage::StoreResult,
};

use super::{
    config::HttpStoreConfig,
    error::{HttpStoreError, HttpStoreResult},
    models::{ANALYSIS_FAILED, BUILD_FAILED, ErrorBody, MATCHES_FAILED, RANK_FAILED},
};

const API_KEY_HEADER: &str = "X-API-KEY";

/// [`MatchStore`] backed by the match backend's `/user/*` REST endpoints and the
/// analyzer's `/analyze` endpoint.
#[derive(Clone)]
pub struct HttpMatchStore {
    client: Client,
    backend_url: Arc<Url>,
    analyzer_url: Arc<Url>,
    api_key: Option<Arc<str>>,
}

impl HttpMatchStore {
    /// Build the HTTP client and validate both base URLs.
    pub fn new(config: HttpStoreConfig) -> HttpStoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| HttpStoreError::ClientBuilder { source })?;

        Ok(Self {
            client,
            backend_url: Arc::new(parse_base(&config.backend_url)?),
            analyzer_url: Arc::new(parse_base(&config.analyzer_url)?),
            api_key: config.api_key.map(Arc::<str>::from),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.api_key {
            Some(ref key) => builder.header(API_KEY_HEADER, key.as_ref()),
            None => builder,
        }
    }

    fn backend_endpoint(&self, segments: &[&str]) -> Url {
        endpoint(&self.backend_url, segments)
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> HttpStoreResult<Response> {
        builder
            .send()
            .await
            .map_err(|source| HttpStoreError::RequestSend {
                path: path.to_string(),
                source,
            })
    }

    /// Issue `builder` and decode a successful JSON body, turning any other status into an error.
    async fn fetch_json<T>(
        &self,
        builder: RequestBuilder,
        path: &str,
        fallback: &'static str,
    ) -> HttpStoreResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(builder, path).await?;
        if !response.status().is_success() {
            return Err(status_error(response, path, fallback).await);
        }
        decode(response, path).await
    }
}

impl MatchStore for HttpMatchStore {
    fn fetch_matches(
        &self,
        identity: &PlayerIdentity,
    ) -> BoxFuture<'static, StoreResult<Vec<MatchRecord>>> {
        let store = self.clone();
        let url = self.backend_endpoint(&["user", "matches", identity.as_str()]);
        Box::pin(async move {
            let path = url.path().to_string();
            let builder = store.request(Method::GET, url);
            store
                .fetch_json(builder, &path, MATCHES_FAILED)
                .await
                .map_err(Into::into)
        })
    }

    fn fetch_build(
        &self,
        match_id: &str,
        identity: &PlayerIdentity,
    ) -> BoxFuture<'static, StoreResult<Option<BuildRecord>>> {
        let store = self.clone();
        let url = self.backend_endpoint(&["user", "build", match_id, identity.as_str()]);
        Box::pin(async move {
            let path = url.path().to_string();
            let response = store.send(store.request(Method::GET, url), &path).await?;

            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => {
                    let mut build: BuildRecord = decode(response, &path).await?;
                    let dropped = build.truncate_slots();
                    if dropped > 0 {
                        warn!(match_id = %build.match_id, dropped, "build carried more slots than an inventory holds");
                    }
                    Ok(Some(build))
                }
                _ => Err(status_error(response, &path, BUILD_FAILED).await.into()),
            }
        })
    }

    fn fetch_rank(
        &self,
        identity: &PlayerIdentity,
        region: &str,
    ) -> BoxFuture<'static, StoreResult<Vec<RankInfoEntry>>> {
        let store = self.clone();
        let url = self.backend_endpoint(&["user", "rank", identity.as_str(), region]);
        Box::pin(async move {
            let path = url.path().to_string();
            let builder = store.request(Method::GET, url);
            store
                .fetch_json(builder, &path, RANK_FAILED)
                .await
                .map_err(Into::into)
        })
    }

    fn submit_match_for_analysis(
        &self,
        request: AnalyzeMatchRequest,
    ) -> BoxFuture<'static, StoreResult<AdviceResult>> {
        let store = self.clone();
        let url = endpoint(&self.analyzer_url, &["analyze"]);
        Box::pin(async move {
            let path = url.path().to_string();
            let builder = store.client.post(url).json(&request);
            store
                .fetch_json(builder, &path, ANALYSIS_FAILED)
                .await
                .map_err(Into::into)
        })
    }
}

fn parse_base(raw: &str) -> HttpStoreResult<Url> {
    let url = Url::parse(raw).map_err(|err| HttpStoreError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(HttpStoreError::InvalidUrl {
            url: raw.to_string(),
            reason: "URL cannot be used as a base".into(),
        });
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

async fn decode<T>(response: Response, path: &str) -> HttpStoreResult<T>
where
    T: DeserializeOwned,
{
    response
        .json::<T>()
        .await
        .map_err(|source| HttpStoreError::DecodeResponse {
            path: path.to_string(),
            source,
        })
}

/// Turn a non-success response into an error, preferring the backend's own `error` message.
async fn status_error(response: Response, path: &str, fallback: &'static str) -> HttpStoreError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    HttpStoreError::RequestStatus {
        path: path.to_string(),
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;
    use crate::dao::models::fixtures::{build_record, match_record};

    fn store_for(server: &MockServer) -> HttpMatchStore {
        let config =
            HttpStoreConfig::new(server.uri(), format!("{}/ml", server.uri())).with_api_key("secret");
        HttpMatchStore::new(config).unwrap()
    }

    #[tokio::test]
    async fn fetch_matches_sends_api_key_and_decodes_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/matches/player-1"))
            .and(header("X-API-KEY", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![match_record("EUW1_2"), match_record("EUW1_1")]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let records = store_for(&server)
            .fetch_matches(&PlayerIdentity::from("player-1"))
            .await
            .unwrap();

        let ids: Vec<_> = records.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, ["EUW1_2", "EUW1_1"]);
    }

    #[tokio::test]
    async fn fetch_matches_decodes_dotted_match_id() {
        let server = MockServer::start().await;
        let mut record = serde_json::to_value(match_record("EUW1_7")).unwrap();
        let object = record.as_object_mut().unwrap();
        let id = object.remove("matchId").unwrap();
        object.insert("metadata.matchId".into(), id);
        Mock::given(method("GET"))
            .and(path("/user/matches/player-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([record])))
            .mount(&server)
            .await;

        let records = store_for(&server)
            .fetch_matches(&PlayerIdentity::from("player-1"))
            .await
            .unwrap();

        assert_eq!(records, [match_record("EUW1_7")]);
    }

    #[tokio::test]
    async fn fetch_matches_surfaces_backend_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/matches/player-1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "riot api down"})))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .fetch_matches(&PlayerIdentity::from("player-1"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "riot api down");
    }

    #[tokio::test]
    async fn fetch_matches_falls_back_to_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/matches/player-1"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .fetch_matches(&PlayerIdentity::from("player-1"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), MATCHES_FAILED);
    }

    #[tokio::test]
    async fn missing_build_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/build/EUW1_1/player-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
            .mount(&server)
            .await;

        let build = store_for(&server)
            .fetch_build("EUW1_1", &PlayerIdentity::from("player-1"))
            .await
            .unwrap();

        assert!(build.is_none());
    }

    #[tokio::test]
    async fn fetch_build_decodes_existing_build() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/build/EUW1_1/player-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(build_record("EUW1_1")))
            .mount(&server)
            .await;

        let build = store_for(&server)
            .fetch_build("EUW1_1", &PlayerIdentity::from("player-1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(build.ddragon_version, "14.1.1");
        assert_eq!(build.item_names(), ["Luden's Companion"]);
    }

    #[tokio::test]
    async fn fetch_rank_uses_region_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/rank/player-1/euw1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "puuid": "player-1",
                "queueType": "RANKED_FLEX_SR",
                "tier": "SILVER",
                "player_rank": "I",
                "leaguePoints": 12,
                "wins": 4,
                "losses": 6
            }])))
            .mount(&server)
            .await;

        let entries = store_for(&server)
            .fetch_rank(&PlayerIdentity::from("player-1"), "euw1")
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label(), "SILVER I");
    }

    #[tokio::test]
    async fn analysis_is_posted_to_the_analyzer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ml/analyze"))
            .and(body_partial_json(json!({"matchId": "EUW1_1", "playerRank": "GOLD II"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "label": "Carry",
                "description": "high damage",
                "archetype_description": "snowballs leads",
                "advice": "ward more"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = AnalyzeMatchRequest {
            record: match_record("EUW1_1"),
            build_item_names: Vec::new(),
            player_rank: "GOLD II".into(),
        };
        let advice = store_for(&server)
            .submit_match_for_analysis(request)
            .await
            .unwrap();

        assert_eq!(advice.label, "Carry");
        assert_eq!(advice.advice, "ward more");
    }

    #[test]
    fn endpoints_encode_path_segments() {
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let url = endpoint(&base, &["user", "matches", "a/b c"]);
        assert_eq!(url.as_str(), "http://localhost:8080/api/user/matches/a%2Fb%20c");
    }
}
