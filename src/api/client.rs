use crate::api::{ApiError, LogLines, ReleaseApi, TokenStore};
use crate::core::config::ApiConfig;
use crate::core::entities::{CreatedRelease, ProjectInfo, PromotionStatus, ReleaseRequest, Revision};
use async_trait::async_trait;
use futures::{stream, AsyncBufReadExt, StreamExt, TryStreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io;

/// ASCII set for encoding path segments (slashes included).
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'%');

pub const ACCESS_TOKEN_HEADER: &str = "X-Launchpad-Access-Token";

/// HTTP client for the release service.
///
/// Built without a request timeout: release logs stay open for as long as
/// the remote build runs.
#[derive(Clone)]
pub struct HttpReleaseApi {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

#[derive(Deserialize)]
struct RevisionsResponse {
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Deserialize)]
struct PromotionResponse {
    status: PromotionStatus,
}

impl HttpReleaseApi {
    pub fn new(config: &ApiConfig, tokens: TokenStore) -> Self {
        HttpReleaseApi {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            if !segment.is_empty() {
                url.push('/');
                url.push_str(&encode_segment(segment));
            }
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.tokens.access_token()?;
        Ok(request.header(ACCESS_TOKEN_HEADER, token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.url(segments);
        tracing::debug!(%url, "GET");
        let response = self.send(self.http.get(&url)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ReleaseApi for HttpReleaseApi {
    async fn fetch_revisions(&self, project_id: &str) -> Result<Vec<Revision>, ApiError> {
        let body: RevisionsResponse = self.get_json(&["apps", project_id, "revisions"]).await?;
        tracing::debug!("fetched {} revisions for {}", body.revisions.len(), project_id);
        Ok(body.revisions)
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<CreatedRelease, ApiError> {
        let url = self.url(&["releases"]);
        tracing::debug!(%url, revision_id = %request.revision_id, channel = %request.channel, "POST");
        let response = self.send(self.http.post(&url).json(request)).await?;
        response
            .json::<CreatedRelease>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn open_release_logs(&self, release_id: &str) -> Result<LogLines, ApiError> {
        let url = self.url(&["promotions", release_id, "logs"]);
        tracing::debug!(%url, "opening release log stream");
        let response = self.send(self.http.get(&url)).await?;

        let reader = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
            .boxed()
            .into_async_read();
        let lines = stream::try_unfold(reader, |mut reader| async move {
            let mut raw = Vec::new();
            if reader.read_until(b'\n', &mut raw).await? == 0 {
                return Ok::<_, io::Error>(None);
            }
            Ok(Some((decode_line(raw), reader)))
        })
        .map_err(|e| ApiError::Stream(e.to_string()))
        .boxed();
        Ok(lines)
    }

    async fn get_promotion_status(&self, release_id: &str) -> Result<PromotionStatus, ApiError> {
        let body: PromotionResponse = self.get_json(&["promotions", release_id]).await?;
        Ok(body.status)
    }

    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo, ApiError> {
        self.get_json(&["apps", project_id]).await
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthenticated),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(url)),
        _ => Err(ApiError::Server {
            status: status.as_u16(),
            body: body.trim().to_string(),
        }),
    }
}

/// One log line without its terminator. Bytes that are not UTF-8 are replaced, never rejected.
fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}
