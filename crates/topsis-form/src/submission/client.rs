use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::backend::{parse_success_body, ScoringBackend, SubmissionFailure};
use super::payload::SubmissionPayload;
use crate::config::BackendConfig;
use crate::results::ResultTable;

pub const SCORE_PATH: &str = "api/topsis";

/// reqwest-backed client for the scoring service.
#[derive(Debug, Clone)]
pub struct TopsisApiClient {
    client: Client,
    base_url: Url,
    endpoint: Url,
}

impl TopsisApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        let base_url = with_trailing_slash(base_url);
        // A base URL with a trailing slash always joins.
        let endpoint = base_url
            .join(SCORE_PATH)
            .unwrap_or_else(|_| base_url.clone());
        Self {
            client,
            base_url,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Turns a backend-relative link (such as a CSV download) into an absolute URL.
    pub fn resolve_link(&self, link: &str) -> Option<Url> {
        self.base_url.join(link).ok()
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl ScoringBackend for TopsisApiClient {
    async fn score(&self, payload: SubmissionPayload) -> Result<ResultTable, SubmissionFailure> {
        let form = payload.into_multipart().map_err(|err| {
            warn!(error = %err, "unable to build multipart payload");
            SubmissionFailure::fallback()
        })?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, endpoint = %self.endpoint, "scoring request failed");
                SubmissionFailure::fallback()
            })?;

        let status = response.status();
        let body = response.bytes().await.ok();
        debug!(%status, bytes = body.as_ref().map_or(0, |b| b.len()), "scoring response received");

        if status.is_success() {
            let Some(body) = body else {
                return Err(SubmissionFailure::fallback());
            };
            let mut table = parse_success_body(&body)?;
            table.download = table
                .download
                .take()
                .map(|link| self.resolve_link(&link).map_or(link, String::from));
            Ok(table)
        } else {
            let failure = SubmissionFailure::from_body(body.as_deref());
            warn!(%status, message = %failure.message, "scoring request rejected");
            Err(failure)
        }
    }
}
