use async_trait::async_trait;
use quiz_core::model::{QuizDefinition, QuizId};
use reqwest::StatusCode;
use url::Url;

use super::{QuizSource, SourceError, parse_definition};

/// Fetches `GET {base}/data/{quizId}.json`.
#[derive(Debug, Clone)]
pub struct HttpQuizSource {
    base: Url,
    client: reqwest::Client,
}

impl HttpQuizSource {
    /// # Errors
    ///
    /// Returns `SourceError::InvalidBaseUrl` if `base` is not an absolute URL
    /// that can carry path segments.
    pub fn new(base: &str) -> Result<Self, SourceError> {
        let base = Url::parse(base).map_err(|_| SourceError::InvalidBaseUrl(base.to_owned()))?;
        if base.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl(base.to_string()));
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// URL for a quiz; the id is percent-encoded as a single path segment.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidBaseUrl` if the base cannot take segments.
    pub fn quiz_url(&self, quiz_id: &QuizId) -> Result<Url, SourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("data")
            .push(&format!("{quiz_id}.json"));
        Ok(url)
    }
}

#[async_trait]
impl QuizSource for HttpQuizSource {
    async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<QuizDefinition, SourceError> {
        let url = self.quiz_url(quiz_id)?;
        tracing::debug!(%url, "fetching quiz definition");
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(SourceError::NotFound(quiz_id.clone())),
            status if !status.is_success() => return Err(SourceError::HttpStatus(status)),
            _ => {}
        }
        let bytes = response.bytes().await?;
        parse_definition(quiz_id, &bytes)
    }
}
