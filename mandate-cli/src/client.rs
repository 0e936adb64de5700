use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use mandate_protocol::{BusinessProfile, IDEMPOTENCY_KEY_HEADER, REPLAY_HEADER};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("server returned an error: {0}")]
    Server(String),
    #[error("i/o failed: {0}")]
    Io(String),
    #[error("catalog failed to load: {0}")]
    Catalog(String),
    #[error("{0}")]
    Validation(String),
}

impl From<reqwest::Error> for CliError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Thin HTTP client for a running mandate-server.
pub struct ServiceClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Result<Self, CliError> {
        let url = Url::parse(base_url)
            .map_err(|err| CliError::Validation(format!("invalid server URL: {err}")))?;
        Ok(Self {
            base_url: url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CliError> {
        self.base_url
            .join(path)
            .map_err(|err| CliError::Validation(format!("invalid endpoint path: {err}")))
    }

    /// Submits a profile for evaluation. Returns the raw result document and
    /// whether the server replayed a stored result for the idempotency key.
    pub async fn evaluate(
        &self,
        profile: &BusinessProfile,
        idempotency_key: Option<&str>,
    ) -> Result<(Value, bool), CliError> {
        let url = self.endpoint("/api/evaluate")?;
        let mut request = self.http.post(url).json(profile);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let replayed = response
            .headers()
            .get(REPLAY_HEADER)
            .and_then(|value| value.to_str().ok())
            == Some("true");
        let results = parse_response::<Value>(response).await?;
        Ok((results, replayed))
    }

    pub async fn list_rules(&self, limit: Option<u32>) -> Result<Vec<Value>, CliError> {
        let mut url = self.endpoint("/api/rules")?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        let response = self.http.get(url).send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, CliError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| CliError::Http(err.to_string()))
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "".to_string());
        if let Ok(err) = serde_json::from_str::<ServiceErrorBody>(&body) {
            Err(CliError::Server(format!("{status}: {}", err.error)))
        } else {
            Err(CliError::Server(format!("{status}: {body}")))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: String,
}
