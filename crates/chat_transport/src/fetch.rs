use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{parse_error_message, TransportError};
use crate::url::{docs_url, file_url};

#[derive(Debug, Deserialize)]
struct DocumentationPayload {
    #[serde(default)]
    content: String,
}

/// HTTP client for preview content: generated files and architecture docs.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    http: Client,
    config: TransportConfig,
}

impl ArtifactFetcher {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Fetches a generated file as text, e.g. a CSV for the table preview.
    pub async fn fetch_text(&self, file_id: &str) -> Result<String, TransportError> {
        let url = file_url(&self.config.base_url, file_id)?;
        debug!(%url, "fetching file preview");
        let response = checked(self.http.get(url).send().await?).await?;
        Ok(response.text().await?)
    }

    /// Fetches the architecture documentation markdown (`{"content": ..}`).
    pub async fn fetch_documentation(&self) -> Result<String, TransportError> {
        let url = docs_url(&self.config.base_url)?;
        debug!(%url, "fetching documentation");
        let response = checked(self.http.get(url).send().await?).await?;
        let body = response.text().await?;
        let payload: DocumentationPayload = serde_json::from_str(&body)?;
        Ok(payload.content)
    }
}

async fn checked(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status(status, parse_error_message(status, &body)))
}
