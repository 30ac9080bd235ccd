//! HTTP client for the scoring service

use crate::error::{ScoreserverError, ScoreserverResult};
use crate::source::EnvironmentSource;
use arena_types::ProblemEnvironment;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the scoring service's environment API
pub struct ScoreserverClient {
    client: Client,
    base_url: String,
}

impl ScoreserverClient {
    /// Create a new scoring service client
    pub fn new(endpoint: &str) -> ScoreserverResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ScoreserverResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ScoreserverResult<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ScoreserverError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl EnvironmentSource for ScoreserverClient {
    async fn list_environments(&self) -> ScoreserverResult<Vec<ProblemEnvironment>> {
        self.get("/problem-environments").await
    }

    async fn get_environment(&self, name: &str) -> ScoreserverResult<ProblemEnvironment> {
        self.get(&format!("/problem-environments/{}", name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ScoreserverClient::new("http://127.0.0.1:8905").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8905");
    }

    #[test]
    fn test_client_endpoint_normalization() {
        let client = ScoreserverClient::new("http://127.0.0.1:8905/").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8905");
    }
}
