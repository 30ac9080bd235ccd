//! HTTP client for the fleet-lifecycle service

use crate::error::{FleetError, FleetResult};
use crate::lifecycle::FleetLifecycle;
use arena_types::Instance;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// HTTP client for the fleet-lifecycle service. Creation can take minutes
/// on the remote side, so the request timeout is generous.
pub struct FleetClient {
    client: Client,
    base_url: String,
    credential: String,
}

/// Request to boot a new instance
#[derive(Debug, Serialize)]
struct CreateInstanceRequest<'a> {
    problem_id: &'a str,
    machine_image_name: &'a str,
    project: &'a str,
    zone: &'a str,
}

impl FleetClient {
    /// Create a new fleet-lifecycle client. An empty credential sends no
    /// authorization header.
    pub fn new(endpoint: &str, credential: &str) -> FleetResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            credential: credential.to_string(),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.credential.is_empty() {
            request
        } else {
            request.bearer_auth(&self.credential)
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> FleetResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(FleetError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl FleetLifecycle for FleetClient {
    async fn create_instance(
        &self,
        problem_id: &str,
        machine_image_name: &str,
        project: &str,
        zone: &str,
    ) -> FleetResult<Vec<Instance>> {
        let url = format!("{}/instances", self.base_url);
        let body = CreateInstanceRequest {
            problem_id,
            machine_image_name,
            project,
            zone,
        };

        let response = self.authorize(self.client.post(&url).json(&body)).send().await?;
        let response = self.check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_instance(
        &self,
        instance_name: &str,
        project: &str,
        zone: &str,
    ) -> FleetResult<()> {
        let url = format!("{}/instances/{}", self.base_url, instance_name);

        let response = self
            .authorize(
                self.client
                    .delete(&url)
                    .query(&[("project", project), ("zone", zone)]),
            )
            .send()
            .await?;

        // 204 carries no body
        self.check_status(response).await?;
        Ok(())
    }
}
