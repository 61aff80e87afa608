//! Reassignment dispatch to the external assignment service.
//!
//! Dropping a lead hands it to a designated investigation role; the actual
//! assignment is owned by an external service, so the drop handler only
//! emits a command here. When no service is configured the dispatcher is a
//! stub that reports itself unconfigured and the drop proceeds without it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::ReassignmentRequest;

#[derive(Error, Debug)]
pub enum ReassignError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Assignment service error: {message}")]
    Api { message: String },
    #[error("Assignment service not configured")]
    NotConfigured,
}

#[async_trait]
pub trait ReassignmentService: Send + Sync {
    async fn reassign(&self, request: &ReassignmentRequest) -> Result<(), ReassignError>;
}

#[derive(Clone)]
pub struct HttpReassignmentClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ReassignCommand<'a> {
    #[serde(rename = "commandId")]
    command_id: Uuid,
    #[serde(rename = "leadId")]
    lead_id: i64,
    #[serde(rename = "toRole")]
    to_role: &'a str,
}

impl HttpReassignmentClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ReassignmentService for HttpReassignmentClient {
    async fn reassign(&self, request: &ReassignmentRequest) -> Result<(), ReassignError> {
        let command = ReassignCommand {
            command_id: Uuid::new_v4(),
            lead_id: request.lead_id,
            to_role: &request.to_role,
        };

        let url = format!("{}/leads/{}/reassign", self.base_url, request.lead_id);
        let mut http_request = self.client.post(&url).json(&command);
        if let Some(key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", key));
        }

        let response = http_request.send().await?;
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReassignError::Api { message });
        }

        tracing::info!(
            "Requested reassignment of lead {} to role '{}'",
            request.lead_id,
            request.to_role
        );
        Ok(())
    }
}

/// Used when ASSIGNMENT_SERVICE_URL is not set.
pub struct DisabledReassignment;

#[async_trait]
impl ReassignmentService for DisabledReassignment {
    async fn reassign(&self, _request: &ReassignmentRequest) -> Result<(), ReassignError> {
        Err(ReassignError::NotConfigured)
    }
}
