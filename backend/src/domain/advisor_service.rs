//! AI business advisor.
//!
//! Prompts are forwarded to an HTTP proxy that holds the model credential,
//! together with a JSON snapshot of the financial summary as context. The
//! caller never sees an advisor failure: any transport, status, timeout or
//! decode problem produces the stock apology with `fallback: true`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{AdvisorRequest, AdvisorResponse};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AdvisorConfig;
use crate::domain::dashboard_service::DashboardService;
use crate::domain::error::{require_text, DomainResult};

pub const FALLBACK_REPLY: &str =
    "Sorry, the advisor is unavailable right now. Please try again in a moment.";

/// Something that can answer a prompt given a context snapshot
#[async_trait]
pub trait AdvisorClient: Send + Sync {
    async fn ask(&self, prompt: &str, context: &Value) -> Result<String>;
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    prompt: &'a str,
    context: &'a Value,
}

#[derive(Deserialize)]
struct ProxyResponse {
    text: String,
}

/// Advisor client talking to the configured proxy endpoint
pub struct HttpAdvisorClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl HttpAdvisorClient {
    pub fn new(config: &AdvisorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build advisor HTTP client")?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if config.endpoint.is_some() && api_key.is_none() {
            warn!(
                "Advisor endpoint configured but {} is not set",
                config.api_key_env
            );
        }
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl AdvisorClient for HttpAdvisorClient {
    async fn ask(&self, prompt: &str, context: &Value) -> Result<String> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| anyhow!("No advisor endpoint configured"))?;

        let mut request = self
            .client
            .post(endpoint)
            .json(&ProxyRequest { prompt, context });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Advisor request failed")?
            .error_for_status()
            .context("Advisor returned an error status")?;
        let body: ProxyResponse = response
            .json()
            .await
            .context("Advisor reply was not valid JSON")?;
        Ok(body.text)
    }
}

#[derive(Clone)]
pub struct AdvisorService {
    client: Arc<dyn AdvisorClient>,
    dashboard: DashboardService,
}

impl AdvisorService {
    pub fn new(client: Arc<dyn AdvisorClient>, dashboard: DashboardService) -> Self {
        Self { client, dashboard }
    }

    pub async fn ask(&self, request: AdvisorRequest) -> DomainResult<AdvisorResponse> {
        let prompt = require_text("Prompt", &request.prompt)?;

        let context = match self.dashboard.summary().await {
            Ok(summary) => serde_json::to_value(summary).unwrap_or(Value::Null),
            Err(e) => {
                warn!("Advisor context unavailable: {}", e);
                Value::Null
            }
        };

        match self.client.ask(&prompt, &context).await {
            Ok(text) => {
                info!("Advisor answered a {}-character prompt", prompt.len());
                Ok(AdvisorResponse {
                    text,
                    fallback: false,
                })
            }
            Err(e) => {
                warn!("Advisor unavailable, using fallback reply: {:#}", e);
                Ok(AdvisorResponse {
                    text: FALLBACK_REPLY.to_string(),
                    fallback: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::storage::test_utils::memory_connection;
    use std::sync::Mutex;

    /// Records what it was asked and replies with a fixed result
    struct StubClient {
        reply: Option<String>,
        seen: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl AdvisorClient for StubClient {
        async fn ask(&self, prompt: &str, context: &Value) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), context.clone()));
            self.reply.clone().ok_or_else(|| anyhow!("connection refused"))
        }
    }

    async fn service(reply: Option<&str>) -> (AdvisorService, Arc<StubClient>) {
        let conn = memory_connection().await;
        let stub = Arc::new(StubClient {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        });
        let service = AdvisorService::new(stub.clone(), DashboardService::new(&conn, 30));
        (service, stub)
    }

    #[tokio::test]
    async fn test_reply_passes_through_with_summary_context() {
        let (service, stub) = service(Some("Raise the latte price")).await;
        let response = service
            .ask(AdvisorRequest { prompt: " How do I improve margin? ".to_string() })
            .await
            .unwrap();

        assert_eq!(response.text, "Raise the latte price");
        assert!(!response.fallback);

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].0, "How do I improve margin?");
        assert_eq!(seen[0].1["profit_margin"], 0.0);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let (service, _) = service(None).await;
        let response = service
            .ask(AdvisorRequest { prompt: "Hello".to_string() })
            .await
            .unwrap();
        assert!(response.fallback);
        assert_eq!(response.text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let (service, stub) = service(Some("unused")).await;
        let result = service.ask(AdvisorRequest { prompt: "  ".to_string() }).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_http_client_errors() {
        let client = HttpAdvisorClient::new(&AdvisorConfig::default()).unwrap();
        assert!(client.ask("hi", &Value::Null).await.is_err());
    }
}
