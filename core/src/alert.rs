use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::telemetry::ApiPrediction;

pub struct AlertSync {
    config: Option<AlertConfig>,
}

struct AlertConfig {
    client: Client,
    base_url: String,
    source_id: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AlertPayload<'a> {
    source_id: &'a str,
    prediction: &'a ApiPrediction,
}

impl AlertSync {
    pub fn new() -> Self {
        let base_url = std::env::var("CARDWATCH_ALERT_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let Some(base_url) = base_url else {
            return Self { config: None };
        };

        let timeout_secs = std::env::var("CARDWATCH_ALERT_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(10);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .ok();

        let client = match client {
            Some(client) => client,
            None => return Self { config: None },
        };

        let source_id = std::env::var("CARDWATCH_ALERT_SOURCE_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "cardwatch-local".to_string());

        let api_key = std::env::var("CARDWATCH_ALERT_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Self {
            config: Some(AlertConfig {
                client,
                base_url,
                source_id,
                api_key,
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn push_alert(&self, prediction: &ApiPrediction) -> Result<(), String> {
        let Some(config) = &self.config else {
            return Ok(());
        };

        let url = format!("{}/api/v1/alerts", config.base_url.trim_end_matches('/'));
        let payload = AlertPayload {
            source_id: &config.source_id,
            prediction,
        };

        let mut request = config.client.post(url).json(&payload);
        if let Some(api_key) = &config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await.map_err(|error| error.to_string())?;
        if !response.status().is_success() {
            return Err(format!("alert endpoint response {}", response.status()));
        }

        Ok(())
    }
}
