use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub api_addr: String,
    pub model_path: String,
    pub scaler_path: String,
    pub log_requests: bool,
    pub history_limit: usize,
    pub alert_push_enabled: bool,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        let api_addr = std::env::var("CARDWATCH_API_ADDR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "127.0.0.1:8090".to_string());

        let model_path = std::env::var("CARDWATCH_MODEL_PATH")
            .unwrap_or_else(|_| default_model_path().to_string_lossy().to_string());

        let scaler_path = std::env::var("CARDWATCH_SCALER_PATH")
            .unwrap_or_else(|_| default_scaler_path().to_string_lossy().to_string());

        let log_requests = parse_bool_env("CARDWATCH_LOG_REQUESTS", false);

        let history_limit = std::env::var("CARDWATCH_HISTORY_LIMIT")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .map(clamp_history_limit)
            .unwrap_or(50);

        let alert_push_enabled = parse_bool_env("CARDWATCH_ALERT_PUSH", true);

        CoreConfig {
            api_addr,
            model_path,
            scaler_path,
            log_requests,
            history_limit,
            alert_push_enabled,
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("fraud_model.json")
}

fn default_scaler_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("fraud_scaler.json")
}

fn parse_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn clamp_history_limit(value: usize) -> usize {
    value.clamp(10, 500)
}
