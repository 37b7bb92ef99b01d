use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::alert::AlertSync;
use crate::config::CoreConfig;
use crate::ml::Predictor;
use crate::telemetry::{
    system_status_from_recent, ApiPrediction, StatsSnapshot, SystemHealth, TelemetryStore,
};
use crate::types::TransactionInput;

static PREDICTION_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct ApiState {
    pub telemetry: Arc<TelemetryStore>,
    pub predictor: Arc<Predictor>,
    pub alert: Arc<AlertSync>,
    pub config: Arc<tokio::sync::RwLock<CoreConfig>>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub id: String,
    pub fraudulent: bool,
    pub label: u8,
    pub verdict: String,
    pub fraud_probability: f64,
    pub confidence: f64,
    pub confidence_display: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    model_id: String,
    model_version: String,
    threshold: f64,
    feature_count: usize,
}

#[derive(Debug, Serialize)]
struct ApiStatus {
    system_status: String,
    stats: StatsSnapshot,
    recent: Vec<ApiPrediction>,
    health: SystemHealth,
    model: ModelInfo,
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    api_addr: String,
    model_path: String,
    scaler_path: String,
    log_requests: bool,
    history_limit: usize,
    alert_push_enabled: bool,
    alert_configured: bool,
}

#[derive(Debug, Deserialize)]
struct SettingsUpdate {
    log_requests: Option<bool>,
    alert_push_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: Option<String>,
}

pub async fn serve(addr: String, state: ApiState) -> Result<(), Box<dyn std::error::Error>> {
    let app = Router::new()
        .route("/api/predict", post(predict))
        .route("/api/status", get(status))
        .route("/api/settings", get(settings_get).put(settings_update))
        .with_state(state)
        .layer(cors_layer());

    let addr: SocketAddr = addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn predict(
    State(state): State<ApiState>,
    Json(payload): Json<TransactionInput>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ActionResponse>)> {
    if let Err(message) = validate_input(&payload) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ActionResponse {
                status: "error".to_string(),
                message: Some(message),
            }),
        ));
    }

    let assessment = state.predictor.assess(&payload);

    let id = format!("TXN-{}", PREDICTION_COUNTER.fetch_add(1, Ordering::SeqCst));
    let entry = state.telemetry.record_assessment(id.clone(), &assessment).await;

    let (log_requests, alert_push_enabled) = {
        let config = state.config.read().await;
        (config.log_requests, config.alert_push_enabled)
    };

    if log_requests {
        println!(
            "[PREDICT] {} verdict={} confidence={}",
            entry.id,
            entry.verdict,
            assessment.confidence_display()
        );
    }

    if assessment.label.is_fraud() && alert_push_enabled {
        if let Err(error) = state.alert.push_alert(&entry).await {
            eprintln!("[ALERT] Failed to push {}: {}", entry.id, error);
        }
    }

    Ok(Json(PredictResponse {
        id,
        fraudulent: assessment.label.is_fraud(),
        label: assessment.label.as_u8(),
        verdict: assessment.verdict_label().to_string(),
        fraud_probability: assessment.fraud_probability,
        confidence: assessment.confidence,
        confidence_display: assessment.confidence_display(),
        message: assessment.message().to_string(),
    }))
}

async fn status(State(state): State<ApiState>) -> Json<ApiStatus> {
    let stats = state.telemetry.snapshot_stats().await;
    let recent = state.telemetry.snapshot_predictions().await;
    let health = state.telemetry.health_snapshot().await;
    let system_status = system_status_from_recent(&recent);

    Json(ApiStatus {
        system_status,
        stats,
        recent,
        health,
        model: ModelInfo {
            model_id: state.predictor.model_id().to_string(),
            model_version: state.predictor.model_version().to_string(),
            threshold: state.predictor.threshold(),
            feature_count: crate::ml::features::FEATURE_COUNT,
        },
    })
}

async fn settings_get(State(state): State<ApiState>) -> Json<SettingsResponse> {
    let config = state.config.read().await;
    Json(settings_from_config(&config, state.alert.is_configured()))
}

async fn settings_update(
    State(state): State<ApiState>,
    Json(payload): Json<SettingsUpdate>,
) -> Json<SettingsResponse> {
    let mut config = state.config.write().await;

    if let Some(enabled) = payload.log_requests {
        config.log_requests = enabled;
    }

    if let Some(enabled) = payload.alert_push_enabled {
        config.alert_push_enabled = enabled;
    }

    Json(settings_from_config(&config, state.alert.is_configured()))
}

fn validate_input(input: &TransactionInput) -> Result<(), String> {
    let numerics = [
        ("distance_from_home", input.distance_from_home),
        (
            "distance_from_last_transaction",
            input.distance_from_last_transaction,
        ),
        (
            "ratio_to_median_purchase_price",
            input.ratio_to_median_purchase_price,
        ),
    ];

    for (name, value) in numerics {
        if !value.is_finite() {
            return Err(format!("{} must be a finite number", name));
        }
        if value < 0.0 {
            return Err(format!("{} must not be negative", name));
        }
    }

    Ok(())
}

fn cors_layer() -> CorsLayer {
    let allowed = std::env::var("CARDWATCH_CORS_ORIGIN").unwrap_or_else(|_| {
        "http://localhost:5173,http://127.0.0.1:5173".to_string()
    });

    let mut cors = if allowed.trim() == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = allowed
            .split(',')
            .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    cors = cors.allow_methods([Method::GET, Method::POST, Method::PUT]);
    cors.allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn settings_from_config(config: &CoreConfig, alert_configured: bool) -> SettingsResponse {
    SettingsResponse {
        api_addr: config.api_addr.clone(),
        model_path: config.model_path.clone(),
        scaler_path: config.scaler_path.clone(),
        log_requests: config.log_requests,
        history_limit: config.history_limit,
        alert_push_enabled: config.alert_push_enabled,
        alert_configured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::tests::bias_only_model;
    use crate::ml::scaler::FeatureScaler;
    use crate::types::YesNo;

    fn test_state(bias: f64) -> ApiState {
        let predictor =
            Predictor::with_parts(FeatureScaler::identity(), bias_only_model(bias)).unwrap();
        ApiState {
            telemetry: Arc::new(TelemetryStore::new(10)),
            predictor: Arc::new(predictor),
            alert: Arc::new(AlertSync::new()),
            config: Arc::new(tokio::sync::RwLock::new(CoreConfig {
                api_addr: "127.0.0.1:0".to_string(),
                model_path: String::new(),
                scaler_path: String::new(),
                log_requests: false,
                history_limit: 10,
                alert_push_enabled: false,
            })),
        }
    }

    fn sample_payload() -> TransactionInput {
        TransactionInput {
            distance_from_home: 10.0,
            distance_from_last_transaction: 5.0,
            ratio_to_median_purchase_price: 1.0,
            repeat_retailer: YesNo::No,
            used_chip: YesNo::Yes,
            used_pin_number: YesNo::No,
            online_order: YesNo::No,
        }
    }

    #[tokio::test]
    async fn predict_returns_fraud_payload() {
        let state = test_state(2.442347); // sigmoid -> 0.92
        let Json(response) = predict(State(state.clone()), Json(sample_payload()))
            .await
            .unwrap();

        assert!(response.fraudulent);
        assert_eq!(response.label, 1);
        assert_eq!(response.verdict, "fraudulent");
        assert_eq!(response.confidence_display, "92.00%");

        let stats = state.telemetry.snapshot_stats().await;
        assert_eq!(stats.assessed, 1);
        assert_eq!(stats.flagged, 1);
    }

    #[tokio::test]
    async fn predict_rejects_negative_distance() {
        let state = test_state(0.0);
        let mut payload = sample_payload();
        payload.distance_from_home = -1.0;

        let (code, Json(body)) = predict(State(state.clone()), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");

        // rejected before assembly: nothing recorded
        let stats = state.telemetry.snapshot_stats().await;
        assert_eq!(stats.assessed, 0);
    }

    #[tokio::test]
    async fn predict_rejects_non_finite_ratio() {
        let state = test_state(0.0);
        let mut payload = sample_payload();
        payload.ratio_to_median_purchase_price = f64::NAN;

        let (code, _) = predict(State(state), Json(payload)).await.unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn settings_update_only_touches_runtime_knobs() {
        let state = test_state(0.0);
        let Json(response) = settings_update(
            State(state.clone()),
            Json(SettingsUpdate {
                log_requests: Some(true),
                alert_push_enabled: Some(true),
            }),
        )
        .await;

        assert!(response.log_requests);
        assert!(response.alert_push_enabled);

        let config = state.config.read().await;
        assert!(config.log_requests);
        assert!(config.alert_push_enabled);
    }
}
