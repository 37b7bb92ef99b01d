use std::collections::VecDeque;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use sysinfo::System;
use tokio::sync::Mutex;

use crate::types::FraudAssessment;

#[derive(Debug, Clone, Serialize)]
pub struct ApiPrediction {
    pub id: String,
    pub timestamp: u64,
    pub verdict: String,
    pub fraud_probability: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub assessed: u64,
    pub flagged: u64,
    pub cleared: u64,
    pub uptime: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub memory_percent: f32,
}

#[derive(Debug, Default)]
struct StatsCounters {
    assessed: u64,
    flagged: u64,
    cleared: u64,
}

pub struct TelemetryStore {
    start_time: SystemTime,
    history_limit: usize,
    stats: Mutex<StatsCounters>,
    predictions: Mutex<VecDeque<ApiPrediction>>,
    system: Mutex<System>,
}

impl TelemetryStore {
    pub fn new(history_limit: usize) -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        TelemetryStore {
            start_time: SystemTime::now(),
            history_limit,
            stats: Mutex::new(StatsCounters::default()),
            predictions: Mutex::new(VecDeque::with_capacity(history_limit)),
            system: Mutex::new(system),
        }
    }

    pub async fn snapshot_stats(&self) -> StatsSnapshot {
        let stats = self.stats.lock().await;
        StatsSnapshot {
            assessed: stats.assessed,
            flagged: stats.flagged,
            cleared: stats.cleared,
            uptime: format_uptime(
                SystemTime::now()
                    .duration_since(self.start_time)
                    .unwrap_or(Duration::from_secs(0)),
            ),
        }
    }

    pub async fn snapshot_predictions(&self) -> Vec<ApiPrediction> {
        let predictions = self.predictions.lock().await;
        predictions.iter().cloned().collect()
    }

    pub async fn health_snapshot(&self) -> SystemHealth {
        let mut system = self.system.lock().await;
        system.refresh_cpu();
        system.refresh_memory();

        let cpu_percent = system.global_cpu_info().cpu_usage();
        let total_mem = system.total_memory();
        let used_mem = system.used_memory();
        let memory_percent = if total_mem > 0 {
            (used_mem as f32 / total_mem as f32) * 100.0
        } else {
            0.0
        };

        SystemHealth {
            cpu_percent,
            memory_mb: used_mem / (1024 * 1024),
            memory_percent,
        }
    }

    pub async fn record_assessment(
        &self,
        id: String,
        assessment: &FraudAssessment,
    ) -> ApiPrediction {
        {
            let mut stats = self.stats.lock().await;
            stats.assessed = stats.assessed.saturating_add(1);
            if assessment.label.is_fraud() {
                stats.flagged = stats.flagged.saturating_add(1);
            } else {
                stats.cleared = stats.cleared.saturating_add(1);
            }
        }

        let entry = ApiPrediction {
            id,
            timestamp: epoch_seconds_now(),
            verdict: assessment.verdict_label().to_string(),
            fraud_probability: assessment.fraud_probability,
            confidence: assessment.confidence,
        };

        let mut predictions = self.predictions.lock().await;
        predictions.push_front(entry.clone());
        while predictions.len() > self.history_limit {
            predictions.pop_back();
        }

        entry
    }
}

pub fn system_status_from_recent(predictions: &[ApiPrediction]) -> String {
    let flagged = predictions
        .iter()
        .filter(|entry| entry.verdict == "fraudulent");
    let mut any = false;
    for entry in flagged {
        if entry.confidence >= 90.0 {
            return "elevated".to_string();
        }
        any = true;
    }
    if any {
        "flagged".to_string()
    } else {
        "clear".to_string()
    }
}

fn epoch_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

fn format_uptime(duration: Duration) -> String {
    let total_minutes = duration.as_secs() / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("{}d {}h {}m", days, hours, minutes)
}
