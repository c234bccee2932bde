//! Health tracking for the inference service
//!
//! Reports whether model artifacts are loaded and whether recent inference
//! calls are succeeding, for liveness and readiness probes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive inference failures before the inference component degrades
pub const DEGRADED_AFTER_FAILURES: u32 = 5;

/// Component names for health tracking
pub mod components {
    pub const MODEL_ARTIFACTS: &str = "model_artifacts";
    pub const INFERENCE: &str = "inference";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Worst status across components; no components reads as healthy
fn overall_status(components: &BTreeMap<String, ComponentHealth>) -> ComponentStatus {
    let mut status = ComponentStatus::Healthy;
    for health in components.values() {
        match health.status {
            ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
            ComponentStatus::Degraded => status = ComponentStatus::Degraded,
            ComponentStatus::Healthy => {}
        }
    }
    status
}

#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<BTreeMap<String, ComponentHealth>>>,
    consecutive_failures: Arc<AtomicU32>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        self.components.write().await.insert(name.to_string(), health);
    }

    /// Mark model artifacts as loaded (or failed to load)
    pub async fn set_model_loaded(&self, loaded: Result<(), String>) {
        let health = match loaded {
            Ok(()) => ComponentHealth::healthy(),
            Err(reason) => ComponentHealth::unhealthy(reason),
        };
        self.update(components::MODEL_ARTIFACTS, health).await;
    }

    /// Track inference outcomes; a run of failures degrades the component
    ///
    /// Malformed input is the caller's fault and should not be reported here.
    pub async fn record_inference(&self, succeeded: bool) {
        if succeeded {
            if self.consecutive_failures.swap(0, Ordering::Relaxed) >= DEGRADED_AFTER_FAILURES {
                self.update(components::INFERENCE, ComponentHealth::healthy()).await;
            }
            return;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures == DEGRADED_AFTER_FAILURES {
            self.update(
                components::INFERENCE,
                ComponentHealth::degraded(format!("{} consecutive inference failures", failures)),
            )
            .await;
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        HealthResponse {
            status: overall_status(&components),
            components,
        }
    }

    /// Ready once model artifacts are loaded and nothing is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let health = self.health().await;
        let loaded = health
            .components
            .get(components::MODEL_ARTIFACTS)
            .map(|c| c.status == ComponentStatus::Healthy)
            .unwrap_or(false);

        let reason = if !loaded {
            Some("Model artifacts not loaded".to_string())
        } else if health.status == ComponentStatus::Unhealthy {
            Some("Critical component unhealthy".to_string())
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}
