//! # Application State Management
//!
//! Shared state handed to every request handler: the current configuration
//! and the counters behind `/health` and `/metrics`.
//!
//! ## Arc<RwLock<T>> Pattern
//! - **Arc**: every worker's `web::Data<AppState>` points at the same data
//! - **RwLock**: many readers of the config, one writer on `PUT /config`
//!
//! The audio core itself is stateless; only this bookkeeping is shared.

use crate::audio::ContainerFormat;
use crate::config::AppConfig;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration (can be updated at runtime)
    pub config: Arc<RwLock<AppConfig>>,

    /// Request and inspection counters
    pub metrics: Arc<RwLock<AppMetrics>>,

    pub start_time: Instant,
}

/// Counters collected across all HTTP requests.
#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    pub request_count: u64,

    pub error_count: u64,

    /// Buffers classified, keyed by detected container
    pub format_counts: HashMap<ContainerFormat, u64>,

    /// Header parse failures, keyed by `ParseError::kind()`
    pub parse_failures: HashMap<&'static str, u64>,

    /// Key: route pattern with method (e.g. "POST /api/v1/audio/inspect")
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,

    /// Cumulative time spent on this endpoint (milliseconds)
    pub total_duration_ms: u64,

    pub error_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
        }
    }

    /// Get a copy of the current configuration.
    ///
    /// Cloning releases the lock immediately, so other threads aren't blocked.
    pub fn get_config(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the configuration if the new one validates.
    pub fn update_config(&self, new_config: AppConfig) -> Result<(), String> {
        new_config.validate().map_err(|e| e.to_string())?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = new_config;
        Ok(())
    }

    fn with_metrics<F: FnOnce(&mut AppMetrics)>(&self, update: F) {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut metrics);
    }

    pub fn increment_request_count(&self) {
        self.with_metrics(|m| m.request_count += 1);
    }

    pub fn increment_error_count(&self) {
        self.with_metrics(|m| m.error_count += 1);
    }

    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        self.with_metrics(|m| {
            let endpoint_metric = m.endpoint_metrics.entry(endpoint.to_string()).or_default();
            endpoint_metric.request_count += 1;
            endpoint_metric.total_duration_ms += duration_ms;
            if is_error {
                endpoint_metric.error_count += 1;
            }
        });
    }

    /// Count one classified buffer.
    pub fn record_format(&self, format: ContainerFormat) {
        self.with_metrics(|m| *m.format_counts.entry(format).or_default() += 1);
    }

    /// Count one header parse failure by kind.
    pub fn record_parse_failure(&self, kind: &'static str) {
        self.with_metrics(|m| *m.parse_failures.entry(kind).or_default() += 1);
    }

    /// Snapshot of current metrics, taken under a read lock and cloned so the
    /// lock is not held while serializing a response.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl AppMetrics {
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Format counts with stable string keys for JSON output.
    pub fn format_counts_by_name(&self) -> HashMap<&'static str, u64> {
        self.format_counts
            .iter()
            .map(|(format, count)| (format.as_str(), *count))
            .collect()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_failure_counters() {
        let state = AppState::new(AppConfig::default());
        state.record_format(ContainerFormat::Wav);
        state.record_format(ContainerFormat::Wav);
        state.record_format(ContainerFormat::Ogg);
        state.record_parse_failure("truncated_chunk");

        let snapshot = state.get_metrics_snapshot();
        assert_eq!(snapshot.format_counts.get(&ContainerFormat::Wav), Some(&2));
        assert_eq!(snapshot.format_counts_by_name().get("ogg"), Some(&1));
        assert_eq!(snapshot.parse_failures.get("truncated_chunk"), Some(&1));
    }

    #[test]
    fn test_update_config_validates() {
        let state = AppState::new(AppConfig::default());

        let mut bad = AppConfig::default();
        bad.server.port = 0;
        assert!(state.update_config(bad).is_err());
        assert_eq!(state.get_config().server.port, 8080);

        let mut good = AppConfig::default();
        good.audio.strict_header_validation = true;
        assert!(state.update_config(good).is_ok());
        assert!(state.get_config().audio.strict_header_validation);
    }

    #[test]
    fn test_endpoint_metrics() {
        let state = AppState::new(AppConfig::default());
        state.record_endpoint_request("POST /api/v1/audio/wav", 10, false);
        state.record_endpoint_request("POST /api/v1/audio/wav", 30, true);

        let snapshot = state.get_metrics_snapshot();
        let metric = &snapshot.endpoint_metrics["POST /api/v1/audio/wav"];
        assert_eq!(metric.average_duration_ms(), 20.0);
        assert_eq!(metric.error_rate(), 0.5);
    }
}
