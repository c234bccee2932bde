//! Box-office prediction service
//!
//! Loads one predictor at startup and serves it over HTTP alongside
//! health probes and Prometheus metrics.

pub mod api;
pub mod config;
