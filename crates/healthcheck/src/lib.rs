//! Healthcheck - endpoint probing and alert fan-out
//!
//! This library probes a configured set of HTTP endpoints, classifies each
//! one as up or down, emits one JSON record per result and fans alerts out
//! to the enabled notification channels.
//!
//! Front-ends (CLI, HTTP handler, scheduler) only need [`Orchestrator::run_checks`].

pub mod config;
pub mod dispatch;
pub mod notify;
pub mod orchestrator;
pub mod prober;
pub mod scheduler;
pub mod sink;
pub mod types;
pub mod validation;

pub use config::{Config, ConfigError, EmailSettings, SmtpSettings};
pub use dispatch::AlertDispatcher;
pub use notify::{Delivery, EmailNotifier, Notifier, WebhookNotifier};
pub use orchestrator::{BuildError, Orchestrator};
pub use prober::{HttpProber, Prober};
pub use scheduler::Scheduler;
pub use sink::EventSink;
pub use types::{AlertEvent, CheckResult, DownReason, Endpoint, Status};

/// Timeout applied to a single probe when none is configured
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Timeout applied to webhook deliveries
pub const WEBHOOK_TIMEOUT_SECS: u64 = 5;

/// Timeout applied to a whole SMTP session
pub const SMTP_TIMEOUT_SECS: u64 = 10;

/// Port on which SMTP uses implicit TLS instead of STARTTLS
pub const SMTPS_PORT: u16 = 465;
