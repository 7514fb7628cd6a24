use std::{env, fmt, ops::RangeInclusive, path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::warn;

use crate::types::Endpoint;
use crate::validation::validate_endpoint;
use crate::DEFAULT_PROBE_TIMEOUT_SECS;

/// Endpoints checked when `URLS` is unset or blank
pub const DEFAULT_URLS: [&str; 2] = ["https://www.google.com", "https://www.github.com"];

/// Sender used when `ALERT_EMAIL_FROM` is unset
pub const DEFAULT_EMAIL_FROM: &str = "health-checker@example.com";

/// Accepted `PROBE_TIMEOUT` values, in seconds
pub const PROBE_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SMTP_PORT must be a port number, got {0:?}")]
    InvalidSmtpPort(String),
    #[error("PROBE_TIMEOUT must be a whole number of seconds, got {0:?}")]
    InvalidProbeTimeout(String),
    #[error(
        "PROBE_TIMEOUT must be between {min} and {max} seconds, got {0}",
        min = PROBE_TIMEOUT_RANGE.start(),
        max = PROBE_TIMEOUT_RANGE.end()
    )]
    ProbeTimeoutOutOfRange(u64),
}

/// Resolved process configuration, built once and read-only afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoints: Vec<Endpoint>,
    pub log_file: Option<PathBuf>,
    pub probe_timeout: Duration,
    pub webhook_url: Option<String>,
    pub email: EmailSettings,
}

/// Email channel settings
#[derive(Debug, Clone, PartialEq)]
pub struct EmailSettings {
    /// Recipient; the email channel is enabled iff this is set
    pub to: Option<String>,
    pub from: String,
    pub smtp: SmtpSettings,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmtpSettings {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: String,
}

impl SmtpSettings {
    /// Server, port and user, or `None` when any of them is missing
    ///
    /// Port 0 counts as missing.
    pub fn connection(&self) -> Option<(&str, u16, &str)> {
        match (&self.server, self.port, &self.user) {
            (Some(server), Some(port), Some(user)) if port != 0 => Some((server, port, user)),
            _ => None,
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self { to: None, from: DEFAULT_EMAIL_FROM.into(), smtp: SmtpSettings::default() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_URLS.iter().copied().map(Endpoint::from).collect(),
            log_file: None,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            webhook_url: None,
            email: EmailSettings::default(),
        }
    }
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    ///
    /// Values are trimmed and empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
        };

        // A non-blank URLS is taken as is, even when it lists nothing
        let endpoints = match get("URLS") {
            Some(raw) => parse_endpoints(&raw),
            None => Config::default().endpoints,
        };
        for endpoint in &endpoints {
            if let Err(error) = validate_endpoint(endpoint.as_str()) {
                warn!(endpoint = %endpoint, "endpoint will be reported down: {error:#}");
            }
        }

        let probe_timeout = match get("PROBE_TIMEOUT") {
            Some(raw) => {
                let seconds: u64 =
                    raw.parse().map_err(|_| ConfigError::InvalidProbeTimeout(raw.clone()))?;
                if !PROBE_TIMEOUT_RANGE.contains(&seconds) {
                    return Err(ConfigError::ProbeTimeoutOutOfRange(seconds));
                }
                Duration::from_secs(seconds)
            }
            None => Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        };

        let port = match get("SMTP_PORT") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidSmtpPort(raw.clone()))?),
            None => None,
        };

        Ok(Self {
            endpoints,
            log_file: get("LOG_FILE").map(PathBuf::from),
            probe_timeout,
            webhook_url: get("SLACK_WEBHOOK"),
            email: EmailSettings {
                to: get("ALERT_EMAIL_TO"),
                from: get("ALERT_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.into()),
                smtp: SmtpSettings {
                    server: get("SMTP_SERVER"),
                    port,
                    user: get("SMTP_USER"),
                    password: get("SMTP_PASS").unwrap_or_default(),
                },
            },
        })
    }
}

/// Split a comma separated endpoint list, skipping blank entries
pub fn parse_endpoints(raw: &str) -> Vec<Endpoint> {
    raw.split(',').map(str::trim).filter(|url| !url.is_empty()).map(Endpoint::from).collect()
}

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("<unset>")
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Health Checker Configuration:")?;
        write_title_1(f, "Probes")?;
        for endpoint in &self.endpoints {
            write_1(f, "Endpoint", endpoint)?;
        }
        write_1(f, "Timeout", &format!("{}s", self.probe_timeout.as_secs()))?;
        write_1(
            f,
            "Log File",
            &or_unset(self.log_file.as_deref().and_then(|path| path.to_str())),
        )?;

        write_title_1(f, "Webhook")?;
        write_1(f, "URL", &or_unset(self.webhook_url.as_deref()))?;

        let smtp = &self.email.smtp;
        write_title_1(f, "Email")?;
        write_1(f, "To", &or_unset(self.email.to.as_deref()))?;
        write_1(f, "From", &self.email.from)?;
        write_1(f, "SMTP Server", &or_unset(smtp.server.as_deref()))?;
        let port = smtp.port.map_or_else(|| "<unset>".to_string(), |port| port.to_string());
        write_1(f, "SMTP Port", &port)?;
        write_1(f, "SMTP User", &or_unset(smtp.user.as_deref()))?;
        let password = if smtp.password.is_empty() { "<unset>" } else { "********" };
        write_1(f, "SMTP Password", &password)?;

        Ok(())
    }
}
