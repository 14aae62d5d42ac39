//! Process configuration read from `.env` and the environment.

use std::env;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::approvals::eligibility::DEFAULT_PROBATION_MONTHS;
use crate::workflows::approvals::LeavePolicy;

/// Ten years; anything longer is a misconfiguration.
const MAX_PROBATION_MONTHS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub leave: LeaveConfig,
}

/// Trimmed value of `name`, treating blank values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = var("APP_ENV")
            .map(|raw| AppEnvironment::parse(&raw))
            .unwrap_or(AppEnvironment::Development);

        let server = ServerConfig {
            host: var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: match var("APP_PORT") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
                None => 3000,
            },
        };

        let telemetry = TelemetryConfig {
            log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        let storage = StorageConfig {
            data_path: var("APP_DATA_PATH").map(PathBuf::from),
        };

        let leave = LeaveConfig {
            probation_months: match var("APP_PROBATION_MONTHS") {
                Some(raw) => match raw.parse() {
                    Ok(months) if months <= MAX_PROBATION_MONTHS => months,
                    _ => return Err(ConfigError::InvalidProbationMonths(raw)),
                },
                None => DEFAULT_PROBATION_MONTHS,
            },
            enforce_maternity_rules: match var("APP_ENFORCE_MATERNITY_RULES") {
                Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                    name: "APP_ENFORCE_MATERNITY_RULES",
                    value: raw,
                })?,
                None => true,
            },
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            storage,
            leave,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Bind address; `localhost` maps to the IPv4 loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host.parse().map_err(|source| ConfigError::InvalidHost {
                host: self.host.clone(),
                source,
            })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Where the records document lives. `None` keeps everything in memory.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_path: Option<PathBuf>,
}

/// Intake rules for leave requests and new hires.
#[derive(Debug, Clone, Copy)]
pub struct LeaveConfig {
    pub probation_months: u32,
    pub enforce_maternity_rules: bool,
}

impl LeaveConfig {
    pub fn policy(&self) -> LeavePolicy {
        LeavePolicy {
            enforce_maternity_rules: self.enforce_maternity_rules,
            probation_months: self.probation_months,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT `{0}` is not a port number")]
    InvalidPort(String),
    #[error("APP_HOST `{host}` is not an IP address or `localhost`")]
    InvalidHost {
        host: String,
        #[source]
        source: AddrParseError,
    },
    #[error("APP_PROBATION_MONTHS `{0}` is not a whole number of months up to 120")]
    InvalidProbationMonths(String),
    #[error("{name} `{value}` is not a boolean flag (true/false, yes/no, on/off, 1/0)")]
    InvalidFlag { name: &'static str, value: String },
}
