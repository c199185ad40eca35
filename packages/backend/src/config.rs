use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use studyplan_algo::{PipelineOptions, SchoolHoursPolicy, DEFAULT_SPAN_CEILING_DAYS};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Daily rolling log directory, when file logging is on
    pub log_dir: Option<PathBuf>,
    pub span_ceiling_days: u32,
    pub school_hours_policy: SchoolHoursPolicy,
    pub enable_adjust: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            log_level: "info".to_string(),
            log_dir: None,
            span_ceiling_days: DEFAULT_SPAN_CEILING_DAYS,
            school_hours_policy: SchoolHoursPolicy::default(),
            enable_adjust: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let log_dir = env_bool("ENABLE_FILE_LOGS").unwrap_or(false).then(|| {
            std::env::var("LOG_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./logs"))
        });

        let span_ceiling_days = std::env::var("SCHEDULE_SPAN_CEILING_DAYS")
            .ok()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(defaults.span_ceiling_days);

        let school_hours_policy = std::env::var("SCHOOL_HOURS_POLICY")
            .ok()
            .and_then(|value| SchoolHoursPolicy::parse(&value))
            .unwrap_or(defaults.school_hours_policy);

        let enable_adjust = env_bool("RUST_ENABLE_ADJUST").unwrap_or(defaults.enable_adjust);

        Self {
            host,
            port,
            log_level,
            log_dir,
            span_ceiling_days,
            school_hours_policy,
            enable_adjust,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            span_ceiling_days: self.span_ceiling_days,
            school_hours_policy: self.school_hours_policy,
        }
    }
}

pub fn env_bool(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    parse_bool(&value)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
