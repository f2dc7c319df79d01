use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bazaar_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_SNAPSHOT_PATH: &str = "data/audit-snapshot.json";

/// Audit persistence backend chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditBackendConfig {
    /// In-process snapshot loaded on start and flushed on stop.
    Snapshot { path: PathBuf },
    /// Relational store accessed with hand-written SQL.
    Postgres { database_url: String },
    /// Relational store accessed through the ORM entity model.
    Orm { database_url: String },
}

impl AuditBackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Postgres { .. } => "postgres",
            Self::Orm { .. } => "orm",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub audit_backend: AuditBackendConfig,
    pub database_max_connections: u32,
    pub audit_write_timeout: Duration,
    pub performance_slow_threshold: Duration,
    pub api_host: String,
    pub api_port: u16,
    pub admin_email: String,
    pub admin_password: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let audit_backend = match optional("AUDIT_BACKEND")
            .unwrap_or_else(|| "snapshot".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "snapshot" => AuditBackendConfig::Snapshot {
                path: PathBuf::from(
                    optional("AUDIT_SNAPSHOT_PATH")
                        .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_owned()),
                ),
            },
            "postgres" => AuditBackendConfig::Postgres {
                database_url: required(&optional, "DATABASE_URL")?,
            },
            "orm" => AuditBackendConfig::Orm {
                database_url: required(&optional, "DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "AUDIT_BACKEND must be one of 'snapshot', 'postgres' or 'orm', got '{other}'"
                )));
            }
        };

        let database_max_connections =
            parsed(&optional, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(10);
        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let audit_write_timeout =
            Duration::from_millis(parsed(&optional, "AUDIT_WRITE_TIMEOUT_MS")?.unwrap_or(5_000));
        let performance_slow_threshold = Duration::from_millis(
            parsed(&optional, "PERFORMANCE_SLOW_THRESHOLD_MS")?.unwrap_or(500),
        );

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parsed(&optional, "API_PORT")?.unwrap_or(3001);

        Ok(Self {
            migrate_only,
            audit_backend,
            database_max_connections,
            audit_write_timeout,
            performance_slow_threshold,
            api_host,
            api_port,
            admin_email: optional("AUTH_ADMIN_EMAIL")
                .unwrap_or_else(|| "admin@admin.ru".to_owned()),
            admin_password: optional("AUTH_ADMIN_PASSWORD"),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;

        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required(optional: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parsed<T>(optional: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
        })
        .transpose()
}
