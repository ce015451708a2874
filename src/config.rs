use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Case-insensitiver Vergleichsoperator des Backends.
///
/// SQLite vergleicht mit `LIKE` bereits case-insensitiv (ASCII), Postgres
/// braucht `ILIKE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeOperator {
    Like,
    Ilike,
}

impl LikeOperator {
    pub fn as_sql(self) -> &'static str {
        match self {
            LikeOperator::Like => "LIKE",
            LikeOperator::Ilike => "ILIKE",
        }
    }
}

/// Voreinstellungen für Kriteriensuche und Paginierung.
#[derive(Debug, Clone, Deserialize)]
pub struct SucheConfig {
    pub default_page_size: i64,
    pub default_page_number: i64,
    pub max_page_size: i64,
    pub case_insensitive_operator: LikeOperator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub activated: bool,
    pub host: String,
    pub port: u16,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub suche: SucheConfig,
    pub mail: MailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: katalog.toml (in CWD)
        .add_source(::config::File::with_name("katalog").required(false));

    if let Ok(custom_path) = std::env::var("KATALOG_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("KATALOG").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Suche/Paginierung
    if cfg.suche.default_page_size <= 0 {
        return Err(anyhow::anyhow!("suche.default_page_size must be > 0"));
    }
    if cfg.suche.default_page_number < 0 {
        return Err(anyhow::anyhow!("suche.default_page_number must be >= 0"));
    }
    if cfg.suche.max_page_size < cfg.suche.default_page_size {
        return Err(anyhow::anyhow!("suche.max_page_size must be >= default_page_size"));
    }

    // Mail
    if cfg.mail.activated && cfg.mail.host.is_empty() {
        return Err(anyhow::anyhow!("mail.host must not be empty when mail is activated"));
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
