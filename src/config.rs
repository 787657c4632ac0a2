use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Wurzelverzeichnis, das der Dienst ausliefert.
    pub root: PathBuf,
    /// Verzeichnis für statische UI-Dateien (`/static`).
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub purge_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_true")]
    pub show_hidden: bool,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Adressen, die beim Start gesperrt werden.
    #[serde(default)]
    pub banned_ips: Vec<String>,
    /// `X-Forwarded-For`/`X-Real-IP` nur hinter einem vertrauenswürdigen Proxy auswerten.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
    #[serde(default = "default_true")]
    pub admin_loopback_only: bool,
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { show_hidden: true, excludes: Vec::new() }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            banned_ips: Vec::new(),
            trust_forwarded_headers: false,
            admin_loopback_only: true,
            enable_hsts: None,
            hsts_max_age: None,
            hsts_include_subdomains: None,
            csp: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
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

impl AppConfig {
    /// Default configuration serving `root`. Used by tests and benches.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let mut cfg = Self::default();
        cfg.storage.root = root.into();
        cfg
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: dateiwald.toml (in CWD)
        .add_source(::config::File::with_name("dateiwald").required(false));

    if let Ok(custom_path) = std::env::var("DATEIWALD_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(
        ::config::Environment::with_prefix("DATEIWALD")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("listing.excludes")
            .with_list_parse_key("security.banned_ips"),
    );

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

/// Upper bound for `upload.max_bytes` (1 GiB).
const MAX_UPLOAD_CEILING: u64 = 1024 * 1024 * 1024;

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Storage
    if cfg.storage.root.as_os_str().is_empty() {
        return Err(anyhow::anyhow!("storage.root must not be empty"));
    }

    // Upload
    if cfg.upload.max_bytes == 0 || cfg.upload.max_bytes > MAX_UPLOAD_CEILING {
        return Err(anyhow::anyhow!("upload.max_bytes must be in 1..={}", MAX_UPLOAD_CEILING));
    }

    // Session
    if cfg.session.ttl_secs == 0 {
        return Err(anyhow::anyhow!("session.ttl_secs must be > 0"));
    }
    if cfg.session.purge_interval_secs == 0 {
        return Err(anyhow::anyhow!("session.purge_interval_secs must be > 0"));
    }

    // Listing
    for pattern in &cfg.listing.excludes {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid listing.excludes pattern '{}': {}", pattern, e))?;
    }

    Ok(())
}

/// Creates the root directory if needed and returns its canonical form.
///
/// Failure here is the only fatal startup condition of the service.
pub fn ensure_root_dir(root: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(root)
        .map_err(|e| anyhow::anyhow!("failed to create root directory {}: {}", root.display(), e))?;
    let canonical = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("failed to access root directory {}: {}", root.display(), e))?;
    if !canonical.is_dir() {
        return Err(anyhow::anyhow!("storage.root is not a directory: {}", canonical.display()));
    }
    Ok(canonical)
}
