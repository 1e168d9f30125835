use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which platform quirks to apply (see `shares::Platform` for the divergent
/// SQL column name between distributions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Fedora,
    Ubuntu,
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Fedora
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/agent.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// DB-stored API key, sent hashed (`Api-Key: <sha1-hex>`).
    pub api_key: String,
    /// Shared secret sent verbatim as `Authorization: Token <shared_secret>`.
    pub shared_secret: String,
    pub disable_cert_checking: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "pfe.example.com".to_string(),
            port: 443,
            api_key: String::new(),
            shared_secret: String::new(),
            disable_cert_checking: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory for the cache, pid file and log file.
    pub data_dir: PathBuf,
    /// When set, shares are derived from subdirectories of this path
    /// instead of the backing store (demo mode).
    pub demo_root: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            demo_root: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 1 (error) .. 5 (trace), mirroring the original agent's `-d` flag.
    pub level: u8,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub no_delete: bool,
    pub no_upload: bool,
    pub no_browse: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            no_delete: false,
            no_upload: false,
            no_browse: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub platform: Platform,
    pub database: DatabaseConfig,
    pub relay: RelayConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub features: FeatureFlags,
    /// Local bind address for the agent's own HTTP surface, reachable
    /// before and independent of the relay connection — mirrors the
    /// original agent's `startLocalServer` on port 4563.
    pub local_bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            database: DatabaseConfig::default(),
            relay: RelayConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            features: FeatureFlags::default(),
            local_bind: "127.0.0.1:4563".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the path in `CONFIG_FILE`, or
    /// `./config.toml` if unset. When the file does not exist, a default
    /// configuration is written out so the next run (and the operator) can
    /// see exactly what was assumed.
    pub fn load() -> Result<Self> {
        let path: PathBuf = std::env::var("CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&contents).with_context(|| "parsing config file")?
        } else {
            let config = Config::default();
            let serialized = toml::to_string_pretty(&config)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, serialized)
                .with_context(|| format!("writing default config file {}", path.display()))?;
            config
        };

        std::fs::create_dir_all(&config.storage.data_dir)
            .with_context(|| "creating data directory")?;

        Ok(config)
    }
}

/// Command-line overrides, only honored in non-production builds — matches
/// the original agent gating all flag parsing behind `!PRODUCTION`.
#[derive(Debug, clap::Parser)]
#[command(name = "homerelay-agent", about = "Home-server relay agent")]
pub struct Cli {
    /// Debug level, 1 (error) through 5 (trace).
    #[arg(short = 'd', long)]
    pub debug_level: Option<u8>,

    /// Local HTTP bind address for the `/md`, debug and health surface.
    #[arg(short = 'h', long = "h2", value_name = "ADDR")]
    pub local_addr: Option<String>,

    /// Relay API key.
    #[arg(short = 'k', long = "key")]
    pub api_key: Option<String>,

    /// Shared secret sent as the registration `Authorization: Token` header.
    #[arg(long = "secret")]
    pub shared_secret: Option<String>,

    /// Root directory for demo-mode shares (subdirectories become shares).
    #[arg(short = 'r', long = "root")]
    pub demo_root: Option<PathBuf>,

    /// Log file path override.
    #[arg(short = 'l', long = "log")]
    pub log_file: Option<PathBuf>,

    /// Relay hostname.
    #[arg(long = "pfe")]
    pub pfe_host: Option<String>,

    /// Relay port.
    #[arg(long = "pfe-port")]
    pub pfe_port: Option<u16>,

    /// Disable delete operations.
    #[arg(long = "nd")]
    pub no_delete: bool,

    /// Disable upload operations.
    #[arg(long = "nu")]
    pub no_upload: bool,

    /// Disable directory browsing.
    #[arg(long = "nb")]
    pub no_browse: bool,
}

impl Cli {
    /// Apply CLI overrides on top of a loaded config. Only called when
    /// `cfg!(debug_assertions)` is true at the call site.
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(level) = self.debug_level {
            config.logging.level = level;
        }
        if let Some(key) = self.api_key {
            config.relay.api_key = key;
        }
        if let Some(secret) = self.shared_secret {
            config.relay.shared_secret = secret;
        }
        if let Some(root) = self.demo_root {
            config.storage.demo_root = Some(root);
        }
        if let Some(host) = self.pfe_host {
            config.relay.host = host;
        }
        if let Some(local_addr) = self.local_addr {
            config.local_bind = local_addr;
        }
        if let Some(port) = self.pfe_port {
            config.relay.port = port;
        }
        config.features.no_delete |= self.no_delete;
        config.features.no_upload |= self.no_upload;
        config.features.no_browse |= self.no_browse;
        config
    }
}
