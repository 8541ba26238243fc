//! Configuration loading and root folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`DJSITE_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never stops startup: it is logged and the
//! remaining sources are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::api::auth::parse_allowed_emails;
use crate::{Error, Result};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "DJSITE_ROOT_FOLDER";
/// Short alias accepted for the root folder
pub const ROOT_FOLDER_ENV_ALIAS: &str = "DJSITE_ROOT";

const DATABASE_FILE: &str = "djsite.db";
const BLOB_DIR: &str = "blobs";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

// ========================================
// Access policy selection
// ========================================

/// Which admin access policy the service runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicyKind {
    /// Password compared against a configured secret, flag kept per session
    #[default]
    SharedSecret,
    /// Federated sign-in restricted to an email allow-list
    AllowList,
}

impl AccessPolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPolicyKind::SharedSecret => "shared_secret",
            AccessPolicyKind::AllowList => "allow_list",
        }
    }
}

impl FromStr for AccessPolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "shared_secret" | "password" => Ok(AccessPolicyKind::SharedSecret),
            "allow_list" | "google" | "federated" => Ok(AccessPolicyKind::AllowList),
            other => Err(Error::Config(format!("Unknown access policy: {}", other))),
        }
    }
}

// ========================================
// Compiled defaults
// ========================================

/// OS-dependent fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/djsite (or /var/lib/djsite for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("djsite"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/djsite"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("djsite"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/djsite"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("djsite"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\djsite"))
    } else {
        PathBuf::from("./djsite_data")
    }
}

// ========================================
// TOML file
// ========================================

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Contents of `config.toml`; every key optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub access_policy: Option<AccessPolicyKind>,
    pub admin_password: Option<String>,
    /// Comma-separated
    pub admin_emails: Option<String>,
    pub google_client_id: Option<String>,
    pub public_base_url: Option<String>,
    pub cleanup_orphans: Option<bool>,
    pub max_upload_bytes: Option<usize>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load from an explicit path, or the first platform location that exists
    ///
    /// Returns `None` (after logging) when nothing usable is found.
    pub fn load(explicit: Option<&Path>) -> Option<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    debug!("No config file found, using environment and defaults");
                    return None;
                }
            },
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read config file {}: {}", path.display(), e);
                return None;
            }
        };

        match Self::parse(&text) {
            Ok(config) => {
                debug!("Loaded config file {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// First existing platform config file
///
/// Linux: `~/.config/djsite/config.toml`, then `/etc/djsite/config.toml`.
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("djsite").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/djsite/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

// ========================================
// Root folder
// ========================================

/// Creates the root folder layout on first run
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and blob directories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.blob_root())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn blob_root(&self) -> PathBuf {
        self.root.join(BLOB_DIR)
    }
}

// ========================================
// Resolved settings
// ========================================

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub access_policy: Option<AccessPolicyKind>,
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub access_policy: AccessPolicyKind,
    /// Shared secret; `None` disables password sign-in
    pub admin_password: Option<String>,
    /// Normalized allow-list (lower-case)
    pub admin_emails: Vec<String>,
    /// Expected `aud` of identity tokens, if checked
    pub google_client_id: Option<String>,
    /// Prefix for blob retrieval URLs; empty means site-relative
    pub public_base_url: String,
    /// Delete already-uploaded blobs when a pipeline fails later
    pub cleanup_orphans: bool,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl SiteSettings {
    /// Resolve from the process environment and the config file
    pub fn resolve(overrides: &SettingsOverrides, toml: Option<TomlConfig>) -> Result<Self> {
        Self::from_sources(overrides, toml.unwrap_or_default(), |key| std::env::var(key).ok())
    }

    /// Resolve with an injectable environment lookup
    pub fn from_sources<F>(overrides: &SettingsOverrides, toml: TomlConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CompiledDefaults::for_current_platform();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let root_folder = overrides
            .root_folder
            .clone()
            .or_else(|| env(ROOT_FOLDER_ENV).map(PathBuf::from))
            .or_else(|| env(ROOT_FOLDER_ENV_ALIAS).map(PathBuf::from))
            .or(toml.root_folder)
            .unwrap_or(defaults.root_folder);

        let bind_address = overrides
            .bind_address
            .clone()
            .or_else(|| env("DJSITE_BIND"))
            .or(toml.bind_address)
            .unwrap_or(defaults.bind_address);

        let access_policy = match (overrides.access_policy, env("DJSITE_ACCESS_POLICY")) {
            (Some(kind), _) => kind,
            (None, Some(raw)) => raw.parse()?,
            (None, None) => toml.access_policy.unwrap_or_default(),
        };

        let admin_password = env("DJSITE_ADMIN_PASSWORD").or(toml.admin_password);

        let admin_emails = env("DJSITE_ADMIN_EMAILS")
            .or(toml.admin_emails)
            .map(|raw| parse_allowed_emails(&raw))
            .unwrap_or_default();

        let google_client_id = env("DJSITE_GOOGLE_CLIENT_ID").or(toml.google_client_id);

        let public_base_url = env("DJSITE_PUBLIC_BASE_URL")
            .or(toml.public_base_url)
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        let cleanup_orphans = match env("DJSITE_CLEANUP_ORPHANS") {
            Some(raw) => parse_bool(&raw)?,
            None => toml.cleanup_orphans.unwrap_or(true),
        };

        let max_upload_bytes = match env("DJSITE_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("Invalid DJSITE_MAX_UPLOAD_BYTES '{}': {}", raw, e))
            })?,
            None => toml.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        let log_level = env("RUST_LOG")
            .or(toml.logging.level)
            .unwrap_or(defaults.log_level);

        Ok(Self {
            root_folder,
            bind_address,
            access_policy,
            admin_password,
            admin_emails,
            google_client_id,
            public_base_url,
            cleanup_orphans,
            max_upload_bytes,
            log_level,
        })
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("Invalid boolean: {}", other))),
    }
}
