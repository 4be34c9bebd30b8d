//! Application configuration.
//!
//! ## Configuration Sources
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 Configuration Priority                     │
//! │                                                            │
//! │  1. Environment Variables (highest priority)               │
//! │     BASKET_DATA_DIR=/var/lib/basket                        │
//! │     BASKET_PLAIN_STORAGE=1                                 │
//! │                                                            │
//! │  2. TOML Config File                                       │
//! │     ~/.config/basket/basket.toml (Linux)                   │
//! │     ~/Library/Application Support/com.basket.app (macOS)   │
//! │                                                            │
//! │  3. Default Values (lowest priority)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # basket.toml
//! [storage]
//! data_dir = "/home/me/.local/share/basket"
//! keyring_service = "basket"
//! plain_only = false
//!
//! [behavior]
//! clear_cart_on_sign_out = false
//! clear_wishlist_on_sign_out = false
//! default_toast_duration_ms = 3000
//!
//! [guard]
//! protected_prefixes = ["/account", "/checkout", "/orders"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where and how state is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the plain file store. Defaults to the platform
    /// data directory when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Service name the OS keyring entries are filed under.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Skip the OS keyring entirely and keep session data in the
    /// plain file store. Useful on headless hosts without a secret
    /// service.
    #[serde(default)]
    pub plain_only: bool,
}

fn default_keyring_service() -> String {
    "basket".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: None,
            keyring_service: default_keyring_service(),
            plain_only: false,
        }
    }
}

// =============================================================================
// Behavior Settings
// =============================================================================

/// Knobs for user-visible behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSettings {
    /// Empty the cart when the user signs out. Off by default: a
    /// guest cart surviving a sign-out is the friendlier behavior.
    #[serde(default)]
    pub clear_cart_on_sign_out: bool,

    /// Empty the wishlist when the user signs out.
    #[serde(default)]
    pub clear_wishlist_on_sign_out: bool,

    /// How long a toast stays on screen when the caller gives no
    /// duration.
    #[serde(default = "default_toast_duration")]
    pub default_toast_duration_ms: u64,
}

fn default_toast_duration() -> u64 {
    basket_core::DEFAULT_TOAST_DURATION_MS
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        BehaviorSettings {
            clear_cart_on_sign_out: false,
            clear_wishlist_on_sign_out: false,
            default_toast_duration_ms: default_toast_duration(),
        }
    }
}

// =============================================================================
// Guard Settings
// =============================================================================

/// Route prefixes that require an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardSettings {
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
}

fn default_protected_prefixes() -> Vec<String> {
    vec![
        "/account".to_string(),
        "/checkout".to_string(),
        "/orders".to_string(),
    ]
}

impl Default for GuardSettings {
    fn default() -> Self {
        GuardSettings {
            protected_prefixes: default_protected_prefixes(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub behavior: BehaviorSettings,

    #[serde(default)]
    pub guard: GuardSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (basket.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| {
                    EngineError::ConfigRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                config = toml::from_str(&contents).map_err(|source| {
                    EngineError::ConfigParse {
                        path: path.clone(),
                        source,
                    }
                })?;
            } else {
                debug!(?path, "config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Saves the configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(EngineError::NoDataDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        info!(?path, "config saved");
        Ok(())
    }

    /// The directory the file store roots at, resolving the platform
    /// default when none is configured.
    pub fn resolve_data_dir(&self) -> EngineResult<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("com", "basket", "app")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(EngineError::NoDataDir)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("BASKET_DATA_DIR") {
            debug!(%dir, "overriding data dir from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(service) = std::env::var("BASKET_KEYRING_SERVICE") {
            self.storage.keyring_service = service;
        }
        if let Ok(flag) = std::env::var("BASKET_PLAIN_STORAGE") {
            self.storage.plain_only = parse_bool(&flag).unwrap_or(self.storage.plain_only);
        }
        if let Ok(flag) = std::env::var("BASKET_CLEAR_CART_ON_SIGN_OUT") {
            self.behavior.clear_cart_on_sign_out =
                parse_bool(&flag).unwrap_or(self.behavior.clear_cart_on_sign_out);
        }
        if let Ok(flag) = std::env::var("BASKET_CLEAR_WISHLIST_ON_SIGN_OUT") {
            self.behavior.clear_wishlist_on_sign_out =
                parse_bool(&flag).unwrap_or(self.behavior.clear_wishlist_on_sign_out);
        }
        if let Ok(ms) = std::env::var("BASKET_TOAST_DURATION_MS") {
            if let Ok(parsed) = ms.parse::<u64>() {
                self.behavior.default_toast_duration_ms = parsed;
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "basket", "app")
            .map(|dirs| dirs.config_dir().join("basket.toml"))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
