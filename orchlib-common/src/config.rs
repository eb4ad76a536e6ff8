//! Configuration loading and root folder resolution

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::listing::{validate_date_format, DEFAULT_DATE_FORMAT};
use crate::{Error, Result};

/// Name of the config file looked up inside the root folder
pub const CONFIG_FILE_NAME: &str = "orchlib.toml";

/// Name of the database file inside the root folder
pub const DATABASE_FILE_NAME: &str = "orchlib.db";

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/orchlib (or /var/lib/orchlib for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("orchlib"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/orchlib"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("orchlib"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/orchlib"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("orchlib"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\orchlib"))
    } else {
        PathBuf::from("./orchlib_data")
    }
}

/// Candidate config files: explicit path, then `<root>/orchlib.toml`,
/// then the per-user config directory
fn config_file_candidates(explicit: Option<&Path>, root_folder: &Path) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = vec![root_folder.join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("orchlib").join("config.toml"));
    }
    candidates
}

// ========================================
// Config file
// ========================================

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Defaults to `<root>/orchlib.db`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    /// Generated and stored in the settings table when absent
    pub api_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_token: None,
        }
    }
}

/// How notification emails leave the process
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransportKind {
    /// Log the message only
    #[default]
    Log,
    Smtp,
    /// Write `.eml` files to `file_dir`
    File,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    pub transport: EmailTransportKind,
    pub from_email: String,
    pub from_name: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_starttls: bool,
    pub file_dir: Option<PathBuf>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: EmailTransportKind::Log,
            from_email: "library@orchestra.example".to_string(),
            from_name: "Orchestra Library".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_starttls: true,
            file_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Local time of the daily reminder run, "HH:MM"
    pub run_at: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_at: "08:00".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn run_at_time(&self) -> Result<chrono::NaiveTime> {
        chrono::NaiveTime::parse_from_str(self.run_at.trim(), "%H:%M").map_err(|e| {
            Error::Config(format!("scheduler.run_at '{}' is not HH:MM: {}", self.run_at, e))
        })
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// chrono format for loan dates in listings and search
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Contents of `orchlib.toml`; every section is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub scheduler: SchedulerConfig,
    pub display: DisplayConfig,
}

impl LibraryConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LibraryConfig =
            toml::from_str(text).map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found, or defaults when there is none.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>, root_folder: &Path) -> Result<Self> {
        for candidate in config_file_candidates(explicit, root_folder) {
            if candidate.exists() {
                info!("Loading config file: {}", candidate.display());
                let text = std::fs::read_to_string(&candidate)?;
                return Self::from_toml_str(&text);
            }
            debug!("No config file at {}", candidate.display());
        }

        if let Some(path) = explicit {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        validate_date_format(&self.display.date_format)?;
        self.scheduler.run_at_time()?;

        match self.email.transport {
            EmailTransportKind::Smtp if self.email.smtp_host.is_none() => {
                return Err(Error::Config(
                    "email.smtp_host is required for the smtp transport".to_string(),
                ));
            }
            EmailTransportKind::File if self.email.file_dir.is_none() => {
                return Err(Error::Config(
                    "email.file_dir is required for the file transport".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(token) = &self.auth.api_token {
            if token.trim().is_empty() {
                return Err(Error::Config("auth.api_token must not be blank".to_string()));
            }
        }
        Ok(())
    }

    /// Database file, relative paths resolved against the root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        match &self.database.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root_folder.join(path),
            None => root_folder.join(DATABASE_FILE_NAME),
        }
    }
}
