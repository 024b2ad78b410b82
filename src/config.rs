use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DashboardConfig {
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
    pub server: ServerConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the local key-value storage
    #[serde(default = "default_storage_path")]
    pub path: String,

    /// Entry name of the persisted snapshot
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Persist the snapshot to disk; in-memory only when false
    #[serde(default = "default_persist")]
    pub persist: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Simulated round trip before a device toggle commits
    #[serde(default = "default_toggle_delay_ms")]
    pub toggle_delay_ms: u64,

    /// Time a freshly mounted camera feed spends loading
    #[serde(default = "default_feed_load_delay_ms")]
    pub feed_load_delay_ms: u64,

    /// Time a manual camera refresh spends loading
    #[serde(default = "default_feed_refresh_delay_ms")]
    pub feed_refresh_delay_ms: u64,

    /// Probability that a feed load resolves to a connection error
    #[serde(default = "default_failure_probability")]
    pub failure_probability: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// IP address to bind to
    #[serde(default = "default_server_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Read single-key commands from the terminal
    #[serde(default = "default_keyboard")]
    pub keyboard: bool,
}

impl SimulationConfig {
    pub fn toggle_delay(&self) -> Duration {
        Duration::from_millis(self.toggle_delay_ms)
    }

    pub fn feed_load_delay(&self) -> Duration {
        Duration::from_millis(self.feed_load_delay_ms)
    }

    pub fn feed_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.feed_refresh_delay_ms)
    }
}

impl DashboardConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("storage.path", default_storage_path())?
            .set_default("storage.key", default_storage_key())?
            .set_default("storage.persist", default_persist())?
            .set_default("simulation.toggle_delay_ms", default_toggle_delay_ms())?
            .set_default(
                "simulation.feed_load_delay_ms",
                default_feed_load_delay_ms(),
            )?
            .set_default(
                "simulation.feed_refresh_delay_ms",
                default_feed_refresh_delay_ms(),
            )?
            .set_default(
                "simulation.failure_probability",
                default_failure_probability(),
            )?
            .set_default("server.ip", default_server_ip())?
            .set_default("server.port", default_server_port())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .set_default("system.keyboard", default_keyboard())?
            .add_source(File::with_name(&path_str).required(false))
            // HOMEDASH_SERVER__PORT=8080 overrides server.port
            .add_source(
                Environment::with_prefix("HOMEDASH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: DashboardConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Render the configuration as a TOML document
    pub fn to_toml(&self) -> crate::error::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::Message(
                "Storage key must not be empty".to_string(),
            ));
        }

        if self.simulation.toggle_delay_ms == 0 {
            return Err(ConfigError::Message(
                "Simulation toggle_delay_ms must be greater than 0".to_string(),
            ));
        }

        if self.simulation.feed_load_delay_ms == 0 || self.simulation.feed_refresh_delay_ms == 0 {
            return Err(ConfigError::Message(
                "Simulation feed delays must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.simulation.failure_probability) {
            return Err(ConfigError::Message(format!(
                "Simulation failure_probability must be within 0.0..=1.0, got {}",
                self.simulation.failure_probability
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: default_storage_path(),
                key: default_storage_key(),
                persist: default_persist(),
            },
            simulation: SimulationConfig {
                toggle_delay_ms: default_toggle_delay_ms(),
                feed_load_delay_ms: default_feed_load_delay_ms(),
                feed_refresh_delay_ms: default_feed_refresh_delay_ms(),
                failure_probability: default_failure_probability(),
            },
            server: ServerConfig {
                ip: default_server_ip(),
                port: default_server_port(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
                keyboard: default_keyboard(),
            },
        }
    }
}

// Default value functions
fn default_storage_path() -> String {
    "./data".to_string()
}
fn default_storage_key() -> String {
    crate::store::DEFAULT_STORAGE_KEY.to_string()
}
fn default_persist() -> bool {
    true
}

fn default_toggle_delay_ms() -> u64 {
    500
}
fn default_feed_load_delay_ms() -> u64 {
    1500
}
fn default_feed_refresh_delay_ms() -> u64 {
    1000
}
fn default_failure_probability() -> f64 {
    0.2
}

fn default_server_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_server_port() -> u16 {
    3000
}

fn default_event_bus_capacity() -> usize {
    100
}
fn default_keyboard() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.storage.key, "smart-home-storage");
        assert_eq!(config.simulation.toggle_delay(), Duration::from_millis(500));
        assert_eq!(config.simulation.feed_load_delay(), Duration::from_millis(1500));
        assert_eq!(
            config.simulation.feed_refresh_delay(),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_from_file(dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homedash.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8088\n\n[simulation]\nfailure_probability = 0.5"
        )
        .unwrap();

        let config = DashboardConfig::load_from_file(&path).unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.simulation.failure_probability, 0.5);
        assert_eq!(config.simulation.toggle_delay_ms, 500);
    }

    #[test]
    fn test_toml_output_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homedash.toml");

        let mut config = DashboardConfig::default();
        config.server.port = 9090;
        config.storage.persist = false;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = DashboardConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_validation() {
        let mut config = DashboardConfig::default();

        config.simulation.failure_probability = 1.5;
        assert!(config.validate().is_err());

        config.simulation.failure_probability = 0.2;
        config.storage.key = "  ".to_string();
        assert!(config.validate().is_err());

        config.storage.key = "smart-home-storage".to_string();
        config.simulation.toggle_delay_ms = 0;
        assert!(config.validate().is_err());

        config.simulation.toggle_delay_ms = 500;
        assert!(config.validate().is_ok());
    }
}
