//! Layered application configuration.
//!
//! Settings are resolved from three sources, later ones winning: built-in
//! defaults, an optional TOML file (`raildash.toml` in the working directory
//! or a file named on the command line), and `RAILDASH_*` environment
//! variables (`RAILDASH_DRIVER__POLL_INTERVAL_MS=250` targets nested keys).

use std::fmt;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{AppResult, DashError};

/// Where the simulator install drops the vendor library by default.
pub const DEFAULT_DLL_PATH: &str =
    r"C:\Program Files (x86)\Steam\steamapps\common\RailWorks\plugins\RailDriver64.dll";

/// Which driver implementation to run against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Built-in simulated driver; no vendor install required.
    Simulated,
    /// The real vendor library, loaded from `dll_path`.
    Hardware,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Simulated => write!(f, "simulated"),
            Backend::Hardware => write!(f, "hardware"),
        }
    }
}

/// Driver-layer settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DriverSettings {
    pub backend: Backend,
    /// Path the vendor library is loaded from when `backend = "hardware"`.
    pub dll_path: String,
    /// Polling cadence in milliseconds.
    pub poll_interval_ms: u64,
    /// The controller whose value is polled by name and plotted.
    pub watched_controller: String,
}

/// Top-level application settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub log_level: String,
    pub driver: DriverSettings,
}

impl Settings {
    /// Builds settings from defaults, the optional config file, and the
    /// environment, then validates them.
    pub fn new(config_path: Option<&str>) -> AppResult<Self> {
        let mut builder = Config::builder()
            .set_default("log_level", "info")?
            .set_default("driver.backend", "simulated")?
            .set_default("driver.dll_path", DEFAULT_DLL_PATH)?
            .set_default("driver.poll_interval_ms", 100_i64)?
            .set_default("driver.watched_controller", "SimpleThrottle")?
            .add_source(File::with_name("raildash").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("RAILDASH").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// The polling cadence as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.driver.poll_interval_ms)
    }

    fn validate(&self) -> AppResult<()> {
        if self.driver.poll_interval_ms == 0 {
            return Err(DashError::Configuration(
                "driver.poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.driver.watched_controller.trim().is_empty() {
            return Err(DashError::Configuration(
                "driver.watched_controller must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::new(None).unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.driver.backend, Backend::Simulated);
        assert_eq!(settings.driver.poll_interval_ms, 100);
        assert_eq!(settings.poll_interval(), Duration::from_millis(100));
        assert_eq!(settings.driver.watched_controller, "SimpleThrottle");
        assert_eq!(settings.driver.dll_path, DEFAULT_DLL_PATH);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[driver]\nbackend = \"hardware\"\npoll_interval_ms = 250\nwatched_controller = \"Regulator\""
        )
        .unwrap();

        let settings = Settings::new(file.path().to_str()).unwrap();
        assert_eq!(settings.driver.backend, Backend::Hardware);
        assert_eq!(settings.driver.poll_interval_ms, 250);
        assert_eq!(settings.driver.watched_controller, "Regulator");
        // Untouched keys keep their defaults.
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[driver]\npoll_interval_ms = 0").unwrap();

        let err = Settings::new(file.path().to_str()).unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[driver]\nbackend = \"serial\"").unwrap();

        assert!(Settings::new(file.path().to_str()).is_err());
    }
}
