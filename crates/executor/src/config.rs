use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use super::error::Error;

/// Topology of the two detectors. Fixed for the lifetime of the process.
#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    pub currencies: Vec<String>,
    pub cycles: Vec<Vec<String>>,
    #[serde(default)]
    pub stop_on_first: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProducerConfig {
    pub batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExecutorConfig {
    pub buffer_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    pub interval_ms: u64,
    pub batch_size: usize,
    pub rate_fluctuation_bps: f64,
    pub spread_bps: f64,
    /// Stop after this many ticks; runs until shutdown when unset.
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub detector: DetectorConfig,
    pub producer: ProducerConfig,
    pub executor: ExecutorConfig,
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    fn validate(self) -> Result<Self, Error> {
        let checks = [
            (self.producer.batch_size, "producer.batch_size"),
            (self.executor.buffer_size, "executor.buffer_size"),
            (self.simulator.batch_size, "simulator.batch_size"),
        ];
        for (value, key) in checks {
            if value == 0 {
                return Err(Error::ConfigLoadError(format!("{} must be positive", key)));
            }
        }

        if self.detector.currencies.len() < 2 {
            return Err(Error::ConfigLoadError(
                "detector.currencies needs at least two currencies".to_string(),
            ));
        }

        Ok(self)
    }
}

/// Loads `crates/executor/Config.toml` relative to the working directory, overlaid by
/// `EXECUTOR_*` environment variables (e.g. `EXECUTOR_SIMULATOR__BATCH_SIZE=50`).
pub fn load_config() -> Result<Config, Error> {
    let base_path = env::current_dir().map_err(|e| {
        Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
    })?;

    let config_file_path: PathBuf = base_path
        .join("crates")
        .join("executor")
        .join("Config.toml");

    load_config_from(&config_file_path)
}

/// Loads configuration from an explicit file, overlaid by environment variables.
pub fn load_config_from(config_file_path: &Path) -> Result<Config, Error> {
    if !config_file_path.exists() {
        return Err(Error::ConfigLoadError(format!(
            "Configuration file not found at calculated path: {}",
            config_file_path.display()
        )));
    }

    let s = ConfigLoader::builder()
        .add_source(File::from(config_file_path).required(true))
        .add_source(
            Environment::with_prefix("EXECUTOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("detector.currencies"),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    app_config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MOCK_CONFIG: &str = r#"
[detector]
currencies = ["USD", "GBP"]
cycles = [["USD/GBP", "GBP/USD"]]

[producer]
batch_size = 8

[executor]
buffer_size = 4

[simulator]
interval_ms = 10
batch_size = 3
rate_fluctuation_bps = 2.5
spread_bps = 1.0
ticks = 5
seed = 7
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::with_suffix(".toml").expect("Failed to create temp file");
        temp_file
            .write_all(content.as_bytes())
            .expect("Failed to write mock config");
        temp_file
    }

    #[test]
    fn test_load_config_from_file() {
        let file = write_config(MOCK_CONFIG);
        let config = load_config_from(file.path()).expect("config should load");

        assert_eq!(config.detector.currencies, vec!["USD", "GBP"]);
        assert_eq!(config.detector.cycles, vec![vec!["USD/GBP", "GBP/USD"]]);
        assert!(!config.detector.stop_on_first);
        assert_eq!(config.producer.batch_size, 8);
        assert_eq!(config.executor.buffer_size, 4);
        assert_eq!(config.simulator.ticks, Some(5));
        assert_eq!(config.simulator.seed, Some(7));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let file = write_config(&MOCK_CONFIG.replace("batch_size = 8", "batch_size = 0"));
        let result = load_config_from(file.path());

        match result {
            Err(Error::ConfigLoadError(msg)) => assert!(msg.contains("producer.batch_size")),
            other => panic!("Expected ConfigLoadError, got: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = load_config_from(Path::new("does/not/exist/Config.toml"));
        assert!(matches!(result, Err(Error::ConfigLoadError(_))));
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Config.toml");
        let config = load_config_from(&path).expect("bundled Config.toml should load");

        assert_eq!(config.detector.currencies.len(), 10);
        assert!(!config.detector.cycles.is_empty());
    }
}
