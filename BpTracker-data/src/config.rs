//! Data file configuration for the blood pressure tracker
//!
//! The data file is chosen from the environment:
//! - `BP_DATA_FILE` names the file directly
//! - `BP_DATA_DIR` names a directory holding `bp_numbers.txt`
//! - otherwise `bp_numbers.txt` in the working directory

use std::env;
use std::path::PathBuf;
use tracing::debug;

/// File name used when the environment does not name a data file
pub const DEFAULT_DATA_FILE: &str = "bp_numbers.txt";

/// Data file configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFileConfig {
    /// Path to the flat file of readings
    pub data_file: PathBuf,
}

impl Default for DataFileConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl DataFileConfig {
    /// Create a new data file configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = match (lookup("BP_DATA_FILE"), lookup("BP_DATA_DIR")) {
            (Some(file), _) if !file.trim().is_empty() => PathBuf::from(file.trim()),
            (_, Some(dir)) if !dir.trim().is_empty() => PathBuf::from(dir.trim()).join(DEFAULT_DATA_FILE),
            _ => PathBuf::from(DEFAULT_DATA_FILE),
        };

        debug!("Data file from environment: {}", data_file.display());

        Self { data_file }
    }

    /// Replace the configured data file, e.g. from a command line override
    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_data_file_config_default() {
        let config = DataFileConfig::default();
        assert_eq!(config.data_file, PathBuf::from("bp_numbers.txt"));
    }

    #[test]
    fn test_data_file_from_env_file() {
        let config = DataFileConfig::from_lookup(lookup_from(&[
            ("BP_DATA_FILE", "/tmp/readings.txt"),
            ("BP_DATA_DIR", "/ignored"),
        ]));
        assert_eq!(config.data_file, PathBuf::from("/tmp/readings.txt"));
    }

    #[test]
    fn test_data_file_from_env_dir() {
        let config = DataFileConfig::from_lookup(lookup_from(&[("BP_DATA_DIR", "data")]));
        assert_eq!(config.data_file, PathBuf::from("data").join("bp_numbers.txt"));
    }

    #[test]
    fn test_blank_values_fall_back_to_default() {
        let config = DataFileConfig::from_lookup(lookup_from(&[("BP_DATA_FILE", "  ")]));
        assert_eq!(config, DataFileConfig::default());
    }

    #[test]
    fn test_with_data_file_override() {
        let config = DataFileConfig::default().with_data_file("other.txt");
        assert_eq!(config.data_file, PathBuf::from("other.txt"));
    }
}
