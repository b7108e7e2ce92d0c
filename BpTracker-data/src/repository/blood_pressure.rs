use std::path::Path;
use tracing::{debug, info};

use crate::config::DataFileConfig;
use crate::models::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
use super::errors::RepositoryError;
use super::flat_file::FlatFileStorage;
use super::line_format::LoadedReadings;

/// Repository trait for blood pressure readings
pub trait BloodPressureRepositoryTrait {
    /// Append a new blood pressure reading from a request
    fn create(&self, request: CreateBloodPressureRequest) -> Result<BloodPressureReading, RepositoryError>;

    /// Load every reading together with the lines that could not be parsed
    fn load(&self) -> Result<LoadedReadings, RepositoryError>;

    /// Human readable name of the backing store
    fn describe(&self) -> String;
}

/// Repository for blood pressure readings backed by the flat data file.
#[derive(Debug, Clone)]
pub struct BloodPressureRepository {
    storage: FlatFileStorage,
}

impl BloodPressureRepository {
    /// Create a new repository over the given data file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            storage: FlatFileStorage::new(path),
        }
    }

    /// Create a repository over the configured data file
    pub fn from_config(config: &DataFileConfig) -> Self {
        Self::new(&config.data_file)
    }

    /// Returns the data file path
    pub fn path(&self) -> &Path {
        self.storage.path()
    }
}

impl BloodPressureRepositoryTrait for BloodPressureRepository {
    fn create(&self, request: CreateBloodPressureRequest) -> Result<BloodPressureReading, RepositoryError> {
        let reading = BloodPressureReading {
            systolic: request.systolic,
            diastolic: request.diastolic,
            pulse: request.pulse,
            timestamp: request.timestamp,
        };

        self.storage.append(&reading)?;
        info!(
            "Recorded {}/{} pulse {} at {} in {}",
            reading.systolic,
            reading.diastolic,
            reading.pulse,
            reading.timestamp,
            self.storage.path().display()
        );
        Ok(reading)
    }

    fn load(&self) -> Result<LoadedReadings, RepositoryError> {
        debug!("Loading readings through {}", self.describe());
        self.storage.load()
    }

    fn describe(&self) -> String {
        format!("file: {}", self.storage.path().display())
    }
}

/// Mock blood pressure repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::repository::in_memory::InMemoryStorage;
    use crate::repository::line_format::InvalidLine;

    /// Mock implementation of BloodPressureRepository for testing
    #[derive(Debug, Clone, Default)]
    pub struct MockBloodPressureRepository {
        storage: InMemoryStorage,
        invalid: Vec<InvalidLine>,
        missing: bool,
        read_only: bool,
    }

    impl MockBloodPressureRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined readings
        pub fn with_readings(readings: Vec<BloodPressureReading>) -> Self {
            Self {
                storage: InMemoryStorage::with_readings(readings),
                ..Self::default()
            }
        }

        /// Report these lines as invalid on every load
        pub fn with_invalid_lines(mut self, invalid: Vec<InvalidLine>) -> Self {
            self.invalid = invalid;
            self
        }

        /// Behave like a data file that does not exist
        pub fn missing(mut self) -> Self {
            self.missing = true;
            self
        }

        /// Behave like a data file that cannot be written
        pub fn read_only(mut self) -> Self {
            self.read_only = true;
            self
        }
    }

    impl BloodPressureRepositoryTrait for MockBloodPressureRepository {
        fn create(&self, request: CreateBloodPressureRequest) -> Result<BloodPressureReading, RepositoryError> {
            if self.read_only {
                return Err(RepositoryError::FileUnwritable(PathBuf::from("mock")));
            }

            let reading = BloodPressureReading {
                systolic: request.systolic,
                diastolic: request.diastolic,
                pulse: request.pulse,
                timestamp: request.timestamp,
            };
            self.storage.store_reading(&reading)
        }

        fn load(&self) -> Result<LoadedReadings, RepositoryError> {
            if self.missing {
                return Err(RepositoryError::FileNotFound(PathBuf::from("mock")));
            }

            Ok(LoadedReadings {
                readings: self.storage.get_all()?,
                invalid: self.invalid.clone(),
            })
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    #[test]
    fn test_file_repository_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let repository = BloodPressureRepository::new(dir.path().join("bp_numbers.txt"));

        let created = repository
            .create(CreateBloodPressureRequest {
                systolic: 132,
                diastolic: 64,
                pulse: 65,
                timestamp: "20220630.1839".to_string(),
            })
            .unwrap();

        let loaded = repository.load().unwrap();
        assert_eq!(loaded.readings, vec![created]);
        assert!(loaded.invalid.is_empty());
    }

    #[test]
    fn test_file_repository_describe() {
        let repository = BloodPressureRepository::from_config(&DataFileConfig::default());
        assert_eq!(repository.describe(), "file: bp_numbers.txt");
    }

    #[test]
    fn test_mock_repository_failures() {
        let missing = MockBloodPressureRepository::new().missing();
        assert!(matches!(missing.load(), Err(RepositoryError::FileNotFound(_))));

        let read_only = MockBloodPressureRepository::new().read_only();
        let result = read_only.create(CreateBloodPressureRequest {
            systolic: 120,
            diastolic: 80,
            pulse: 60,
            timestamp: "0.0".to_string(),
        });
        assert!(matches!(result, Err(RepositoryError::FileUnwritable(_))));
    }
}
