// Repository module structure
pub mod errors;
pub mod line_format;
mod blood_pressure;
mod flat_file;
mod in_memory;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use line_format::{InvalidLine, LineError, LoadedReadings};
pub use blood_pressure::{BloodPressureRepository, BloodPressureRepositoryTrait};
pub use flat_file::{append_reading, check_file, load_readings, AccessMode, FlatFileStorage};
pub use in_memory::InMemoryStorage;

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use blood_pressure::tests;
