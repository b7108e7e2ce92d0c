pub mod classifier;
pub mod aggregate;
pub mod blood_pressure;

// Domain services
// Classification, filtering and statistics, and the service tying them to a repository.

// Re-export service traits and factory functions
pub use aggregate::{AggregateError, FilterError, ReadingFilter};
pub use blood_pressure::{
    create_default_blood_pressure_service, BloodPressureService, BloodPressureServiceError,
    BloodPressureServiceTrait,
};
pub use classifier::ClassifierError;
