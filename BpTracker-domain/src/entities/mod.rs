// Domain entities and value objects
pub mod blood_pressure;
pub mod conversions;

// Re-export common types for easier imports
pub use blood_pressure::{
    Averages, BloodPressureCategory, BloodPressureInsights, BloodPressureReading,
    CreateBloodPressureRequest, DataCheck, DerivedValues, HighestEvents, InvalidLine,
    ReadingAggregate, ReadingAssessment, ReadingKind, ReadingLog, SingleCategory, Stats,
    UnifiedStatus, NO_TIMESTAMP,
};
