use std::sync::{Arc, Mutex};

use crate::models::blood_pressure::BloodPressureReading;
use super::errors::RepositoryError;

/// In-memory storage implementation for blood pressure readings
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    /// Readings in insertion order
    readings: Arc<Mutex<Vec<BloodPressureReading>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory storage seeded with readings
    pub fn with_readings(readings: Vec<BloodPressureReading>) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings)),
        }
    }

    /// Store a reading in memory
    pub fn store_reading(&self, reading: &BloodPressureReading) -> Result<BloodPressureReading, RepositoryError> {
        let mut store = self.readings.lock()?;
        store.push(reading.clone());
        Ok(reading.clone())
    }

    /// Get all readings from memory
    pub fn get_all(&self) -> Result<Vec<BloodPressureReading>, RepositoryError> {
        let store = self.readings.lock()?;
        Ok(store.clone())
    }
}
