use serde::{Deserialize, Serialize};

/// Timestamp written for readings recorded without a time
pub const NO_TIMESTAMP: &str = "0.0";

/// Storage model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Pulse rate in beats per minute
    pub pulse: u16,

    /// When the reading was taken, `YYYYMMDD.HHMM` or `0.0`
    pub timestamp: String,
}

impl BloodPressureReading {
    /// Whether the reading carries a real timestamp
    pub fn has_timestamp(&self) -> bool {
        self.timestamp != NO_TIMESTAMP
    }
}

/// Input data for appending a new blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Pulse rate in beats per minute
    pub pulse: u16,

    /// When the reading was taken, already formatted as `YYYYMMDD.HHMM`
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_timestamp() {
        let mut reading = BloodPressureReading {
            systolic: 115,
            diastolic: 67,
            pulse: 66,
            timestamp: NO_TIMESTAMP.to_string(),
        };
        assert!(!reading.has_timestamp());

        reading.timestamp = "20220914.0800".to_string();
        assert!(reading.has_timestamp());
    }
}
