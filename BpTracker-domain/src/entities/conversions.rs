use crate::entities::blood_pressure::{BloodPressureReading, ReadingLog};
use bp_tracker_data::models::blood_pressure as data;
use bp_tracker_data::repository::LoadedReadings;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert from data model to domain entity for blood pressure reading
pub fn convert_to_domain_reading(data_reading: data::BloodPressureReading) -> BloodPressureReading {
    BloodPressureReading {
        systolic: data_reading.systolic,
        diastolic: data_reading.diastolic,
        pulse: data_reading.pulse,
        timestamp: data_reading.timestamp,
    }
}

/// Convert a loaded data file into the domain reading log
pub fn convert_to_domain_log(loaded: LoadedReadings) -> ReadingLog {
    ReadingLog {
        readings: loaded
            .readings
            .into_iter()
            .map(convert_to_domain_reading)
            .collect(),
        invalid: loaded.invalid,
    }
}

/// Build the data layer create request once the timestamp is settled
pub fn convert_to_data_create_request(
    systolic: u16,
    diastolic: u16,
    pulse: u16,
    timestamp: String,
) -> data::CreateBloodPressureRequest {
    data::CreateBloodPressureRequest {
        systolic,
        diastolic,
        pulse,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_conversion_keeps_fields() {
        let stored = data::BloodPressureReading {
            systolic: 134,
            diastolic: 63,
            pulse: 57,
            timestamp: "20220812.0758".to_string(),
        };

        let domain = convert_to_domain_reading(stored);
        assert_eq!(domain.systolic, 134);
        assert_eq!(domain.timestamp, "20220812.0758");
        assert_eq!(domain.diastolic, 63);
        assert_eq!(domain.pulse, 57);
    }

    #[test]
    fn test_log_conversion_keeps_invalid_lines() {
        let text = "120 65 55 20220914.1407\ntotal junk times four\n";
        let log = convert_to_domain_log(bp_tracker_data::repository::line_format::parse_bytes(text.as_bytes()));

        assert_eq!(log.readings.len(), 1);
        assert_eq!(log.readings[0].pulse, 55);
        assert_eq!(log.invalid.len(), 1);
        assert_eq!(log.invalid[0].line_number, 2);
    }
}
