use chrono::Local;
use thiserror::Error;
use tracing::{debug, error};
use validator::Validate;

use crate::config::DataFileConfig;
use crate::entities::blood_pressure::{
    Averages, BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest, DataCheck,
    HighestEvents, InvalidLine, ReadingAssessment, ReadingKind, ReadingLog, NO_TIMESTAMP,
};
use crate::entities::conversions;
use crate::services::aggregate::{self, AggregateError, ReadingFilter};
use crate::services::classifier::{categorize_blood_pressure, classify_single, compute_derived};
use bp_tracker_data::repository::line_format::{is_valid_timestamp, TIMESTAMP_FORMAT};
use bp_tracker_data::repository::{
    BloodPressureRepository, BloodPressureRepositoryTrait, RepositoryError,
};

/// Blood pressure service errors
#[derive(Debug, Error)]
pub enum BloodPressureServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Data file missing or unreadable
    #[error("Unable to find {0}")]
    FileNotFound(String),

    /// Data file cannot be written or created
    #[error("Unable to write to {0}")]
    FileUnwritable(String),

    /// Nothing left to report on
    #[error("No valid data: {0}")]
    NoValidData(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<AggregateError> for BloodPressureServiceError {
    fn from(err: AggregateError) -> Self {
        BloodPressureServiceError::NoValidData(err.to_string())
    }
}

/// Trait for blood pressure service operations
pub trait BloodPressureServiceTrait {
    /// Validate a create blood pressure request
    fn validate_create_request(
        &self,
        request: &CreateBloodPressureRequest,
    ) -> Result<(), BloodPressureServiceError>;

    /// Classify a systolic/diastolic pair
    fn assess_pair(&self, systolic: u16, diastolic: u16) -> ReadingAssessment;

    /// Validate and append a new reading
    fn record_reading(
        &self,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, BloodPressureServiceError>;

    /// All readings plus the lines that could not be parsed
    fn load(&self) -> Result<ReadingLog, BloodPressureServiceError>;

    /// Summary of the readings left after filtering, and the skipped lines
    fn summarize(
        &self,
        filter: &ReadingFilter,
    ) -> Result<(BloodPressureInsights, Vec<InvalidLine>), BloodPressureServiceError>;

    /// Averages of the last `count` filtered readings, all of them for 0
    fn averages(
        &self,
        filter: &ReadingFilter,
        count: usize,
    ) -> Result<Averages, BloodPressureServiceError>;

    /// Filtered readings with the highest values and the latest one
    fn highest_events(
        &self,
        filter: &ReadingFilter,
    ) -> Result<HighestEvents, BloodPressureServiceError>;

    /// Count valid readings and list invalid lines
    fn check_data(&self) -> Result<DataCheck, BloodPressureServiceError>;

    /// Where the readings come from
    fn source(&self) -> String;
}

/// Blood pressure service for domain logic
pub struct BloodPressureService<R: BloodPressureRepositoryTrait> {
    repository: R,
}

impl<R: BloodPressureRepositoryTrait> BloodPressureService<R> {
    /// Create a new blood pressure service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> BloodPressureServiceError {
        match err {
            RepositoryError::FileNotFound(path) => {
                BloodPressureServiceError::FileNotFound(path.display().to_string())
            }
            RepositoryError::FileUnwritable(path) => {
                BloodPressureServiceError::FileUnwritable(path.display().to_string())
            }
            RepositoryError::Validation(msg) => BloodPressureServiceError::ValidationError(msg),
            _ => {
                error!("Repository error: {}", err);
                BloodPressureServiceError::RepositoryError(err.to_string())
            }
        }
    }

    /// Readings that pass `filter` and the skipped lines; no survivors is
    /// reported as missing data, naming the bad lines if there are any
    fn filtered(
        &self,
        filter: &ReadingFilter,
    ) -> Result<(Vec<BloodPressureReading>, Vec<InvalidLine>), BloodPressureServiceError> {
        let log = self.load()?;
        let kept = aggregate::filter_readings(&log.readings, filter);
        if !kept.is_empty() {
            return Ok((kept, log.invalid));
        }

        let mut message = format!("no readings in {}", self.repository.describe());
        if filter.is_active() && !log.readings.is_empty() {
            message.push_str(" match the filters");
        }
        if !log.invalid.is_empty() {
            let lines: Vec<String> = log
                .invalid
                .iter()
                .map(|line| line.line_number.to_string())
                .collect();
            message.push_str(&format!(", skipped invalid line(s) {}", lines.join(", ")));
        }
        Err(BloodPressureServiceError::NoValidData(message))
    }
}

impl<R: BloodPressureRepositoryTrait> BloodPressureServiceTrait for BloodPressureService<R> {
    fn validate_create_request(
        &self,
        request: &CreateBloodPressureRequest,
    ) -> Result<(), BloodPressureServiceError> {
        if let Err(validation_errors) = request.validate() {
            let mut messages = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| match &err.message {
                            Some(msg) => msg.to_string(),
                            None => format!("Invalid {}", field),
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>();
            messages.sort();

            return Err(BloodPressureServiceError::ValidationError(messages.join("; ")));
        }

        if request.systolic <= request.diastolic {
            return Err(BloodPressureServiceError::ValidationError(
                "Systolic pressure must be greater than diastolic pressure".to_string(),
            ));
        }

        if let Some(timestamp) = &request.timestamp {
            if timestamp != NO_TIMESTAMP && !is_valid_timestamp(timestamp) {
                return Err(BloodPressureServiceError::ValidationError(format!(
                    "timestamp: {:?} is not YYYYMMDD.HHMM",
                    timestamp
                )));
            }
        }

        Ok(())
    }

    fn assess_pair(&self, systolic: u16, diastolic: u16) -> ReadingAssessment {
        ReadingAssessment {
            systolic,
            diastolic,
            systolic_category: classify_single(systolic, ReadingKind::Systolic),
            diastolic_category: classify_single(diastolic, ReadingKind::Diastolic),
            derived: compute_derived(systolic, diastolic),
            category: categorize_blood_pressure(systolic, diastolic),
        }
    }

    fn record_reading(
        &self,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, BloodPressureServiceError> {
        self.validate_create_request(&request)?;

        let timestamp = request
            .timestamp
            .unwrap_or_else(|| Local::now().format(TIMESTAMP_FORMAT).to_string());
        let data_request = conversions::convert_to_data_create_request(
            request.systolic,
            request.diastolic,
            request.pulse,
            timestamp,
        );

        let data_reading = self
            .repository
            .create(data_request)
            .map_err(|e| self.map_repo_error(e))?;

        Ok(conversions::convert_to_domain_reading(data_reading))
    }

    fn load(&self) -> Result<ReadingLog, BloodPressureServiceError> {
        let loaded = self.repository.load().map_err(|e| self.map_repo_error(e))?;
        Ok(conversions::convert_to_domain_log(loaded))
    }

    fn summarize(
        &self,
        filter: &ReadingFilter,
    ) -> Result<(BloodPressureInsights, Vec<InvalidLine>), BloodPressureServiceError> {
        let (kept, invalid) = self.filtered(filter)?;
        let insights = aggregate::summarize(&kept)?;
        debug!(
            "Summarized {} readings: {}",
            insights.reading_count, insights.category
        );
        Ok((insights, invalid))
    }

    fn averages(
        &self,
        filter: &ReadingFilter,
        count: usize,
    ) -> Result<Averages, BloodPressureServiceError> {
        let (readings, _) = self.filtered(filter)?;
        Ok(aggregate::averages_of_last(&readings, count)?)
    }

    fn highest_events(
        &self,
        filter: &ReadingFilter,
    ) -> Result<HighestEvents, BloodPressureServiceError> {
        let (readings, _) = self.filtered(filter)?;
        Ok(aggregate::highest_events(&readings)?)
    }

    fn check_data(&self) -> Result<DataCheck, BloodPressureServiceError> {
        let log = self.load()?;
        Ok(DataCheck {
            valid: log.readings.len(),
            invalid: log.invalid,
        })
    }

    fn source(&self) -> String {
        self.repository.describe()
    }
}

/// Create a blood pressure service over the configured data file
pub fn create_default_blood_pressure_service(
    config: &DataFileConfig,
) -> impl BloodPressureServiceTrait {
    BloodPressureService::new(BloodPressureRepository::from_config(config))
}
