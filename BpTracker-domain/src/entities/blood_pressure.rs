use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::classifier::ClassifierError;

pub use bp_tracker_data::models::blood_pressure::NO_TIMESTAMP;
pub use bp_tracker_data::repository::InvalidLine;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Pulse rate in beats per minute
    pub pulse: u16,

    /// When the reading was taken, `YYYYMMDD.HHMM` or `0.0` for unknown
    pub timestamp: String,
}

impl BloodPressureReading {
    /// Whether the reading carries a real timestamp
    pub fn has_timestamp(&self) -> bool {
        self.timestamp != NO_TIMESTAMP
    }

    /// The `HHMM` part of the timestamp
    pub fn time_of_day(&self) -> Option<&str> {
        if self.has_timestamp() {
            self.timestamp.get(9..13)
        } else {
            None
        }
    }
}

impl fmt::Display for BloodPressureReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} {}",
            self.systolic, self.diastolic, self.pulse, self.timestamp
        )
    }
}

/// Request payload for recording a new blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: u16,

    /// Pulse rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Pulse must be between 20 and 250"))]
    pub pulse: u16,

    /// When the reading was taken. Defaults to the current local time.
    pub timestamp: Option<String>,
}

/// Which half of a reading a single value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingKind {
    Systolic,
    Diastolic,
}

impl FromStr for ReadingKind {
    type Err = ClassifierError;

    /// Accepts any word starting with `s` or `d`, in either case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next() {
            Some('s') | Some('S') => Ok(ReadingKind::Systolic),
            Some('d') | Some('D') => Ok(ReadingKind::Diastolic),
            _ => Err(ClassifierError::InvalidKind(s.to_string())),
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingKind::Systolic => write!(f, "systolic"),
            ReadingKind::Diastolic => write!(f, "diastolic"),
        }
    }
}

/// AHA category of a single systolic or diastolic value, mildest to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SingleCategory {
    ExtremeHypotension,
    SevereHypotension,
    ModerateHypotension,
    LowNormal,
    Ideal,
    HighNormal,
    PreHypertension,
    StageOneHypertension,
    StageTwoHypertension,
    StageThreeHypertension,
    HypertensiveCrisis,
}

impl SingleCategory {
    /// Every category in table order
    pub const ALL: [SingleCategory; 11] = [
        SingleCategory::ExtremeHypotension,
        SingleCategory::SevereHypotension,
        SingleCategory::ModerateHypotension,
        SingleCategory::LowNormal,
        SingleCategory::Ideal,
        SingleCategory::HighNormal,
        SingleCategory::PreHypertension,
        SingleCategory::StageOneHypertension,
        SingleCategory::StageTwoHypertension,
        SingleCategory::StageThreeHypertension,
        SingleCategory::HypertensiveCrisis,
    ];

    /// Position in the category table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SingleCategory::ExtremeHypotension => "Extreme hypotension",
            SingleCategory::SevereHypotension => "Severe hypotension",
            SingleCategory::ModerateHypotension => "Moderate hypotension",
            SingleCategory::LowNormal => "Low normal BP",
            SingleCategory::Ideal => "Ideal BP",
            SingleCategory::HighNormal => "High normal BP",
            SingleCategory::PreHypertension => "Pre-hypertension",
            SingleCategory::StageOneHypertension => "Stage I hypertension",
            SingleCategory::StageTwoHypertension => "Stage II hypertension",
            SingleCategory::StageThreeHypertension => "Stage III hypertension",
            SingleCategory::HypertensiveCrisis => "Hypertensive crisis",
        }
    }
}

impl fmt::Display for SingleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Joint status of a systolic/diastolic pair as used by the MAP calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnifiedStatus {
    /// Systolic < 120 and diastolic < 80
    Normal,
    /// Systolic 120-139 or diastolic 80-89
    PreHypertension,
    /// Systolic 140-159 or diastolic 90-99
    StageOneHypertension,
    /// Systolic 160-180 or diastolic 100-110
    StageTwoHypertension,
    /// Systolic > 180 or diastolic > 110
    HypertensiveCrisis,
}

impl UnifiedStatus {
    pub fn label(self) -> &'static str {
        match self {
            UnifiedStatus::Normal => "Normal BP",
            UnifiedStatus::PreHypertension => "Pre-hypertension",
            UnifiedStatus::StageOneHypertension => "Stage I hypertension",
            UnifiedStatus::StageTwoHypertension => "Stage II hypertension",
            UnifiedStatus::HypertensiveCrisis => "Hypertensive crisis",
        }
    }
}

impl fmt::Display for UnifiedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Blood pressure category based on measurements (2017 AHA chart)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BloodPressureCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic > 180 or diastolic ≥ 120)
    HypertensiveCrisis,
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BloodPressureCategory::Normal => "NORMAL",
            BloodPressureCategory::Elevated => "ELEVATED",
            BloodPressureCategory::Hypertension1 => "STAGE 1 HYPERTENSION",
            BloodPressureCategory::Hypertension2 => "STAGE 2 HYPERTENSION",
            BloodPressureCategory::HypertensiveCrisis => "HYPERTENSIVE CRISIS",
        };
        f.pad(label)
    }
}

/// Values calculated from a systolic/diastolic pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedValues {
    /// Mean arterial pressure, (2 * diastolic + systolic) / 3 rounded
    pub mean_arterial_pressure: u16,

    /// Systolic minus diastolic
    pub pulse_pressure: i32,

    /// Unified status of the pair
    pub status: UnifiedStatus,
}

/// Low, high and rounded average of one measured quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub low: u16,
    pub high: u16,
    pub average: u16,
}

/// Statistics for each measured quantity over a set of readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingAggregate {
    pub systolic: Stats,
    pub diastolic: Stats,
    pub pulse: Stats,
}

/// Blood pressure report over a set of readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodPressureInsights {
    /// Low/high/average of each quantity
    pub aggregate: ReadingAggregate,

    /// Number of readings analyzed
    pub reading_count: usize,

    /// Category of the average systolic value
    pub systolic_category: SingleCategory,

    /// Category of the average diastolic value
    pub diastolic_category: SingleCategory,

    /// MAP, pulse pressure and unified status of the averages
    pub derived: DerivedValues,

    /// 2017 AHA category of the averages
    pub category: BloodPressureCategory,

    /// Timestamp of the analysis
    pub generated_at: DateTime<Local>,
}

/// Readings holding the highest values, plus the latest one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestEvents {
    pub systolic: BloodPressureReading,
    pub diastolic: BloodPressureReading,
    pub pulse: BloodPressureReading,
    pub latest: BloodPressureReading,
}

/// Unrounded averages over the last readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub systolic: f64,
    pub diastolic: f64,
    pub pulse: f64,

    /// How many readings went into the averages
    pub count: usize,
}

impl fmt::Display for Averages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}/{:.0} {:.0}",
            self.systolic, self.diastolic, self.pulse
        )
    }
}

/// Everything the classifier says about one systolic/diastolic pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingAssessment {
    pub systolic: u16,
    pub diastolic: u16,
    pub systolic_category: SingleCategory,
    pub diastolic_category: SingleCategory,
    pub derived: DerivedValues,
    pub category: BloodPressureCategory,
}

/// Readings of a data file in file order, with the lines that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadingLog {
    pub readings: Vec<BloodPressureReading>,
    pub invalid: Vec<InvalidLine>,
}

/// Line counts of a data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataCheck {
    /// Number of readings that parsed
    pub valid: usize,

    /// Lines that did not
    pub invalid: Vec<InvalidLine>,
}

impl DataCheck {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}
