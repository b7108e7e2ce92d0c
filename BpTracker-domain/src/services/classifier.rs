//! Blood pressure classification.
//!
//! Single values are classified against the per-kind category tables.
//! Pairs are classified two ways: the unified status used alongside mean
//! arterial pressure, and the 2017 AHA chart.

use thiserror::Error;

use crate::entities::blood_pressure::{
    BloodPressureCategory, DerivedValues, ReadingKind, SingleCategory, UnifiedStatus,
};

/// Classifier errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifierError {
    /// Kind selector that is neither systolic nor diastolic
    #[error("Must specify systolic or diastolic, got {0:?}")]
    InvalidKind(String),
}

/// Exclusive upper bounds for systolic values; above the last bound is a crisis
static SYSTOLIC_TABLE: [(u16, SingleCategory); 10] = [
    (50, SingleCategory::ExtremeHypotension),
    (70, SingleCategory::SevereHypotension),
    (90, SingleCategory::ModerateHypotension),
    (100, SingleCategory::LowNormal),
    (121, SingleCategory::Ideal),
    (130, SingleCategory::HighNormal),
    (140, SingleCategory::PreHypertension),
    (160, SingleCategory::StageOneHypertension),
    (180, SingleCategory::StageTwoHypertension),
    (211, SingleCategory::StageThreeHypertension),
];

/// Exclusive upper bounds for diastolic values
static DIASTOLIC_TABLE: [(u16, SingleCategory); 10] = [
    (35, SingleCategory::ExtremeHypotension),
    (40, SingleCategory::SevereHypotension),
    (60, SingleCategory::ModerateHypotension),
    (65, SingleCategory::LowNormal),
    (81, SingleCategory::Ideal),
    (85, SingleCategory::HighNormal),
    (90, SingleCategory::PreHypertension),
    (100, SingleCategory::StageOneHypertension),
    (110, SingleCategory::StageTwoHypertension),
    (121, SingleCategory::StageThreeHypertension),
];

/// The ordered (bound, category) table for a kind
pub fn category_table(kind: ReadingKind) -> &'static [(u16, SingleCategory)] {
    match kind {
        ReadingKind::Systolic => &SYSTOLIC_TABLE,
        ReadingKind::Diastolic => &DIASTOLIC_TABLE,
    }
}

/// Classify a single systolic or diastolic value
pub fn classify_single(value: u16, kind: ReadingKind) -> SingleCategory {
    category_table(kind)
        .iter()
        .find(|(bound, _)| value < *bound)
        .map(|(_, category)| *category)
        .unwrap_or(SingleCategory::HypertensiveCrisis)
}

/// Classify a single value with the kind given as text (`s...` or `d...`)
pub fn classify_single_str(value: u16, kind: &str) -> Result<SingleCategory, ClassifierError> {
    Ok(classify_single(value, kind.parse()?))
}

/// Unified status of a pair. Rules are tried mildest first and the first
/// match wins, so a pair straddling two tiers gets the milder one.
pub fn unified_status(systolic: u16, diastolic: u16) -> UnifiedStatus {
    if systolic < 120 && diastolic < 80 {
        UnifiedStatus::Normal
    } else if (120..140).contains(&systolic) || (80..90).contains(&diastolic) {
        UnifiedStatus::PreHypertension
    } else if (140..160).contains(&systolic) || (90..=99).contains(&diastolic) {
        UnifiedStatus::StageOneHypertension
    } else if (160..=180).contains(&systolic) || (100..=110).contains(&diastolic) {
        UnifiedStatus::StageTwoHypertension
    } else {
        // Only systolic > 180 or diastolic > 110 is left
        UnifiedStatus::HypertensiveCrisis
    }
}

/// Mean arterial pressure rounded to the nearest integer
pub fn mean_arterial_pressure(systolic: u16, diastolic: u16) -> u16 {
    let total = 2 * u32::from(diastolic) + u32::from(systolic);
    // thirds never tie, so adding one before dividing rounds to nearest
    ((total + 1) / 3) as u16
}

/// Mean arterial pressure, pulse pressure and unified status of a pair
pub fn compute_derived(systolic: u16, diastolic: u16) -> DerivedValues {
    DerivedValues {
        mean_arterial_pressure: mean_arterial_pressure(systolic, diastolic),
        pulse_pressure: i32::from(systolic) - i32::from(diastolic),
        status: unified_status(systolic, diastolic),
    }
}

/// One line summary of the derived values
pub fn show_derived(systolic: u16, diastolic: u16) -> String {
    let derived = compute_derived(systolic, diastolic);
    format!(
        "Mean BP: {}, Pulse pressure: {}, Status: {}",
        derived.mean_arterial_pressure, derived.pulse_pressure, derived.status
    )
}

/// Categorize blood pressure based on the 2017 AHA chart
pub fn categorize_blood_pressure(systolic: u16, diastolic: u16) -> BloodPressureCategory {
    if systolic > 180 || diastolic >= 120 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

/// Whether a pair calls for emergency care
pub fn is_hypertensive_crisis(systolic: u16, diastolic: u16) -> bool {
    categorize_blood_pressure(systolic, diastolic) == BloodPressureCategory::HypertensiveCrisis
}

/// Single value categories of both halves, `"<systolic> / <diastolic>"`
pub fn describe_pair(systolic: u16, diastolic: u16) -> String {
    format!(
        "{} / {}",
        classify_single(systolic, ReadingKind::Systolic),
        classify_single(diastolic, ReadingKind::Diastolic)
    )
}
