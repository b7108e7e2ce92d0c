use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use bp_tracker_domain::config::DataFileConfig;
use bp_tracker_domain::services::{FilterError, ReadingFilter};

/// Command line arguments of `bp-tracker`
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bp-tracker", version)]
#[command(about = "Record blood pressure readings and report on them")]
#[command(group(
    ArgGroup::new("action").args(["add", "averages", "highest", "check", "classify"])
))]
#[command(group(
    ArgGroup::new("filters")
        .args(["number", "times", "range", "date"])
        .multiple(true)
))]
pub struct Args {
    /// Add a reading stamped with the current time
    #[arg(short, long, num_args = 3, value_names = ["SYS", "DIA", "PULSE"])]
    #[arg(conflicts_with = "filters")]
    pub add: Option<Vec<u16>>,

    /// Data file (default bp_numbers.txt, or BP_DATA_FILE)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Only report on the last N matching readings
    #[arg(short, long, value_name = "N")]
    pub number: Option<usize>,

    /// Only readings taken between these times of day (HHMM)
    #[arg(short, long, num_args = 2, value_names = ["BEGIN", "END"])]
    pub times: Option<Vec<String>>,

    /// Only readings between these dates (YYYYMMDD or YYYYMMDD.HHMM)
    #[arg(short, long, num_args = 2, value_names = ["BEGIN", "END"])]
    pub range: Option<Vec<String>>,

    /// Only readings taken on or after this date
    #[arg(short, long, value_name = "NOT_BEFORE")]
    pub date: Option<String>,

    /// Average of the last N readings, 0 for all
    #[arg(short = 'v', long, value_name = "N")]
    pub averages: Option<usize>,

    /// Show the readings with the highest values and the latest one
    #[arg(long)]
    pub highest: bool,

    /// Count valid readings and list badly formatted lines
    #[arg(short, long, conflicts_with = "filters")]
    pub check: bool,

    /// Classify a reading without recording it
    #[arg(short = 's', long, num_args = 2, value_names = ["SYS", "DIA"])]
    #[arg(conflicts_with = "filters")]
    pub classify: Option<Vec<u16>>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Log debug output to stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    /// Configuration with `--file` applied on top
    pub fn data_config(&self, base: DataFileConfig) -> DataFileConfig {
        match &self.file {
            Some(path) => base.with_data_file(path),
            None => base,
        }
    }

    /// Build the reading filter from the filter options
    pub fn filter(&self) -> Result<ReadingFilter, FilterError> {
        let mut filter = ReadingFilter::new();

        if let Some([begin, end]) = self.times.as_deref() {
            filter = filter.with_time_of_day(begin, end)?;
        }
        if let Some([begin, end]) = self.range.as_deref() {
            filter = filter.with_date_range(begin, end)?;
        }
        if let Some(date) = &self.date {
            filter = filter.with_not_before(date)?;
        }
        if let Some(n) = self.number {
            filter = filter.with_last_n(n);
        }

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from(["bp-tracker", "-a", "127", "85", "70"]).unwrap();
        assert_eq!(args.add, Some(vec![127, 85, 70]));
        assert!(!args.check);
    }

    #[test]
    fn test_add_needs_three_values() {
        let err = Args::try_parse_from(["bp-tracker", "--add", "127", "85"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongNumberOfValues);
    }

    #[test]
    fn test_add_rejects_negative_values() {
        assert!(Args::try_parse_from(["bp-tracker", "-a", "127", "-85", "70"]).is_err());
    }

    #[test]
    fn test_actions_conflict() {
        let err = Args::try_parse_from(["bp-tracker", "-c", "--highest"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_filters_conflict_with_non_report_actions() {
        let actions: [&[&str]; 3] = [&["-c"], &["-a", "120", "80", "70"], &["-s", "120", "80"]];
        for action in actions {
            let mut argv = vec!["bp-tracker", "-t", "0800", "0900"];
            argv.extend_from_slice(action);
            let err = Args::try_parse_from(argv).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        }

        let args = Args::try_parse_from(["bp-tracker", "--highest", "-n", "3", "-d", "20220901"]).unwrap();
        assert!(args.highest);
        assert_eq!(args.filter().unwrap().last_n, Some(3));
    }

    #[test]
    fn test_filter_from_options() {
        let args = Args::try_parse_from([
            "bp-tracker", "-t", "0700", "0900", "-r", "20220901", "20220930", "-n", "5",
        ])
        .unwrap();
        let filter = args.filter().unwrap();

        assert_eq!(filter.time_of_day, Some(("0700".to_string(), "0900".to_string())));
        assert_eq!(filter.date_range, Some(("20220901".to_string(), "20220930".to_string())));
        assert_eq!(filter.not_before, None);
        assert_eq!(filter.last_n, Some(5));
    }

    #[test]
    fn test_filter_rejects_bad_time() {
        let args = Args::try_parse_from(["bp-tracker", "-t", "7am", "0900"]).unwrap();
        assert!(matches!(args.filter(), Err(FilterError::BadTimeOfDay(_))));
    }

    #[test]
    fn test_file_overrides_config() {
        let args = Args::try_parse_from(["bp-tracker", "-f", "other.txt"]).unwrap();
        let config = args.data_config(DataFileConfig::default());
        assert_eq!(config.data_file, PathBuf::from("other.txt"));

        let config = Args::default().data_config(DataFileConfig::default());
        assert_eq!(config.data_file, PathBuf::from("bp_numbers.txt"));
    }
}
