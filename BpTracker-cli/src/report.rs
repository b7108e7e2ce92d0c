//! Plain text rendering of service results.

use std::io::{self, Write};

use bp_tracker_domain::entities::{
    Averages, BloodPressureInsights, BloodPressureReading, DataCheck, HighestEvents, InvalidLine,
    ReadingAssessment,
};
use bp_tracker_domain::services::classifier::{describe_pair, is_hypertensive_crisis, show_derived};

/// Low/high/average table of a summary
pub fn write_table(out: &mut dyn Write, insights: &BloodPressureInsights) -> io::Result<()> {
    let agg = &insights.aggregate;
    writeln!(out, "           | Low  | High | Avg  |")?;
    for (name, stats) in [
        ("Systolic ..", agg.systolic),
        ("Diastolic .", agg.diastolic),
        ("Pulse .....", agg.pulse),
    ] {
        writeln!(
            out,
            "{}|{:^6}|{:^6}|{:^6}|",
            name, stats.low, stats.high, stats.average
        )?;
    }
    Ok(())
}

/// Table followed by the classification of the averages
pub fn write_summary(
    out: &mut dyn Write,
    insights: &BloodPressureInsights,
    invalid: &[InvalidLine],
) -> io::Result<()> {
    let systolic = insights.aggregate.systolic.average;
    let diastolic = insights.aggregate.diastolic.average;

    write_table(out, insights)?;
    writeln!(out)?;
    writeln!(out, "Readings: {}", insights.reading_count)?;
    writeln!(out, "AHA category: {}", insights.category)?;
    writeln!(out, "{}", describe_pair(systolic, diastolic))?;
    writeln!(out, "{}", show_derived(systolic, diastolic))?;
    write_invalid_lines(out, invalid)
}

/// Notice listing the lines that were skipped, nothing when there are none
pub fn write_invalid_lines(out: &mut dyn Write, invalid: &[InvalidLine]) -> io::Result<()> {
    if invalid.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Skipped {} badly formatted line(s):", invalid.len())?;
    for line in invalid {
        writeln!(
            out,
            "  line {}: {:?} ({})",
            line.line_number, line.content, line.reason
        )?;
    }
    Ok(())
}

pub fn write_recorded(
    out: &mut dyn Write,
    reading: &BloodPressureReading,
    assessment: &ReadingAssessment,
) -> io::Result<()> {
    writeln!(out, "Recorded {}", reading)?;
    write_assessment(out, assessment)
}

pub fn write_assessment(out: &mut dyn Write, assessment: &ReadingAssessment) -> io::Result<()> {
    writeln!(
        out,
        "{}/{} classified as {} / {}",
        assessment.systolic,
        assessment.diastolic,
        assessment.systolic_category,
        assessment.diastolic_category
    )?;
    writeln!(out, "{}", show_derived(assessment.systolic, assessment.diastolic))?;
    writeln!(out, "AHA category: {}", assessment.category)?;
    if is_hypertensive_crisis(assessment.systolic, assessment.diastolic) {
        writeln!(out, "Reading is in the hypertensive crisis range, seek care now")?;
    }
    Ok(())
}

pub fn write_averages(out: &mut dyn Write, averages: &Averages) -> io::Result<()> {
    writeln!(
        out,
        "Average values (sys/dia pulse) of last {} readings: {}",
        averages.count, averages
    )
}

pub fn write_highest(out: &mut dyn Write, events: &HighestEvents) -> io::Result<()> {
    writeln!(out, "Highest Systolic: {}", events.systolic)?;
    writeln!(out, "Highest Diastolic: {}", events.diastolic)?;
    writeln!(out, "Highest Pulse: {}", events.pulse)?;
    writeln!(out, "Latest Record: {}", events.latest)
}

pub fn write_check(out: &mut dyn Write, source: &str, check: &DataCheck) -> io::Result<()> {
    writeln!(
        out,
        "{}: {} valid reading(s), {} invalid line(s)",
        source,
        check.valid,
        check.invalid.len()
    )?;
    write_invalid_lines(out, &check.invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_tracker_domain::services::aggregate::summarize;

    fn reading(systolic: u16, diastolic: u16, pulse: u16, timestamp: &str) -> BloodPressureReading {
        BloodPressureReading {
            systolic,
            diastolic,
            pulse,
            timestamp: timestamp.to_string(),
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buffer: Vec<u8> = Vec::new();
        let out: &mut dyn Write = &mut buffer;
        f(out).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_table_layout() {
        let insights =
            summarize(&[reading(120, 65, 55, "0.0"), reading(140, 62, 60, "0.0")]).unwrap();
        let text = render(|out| write_table(out, &insights));

        assert_eq!(
            text,
            "           | Low  | High | Avg  |\n\
             Systolic ..| 120  | 140  | 130  |\n\
             Diastolic .|  62  |  65  |  64  |\n\
             Pulse .....|  55  |  60  |  58  |\n"
        );
    }

    #[test]
    fn test_invalid_lines_notice() {
        assert_eq!(render(|out| write_invalid_lines(out, &[])), "");

        let loaded = bp_tracker_data::repository::line_format::parse_bytes(b"total junk times four\n");
        let text = render(|out| write_invalid_lines(out, &loaded.invalid));
        assert!(text.contains("Skipped 1 badly formatted line(s):"));
        assert!(text.contains("line 1: \"total junk times four\""));
    }

    #[test]
    fn test_highest_lines() {
        let events = HighestEvents {
            systolic: reading(134, 63, 57, "20220812.0758"),
            diastolic: reading(134, 63, 57, "20220812.0758"),
            pulse: reading(110, 59, 68, "20220812.1323"),
            latest: reading(110, 59, 68, "20220812.1323"),
        };
        let text = render(|out| write_highest(out, &events));
        assert!(text.starts_with("Highest Systolic: 134/63 57 20220812.0758\n"));
        assert!(text.ends_with("Latest Record: 110/59 68 20220812.1323\n"));
    }
}
