use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use bp_tracker_domain::config::DataFileConfig;
use bp_tracker_domain::entities::{
    BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest, InvalidLine,
    ReadingAssessment,
};
use bp_tracker_domain::services::{create_default_blood_pressure_service, BloodPressureServiceTrait};

use crate::args::Args;
use crate::report;

#[derive(Serialize)]
struct SummaryOutput<'a> {
    summary: &'a BloodPressureInsights,
    invalid: &'a [InvalidLine],
}

#[derive(Serialize)]
struct RecordedOutput<'a> {
    reading: &'a BloodPressureReading,
    assessment: &'a ReadingAssessment,
}

/// Run the action selected by `args` against the configured data file,
/// writing results to `out`
pub fn run(args: &Args, config: DataFileConfig, out: &mut dyn Write) -> Result<()> {
    let config = args.data_config(config);
    info!("Using {} as data file", config.data_file.display());
    let service = create_default_blood_pressure_service(&config);

    if let Some(values) = &args.add {
        return add(&service, values, args.json, out);
    }
    if let Some(values) = &args.classify {
        return classify(&service, values, args.json, out);
    }
    if args.check {
        let check = service.check_data()?;
        let source = service.source();
        return emit(out, args.json, &check, |out| report::write_check(out, &source, &check));
    }

    let filter = args.filter()?;
    debug!("Reporting with {:?}", filter);

    if let Some(count) = args.averages {
        let averages = service.averages(&filter, count)?;
        return emit(out, args.json, &averages, |out| report::write_averages(out, &averages));
    }
    if args.highest {
        let events = service.highest_events(&filter)?;
        return emit(out, args.json, &events, |out| report::write_highest(out, &events));
    }

    let (insights, invalid) = service.summarize(&filter)?;

    if args.json {
        let output = SummaryOutput {
            summary: &insights,
            invalid: &invalid,
        };
        write_json(out, &output)
    } else {
        report::write_summary(out, &insights, &invalid).context("Unable to write report")
    }
}

fn add(
    service: &impl BloodPressureServiceTrait,
    values: &[u16],
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let &[systolic, diastolic, pulse] = values else {
        anyhow::bail!("--add takes systolic, diastolic and pulse");
    };

    let reading = service.record_reading(CreateBloodPressureRequest {
        systolic,
        diastolic,
        pulse,
        timestamp: None,
    })?;
    let assessment = service.assess_pair(systolic, diastolic);

    if json {
        let output = RecordedOutput {
            reading: &reading,
            assessment: &assessment,
        };
        write_json(out, &output)
    } else {
        report::write_recorded(out, &reading, &assessment).context("Unable to write report")
    }
}

fn classify(
    service: &impl BloodPressureServiceTrait,
    values: &[u16],
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let &[systolic, diastolic] = values else {
        anyhow::bail!("--classify takes systolic and diastolic");
    };

    let assessment = service.assess_pair(systolic, diastolic);
    emit(out, json, &assessment, |out| report::write_assessment(out, &assessment))
}

fn emit<T: Serialize>(
    out: &mut dyn Write,
    json: bool,
    value: &T,
    text: impl FnOnce(&mut dyn Write) -> std::io::Result<()>,
) -> Result<()> {
    if json {
        write_json(out, value)
    } else {
        text(out).context("Unable to write report")
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Unable to write JSON")?;
    writeln!(out)?;
    Ok(())
}
