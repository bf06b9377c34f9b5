//! CSV and JSON export for disaggregated series, shift profiles and run summaries.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::calendar::YearClock;
use crate::disagg::ShiftProfiles;
use crate::error::{DisaggError, LoadError};
use crate::model::{State, TimeSeries};
use crate::runner::{RunSummary, SeriesSink};

/// Long-format column header for series export.
const SERIES_HEADER: [&str; 6] = ["timestamp", "sector", "region", "carrier", "application", "value"];

/// Label written for series without an application split.
const NO_APPLICATION: &str = "total";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Streams series to CSV in long format, one row per quarter-hour.
///
/// Rows appear in the order the series are accepted, so a deterministic run
/// produces byte-identical files.
pub struct CsvSeriesSink<W: Write> {
    writer: csv::Writer<W>,
    origin: String,
    clocks: BTreeMap<i32, Vec<String>>,
    rows: u64,
}

impl CsvSeriesSink<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: &Path) -> Result<Self, LoadError> {
        let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
        Self::with_origin(BufWriter::new(file), path.display().to_string())
    }
}

impl<W: Write> CsvSeriesSink<W> {
    pub fn new(writer: W) -> Result<Self, LoadError> {
        Self::with_origin(writer, "<series>".to_string())
    }

    fn with_origin(writer: W, origin: String) -> Result<Self, LoadError> {
        let mut writer = csv::WriterBuilder::new().from_writer(writer);
        writer
            .write_record(SERIES_HEADER)
            .map_err(|e| LoadError::csv(&origin, e))?;
        Ok(Self {
            writer,
            origin,
            clocks: BTreeMap::new(),
            rows: 0,
        })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes and returns the inner writer.
    pub fn finish(self) -> Result<W, LoadError> {
        let origin = self.origin;
        self.writer.into_inner().map_err(|e| {
            let err = e.error();
            LoadError::io(&origin, io::Error::new(err.kind(), err.to_string()))
        })
    }

    /// Formats the timestamps of `year` once and keeps them for later series.
    fn ensure_clock(&mut self, year: i32) -> Result<(), DisaggError> {
        if !self.clocks.contains_key(&year) {
            let mut clock = YearClock::new(year)?;
            let mut stamps = Vec::with_capacity(clock.len());
            clock.run(|_, ts| stamps.push(format_timestamp(ts)));
            self.clocks.insert(year, stamps);
        }
        Ok(())
    }
}

impl<W: Write> SeriesSink for CsvSeriesSink<W> {
    fn accept(&mut self, _state: State, series: &[TimeSeries]) -> Result<(), LoadError> {
        for s in series {
            self.ensure_clock(s.key.year)?;
            let stamps = self
                .clocks
                .get(&s.key.year)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let sector = s.key.sector.to_string();
            let region = s.key.region.to_string();
            let application = s
                .key
                .application
                .map_or(NO_APPLICATION, |a| a.as_str());
            for (ts, value) in stamps.iter().zip(&s.values) {
                self.writer
                    .write_record([
                        ts.as_str(),
                        sector.as_str(),
                        region.as_str(),
                        s.key.carrier.as_str(),
                        application,
                        value.to_string().as_str(),
                    ])
                    .map_err(|e| LoadError::csv(&self.origin, e))?;
            }
            self.rows += s.values.len() as u64;
        }
        self.writer
            .flush()
            .map_err(|e| LoadError::io(&self.origin, e))
    }
}

/// Writes all nine shift columns of one state in wide format.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_profiles_csv(profiles: &ShiftProfiles, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["timestamp".to_string()];
    header.extend(profiles.columns().map(|(variant, _)| variant.name()));
    wtr.write_record(&header)?;

    let clock = YearClock::new(profiles.year()).map_err(io::Error::other)?;
    let columns: Vec<&[f64]> = profiles.columns().map(|(_, c)| c).collect();
    for i in 0..profiles.len() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(format_timestamp(clock.timestamp_at(i)));
        record.extend(columns.iter().map(|c| c[i].to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports shift profiles to a CSV file.
pub fn export_profiles_csv(profiles: &ShiftProfiles, path: &Path) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
    write_profiles_csv(profiles, BufWriter::new(file)).map_err(|e| LoadError::io(path, e))
}

/// Writes the run summary as pretty-printed JSON.
pub fn write_summary_json(summary: &RunSummary, writer: impl Write) -> Result<(), LoadError> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

/// Exports the run summary to a JSON file.
pub fn export_summary_json(summary: &RunSummary, path: &Path) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
    let mut buf = BufWriter::new(file);
    write_summary_json(summary, &mut buf)?;
    buf.flush().map_err(|e| LoadError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekendsOnly;
    use crate::factors::ShiftDefinitions;
    use crate::model::{Application, EnergyCarrier, Region, Sector, SeriesKey};

    fn series(application: Option<Application>) -> TimeSeries {
        TimeSeries {
            key: SeriesKey {
                sector: Sector::new(47).expect("valid sector"),
                region: Region::new(6412).expect("valid region"),
                carrier: EnergyCarrier::Power,
                year: 2021,
                application,
            },
            values: vec![0.25; 35_040],
        }
    }

    fn written(series: &[TimeSeries]) -> String {
        let mut sink = CsvSeriesSink::new(Vec::new()).expect("header written");
        sink.accept(State::HE, series).expect("rows written");
        let buf = sink.finish().expect("flushed");
        String::from_utf8(buf).expect("utf8 output")
    }

    #[test]
    fn header_and_first_row() {
        let out = written(&[series(Some(Application::Lighting))]);
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,sector,region,carrier,application,value")
        );
        assert_eq!(
            lines.next(),
            Some("2021-01-01 00:00,47,06412,power,lighting,0.25")
        );
        assert_eq!(out.lines().count(), 35_041);
    }

    #[test]
    fn unsplit_series_are_labelled_total() {
        let out = written(&[series(None)]);
        assert!(out.lines().nth(1).is_some_and(|l| l.contains(",total,")));
    }

    #[test]
    fn deterministic_output() {
        let s = [series(None), series(Some(Application::HotWater))];
        assert_eq!(written(&s), written(&s));
    }

    #[test]
    fn profile_dump_is_wide() {
        let p = ShiftProfiles::generate(State::HE, 2021, &ShiftDefinitions::default(), &WeekendsOnly)
            .expect("profiles build");
        let mut buf = Vec::new();
        write_profiles_csv(&p, &mut buf).expect("written");

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().expect("header row");
        assert_eq!(headers.len(), 10);
        assert_eq!(headers.get(1), Some("S1_WT"));
        assert_eq!(rdr.records().count(), 35_040);
    }
}
