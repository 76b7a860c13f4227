//! # Match recording
//!
//! Destinations for the [`MatchResult`]s produced by the match engine.
//!
//! ## Overview
//! -----------------
//! * [`MatchRecorder`] – writes a human readable block and a CSV row per result to two
//!   parallel sinks. [`MatchRecorder::open`] opens `<name>.txt`-like and `<name>.csv` files in
//!   append mode, so earlier runs are never overwritten.
//! * [`MatchCollector`] – keeps the results in memory.
//!
//! Both count the results they received, see [`MatchSink::possible_matches`].
//!
//! ## CSV layout
//! -----------------
//! ```text
//! Candidate,RAJ,DECJ,P0,DM,SNR,Known Source,RAJ,DECJ,P0,DM,Harmonic Number,Harmonic Period,Harmonic Period/Candidate Period,Angular separation(deg)
//! ```
//! The header is written only when the CSV file is empty.
use std::{
    fs::{File, OpenOptions},
    io::Write,
};

use camino::Utf8Path;
use tracing::debug;

use crate::{matcher::MatchResult, psrmatch_errors::PsrMatchError};

pub const CSV_HEADER: [&str; 15] = [
    "Candidate",
    "RAJ",
    "DECJ",
    "P0",
    "DM",
    "SNR",
    "Known Source",
    "RAJ",
    "DECJ",
    "P0",
    "DM",
    "Harmonic Number",
    "Harmonic Period",
    "Harmonic Period/Candidate Period",
    "Angular separation(deg)",
];

/// Receiver of match results.
pub trait MatchSink {
    /// Store one result.
    fn record(&mut self, result: &MatchResult) -> Result<(), PsrMatchError>;

    /// Number of results stored so far.
    fn possible_matches(&self) -> usize;
}

fn csv_record(result: &MatchResult) -> [String; 15] {
    [
        result.candidate.clone(),
        result.candidate_raj.clone(),
        result.candidate_decj.clone(),
        result.candidate_p0.clone(),
        result.candidate_dm.clone(),
        result.candidate_snr.clone(),
        result.known.clone(),
        result.known_raj.clone(),
        result.known_decj.clone(),
        result.known_p0.clone(),
        result.known_dm.clone(),
        result.harmonic_number.to_string(),
        result.harmonic_period.to_string(),
        result.period_ratio.to_string(),
        result.separation_str(),
    ]
}

/// Text and CSV writer pair.
pub struct MatchRecorder<T: Write, C: Write> {
    text: T,
    csv: csv::Writer<C>,
    count: usize,
}

impl<T: Write, C: Write> MatchRecorder<T, C> {
    /// Wrap two writers.
    ///
    /// Arguments
    /// -----------------
    /// * `text`: receives one block per result.
    /// * `csv`: receives one row per result.
    /// * `write_header`: write [`CSV_HEADER`] first.
    pub fn new(text: T, csv: C, write_header: bool) -> Result<Self, PsrMatchError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(csv);
        if write_header {
            csv.write_record(CSV_HEADER)?;
            csv.flush()?;
        }
        Ok(MatchRecorder {
            text,
            csv,
            count: 0,
        })
    }

    /// Flush both sinks and give the writers back.
    pub fn into_inner(mut self) -> Result<(T, C), PsrMatchError> {
        self.text.flush()?;
        let csv = self
            .csv
            .into_inner()
            .map_err(|err| PsrMatchError::IoError(err.into_error()))?;
        Ok((self.text, csv))
    }
}

impl MatchRecorder<File, File> {
    /// Open the text output and its CSV sibling in append mode.
    ///
    /// The CSV path is `text_path` with its extension replaced by `csv`. A `text_path` that
    /// already ends in `.csv` would share that file and is rejected with
    /// [`PsrMatchError::OutputPathClash`].
    pub fn open(text_path: &Utf8Path) -> Result<Self, PsrMatchError> {
        let csv_path = text_path.with_extension("csv");
        if csv_path == text_path {
            return Err(PsrMatchError::OutputPathClash(text_path.to_string()));
        }
        let append = |path: &Utf8Path| OpenOptions::new().create(true).append(true).open(path);

        let text = append(text_path)?;
        let csv = append(&csv_path)?;
        let write_header = csv.metadata()?.len() == 0;

        debug!(text = %text_path, csv = %csv_path, write_header, "match output opened");
        Self::new(text, csv, write_header)
    }
}

impl<T: Write, C: Write> MatchSink for MatchRecorder<T, C> {
    /// Write the text block, then the CSV row.
    ///
    /// Both payloads are rendered before either sink is touched. An I/O failure on the CSV
    /// sink after the text block was written leaves the two outputs one result apart; the
    /// error is returned and the result is not counted.
    fn record(&mut self, result: &MatchResult) -> Result<(), PsrMatchError> {
        let block = format!("{result}\n");
        let row = csv_record(result);

        self.text.write_all(block.as_bytes())?;
        self.text.flush()?;
        self.csv.write_record(&row)?;
        self.csv.flush()?;
        self.count += 1;
        Ok(())
    }

    fn possible_matches(&self) -> usize {
        self.count
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MatchCollector {
    results: Vec<MatchResult>,
}

impl MatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<MatchResult> {
        self.results
    }
}

impl MatchSink for MatchCollector {
    fn record(&mut self, result: &MatchResult) -> Result<(), PsrMatchError> {
        self.results.push(result.clone());
        Ok(())
    }

    fn possible_matches(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod recorder_test {
    use super::*;

    fn result(separation: Option<f64>) -> MatchResult {
        MatchResult {
            candidate: "cand.pfd".into(),
            candidate_raj: "00:00:00".into(),
            candidate_decj: "+00:00:00".into(),
            candidate_p0: "0.2502".into(),
            candidate_dm: "10.3".into(),
            candidate_snr: "0.0".into(),
            candidate_sort_key: 0,
            known: "J0000+0000".into(),
            known_raj: "00:00:00".into(),
            known_decj: "+00:00:00".into(),
            known_p0: "1.0".into(),
            known_dm: "10".into(),
            known_sort_key: 0,
            harmonic_number: 4,
            harmonic_period: 0.25,
            period_ratio: 0.5,
            separation,
        }
    }

    #[test]
    fn test_in_memory_writers() {
        let mut recorder = MatchRecorder::new(Vec::new(), Vec::new(), true).unwrap();
        recorder.record(&result(None)).unwrap();
        recorder.record(&result(Some(0.125))).unwrap();
        assert_eq!(recorder.possible_matches(), 2);

        let (text, csv) = recorder.into_inner().unwrap();
        let text = String::from_utf8(text).unwrap();
        let csv = String::from_utf8(csv).unwrap();

        assert_eq!(text.matches("POSSIBLE MATCH FOR:").count(), 2);
        assert!(text.contains("Harmonic Number = 4\n"));
        assert!(text.contains("Angular separation of psr and cand (deg): unspecified\n"));
        assert!(text.ends_with("@-----------------------------------------------------------------\n"));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "cand.pfd,00:00:00,+00:00:00,0.2502,10.3,0.0,J0000+0000,00:00:00,+00:00:00,1.0,10,4,0.25,0.5,unspecified"
        );
        assert!(lines[2].ends_with(",0.125"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_failed_write_is_not_counted() {
        let mut recorder = MatchRecorder::new(Broken, Vec::new(), false).unwrap();
        assert!(matches!(
            recorder.record(&result(None)),
            Err(PsrMatchError::IoError(_))
        ));
        assert_eq!(recorder.possible_matches(), 0);
        // the CSV sink never saw the row
        assert!(recorder.csv.get_ref().is_empty());

        let mut recorder = MatchRecorder::new(Vec::new(), Broken, false).unwrap();
        assert!(recorder.record(&result(None)).is_err());
        assert_eq!(recorder.possible_matches(), 0);
    }

    #[test]
    fn test_open_rejects_csv_text_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("matches.csv")).unwrap();
        assert_eq!(
            MatchRecorder::open(&path).err(),
            Some(PsrMatchError::OutputPathClash(path.to_string()))
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_collector() {
        let mut collector = MatchCollector::new();
        collector.record(&result(None)).unwrap();
        assert_eq!(collector.possible_matches(), 1);
        assert_eq!(collector.into_results()[0].harmonic_number, 4);
    }
}
