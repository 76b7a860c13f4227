//! # Search candidates
//!
//! A candidate is a periodic signal found by a pulsar search pipeline. Pipelines report its
//! position either as sexagesimal strings or as decimal degrees; [`CandidateParams`] accepts
//! both and turns the candidate into the [`SourceRecord`] consumed by the match engine.
//!
//! ## Candidate lists
//! -----------------
//! [`read_candidates_csv`] reads a CSV file with the header `name,ra,dec,period,dm,snr`.
//! `ra`/`dec` holding a `:` are taken as sexagesimal, anything else as decimal degrees. Empty
//! fields mean "unknown":
//!
//! ```text
//! name,ra,dec,period,dm,snr
//! cand_001.pfd,05:34:31.9,+22:00:52,0.0337,56.8,41.2
//! cand_002.pfd,83.63,22.01,0.0674,56.7,12.0
//! cand_003.pfd,,,1.2,,
//! ```
use std::fs::File;

use camino::Utf8Path;
use serde::Deserialize;
use smallvec::smallvec;
use tracing::debug;

use crate::{
    constants::Degree,
    conversion::{dec_deg_to_dms, ra_deg_to_hms},
    psrmatch_errors::PsrMatchError,
    source::{Parameter, ParameterKey, SourceRecord},
};

/// A sky coordinate as reported by a search pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    /// `HH:MM:SS.s` or `±DD:MM:SS.s`, one or two fields accepted.
    Sexagesimal(String),
    Degrees(Degree),
}

impl Coordinate {
    /// Right ascension as a sexagesimal string, degrees converted with [`ra_deg_to_hms`].
    pub fn as_ra(&self) -> String {
        match self {
            Coordinate::Sexagesimal(s) => s.clone(),
            Coordinate::Degrees(deg) => ra_deg_to_hms(*deg),
        }
    }

    /// Declination as a sexagesimal string, degrees converted with [`dec_deg_to_dms`].
    pub fn as_dec(&self) -> String {
        match self {
            Coordinate::Sexagesimal(s) => s.clone(),
            Coordinate::Degrees(deg) => dec_deg_to_dms(*deg),
        }
    }

    fn parse_field(field: &str) -> Result<Option<Self>, PsrMatchError> {
        let field = field.trim();
        if field.is_empty() {
            Ok(None)
        } else if field.contains(':') {
            Ok(Some(Coordinate::Sexagesimal(field.to_string())))
        } else {
            field
                .parse()
                .map(|deg| Some(Coordinate::Degrees(deg)))
                .map_err(|_| PsrMatchError::InvalidNumber(field.to_string()))
        }
    }
}

/// Flat candidate description handed over by a search pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateParams {
    /// Candidate identifier, usually the path of the candidate file.
    pub name: String,
    pub ra: Option<Coordinate>,
    pub dec: Option<Coordinate>,
    /// Period in seconds.
    pub period: Option<f64>,
    pub dm: Option<f64>,
    pub snr: Option<f64>,
}

fn with_zero_error(value: String) -> Parameter {
    smallvec![value, "0".into()]
}

impl CandidateParams {
    pub fn new(name: impl Into<String>) -> Self {
        CandidateParams {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build the record matched against the catalog.
    ///
    /// The name is stored under `PSRJ`. Each known value gets a `0` uncertainty. A position is
    /// only stored when both coordinates are known, otherwise the candidate is matched by
    /// period and DM alone.
    pub fn to_source(&self) -> SourceRecord {
        let mut record = SourceRecord::new();
        record.set_parameter(ParameterKey::PsrJ, with_zero_error(self.name.clone()));

        if let (Some(ra), Some(dec)) = (&self.ra, &self.dec) {
            record.set_parameter(ParameterKey::RaJ, with_zero_error(ra.as_ra()));
            record.set_parameter(ParameterKey::DecJ, with_zero_error(dec.as_dec()));
        }

        let numbers = [
            (ParameterKey::Dm, self.dm),
            (ParameterKey::P0, self.period),
            (ParameterKey::Snr, self.snr),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                record.set_parameter(key, with_zero_error(value.to_string()));
            }
        }

        record
    }
}

impl From<&CandidateParams> for SourceRecord {
    fn from(candidate: &CandidateParams) -> Self {
        candidate.to_source()
    }
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    name: String,
    #[serde(default)]
    ra: String,
    #[serde(default)]
    dec: String,
    period: Option<f64>,
    dm: Option<f64>,
    snr: Option<f64>,
}

impl TryFrom<CandidateRow> for CandidateParams {
    type Error = PsrMatchError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(CandidateParams {
            ra: Coordinate::parse_field(&row.ra)?,
            dec: Coordinate::parse_field(&row.dec)?,
            name: row.name,
            period: row.period,
            dm: row.dm,
            snr: row.snr,
        })
    }
}

/// Read a `name,ra,dec,period,dm,snr` candidate list.
///
/// Arguments
/// -----------------
/// * `path`: CSV file with a header row.
///
/// Return
/// ----------
/// * The candidates in file order, or the first I/O, CSV or coordinate error met.
pub fn read_candidates_csv(path: &Utf8Path) -> Result<Vec<CandidateParams>, PsrMatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(File::open(path)?);

    let candidates = reader
        .deserialize::<CandidateRow>()
        .map(|row| CandidateParams::try_from(row?))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(path = path.as_str(), candidates = candidates.len(), "candidate list read");
    Ok(candidates)
}
