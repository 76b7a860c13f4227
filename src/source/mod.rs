//! # Source records
//!
//! A [`SourceRecord`] holds every parameter reported for one catalogued pulsar (or one search
//! candidate, which uses the same representation), together with the derived
//! [`SortKey`] that orders the catalog.
//!
//! ## Parameter storage
//! -----------------
//! The handful of keys used by the matcher (`PSRJ`, `PSRB`, `RAJ`, `DECJ`, `P0`, `F0`, `DM`,
//! `SNR`) live in dedicated typed slots. Every other catalog column is kept in an `extra`
//! map so that nothing read from the catalog is lost. Each parameter keeps its raw string
//! sub-values (`value [uncertainty] [provenance...]`), see [`Parameter`].
//!
//! ## Invariants
//! -----------------
//! * `RAJ` and `DECJ` values are always stored with exactly three colon-separated fields.
//! * The sort key is recomputed after every insertion while it is still zero, and frozen
//!   once it is not.
//! * The displayed name is the `PSRJ` name when present, else the `PSRB` name, else
//!   [`UNKNOWN_SOURCE_NAME`].
mod parameter;

pub use parameter::{Parameter, ParameterKey};

use std::{collections::HashMap, fmt};

use ahash::RandomState;
use itertools::Itertools;
use smallvec::smallvec;
use tracing::debug;

use crate::{
    constants::{Second, SortKey, MISSING_VALUE, UNKNOWN_SOURCE_NAME},
    conversion::{normalize_sexagesimal, to_seconds},
    psrmatch_errors::PsrMatchError,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    psrj: Option<Parameter>,
    psrb: Option<Parameter>,
    raj: Option<Parameter>,
    decj: Option<Parameter>,
    p0: Option<Parameter>,
    f0: Option<Parameter>,
    dm: Option<Parameter>,
    snr: Option<Parameter>,
    extra: HashMap<String, Parameter, RandomState>,
    sort_key: SortKey,
    period_derived: bool,
}

/// Parse the first sub-value of a parameter as a number, treating `*` as absent.
fn numeric(parameter: Option<&Parameter>) -> Option<f64> {
    let value = parameter?.first()?;
    if value == MISSING_VALUE {
        return None;
    }
    value.parse::<f64>().ok()
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a sequence of catalog parameter lines.
    ///
    /// ```rust
    /// use psrmatch::source::SourceRecord;
    ///
    /// let psr = SourceRecord::from_lines([
    ///     "PSRJ     J0007+7303                    aaa+09c",
    ///     "RAJ      00:07:01.7               2    awd+12",
    ///     "DECJ     +73:03:07.4              8    awd+12",
    /// ])
    /// .unwrap();
    /// assert_eq!(psr.name(), "J0007+7303");
    /// assert_eq!(psr.sort_key(), 421 + 262987);
    /// ```
    pub fn from_lines<'a, I>(lines: I) -> Result<Self, PsrMatchError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut record = SourceRecord::new();
        for line in lines {
            record.add_parameter(line)?;
        }
        Ok(record)
    }

    /// Add one whitespace-separated parameter line `KEY value [error] [flags...]`.
    ///
    /// Arguments
    /// -----------------
    /// * `line`: a raw line from a catalog file, e.g. `"DM       13.9    1    snt97"`.
    ///
    /// Return
    /// ----------
    /// * `Ok(())` once the parameter is stored, or
    ///   [`PsrMatchError::InvalidParameterLine`] if the line holds no key at all.
    ///
    /// See also
    /// ------------
    /// * [`SourceRecord::set_parameter`] – Typed entry point used by the tabular reader.
    pub fn add_parameter(&mut self, line: &str) -> Result<(), PsrMatchError> {
        let mut tokens = line.split_whitespace();
        let key = tokens
            .next()
            .ok_or_else(|| PsrMatchError::InvalidParameterLine(line.to_string()))?;

        self.set_parameter(key.into(), tokens.map(str::to_string).collect());
        Ok(())
    }

    /// Store the sub-values of one parameter, replacing any previous value for that key.
    ///
    /// `RAJ`/`DECJ` values are right-padded to three fields before storage, and the sort key
    /// is refreshed while it is still unset.
    pub fn set_parameter(&mut self, key: ParameterKey, mut values: Parameter) {
        if matches!(key, ParameterKey::RaJ | ParameterKey::DecJ) {
            if let Some(first) = values.first_mut() {
                *first = normalize_sexagesimal(first);
            }
        }

        match key {
            ParameterKey::PsrJ => self.psrj = Some(values),
            ParameterKey::PsrB => self.psrb = Some(values),
            ParameterKey::RaJ => self.raj = Some(values),
            ParameterKey::DecJ => self.decj = Some(values),
            ParameterKey::P0 => self.p0 = Some(values),
            ParameterKey::F0 => self.f0 = Some(values),
            ParameterKey::Dm => self.dm = Some(values),
            ParameterKey::Snr => self.snr = Some(values),
            ParameterKey::Other(key) => {
                self.extra.insert(key, values);
            }
        }

        if self.sort_key == 0 {
            self.update_sort_key();
        }
    }

    fn update_sort_key(&mut self) {
        let (Some(raj), Some(decj)) = (self.raj(), self.decj()) else {
            return;
        };

        match (to_seconds(raj), to_seconds(decj)) {
            (Ok(ra), Ok(dec)) => match ra.checked_add(dec) {
                Some(key) => self.sort_key = key,
                None => debug!(source = self.name(), raj, decj, "sort key overflow, left unset"),
            },
            (Err(err), _) | (_, Err(err)) => {
                debug!(source = self.name(), %err, "sort key left unset");
            }
        }
    }

    /// Complete the record once its last parameter is read.
    ///
    /// When `P0` is missing (or the `*` placeholder) and `F0` holds a usable non-zero
    /// frequency, `P0 = 1 / F0` is stored with `0` uncertainty and provenance. Matching then
    /// never has to mutate the catalog.
    ///
    /// Return
    /// ----------
    /// * `true` if a period was derived.
    pub fn finalize(&mut self) -> bool {
        if self.period().is_some() {
            return false;
        }
        match self.frequency() {
            Some(f0) if f0 != 0.0 && f0.is_finite() => {
                self.p0 = Some(smallvec![(1.0 / f0).to_string(), "0".into(), "0".into()]);
                self.period_derived = true;
                true
            }
            _ => false,
        }
    }

    /// Name used to identify the source: J name, then B name, then `"unknown"`.
    pub fn name(&self) -> &str {
        self.psrj
            .as_ref()
            .and_then(|p| p.first())
            .or_else(|| self.psrb.as_ref().and_then(|p| p.first()))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SOURCE_NAME)
    }

    fn slot(&self, key: &ParameterKey) -> Option<&Parameter> {
        match key {
            ParameterKey::PsrJ => self.psrj.as_ref(),
            ParameterKey::PsrB => self.psrb.as_ref(),
            ParameterKey::RaJ => self.raj.as_ref(),
            ParameterKey::DecJ => self.decj.as_ref(),
            ParameterKey::P0 => self.p0.as_ref(),
            ParameterKey::F0 => self.f0.as_ref(),
            ParameterKey::Dm => self.dm.as_ref(),
            ParameterKey::Snr => self.snr.as_ref(),
            ParameterKey::Other(key) => self.extra.get(key),
        }
    }

    /// All sub-values stored for `key`, or `None` if the key was never seen.
    pub fn get_parameter(&self, key: &str) -> Option<&Parameter> {
        self.slot(&ParameterKey::from(key))
    }

    /// Sub-value at `index` for `key`; `None` for an unknown key or an out-of-range index.
    pub fn get_parameter_at_index(&self, key: &str, index: usize) -> Option<&str> {
        self.get_parameter(key)?.get(index).map(String::as_str)
    }

    /// First sub-value stored for `key`.
    pub fn value(&self, key: &ParameterKey) -> Option<&str> {
        self.slot(key)?.first().map(String::as_str)
    }

    pub fn raj(&self) -> Option<&str> {
        self.value(&ParameterKey::RaJ)
    }

    pub fn decj(&self) -> Option<&str> {
        self.value(&ParameterKey::DecJ)
    }

    /// `true` when both `RAJ` and `DECJ` carry a value.
    pub fn has_position(&self) -> bool {
        self.raj().is_some() && self.decj().is_some()
    }

    /// Period in seconds, `None` if absent, `*` or unparsable.
    pub fn period(&self) -> Option<Second> {
        numeric(self.p0.as_ref())
    }

    /// Spin frequency in Hz.
    pub fn frequency(&self) -> Option<f64> {
        numeric(self.f0.as_ref())
    }

    pub fn dm(&self) -> Option<f64> {
        numeric(self.dm.as_ref())
    }

    pub fn snr(&self) -> Option<f64> {
        numeric(self.snr.as_ref())
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// `true` if `P0` was computed from `F0` by [`SourceRecord::finalize`].
    pub fn period_is_derived(&self) -> bool {
        self.period_derived
    }

    /// `true` if no parameter has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.parameters().next().is_none()
    }

    /// Every stored parameter: typed keys first in a fixed order, then extra keys sorted.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        let typed = [
            ("PSRJ", &self.psrj),
            ("PSRB", &self.psrb),
            ("RAJ", &self.raj),
            ("DECJ", &self.decj),
            ("P0", &self.p0),
            ("F0", &self.f0),
            ("DM", &self.dm),
            ("SNR", &self.snr),
        ]
        .into_iter()
        .filter_map(|(key, slot)| slot.as_ref().map(|p| (key, p)));

        let extra = self
            .extra
            .iter()
            .map(|(key, p)| (key.as_str(), p))
            .sorted_by_key(|(key, _)| *key);

        typed.chain(extra)
    }

    fn display_value(&self, key: &ParameterKey) -> &str {
        self.value(key).unwrap_or(MISSING_VALUE)
    }

    /// Padded one-line summary: name, RAJ, DECJ, P0, DM.
    pub fn short_form(&self) -> String {
        format!(
            "{:<10}\t{:<12}\t{:<13}\t{:<20}\t{:<15}",
            self.name(),
            self.display_value(&ParameterKey::RaJ),
            self.display_value(&ParameterKey::DecJ),
            self.display_value(&ParameterKey::P0),
            self.display_value(&ParameterKey::Dm),
        )
    }

    /// Every parameter on its own line, keys aligned: `RAJ      00:07:01.7, 2, awd+12`.
    pub fn full_form(&self) -> String {
        self.parameters()
            .map(|(key, values)| format!("{key:<9}{}", values.join(", ")))
            .join("\n")
    }
}

impl fmt::Display for SourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.name(),
            self.display_value(&ParameterKey::RaJ),
            self.display_value(&ParameterKey::DecJ),
            self.display_value(&ParameterKey::P0),
            self.display_value(&ParameterKey::Dm),
            self.sort_key
        )
    }
}

#[cfg(test)]
mod source_record_test {
    use super::*;

    fn j0024() -> SourceRecord {
        SourceRecord::from_lines([
            "PSRB     B0021-72G                     rlm+95",
            "PSRJ     J0024-7204G",
            "RAJ      00:24:07.9587            3    fck+03",
            "DECJ     -72:04:39.6911           7    fck+03",
            "PMRA     4.2                      14   fck+03",
            "F0       247.50152509652          2    fck+03",
        ])
        .unwrap()
    }

    #[test]
    fn test_add_parameter_keeps_sub_values() {
        let psr = j0024();
        assert_eq!(
            psr.get_parameter("RAJ").map(|p| p.to_vec()),
            Some(vec![
                "00:24:07.9587".to_string(),
                "3".to_string(),
                "fck+03".to_string()
            ])
        );
        assert_eq!(psr.get_parameter_at_index("PMRA", 0), Some("4.2"));
        assert_eq!(psr.get_parameter_at_index("PMRA", 2), Some("fck+03"));
        assert_eq!(psr.get_parameter_at_index("PMRA", 3), None);
        assert_eq!(psr.get_parameter("DM"), None);
        assert_eq!(psr.get_parameter_at_index("DM", 0), None);
    }

    #[test]
    fn test_empty_line_is_rejected() {
        let mut psr = SourceRecord::new();
        assert_eq!(
            psr.add_parameter("   "),
            Err(PsrMatchError::InvalidParameterLine("   ".into()))
        );
        assert!(psr.is_empty());
    }

    #[test]
    fn test_j_name_wins_over_b_name() {
        assert_eq!(j0024().name(), "J0024-7204G");

        let b_only = SourceRecord::from_lines(["PSRB B1937+21"]).unwrap();
        assert_eq!(b_only.name(), "B1937+21");

        let j_first = SourceRecord::from_lines(["PSRJ J1939+2134", "PSRB B1937+21"]).unwrap();
        assert_eq!(j_first.name(), "J1939+2134");

        assert_eq!(SourceRecord::new().name(), UNKNOWN_SOURCE_NAME);
    }

    #[test]
    fn test_position_normalization() {
        let mut psr = SourceRecord::from_lines(["RAJ 00:23 0", "DECJ +09 0"]).unwrap();
        assert_eq!(psr.raj(), Some("00:23:00"));
        assert_eq!(psr.decj(), Some("+09:00:00"));

        let key = psr.sort_key();
        psr.add_parameter("RAJ 00:23:00 0").unwrap();
        assert_eq!(psr.raj(), Some("00:23:00"));
        assert_eq!(psr.sort_key(), key);
    }

    #[test]
    fn test_sort_key_needs_both_angles() {
        let mut psr = SourceRecord::from_lines(["PSRJ J0000+0001", "RAJ 00:00:10"]).unwrap();
        assert_eq!(psr.sort_key(), 0);
        assert!(!psr.has_position());

        psr.add_parameter("DECJ +00:00:05").unwrap();
        assert_eq!(psr.sort_key(), 15);
        assert!(psr.has_position());

        // frozen once set
        psr.add_parameter("RAJ 10:00:00").unwrap();
        assert_eq!(psr.sort_key(), 15);
    }

    #[test]
    fn test_sort_key_grows_with_ra_seconds() {
        let a = SourceRecord::from_lines(["RAJ 05:10:20", "DECJ -30:00:00"]).unwrap();
        let b = SourceRecord::from_lines(["RAJ 05:10:21", "DECJ -30:00:00"]).unwrap();
        assert!(b.sort_key() > a.sort_key());
    }

    #[test]
    fn test_unparsable_position_leaves_key_unset() {
        let psr = SourceRecord::from_lines(["RAJ ab:cd", "DECJ +10:00:00"]).unwrap();
        assert_eq!(psr.sort_key(), 0);
        assert!(psr.has_position());
    }

    #[test]
    fn test_unbounded_position_leaves_key_unset() {
        for raj in ["RAJ inf", "RAJ 1e30", "RAJ 00:00:NaN"] {
            let psr = SourceRecord::from_lines(["PSRJ J1", raj, "DECJ +01:00:00"]).unwrap();
            assert_eq!(psr.sort_key(), 0, "{raj}");
        }

        let catalog: crate::catalog::Catalog =
            "#CATALOGUE\nPSRJ J1\nRAJ inf\nDECJ +01:00:00\nP0 1.0\n@\nPSRJ J2\nRAJ 01:00:00\nDECJ +01:00:00\nP0 2.0\n"
                .parse()
                .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_at(1), Some("J2"));
    }

    #[test]
    fn test_finalize_derives_period() {
        let mut psr = SourceRecord::from_lines(["PSRJ J0000+0000", "F0 2.0 1 x"]).unwrap();
        assert_eq!(psr.period(), None);
        assert!(psr.finalize());
        assert_eq!(psr.period(), Some(0.5));
        assert!(psr.period_is_derived());
        assert!(!psr.finalize());

        let mut zero = SourceRecord::from_lines(["F0 0"]).unwrap();
        assert!(!zero.finalize());
        assert_eq!(zero.period(), None);

        let mut both = SourceRecord::from_lines(["P0 1.5", "F0 2.0"]).unwrap();
        assert!(!both.finalize());
        assert_eq!(both.period(), Some(1.5));
    }

    #[test]
    fn test_missing_value_marker() {
        let psr = SourceRecord::from_lines(["P0 * 0", "DM 12.5 0.6"]).unwrap();
        assert_eq!(psr.period(), None);
        assert_eq!(psr.dm(), Some(12.5));
    }

    #[test]
    fn test_renderings() {
        let psr = SourceRecord::from_lines([
            "PSRJ J0006+1834",
            "RAJ 00:06:04.8 0.2",
            "DECJ +18:34:59 4",
            "P0 0.69374767047 1.4e-10",
            "F1 -2.1e-15 1 abc",
        ])
        .unwrap();

        assert_eq!(
            psr.to_string(),
            format!("J0006+1834,00:06:04.8,+18:34:59,0.69374767047,*,{}", psr.sort_key())
        );
        assert!(psr.short_form().starts_with("J0006+1834\t00:06:04.8  \t"));
        assert_eq!(
            psr.full_form().lines().last(),
            Some("F1       -2.1e-15, 1, abc")
        );
        assert_eq!(psr.full_form().lines().count(), 5);
    }
}
