//! Comparison of one candidate against one known source.
//!
//! For every harmonic denominator `n` of the settings the pair matches when all active
//! criteria hold:
//!
//! * **period**: `P_cat / n - acc < P_cand < P_cat / n + acc` with
//!   `acc = accuracy / 100 · P_cand`;
//! * **DM**, active when the candidate DM is known and non-zero, the DM accuracy is non-zero
//!   and the catalog DM is known: `DM_cand - dm_acc < DM_cat < DM_cand + dm_acc` with
//!   `dm_acc = dm_accuracy / 100 · DM_cand`;
//! * **position**, active when the candidate has a position other than `00:00:00`: the
//!   angular separation is below `radius`.
//!
//! Unusable values never raise: the pair simply does not match.
use tracing::debug;

use super::result::MatchResult;
use crate::{
    constants::{Degree, Second, MISSING_VALUE, ZERO_POSITION},
    conversion::{angular_separation, is_zero_position},
    settings::MatchSettings,
    source::{ParameterKey, SourceRecord},
};

/// `centre - tolerance < value < centre + tolerance`
pub(crate) fn within_tolerance(value: f64, centre: f64, tolerance: f64) -> bool {
    centre - tolerance < value && value < centre + tolerance
}

/// Period criterion for the harmonic `1/n`.
pub fn harmonic_matches(
    catalog_period: Second,
    candidate_period: Second,
    accuracy: f64,
    n: u32,
) -> bool {
    let tolerance = accuracy / 100.0 * candidate_period;
    within_tolerance(candidate_period, catalog_period / f64::from(n), tolerance)
}

/// DM criterion, the window is relative to the candidate DM.
pub fn dm_matches(catalog_dm: f64, candidate_dm: f64, dm_accuracy: f64) -> bool {
    let tolerance = dm_accuracy / 100.0 * candidate_dm;
    within_tolerance(catalog_dm, candidate_dm, tolerance)
}

/// Candidate position used by the position criterion and by the search mode.
///
/// `None` when either coordinate is missing or holds the `00:00:00` placeholder.
pub fn candidate_position(candidate: &SourceRecord) -> Option<(&str, &str)> {
    match (candidate.raj(), candidate.decj()) {
        (Some(ra), Some(dec)) if !is_zero_position(ra) && !is_zero_position(dec) => {
            Some((ra, dec))
        }
        _ => None,
    }
}

/// Candidate values parsed once and reused against every known source.
#[derive(Debug, Clone)]
pub(crate) struct ParsedCandidate<'a> {
    record: &'a SourceRecord,
    period: Second,
    dm: Option<f64>,
    position: Option<(&'a str, &'a str)>,
}

impl<'a> ParsedCandidate<'a> {
    /// `None` when the candidate has no usable period: it cannot match anything.
    pub(crate) fn new(record: &'a SourceRecord) -> Option<Self> {
        let period = record.period().filter(|p| *p != 0.0 && p.is_finite())?;
        Some(ParsedCandidate {
            record,
            period,
            dm: record.dm().filter(|dm| *dm != 0.0),
            position: candidate_position(record),
        })
    }

    /// Angular separation to `known`.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` when the position criterion is inactive, `Ok(Some(θ))` when it is active
    ///   and computable, `Err(())` when it is active but cannot be evaluated.
    fn separation(
        &self,
        known: &SourceRecord,
        settings: &MatchSettings,
    ) -> Result<Option<Degree>, ()> {
        let Some((ra, dec)) = self.position else {
            return Ok(None);
        };
        let (Some(known_ra), Some(known_dec)) = (known.raj(), known.decj()) else {
            return Err(());
        };

        angular_separation(ra, dec, known_ra, known_dec, settings.separation)
            .map(Some)
            .map_err(|err| {
                debug!(
                    candidate = self.record.name(),
                    known = known.name(),
                    %err,
                    "separation skipped"
                );
            })
    }

    fn result(
        &self,
        known: &SourceRecord,
        known_period: Second,
        n: u32,
        separation: Option<Degree>,
    ) -> MatchResult {
        let text = |record: &SourceRecord, key: ParameterKey, default: &str| {
            record.value(&key).unwrap_or(default).to_string()
        };
        let harmonic_period = known_period / f64::from(n);

        MatchResult {
            candidate: self.record.name().to_string(),
            candidate_raj: text(self.record, ParameterKey::RaJ, ZERO_POSITION),
            candidate_decj: text(self.record, ParameterKey::DecJ, ZERO_POSITION),
            candidate_p0: text(self.record, ParameterKey::P0, MISSING_VALUE),
            candidate_dm: text(self.record, ParameterKey::Dm, MISSING_VALUE),
            candidate_snr: text(self.record, ParameterKey::Snr, "0.0"),
            candidate_sort_key: self.record.sort_key(),
            known: known.name().to_string(),
            known_raj: text(known, ParameterKey::RaJ, MISSING_VALUE),
            known_decj: text(known, ParameterKey::DecJ, MISSING_VALUE),
            known_p0: text(known, ParameterKey::P0, MISSING_VALUE),
            known_dm: text(known, ParameterKey::Dm, MISSING_VALUE),
            known_sort_key: known.sort_key(),
            harmonic_number: n,
            harmonic_period,
            period_ratio: harmonic_period / self.period,
            separation,
        }
    }

    /// Every harmonic under which `known` matches the candidate, in ascending `n`.
    pub(crate) fn compare(
        &self,
        known: &SourceRecord,
        settings: &MatchSettings,
    ) -> Vec<MatchResult> {
        let Some(known_period) = known.period() else {
            return Vec::new();
        };

        let harmonics: Vec<u32> = settings
            .harmonics
            .iter()
            .copied()
            .filter(|&n| harmonic_matches(known_period, self.period, settings.accuracy, n))
            .collect();
        if harmonics.is_empty() {
            return Vec::new();
        }

        if let (Some(candidate_dm), Some(known_dm)) = (self.dm, known.dm()) {
            if settings.dm_accuracy != 0.0
                && !dm_matches(known_dm, candidate_dm, settings.dm_accuracy)
            {
                return Vec::new();
            }
        }

        let separation = match self.separation(known, settings) {
            Ok(Some(theta)) if theta >= settings.radius => return Vec::new(),
            Ok(separation) => separation,
            Err(()) => return Vec::new(),
        };

        harmonics
            .into_iter()
            .map(|n| self.result(known, known_period, n, separation))
            .collect()
    }
}

/// Compare a candidate against one known source.
///
/// Arguments
/// -----------------
/// * `known`: catalog entry, its period is expected to be finalized.
/// * `candidate`: the candidate record.
/// * `settings`: tolerances and harmonic list.
///
/// Return
/// ----------
/// * One [`MatchResult`] per harmonic satisfying every active criterion, possibly none.
pub fn compare(
    known: &SourceRecord,
    candidate: &SourceRecord,
    settings: &MatchSettings,
) -> Vec<MatchResult> {
    ParsedCandidate::new(candidate)
        .map(|parsed| parsed.compare(known, settings))
        .unwrap_or_default()
}

#[cfg(test)]
mod predicate_test {
    use super::*;
    use approx::assert_relative_eq;

    fn known(lines: &[&str]) -> SourceRecord {
        let mut record = SourceRecord::from_lines(lines.iter().copied()).unwrap();
        record.finalize();
        record
    }

    fn settings(accuracy: f64, dm_accuracy: f64, radius: f64) -> MatchSettings {
        MatchSettings::builder()
            .accuracy(accuracy)
            .dm_accuracy(dm_accuracy)
            .radius(radius)
            .build()
            .unwrap()
    }

    #[test]
    fn test_harmonic_window() {
        assert!(harmonic_matches(1.0, 0.5003, 0.5, 2));
        assert!(!harmonic_matches(1.0, 0.5003, 0.5, 1));
        assert!(!harmonic_matches(1.0, 0.51, 0.5, 2));
        assert!(harmonic_matches(1.0, 1.0, 0.0001, 1));
        // window bounds are exclusive
        assert!(!harmonic_matches(1.0, 1.0, 0.0, 1));
    }

    #[test]
    fn test_half_period_only() {
        let psr = known(&["PSRJ J1", "P0 1.0"]);
        for candidate_period in ["0.5003", "0.51"] {
            let candidate =
                SourceRecord::from_lines(["PSRJ cand", format!("P0 {candidate_period} 0").as_str()])
                    .unwrap();
            let results = compare(&psr, &candidate, &MatchSettings::default());
            let harmonics: Vec<u32> = results.iter().map(|r| r.harmonic_number).collect();
            if candidate_period == "0.5003" {
                assert_eq!(harmonics, vec![2]);
                assert_eq!(results[0].separation, None);
                assert_relative_eq!(results[0].harmonic_period, 0.5);
                assert_relative_eq!(results[0].period_ratio, 0.5 / 0.5003);
            } else {
                assert!(harmonics.is_empty());
            }
        }
    }

    #[test]
    fn test_dm_gate() {
        let psr = known(&["PSRJ J1", "P0 1.0", "DM 20"]);
        let with_dm = |dm: &str| {
            let dm_line = format!("DM {dm} 0");
            SourceRecord::from_lines(["PSRJ cand", "P0 1.0 0", dm_line.as_str()]).unwrap()
        };
        let settings = settings(0.5, 5.0, 0.5);

        assert_eq!(compare(&psr, &with_dm("21"), &settings).len(), 1);
        assert!(compare(&psr, &with_dm("25"), &settings).is_empty());
        // zero DM disables the criterion
        assert_eq!(compare(&psr, &with_dm("0"), &settings).len(), 1);
        // as does a zero DM accuracy
        assert_eq!(compare(&psr, &with_dm("25"), &self::settings(0.5, 0.0, 0.5)).len(), 1);

        let unknown_dm = known(&["PSRJ J2", "P0 1.0", "DM *"]);
        assert_eq!(compare(&unknown_dm, &with_dm("25"), &settings).len(), 1);
        assert_eq!(compare(&unknown_dm, &with_dm("25"), &settings)[0].known_dm, "*");
    }

    #[test]
    fn test_radius_gate() {
        let psr = known(&["PSRJ J1", "RAJ 06:00:00", "DECJ +10:00:00", "P0 1.0"]);
        let candidate =
            SourceRecord::from_lines(["PSRJ cand", "RAJ 06:00:00", "DECJ +12:00:00", "P0 1.0"])
                .unwrap();

        assert!(compare(&psr, &candidate, &settings(0.5, 5.0, 1.0)).is_empty());
        let results = compare(&psr, &candidate, &settings(0.5, 5.0, 3.0));
        assert_eq!(results.len(), 1);
        assert_relative_eq!(results[0].separation.unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_position_criterion_needs_known_position() {
        let psr = known(&["PSRJ J1", "P0 1.0"]);
        let positioned =
            SourceRecord::from_lines(["PSRJ cand", "RAJ 06:00:00", "DECJ +12:00:00", "P0 1.0"])
                .unwrap();
        assert!(compare(&psr, &positioned, &MatchSettings::default()).is_empty());

        let zero = SourceRecord::from_lines([
            "PSRJ cand",
            "RAJ 00:00:00",
            "DECJ +12:00:00",
            "P0 1.0",
        ])
        .unwrap();
        let results = compare(&psr, &zero, &MatchSettings::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].separation_str(), "unspecified");
        assert_eq!(results[0].known_raj, "*");
    }

    #[test]
    fn test_unusable_candidate_period() {
        let psr = known(&["PSRJ J1", "P0 1.0"]);
        for p0 in ["P0 * 0", "P0 fast 0", "P0 0 0"] {
            let candidate = SourceRecord::from_lines(["PSRJ cand", p0]).unwrap();
            assert!(compare(&psr, &candidate, &MatchSettings::default()).is_empty());
        }
    }

    #[test]
    fn test_unparsable_known_position_is_no_match() {
        let psr = known(&["PSRJ J1", "RAJ xx:00:00", "DECJ +12:00:00", "P0 1.0"]);
        let candidate =
            SourceRecord::from_lines(["PSRJ cand", "RAJ 06:00:00", "DECJ +12:00:00", "P0 1.0"])
                .unwrap();
        assert!(compare(&psr, &candidate, &MatchSettings::default()).is_empty());
    }

    #[test]
    fn test_several_harmonics_are_all_reported() {
        let psr = known(&["PSRJ J1", "P0 1.0"]);
        let candidate = SourceRecord::from_lines(["PSRJ cand", "P0 0.25 0"]).unwrap();
        let settings = MatchSettings::builder()
            .accuracy(50.0)
            .harmonics([3, 4, 5])
            .build()
            .unwrap();

        let harmonics: Vec<u32> = compare(&psr, &candidate, &settings)
            .iter()
            .map(|r| r.harmonic_number)
            .collect();
        assert_eq!(harmonics, vec![3, 4, 5]);
    }
}
