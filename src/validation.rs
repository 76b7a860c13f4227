//! # Catalog self-consistency
//!
//! Feeds every known source back into the engine as if it were a candidate. A correctly
//! tuned engine finds each source matching itself at harmonic 1; sources that don't usually
//! point at a `search_padding` too small for their neighbourhood or at an unusable record.
use tracing::{info, warn};

use crate::{matcher::MatchEngine, source::SourceRecord};

/// Outcome of [`self_consistency`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Sources with a period, fed back as candidates.
    pub checked: usize,
    /// Sources found matching themselves at harmonic 1.
    pub self_matched: usize,
    /// Names of the sources that did not.
    pub missed: Vec<String>,
}

impl ValidationReport {
    pub fn is_consistent(&self) -> bool {
        self.missed.is_empty()
    }
}

/// Copy of `source` with only the fields a search pipeline would report.
fn as_candidate(source: &SourceRecord) -> SourceRecord {
    let mut candidate = SourceRecord::new();
    for (key, values) in source.parameters() {
        if matches!(key, "PSRJ" | "PSRB" | "RAJ" | "DECJ" | "P0" | "DM") {
            candidate.set_parameter(key.into(), values.clone());
        }
    }
    candidate
}

/// Match every catalog source carrying a period against the catalog it comes from.
///
/// Return
/// ----------
/// * A [`ValidationReport`] listing the sources missing their own match.
pub fn self_consistency(engine: &MatchEngine) -> ValidationReport {
    let mut report = ValidationReport::default();

    for source in engine.catalog().iter().filter(|s| s.period().is_some()) {
        report.checked += 1;
        let found = engine
            .match_candidate(&as_candidate(source))
            .iter()
            .any(|r| r.known == source.name() && r.harmonic_number == 1);

        if found {
            report.self_matched += 1;
        } else {
            warn!(
                source = source.name(),
                sort_key = source.sort_key(),
                "source does not match itself"
            );
            report.missed.push(source.name().to_string());
        }
    }

    info!(
        checked = report.checked,
        self_matched = report.self_matched,
        missed = report.missed.len(),
        "catalog self-consistency"
    );
    report
}

#[cfg(test)]
mod validation_test {
    use super::*;
    use crate::{catalog::Catalog, settings::MatchSettings};

    #[test]
    fn test_self_consistency() {
        let catalog = Catalog::parse(
            "#CATALOGUE
PSRJ J0100+0100
RAJ 01:00:00
DECJ +01:00:00
P0 0.5
DM 30
@---
PSRB B0000+00
F0 10.0
@---
PSRJ J0200-1000
RAJ 02:00:00
DECJ -10:00:00
DM 3
",
        )
        .unwrap();
        let engine = MatchEngine::new(catalog, MatchSettings::default());

        let report = self_consistency(&engine);
        assert_eq!(report.checked, 2);
        assert_eq!(report.self_matched, 2);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_as_candidate_drops_frequency() {
        let source = SourceRecord::from_lines(["PSRJ J1", "F0 2.0", "P0 0.5", "PMRA 1"]).unwrap();
        let candidate = as_candidate(&source);
        assert_eq!(candidate.frequency(), None);
        assert_eq!(candidate.get_parameter("PMRA"), None);
        assert_eq!(candidate.period(), Some(0.5));
    }
}
