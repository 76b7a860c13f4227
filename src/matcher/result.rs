use std::fmt;

use crate::constants::{Degree, Second, SortKey, UNSPECIFIED_SEPARATION};

/// One candidate/known-source pair satisfying every active criterion for one harmonic.
///
/// Candidate and known-source values are kept as the strings read from their records, so the
/// recorded output shows exactly what was compared.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub candidate: String,
    pub candidate_raj: String,
    pub candidate_decj: String,
    pub candidate_p0: String,
    pub candidate_dm: String,
    pub candidate_snr: String,
    pub candidate_sort_key: SortKey,

    pub known: String,
    pub known_raj: String,
    pub known_decj: String,
    pub known_p0: String,
    pub known_dm: String,
    pub known_sort_key: SortKey,

    /// Denominator `n` of the harmonic: the catalog period divided by `n` matched.
    pub harmonic_number: u32,
    /// Catalog period divided by `harmonic_number`.
    pub harmonic_period: Second,
    /// `harmonic_period / candidate period`.
    pub period_ratio: f64,
    /// `None` when the position criterion was not applied.
    pub separation: Option<Degree>,
}

impl MatchResult {
    /// Separation rendered for output, `unspecified` when it was not computed.
    pub fn separation_str(&self) -> String {
        self.separation
            .map_or_else(|| UNSPECIFIED_SEPARATION.to_string(), |s| s.to_string())
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "POSSIBLE MATCH FOR:")?;
        writeln!(f, "{}", self.candidate)?;
        writeln!(
            f,
            "Candidate Source -> RAJ: {} DECJ: {} P0: {} DM: {} SNR: {} SORT KEY: {}",
            self.candidate_raj,
            self.candidate_decj,
            self.candidate_p0,
            self.candidate_dm,
            self.candidate_snr,
            self.candidate_sort_key
        )?;
        writeln!(
            f,
            "Known Source     -> RAJ: {} DECJ: {} P0: {} DM: {} SORT KEY: {}",
            self.known_raj, self.known_decj, self.known_p0, self.known_dm, self.known_sort_key
        )?;
        writeln!(f, "PSR: {}", self.known)?;
        writeln!(f, "Harmonic Number = {}", self.harmonic_number)?;
        writeln!(f, "Harmonic Period: {}", self.harmonic_period)?;
        writeln!(f, "Harmonic Period/Candidate Period: {}", self.period_ratio)?;
        writeln!(
            f,
            "Angular separation of psr and cand (deg): {}",
            self.separation_str()
        )?;
        write!(
            f,
            "@-----------------------------------------------------------------"
        )
    }
}
