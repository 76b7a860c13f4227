//! # Match engine
//!
//! Compare search candidates against a [`Catalog`] of known pulsars.
//!
//! ## Overview
//! -----------------
//! For each candidate the engine picks a [`SearchMode`]:
//!
//! * [`SearchMode::Indexed`] (candidate with a position): a divide-and-conquer search over
//!   the catalog sort keys finds a seed rank. If the seed key lies within
//!   `±search_padding` of the candidate key, the seed is compared, then the ranks to its right
//!   and to its left, each walk stopping at the first rank whose key leaves the window. A seed
//!   outside the window means no comparison at all.
//! * [`SearchMode::Exhaustive`] (candidate without a usable position): every catalog entry is
//!   compared.
//!
//! Each comparison is performed by the [`predicate`] module and yields zero or more
//! [`MatchResult`]s, one per matching harmonic.
//!
//! The mode is a pure function of the candidate: a position-less candidate never changes how
//! later candidates are searched.
//!
//! ## Example
//! -----------------
//! ```rust
//! use psrmatch::{
//!     candidate::{CandidateParams, Coordinate},
//!     catalog::Catalog,
//!     matcher::MatchEngine,
//!     settings::MatchSettings,
//! };
//!
//! let catalog: Catalog = "#CATALOGUE\nPSRJ J0000+0000\nRAJ 00:00:00\nDECJ +00:00:00\nP0 1.0\nDM 10\n"
//!     .parse()
//!     .unwrap();
//! let engine = MatchEngine::new(catalog, MatchSettings::default());
//!
//! let candidate = CandidateParams {
//!     ra: Some(Coordinate::Sexagesimal("00:00:01".into())),
//!     dec: Some(Coordinate::Sexagesimal("+00:00:01".into())),
//!     period: Some(0.5001),
//!     dm: Some(10.1),
//!     ..CandidateParams::new("cand.pfd")
//! };
//!
//! let results = engine.match_params(&candidate);
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].harmonic_number, 2);
//! ```
pub mod predicate;
mod result;

pub use predicate::{candidate_position, compare};
pub use result::MatchResult;

#[cfg(feature = "progress")]
use std::time::Duration;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::{
    candidate::CandidateParams,
    catalog::Catalog,
    constants::SortKey,
    psrmatch_errors::PsrMatchError,
    recorder::MatchSink,
    settings::MatchSettings,
    source::SourceRecord,
};
use predicate::ParsedCandidate;

/// How the catalog is traversed for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Seed search on the sort key followed by a bounded walk on both sides.
    Indexed,
    /// Comparison against every catalog entry.
    Exhaustive,
}

impl SearchMode {
    /// `Exhaustive` when the candidate has no position, or only the `00:00:00` placeholder.
    pub fn for_candidate(candidate: &SourceRecord) -> Self {
        if candidate_position(candidate).is_some() {
            SearchMode::Indexed
        } else {
            SearchMode::Exhaustive
        }
    }
}

/// Totals of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Candidates processed.
    pub candidates: usize,
    /// Results recorded for this batch.
    pub matches: usize,
}

#[derive(Debug, Clone)]
pub struct MatchEngine {
    catalog: Catalog,
    settings: MatchSettings,
}

impl MatchEngine {
    pub fn new(catalog: Catalog, settings: MatchSettings) -> Self {
        MatchEngine { catalog, settings }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    fn key_at(&self, rank: usize) -> SortKey {
        self.catalog.sort_key_at(rank).unwrap_or_default()
    }

    /// Rank where the indexed search starts for a candidate sort key.
    ///
    /// The half-open range `[start, end)` is split at `mid = ceil((start + end) / 2)` until
    /// the key at `mid` equals `key` or at most two ranks remain. With two ranks left, the
    /// one whose key is nearer to `key` is returned (the upper one on a tie), so a key present
    /// in the catalog is always found.
    ///
    /// Return
    /// ----------
    /// * `None` only for an empty catalog.
    pub fn seed_position(&self, key: SortKey) -> Option<usize> {
        let (mut start, mut end) = (0, self.catalog.len());

        loop {
            match end - start {
                0 => return None,
                1 => return Some(start),
                2 => {
                    let lower = self.key_at(start).abs_diff(key);
                    let upper = self.key_at(start + 1).abs_diff(key);
                    return Some(if lower < upper { start } else { start + 1 });
                }
                _ => {
                    let mid = (start + end).div_ceil(2);
                    let mid_key = self.key_at(mid);
                    if key == mid_key {
                        return Some(mid);
                    } else if key < mid_key {
                        end = mid;
                    } else {
                        start = mid;
                    }
                }
            }
        }
    }

    fn in_window(&self, rank: usize, key: SortKey) -> bool {
        let padding = self.settings.search_padding.unsigned_abs();
        self.key_at(rank).abs_diff(key) <= padding
    }

    /// Catalog ranks compared against a candidate sort key in indexed mode.
    ///
    /// Order: seed, then increasing ranks, then decreasing ranks. Empty when the seed lies
    /// outside the padding window.
    pub fn indexed_ranks(&self, key: SortKey) -> Vec<usize> {
        let Some(seed) = self.seed_position(key) else {
            return Vec::new();
        };
        if !self.in_window(seed, key) {
            return Vec::new();
        }

        let right = (seed + 1..self.catalog.len()).take_while(|&rank| self.in_window(rank, key));
        let left = (0..seed).rev().take_while(|&rank| self.in_window(rank, key));

        std::iter::once(seed).chain(right).chain(left).collect()
    }

    /// Catalog ranks compared against `candidate`, according to its [`SearchMode`].
    pub fn comparison_set(&self, candidate: &SourceRecord) -> Vec<usize> {
        match SearchMode::for_candidate(candidate) {
            SearchMode::Exhaustive => (0..self.catalog.len()).collect(),
            SearchMode::Indexed => self.indexed_ranks(candidate.sort_key()),
        }
    }

    /// Every possible match of one candidate.
    ///
    /// Arguments
    /// -----------------
    /// * `candidate`: candidate record, see [`CandidateParams::to_source`].
    ///
    /// Return
    /// ----------
    /// * The results in comparison order, several per known source when several harmonics
    ///   match. Empty when the candidate has no usable period.
    pub fn match_candidate(&self, candidate: &SourceRecord) -> Vec<MatchResult> {
        let Some(parsed) = ParsedCandidate::new(candidate) else {
            debug!(candidate = candidate.name(), "no usable period, skipped");
            return Vec::new();
        };

        let mode = SearchMode::for_candidate(candidate);
        let ranks = self.comparison_set(candidate);
        debug!(
            candidate = candidate.name(),
            ?mode,
            sort_key = candidate.sort_key(),
            compared = ranks.len(),
            "candidate searched"
        );

        ranks
            .into_iter()
            .filter_map(|rank| self.catalog.get(rank))
            .flat_map(|known| parsed.compare(known, &self.settings))
            .collect()
    }

    pub fn match_params(&self, candidate: &CandidateParams) -> Vec<MatchResult> {
        self.match_candidate(&candidate.to_source())
    }

    /// Match one candidate and hand every result to `sink`.
    ///
    /// Return
    /// ----------
    /// * The number of results recorded for this candidate.
    pub fn match_and_record<S: MatchSink>(
        &self,
        candidate: &SourceRecord,
        sink: &mut S,
    ) -> Result<usize, PsrMatchError> {
        let results = self.match_candidate(candidate);
        for result in &results {
            sink.record(result)?;
        }
        Ok(results.len())
    }

    /// Match a batch of candidates, recording every result in `sink`.
    ///
    /// With the `progress` feature a progress bar is drawn while the batch runs.
    ///
    /// See also
    /// ------------
    /// * [`crate::recorder::MatchRecorder`] – Append-only text and CSV output.
    /// * [`crate::recorder::MatchCollector`] – In-memory sink.
    pub fn match_all<S: MatchSink>(
        &self,
        candidates: &[CandidateParams],
        sink: &mut S,
    ) -> Result<MatchSummary, PsrMatchError> {
        #[cfg(feature = "progress")]
        let pb = {
            let pb = ProgressBar::new(candidates.len().max(1) as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
                )
                .expect("indicatif template"),
            );
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        };

        let mut summary = MatchSummary::default();
        for candidate in candidates {
            summary.matches += self.match_and_record(&candidate.to_source(), sink)?;
            summary.candidates += 1;

            #[cfg(feature = "progress")]
            {
                pb.set_message(format!("matches: {}", summary.matches));
                pb.inc(1);
            }
        }

        #[cfg(feature = "progress")]
        pb.finish_and_clear();

        tracing::info!(
            candidates = summary.candidates,
            matches = summary.matches,
            known_sources = self.catalog.len(),
            "batch matched"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod match_engine_test {
    use super::*;

    /// Positioned sources at RA 00:00:00 with declinations giving keys `keys`.
    fn engine_with_keys(keys: &[SortKey], padding: SortKey) -> MatchEngine {
        let records = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let decj = format!("DECJ +00:00:{key}");
                SourceRecord::from_lines([
                    format!("PSRJ J{i:04}").as_str(),
                    "RAJ 00:00:00",
                    decj.as_str(),
                    "P0 1.0",
                ])
                .unwrap()
            })
            .collect();
        let settings = MatchSettings::builder()
            .search_padding(padding)
            .build()
            .unwrap();
        MatchEngine::new(Catalog::from_records(records).unwrap(), settings)
    }

    #[test]
    fn test_seed_exact_keys() {
        for n in 1..40 {
            let keys: Vec<SortKey> = (0..n).map(|i| 10 + 7 * i).collect();
            let engine = engine_with_keys(&keys, 0);
            for (rank, key) in keys.iter().enumerate() {
                let seed = engine.seed_position(*key).unwrap();
                assert_eq!(engine.catalog().sort_key_at(seed), Some(*key));
                assert_eq!(seed, rank);
            }
        }
    }

    #[test]
    fn test_seed_between_keys() {
        let engine = engine_with_keys(&[10, 20, 30, 40, 50], 0);
        let seed = engine.seed_position(33).unwrap();
        assert!([2, 3].contains(&seed));
        assert_eq!(engine.seed_position(-100), Some(0));
        assert_eq!(engine.seed_position(1000), Some(4));
    }

    #[test]
    fn test_neighbour_expansion() {
        let engine = engine_with_keys(&[10, 20, 30, 40, 50], 6);
        let mut ranks = engine.indexed_ranks(25);
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2]);

        let engine = engine_with_keys(&[10, 20, 30, 40, 50], 15);
        let ranks = engine.indexed_ranks(30);
        assert_eq!(ranks, vec![2, 3, 1]);
    }

    #[test]
    fn test_seed_outside_window() {
        let engine = engine_with_keys(&[10, 20, 30], 5);
        assert!(engine.indexed_ranks(100).is_empty());
    }

    #[test]
    fn test_search_mode() {
        let positioned =
            SourceRecord::from_lines(["RAJ 01:00:00", "DECJ +01:00:00", "P0 1"]).unwrap();
        assert_eq!(SearchMode::for_candidate(&positioned), SearchMode::Indexed);

        let zero = SourceRecord::from_lines(["RAJ 00:00:00", "DECJ 00:00:00", "P0 1"]).unwrap();
        assert_eq!(SearchMode::for_candidate(&zero), SearchMode::Exhaustive);

        let none = SourceRecord::from_lines(["P0 1"]).unwrap();
        assert_eq!(SearchMode::for_candidate(&none), SearchMode::Exhaustive);

        let engine = engine_with_keys(&[10, 20, 30], 0);
        assert_eq!(engine.comparison_set(&none), vec![0, 1, 2]);
    }
}
