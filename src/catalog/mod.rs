//! # Known-source catalog
//!
//! Loading and querying the reference list of known pulsars.
//!
//! ## Overview
//! -----------------
//! A [`Catalog`] is built once, from either of the two layouts described by
//! [`CatalogFormat`], and is read-only afterwards. Every record is completed by
//! [`SourceRecord::finalize`] while the file is read, so derived periods are available without
//! any mutation on the matching path.
//!
//! Sources are stored in ascending [`SortKey`] order (ties broken by name). The rank of a
//! source in that order is the positional index walked by the match engine.
//!
//! ## Example
//! -----------------
//! ```rust
//! use psrmatch::catalog::Catalog;
//!
//! let catalog: Catalog = "#CATALOGUE\n\
//!     PSRJ J0000+0010\nRAJ 00:00:00\nDECJ +00:10:00\nP0 1.0\n@---\n\
//!     PSRJ J0000+0001\nRAJ 00:00:00\nDECJ +00:01:00\nP0 2.0\n"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.name_at(0), Some("J0000+0001"));
//! assert_eq!(catalog.sort_key_at(1), Some(600));
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::matcher::MatchEngine`] – Candidate matching over a catalog.
mod display;
mod format;
mod plain_reader;
mod web_reader;

pub use format::CatalogFormat;

use std::{collections::HashMap, fs, str::FromStr};

use ahash::RandomState;
use camino::Utf8Path;
use itertools::Itertools;
use tracing::info;

use crate::{
    constants::{Second, SortKey},
    matcher::predicate::{harmonic_matches, within_tolerance},
    psrmatch_errors::PsrMatchError,
    source::SourceRecord,
};

/// Diagnostics collected while a catalog is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Number of distinct sources kept.
    pub total: usize,
    /// Sources without a `RAJ` parameter.
    pub missing_raj: usize,
    /// Sources whose `P0` was derived from `F0`.
    pub derived_periods: usize,
    /// Records dropped because a later record had the same name.
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    sources: Vec<SourceRecord>,
    by_name: HashMap<String, usize, RandomState>,
    positionless: Vec<usize>,
    stats: CatalogStats,
    format: Option<CatalogFormat>,
}

impl Catalog {
    /// Read a catalog file, detecting its layout.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: path to a plain catalogue or a web-export table.
    ///
    /// Return
    /// ----------
    /// * The catalog, or an error if the file cannot be read, has no recognised signature,
    ///   or yields no source at all.
    pub fn from_path(path: &Utf8Path) -> Result<Self, PsrMatchError> {
        let content = fs::read_to_string(path)?;
        Self::parse_named(&content, path.as_str())
    }

    /// Parse catalog content held in memory.
    pub fn parse(content: &str) -> Result<Self, PsrMatchError> {
        Self::parse_named(content, "<memory>")
    }

    fn parse_named(content: &str, origin: &str) -> Result<Self, PsrMatchError> {
        let format = CatalogFormat::detect(content)?;
        let records = match format {
            CatalogFormat::Plain => plain_reader::read_plain(content),
            CatalogFormat::WebExport => web_reader::read_web_export(content),
        };

        let mut catalog = Self::build(records, origin)?;
        catalog.format = Some(format);

        info!(
            origin,
            %format,
            sources = catalog.stats.total,
            missing_raj = catalog.stats.missing_raj,
            derived_periods = catalog.stats.derived_periods,
            duplicates = catalog.stats.duplicates,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from already assembled records.
    ///
    /// Records are finalized, de-duplicated by name (the last one wins) and sorted.
    pub fn from_records(records: Vec<SourceRecord>) -> Result<Self, PsrMatchError> {
        let records = records
            .into_iter()
            .map(|mut record| {
                record.finalize();
                record
            })
            .collect();
        Self::build(records, "<records>")
    }

    fn build(records: Vec<SourceRecord>, origin: &str) -> Result<Self, PsrMatchError> {
        let read = records.len();
        let mut unique: HashMap<String, SourceRecord, RandomState> = HashMap::default();
        for record in records {
            unique.insert(record.name().to_string(), record);
        }

        if unique.is_empty() {
            return Err(PsrMatchError::EmptyCatalog(origin.to_string()));
        }

        let sources: Vec<SourceRecord> = unique
            .into_values()
            .sorted_by(|a, b| {
                a.sort_key()
                    .cmp(&b.sort_key())
                    .then_with(|| a.name().cmp(b.name()))
            })
            .collect();

        let by_name = sources
            .iter()
            .enumerate()
            .map(|(rank, record)| (record.name().to_string(), rank))
            .collect();

        let positionless = sources
            .iter()
            .positions(|record| !record.has_position())
            .collect();

        let stats = CatalogStats {
            total: sources.len(),
            missing_raj: sources.iter().filter(|r| r.raj().is_none()).count(),
            derived_periods: sources.iter().filter(|r| r.period_is_derived()).count(),
            duplicates: read - sources.len(),
        };

        Ok(Catalog {
            sources,
            by_name,
            positionless,
            stats,
            format: None,
        })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source at `rank` in sort-key order.
    pub fn get(&self, rank: usize) -> Option<&SourceRecord> {
        self.sources.get(rank)
    }

    pub fn name_at(&self, rank: usize) -> Option<&str> {
        self.get(rank).map(SourceRecord::name)
    }

    pub fn sort_key_at(&self, rank: usize) -> Option<SortKey> {
        self.get(rank).map(SourceRecord::sort_key)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SourceRecord> {
        self.rank_of(name).and_then(|rank| self.get(rank))
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Sources in sort-key order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceRecord> {
        self.sources.iter()
    }

    /// Ranks of the sources lacking `RAJ` or `DECJ`.
    pub fn positionless(&self) -> &[usize] {
        &self.positionless
    }

    pub fn stats(&self) -> CatalogStats {
        self.stats
    }

    /// Layout the catalog was read from, `None` when built with [`Catalog::from_records`].
    pub fn format(&self) -> Option<CatalogFormat> {
        self.format
    }

    /// Sources whose period, or one of its harmonics, is close to `period`.
    ///
    /// Arguments
    /// -----------------
    /// * `period`: period to look for, in seconds.
    /// * `accuracy`: tolerance in percent of `period`.
    /// * `harmonics`: denominators `n` to try, each standing for a catalog period divided by `n`.
    ///
    /// Return
    /// ----------
    /// * Every `(source, n)` pair satisfying the window, in catalog order. A source may appear
    ///   once per matching harmonic.
    pub fn search_by_period(
        &self,
        period: Second,
        accuracy: f64,
        harmonics: &[u32],
    ) -> Vec<(&SourceRecord, u32)> {
        self.sources
            .iter()
            .filter_map(|record| record.period().map(|p| (record, p)))
            .flat_map(|(record, catalog_period)| {
                harmonics
                    .iter()
                    .filter(move |&&n| harmonic_matches(catalog_period, period, accuracy, n))
                    .map(move |&n| (record, n))
            })
            .collect()
    }

    /// Sources whose DM lies within `accuracy` percent of `dm`.
    pub fn search_by_dm(&self, dm: f64, accuracy: f64) -> Vec<&SourceRecord> {
        let tolerance = accuracy / 100.0 * dm;
        self.sources
            .iter()
            .filter(|record| {
                record
                    .dm()
                    .is_some_and(|catalog_dm| within_tolerance(catalog_dm, dm, tolerance))
            })
            .collect()
    }
}

impl FromStr for Catalog {
    type Err = PsrMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Catalog::parse(s)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a SourceRecord;
    type IntoIter = std::slice::Iter<'a, SourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;

    fn plain() -> &'static str {
        "#CATALOGUE 1.54
PSRJ     J0100+0000
RAJ      01:00:00
DECJ     +00:00:00
P0       1.0
DM       20
@-----------------------------------------------------------------
PSRJ     J0000+0000
RAJ      00:00:00
DECJ     +00:00:00
F0       4.0
@-----------------------------------------------------------------
PSRJ     J9999
P0       0.3
DM       *
@-----------------------------------------------------------------
PSRJ     J0100+0000
RAJ      01:00:00
DECJ     +00:00:00
P0       1.0
DM       21
"
    }

    #[test]
    fn test_parse_plain() {
        let catalog = Catalog::parse(plain()).unwrap();
        assert_eq!(catalog.format(), Some(CatalogFormat::Plain));
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.stats(),
            CatalogStats {
                total: 3,
                missing_raj: 1,
                derived_periods: 1,
                duplicates: 1,
            }
        );

        // positionless source has key 0 and sorts by name among key-0 sources
        assert_eq!(catalog.name_at(0), Some("J0000+0000"));
        assert_eq!(catalog.name_at(1), Some("J9999"));
        assert_eq!(catalog.name_at(2), Some("J0100+0000"));
        assert_eq!(catalog.positionless(), &[1]);

        // last duplicate wins
        assert_eq!(catalog.get_by_name("J0100+0000").unwrap().dm(), Some(21.0));
        assert_eq!(catalog.rank_of("J0100+0000"), Some(2));
        assert!(catalog.get_by_name("J1234+5678").is_none());
    }

    #[test]
    fn test_sorted_by_key() {
        let catalog = Catalog::parse(plain()).unwrap();
        assert!(catalog
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.sort_key() <= b.sort_key()));
    }

    #[test]
    fn test_empty_catalog() {
        assert_eq!(
            Catalog::parse("#CATALOGUE\n# nothing here\n").unwrap_err(),
            PsrMatchError::EmptyCatalog("<memory>".into())
        );
        assert_eq!(
            Catalog::from_records(vec![]).unwrap_err(),
            PsrMatchError::EmptyCatalog("<records>".into())
        );
    }

    #[test]
    fn test_search_by_period() {
        let catalog = Catalog::parse(plain()).unwrap();

        let hits = catalog.search_by_period(0.5003, 0.5, &[1, 2, 4]);
        let names: Vec<_> = hits.iter().map(|(r, n)| (r.name(), *n)).collect();
        assert_eq!(names, vec![("J0100+0000", 2)]);

        let hits = catalog.search_by_period(0.25, 0.5, &[1, 2, 4]);
        let names: Vec<_> = hits.iter().map(|(r, n)| (r.name(), *n)).collect();
        assert_eq!(names, vec![("J0000+0000", 1), ("J0100+0000", 4)]);

        assert!(catalog.search_by_period(0.51, 0.5, &[1, 2]).is_empty());
    }

    #[test]
    fn test_search_by_dm() {
        let catalog = Catalog::parse(plain()).unwrap();
        let hits: Vec<_> = catalog
            .search_by_dm(20.0, 10.0)
            .into_iter()
            .map(SourceRecord::name)
            .collect();
        assert_eq!(hits, vec!["J0100+0000"]);
        assert!(catalog.search_by_dm(30.0, 5.0).is_empty());
    }
}
