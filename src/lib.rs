//! # psrmatch
//!
//! Match pulsar search candidates against a catalog of known pulsars.
//!
//! A candidate matches a known source when its period is close to the known period or to one
//! of its harmonics, its dispersion measure (DM) is compatible, and it lies close enough on
//! the sky. Catalog lookups use a sort key derived from the position so that only the
//! neighbourhood of a candidate is compared.
//!
//! ## Modules
//! -----------------
//! * [`catalog`] – catalog loading (plain and web-export layouts) and queries.
//! * [`source`] – the per-source parameter record.
//! * [`candidate`] – candidate descriptions and CSV candidate lists.
//! * [`matcher`] – the match engine and its comparison predicate.
//! * [`recorder`] – text and CSV output of the results.
//! * [`settings`] – tolerances, search padding and harmonic list.
//! * [`conversion`] – sexagesimal codec and angular separation.
//! * [`validation`] – catalog self-consistency check.
//!
//! ## Quick start
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use psrmatch::{
//!     candidate::read_candidates_csv, catalog::Catalog, matcher::MatchEngine,
//!     recorder::MatchRecorder, settings::MatchSettings,
//! };
//!
//! let catalog = Catalog::from_path(Utf8Path::new("psrcat.db"))?;
//! let engine = MatchEngine::new(catalog, MatchSettings::default());
//!
//! let candidates = read_candidates_csv(Utf8Path::new("candidates.csv"))?;
//! let mut recorder = MatchRecorder::open(Utf8Path::new("matches.txt"))?;
//! let summary = engine.match_all(&candidates, &mut recorder)?;
//! println!("{} possible matches", summary.matches);
//! # Ok::<(), psrmatch::psrmatch_errors::PsrMatchError>(())
//! ```
pub mod candidate;
pub mod catalog;
pub mod constants;
pub mod conversion;
pub mod matcher;
pub mod psrmatch_errors;
pub mod recorder;
pub mod settings;
pub mod source;
pub mod validation;
