//! # Constants and type definitions for psrmatch
//!
//! This module centralizes the **sentinels**, **default tuning values**, and **common type
//! aliases** used by the catalog parser and the match engine.
//!
//! ## Overview
//!
//! - Unit conversions (hours ↔ degrees, degrees ↔ radians)
//! - Sentinel strings used by pulsar catalogs (`*` for a missing value, `00:00:00` for an
//!   unknown candidate position)
//! - Defaults for the matching tolerances (see [`crate::settings::MatchSettings`])
//! - The canonical list of harmonic denominators

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Hours of right ascension → degrees
pub const HOUR_TO_DEG: f64 = 15.0;

/// Seconds in one hour (or arcseconds in one degree)
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Period in seconds
pub type Second = f64;
/// Derived ordering key of a source, `to_seconds(RAJ) + to_seconds(DECJ)`.
///
/// It carries no physical meaning, it only puts angularly close sources next to each other
/// most of the time.
pub type SortKey = i64;

// -------------------------------------------------------------------------------------------------
// Sentinels
// -------------------------------------------------------------------------------------------------

/// Name given to a source until a `PSRJ` or `PSRB` line is seen.
pub const UNKNOWN_SOURCE_NAME: &str = "unknown";

/// Placeholder used by pulsar catalogs for a missing value.
pub const MISSING_VALUE: &str = "*";

/// Candidate position meaning "position not provided".
pub const ZERO_POSITION: &str = "00:00:00";

/// Text rendered in place of the angular separation when the position criterion was skipped.
pub const UNSPECIFIED_SEPARATION: &str = "unspecified";

/// First token of a plain catalog file.
pub const PLAIN_CATALOG_SIGNATURE: &str = "#CATALOGUE";

// -------------------------------------------------------------------------------------------------
// Matching defaults
// -------------------------------------------------------------------------------------------------

/// Period tolerance, in percent of the candidate period.
pub const DEFAULT_ACCURACY: f64 = 0.5;

/// DM tolerance, in percent of the candidate DM.
pub const DEFAULT_DM_ACCURACY: f64 = 5.0;

/// Maximum angular separation accepted for a match.
pub const DEFAULT_RADIUS: Degree = 0.5;

/// Half width of the sort-key window explored around the seed position.
pub const DEFAULT_SEARCH_PADDING: SortKey = 3600;

/// Harmonic denominators `n` tried by the comparison predicate, each standing for a ratio `1/n`.
pub const DEFAULT_HARMONICS: [u32; 17] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 32];
