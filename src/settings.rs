//! # Match settings
//!
//! Tolerances and search parameters of the [`crate::matcher::MatchEngine`].
//!
//! ## Overview
//! -----------------
//! [`MatchSettings`] can be obtained in three ways:
//!
//! * [`MatchSettings::default`] – accuracy `0.5 %`, DM accuracy `5 %`, radius `0.5°`,
//!   search padding `3600`, harmonics `1..=16` and `32`, great-circle separation.
//! * [`MatchSettings::builder`] – fluent builder with validation.
//! * [`MatchSettings::from_file`] / [`str::parse`] – a `key = value` text file.
//!
//! ## Settings file
//! -----------------
//! ```text
//! # tolerances in percent of the candidate value
//! accuracy    = 0.5
//! dm_accuracy = 5
//! radius      = 0.5          # degrees
//! padding     = 3600
//! harmonics   = 1, 2, 3, 4, 8, 16
//! separation  = great_circle # or legacy
//! ```
//!
//! Blank lines and `#` comments are ignored, missing keys keep their default value, unknown
//! keys are rejected.
use std::{fmt, fs, str::FromStr};

use camino::Utf8Path;
use itertools::Itertools;
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, i64 as parse_i64, space0, u32 as parse_u32},
    combinator::{all_consuming, rest},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

use crate::{
    constants::{
        Degree, SortKey, DEFAULT_ACCURACY, DEFAULT_DM_ACCURACY, DEFAULT_HARMONICS,
        DEFAULT_RADIUS, DEFAULT_SEARCH_PADDING,
    },
    conversion::SeparationFormula,
    psrmatch_errors::PsrMatchError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    /// Period tolerance, in percent of the candidate period.
    pub accuracy: f64,
    /// DM tolerance, in percent of the candidate DM. `0` disables the DM criterion.
    pub dm_accuracy: f64,
    /// Largest angular separation accepted for a match, in degrees.
    pub radius: Degree,
    /// Half width of the sort-key window searched around a candidate.
    pub search_padding: SortKey,
    /// Harmonic denominators, sorted ascending and without duplicates.
    pub harmonics: Vec<u32>,
    pub separation: SeparationFormula,
}

impl Default for MatchSettings {
    fn default() -> Self {
        MatchSettings {
            accuracy: DEFAULT_ACCURACY,
            dm_accuracy: DEFAULT_DM_ACCURACY,
            radius: DEFAULT_RADIUS,
            search_padding: DEFAULT_SEARCH_PADDING,
            harmonics: DEFAULT_HARMONICS.to_vec(),
            separation: SeparationFormula::default(),
        }
    }
}

impl MatchSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`MatchSettingsBuilder`] starting from the default values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use psrmatch::settings::MatchSettings;
    ///
    /// let settings = MatchSettings::builder()
    ///     .accuracy(1.0)
    ///     .radius(2.0)
    ///     .harmonics([4, 1, 2, 2])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(settings.harmonics, vec![1, 2, 4]);
    /// ```
    pub fn builder() -> MatchSettingsBuilder {
        MatchSettingsBuilder::new()
    }

    /// Read settings from a `key = value` file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: the settings file.
    ///
    /// Return
    /// ----------
    /// * The validated settings, [`PsrMatchError::IoError`] if the file cannot be read or
    ///   [`PsrMatchError::InvalidSettings`] for a malformed line, an unknown key or an out of
    ///   range value.
    pub fn from_file(path: &Utf8Path) -> Result<Self, PsrMatchError> {
        fs::read_to_string(path)?.parse()
    }
}

impl FromStr for MatchSettings {
    type Err = PsrMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = MatchSettings::builder();

        for (line_number, raw) in s.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let invalid =
                || PsrMatchError::InvalidSettings(format!("line {}: {raw:?}", line_number + 1));

            let (_, (key, value)) = parse_key_value(line).map_err(|_| invalid())?;
            let value = value.trim();

            builder = match key {
                "accuracy" => builder.accuracy(parse_number(value).map_err(|_| invalid())?.1),
                "dm_accuracy" => {
                    builder.dm_accuracy(parse_number(value).map_err(|_| invalid())?.1)
                }
                "radius" => builder.radius(parse_number(value).map_err(|_| invalid())?.1),
                "padding" => {
                    builder.search_padding(parse_padding(value).map_err(|_| invalid())?.1)
                }
                "harmonics" => builder.harmonics(parse_harmonics(value).map_err(|_| invalid())?.1),
                "separation" => builder.separation(value.parse()?),
                other => {
                    return Err(PsrMatchError::InvalidSettings(format!(
                        "line {}: unknown key {other:?}",
                        line_number + 1
                    )))
                }
            };
        }

        builder.build()
    }
}

impl fmt::Display for MatchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "accuracy = {}", self.accuracy)?;
        writeln!(f, "dm_accuracy = {}", self.dm_accuracy)?;
        writeln!(f, "radius = {}", self.radius)?;
        writeln!(f, "padding = {}", self.search_padding)?;
        writeln!(f, "harmonics = {}", self.harmonics.iter().join(", "))?;
        writeln!(f, "separation = {}", self.separation)
    }
}

fn parse_key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(space0, take_while1(|c: char| c.is_alphanumeric() || c == '_')),
        delimited(space0, char('='), space0),
        rest,
    )
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, f64> {
    all_consuming(double).parse(input)
}

fn parse_padding(input: &str) -> IResult<&str, i64> {
    all_consuming(parse_i64).parse(input)
}

fn parse_harmonics(input: &str) -> IResult<&str, Vec<u32>> {
    all_consuming(separated_list1(
        delimited(space0, char(','), space0),
        parse_u32,
    ))
    .parse(input)
}

/// Builder for [`MatchSettings`], with validation.
#[derive(Debug, Clone)]
pub struct MatchSettingsBuilder {
    settings: MatchSettings,
}

impl Default for MatchSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: MatchSettings::default(),
        }
    }

    pub fn accuracy(mut self, v: f64) -> Self {
        self.settings.accuracy = v;
        self
    }
    pub fn dm_accuracy(mut self, v: f64) -> Self {
        self.settings.dm_accuracy = v;
        self
    }
    pub fn radius(mut self, v: Degree) -> Self {
        self.settings.radius = v;
        self
    }
    pub fn search_padding(mut self, v: SortKey) -> Self {
        self.settings.search_padding = v;
        self
    }
    pub fn harmonics(mut self, v: impl IntoIterator<Item = u32>) -> Self {
        self.settings.harmonics = v.into_iter().collect();
        self
    }
    pub fn separation(mut self, v: SeparationFormula) -> Self {
        self.settings.separation = v;
        self
    }

    fn ge0(v: f64) -> bool {
        v.is_finite() && v >= 0.0
    }

    /// Validate and return the settings.
    ///
    /// Rules
    /// -----------------
    /// * `accuracy` and `dm_accuracy` are finite and non-negative.
    /// * `radius` is finite and strictly positive.
    /// * `search_padding` is non-negative.
    /// * `harmonics` is non-empty and holds no zero. It is sorted and de-duplicated.
    pub fn build(self) -> Result<MatchSettings, PsrMatchError> {
        let mut settings = self.settings;

        if !Self::ge0(settings.accuracy) {
            return Err(PsrMatchError::InvalidSettings(
                "accuracy must be a non-negative percentage".into(),
            ));
        }
        if !Self::ge0(settings.dm_accuracy) {
            return Err(PsrMatchError::InvalidSettings(
                "dm_accuracy must be a non-negative percentage".into(),
            ));
        }
        if !Self::ge0(settings.radius) || settings.radius == 0.0 {
            return Err(PsrMatchError::InvalidSettings(
                "radius must be > 0 degrees".into(),
            ));
        }
        if settings.search_padding < 0 {
            return Err(PsrMatchError::InvalidSettings(
                "padding must be >= 0".into(),
            ));
        }
        if settings.harmonics.is_empty() || settings.harmonics.contains(&0) {
            return Err(PsrMatchError::InvalidSettings(
                "harmonics must be a non-empty list of positive integers".into(),
            ));
        }

        settings.harmonics.sort_unstable();
        settings.harmonics.dedup();
        Ok(settings)
    }
}
