//! # Sexagesimal coordinate codec
//!
//! Conversions between the colon-separated sexagesimal strings used by pulsar catalogs
//! (`HH:MM:SS.ss` for right ascension, `±DD:MM:SS.s` for declination) and numeric values,
//! plus the great-circle distance between two catalog positions.
//!
//! ## Overview
//! -----------------
//! * [`normalize_sexagesimal`] – right-pad a one- or two-field string to `H:M:S`.
//! * [`to_seconds`] – collapse a sexagesimal string into whole seconds, used to build the
//!   catalog [`SortKey`].
//! * [`ra_deg_to_hms`] / [`dec_deg_to_dms`] – render decimal degrees coming from candidate
//!   files as sexagesimal strings.
//! * [`angular_separation`] – separation in degrees between two positions, with two
//!   selectable formulas (see [`SeparationFormula`]).
//!
//! ## Sign handling
//! -----------------
//! [`to_seconds`] strips a leading `+`/`-` from the first field and never propagates it:
//! the sort key is an ordering device, not an angle. [`SeparationFormula::GreatCircle`]
//! applies the sign of the first field to the whole value, [`SeparationFormula::Legacy`]
//! only to the first field.
use std::{fmt, str::FromStr};

use nalgebra::Vector3;

use crate::{
    constants::{Degree, Radian, SortKey, HOUR_TO_DEG, RADEG, SECONDS_PER_HOUR, ZERO_POSITION},
    psrmatch_errors::PsrMatchError,
};

/// Largest magnitude accepted by [`to_seconds`], keeps the sum of two keys inside [`SortKey`].
const MAX_SECONDS: f64 = (SortKey::MAX / 4) as f64;

fn parse_field(field: &str, whole: &str) -> Result<f64, PsrMatchError> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PsrMatchError::InvalidSexagesimal(whole.to_string()))
}

/// Split a sexagesimal string into `(negative, [first, minutes, seconds])`.
///
/// Missing minute or second fields default to zero. The sign is removed from the first field.
fn split_sexagesimal(value: &str) -> Result<(bool, [f64; 3]), PsrMatchError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PsrMatchError::InvalidSexagesimal(value.to_string()));
    }

    let mut fields = trimmed.split(':');
    let first = fields.next().unwrap_or_default();
    let negative = first.starts_with('-');
    let first = parse_field(first.trim_start_matches(['+', '-']), value)?;

    let mut parsed = [first, 0.0, 0.0];
    for (slot, field) in parsed.iter_mut().skip(1).zip(fields.by_ref()) {
        *slot = parse_field(field, value)?;
    }
    if fields.next().is_some() {
        return Err(PsrMatchError::InvalidSexagesimal(value.to_string()));
    }

    Ok((negative, parsed))
}

/// Right-pad a sexagesimal string to exactly three colon-separated fields.
///
/// `"12"` becomes `"12:00:00"`, `"12:30"` becomes `"12:30:00"`, anything with three or more
/// fields is returned unchanged. Applying it twice is a no-op.
pub fn normalize_sexagesimal(value: &str) -> String {
    match value.split(':').count() {
        1 => format!("{value}:00:00"),
        2 => format!("{value}:00"),
        _ => value.to_string(),
    }
}

/// Convert a sexagesimal string `H:M:S` into whole seconds.
///
/// Computes `floor(h·3600 + m·60 + s)` where a leading sign on `h` is discarded. This is
/// the building block of the catalog sort key and is deliberately not an angle.
///
/// Arguments
/// -----------------
/// * `value`: a one-, two- or three-field sexagesimal string, e.g. `"-72:04:39.6911"`.
///
/// Return
/// ----------
/// * The number of seconds, or [`PsrMatchError::InvalidSexagesimal`] if a field is not a
///   finite number or the total does not fit a [`SortKey`].
pub fn to_seconds(value: &str) -> Result<SortKey, PsrMatchError> {
    let (_, [h, m, s]) = split_sexagesimal(value)?;
    let total = (h * SECONDS_PER_HOUR + m * 60.0 + s).floor();
    if total.abs() > MAX_SECONDS {
        return Err(PsrMatchError::InvalidSexagesimal(value.to_string()));
    }
    Ok(total as SortKey)
}

/// Signed decimal value of a sexagesimal string (hours for RA, degrees for DEC).
pub fn sexagesimal_to_decimal(value: &str) -> Result<f64, PsrMatchError> {
    let (negative, [h, m, s]) = split_sexagesimal(value)?;
    let magnitude = h + m / 60.0 + s / SECONDS_PER_HOUR;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Field-wise sum where only the first field carries the sign: `-72:04:00` gives `-71.933…`.
fn legacy_decimal(value: &str) -> Result<f64, PsrMatchError> {
    let (negative, [h, m, s]) = split_sexagesimal(value)?;
    let first = if negative { -h } else { h };
    Ok(first + m / 60.0 + s / SECONDS_PER_HOUR)
}

/// Render a right ascension in decimal degrees as `HH:MM:SS`.
///
/// The value is wrapped into `[0, 360)`, converted to hours (`× 24 / 360`) and each field is
/// truncated to an integer.
pub fn ra_deg_to_hms(ra: Degree) -> String {
    let hours = ra.rem_euclid(360.0) * 24.0 / 360.0;
    let h = hours.trunc();
    let minutes = (hours - h) * 60.0;
    let m = minutes.trunc();
    let s = ((minutes - m) * 60.0).trunc();
    format!("{:02}:{:02}:{:02}", h as u32, m as u32, s as u32)
}

/// Render a declination in decimal degrees as `±DD:MM:SS`.
///
/// Minutes and seconds are extracted from the absolute value and truncated to integers; the
/// sign is carried by the degree field only, including for `-1 < dec < 0`.
pub fn dec_deg_to_dms(dec: Degree) -> String {
    let sign = if dec.is_sign_negative() && dec != 0.0 {
        '-'
    } else {
        '+'
    };
    let abs = dec.abs();
    let d = abs.trunc();
    let minutes = (abs - d) * 60.0;
    let m = minutes.trunc();
    let s = ((minutes - m) * 60.0).trunc();
    format!("{sign}{:02}:{:02}:{:02}", d as u32, m as u32, s as u32)
}

/// `true` for the unsigned `00:00:00` placeholder used when a candidate has no usable
/// position. A signed `+00:00:00` is a real coordinate on the equator.
pub fn is_zero_position(value: &str) -> bool {
    value.trim() == ZERO_POSITION
}

/// Formula used by [`angular_separation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparationFormula {
    /// Great-circle distance `atan2(|a × b|, a · b)` between unit vectors, RA converted from
    /// hours to degrees. Stable for every separation.
    #[default]
    GreatCircle,
    /// Tangent formula kept for output compatibility with earlier match files: RA and DEC
    /// are both fed to the trigonometry as degrees, a negative `atan` result is shifted by
    /// `180°`, and only the first sexagesimal field is signed.
    Legacy,
}

impl fmt::Display for SeparationFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeparationFormula::GreatCircle => write!(f, "great_circle"),
            SeparationFormula::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for SeparationFormula {
    type Err = PsrMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "great_circle" | "greatcircle" | "vincenty" => Ok(SeparationFormula::GreatCircle),
            "legacy" => Ok(SeparationFormula::Legacy),
            other => Err(PsrMatchError::UnknownSeparationFormula(other.to_string())),
        }
    }
}

fn unit_vector(ra: Radian, dec: Radian) -> Vector3<f64> {
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

fn great_circle(ra1: &str, dec1: &str, ra2: &str, dec2: &str) -> Result<Degree, PsrMatchError> {
    let a = unit_vector(
        sexagesimal_to_decimal(ra1)? * HOUR_TO_DEG * RADEG,
        sexagesimal_to_decimal(dec1)? * RADEG,
    );
    let b = unit_vector(
        sexagesimal_to_decimal(ra2)? * HOUR_TO_DEG * RADEG,
        sexagesimal_to_decimal(dec2)? * RADEG,
    );
    Ok(a.cross(&b).norm().atan2(a.dot(&b)).to_degrees())
}

fn legacy(ra1: &str, dec1: &str, ra2: &str, dec2: &str) -> Result<Degree, PsrMatchError> {
    let r1 = legacy_decimal(ra1)? * RADEG;
    let d1 = legacy_decimal(dec1)? * RADEG;
    let r2 = legacy_decimal(ra2)? * RADEG;
    let d2 = legacy_decimal(dec2)? * RADEG;
    let dr = r2 - r1;

    let numerator = ((d2.cos() * dr.sin()).powi(2)
        + (d1.cos() * d2.sin() - d1.sin() * d2.cos() * dr.cos()).powi(2))
    .sqrt();
    let denominator = d1.sin() * d2.sin() + d1.cos() * d2.cos() * dr.cos();

    let theta = (numerator / denominator).atan().to_degrees();
    Ok(if theta < 0.0 { theta + 180.0 } else { theta })
}

/// Angular separation in degrees between two sexagesimal positions.
///
/// Arguments
/// -----------------
/// * `ra1`, `dec1`: first position (`H:M:S`, `±D:M:S`; two-field strings are accepted).
/// * `ra2`, `dec2`: second position.
/// * `formula`: see [`SeparationFormula`].
///
/// Return
/// ----------
/// * The separation in degrees, or [`PsrMatchError::InvalidSexagesimal`] if any string
///   cannot be parsed.
pub fn angular_separation(
    ra1: &str,
    dec1: &str,
    ra2: &str,
    dec2: &str,
    formula: SeparationFormula,
) -> Result<Degree, PsrMatchError> {
    match formula {
        SeparationFormula::GreatCircle => great_circle(ra1, dec1, ra2, dec2),
        SeparationFormula::Legacy => legacy(ra1, dec1, ra2, dec2),
    }
}
