use std::{fmt, str::FromStr};

use smallvec::SmallVec;

/// Raw sub-values reported for one catalog parameter: the value itself, usually followed by
/// its uncertainty and a provenance tag (`"13.9", "1", "snt97"`).
pub type Parameter = SmallVec<[String; 3]>;

/// Parameter keys the matcher understands.
///
/// Any other key found in a catalog is kept verbatim under [`ParameterKey::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    /// J2000 name, e.g. `J0437-4715`
    PsrJ,
    /// B1950 name, e.g. `B0021-72G`
    PsrB,
    /// Right ascension (J2000), `HH:MM:SS.s`
    RaJ,
    /// Declination (J2000), `±DD:MM:SS.s`
    DecJ,
    /// Barycentric period in seconds
    P0,
    /// Barycentric spin frequency in Hz
    F0,
    /// Dispersion measure in cm^-3 pc
    Dm,
    /// Detection signal-to-noise ratio (candidates only)
    Snr,
    Other(String),
}

impl ParameterKey {
    pub fn as_str(&self) -> &str {
        match self {
            ParameterKey::PsrJ => "PSRJ",
            ParameterKey::PsrB => "PSRB",
            ParameterKey::RaJ => "RAJ",
            ParameterKey::DecJ => "DECJ",
            ParameterKey::P0 => "P0",
            ParameterKey::F0 => "F0",
            ParameterKey::Dm => "DM",
            ParameterKey::Snr => "SNR",
            ParameterKey::Other(key) => key,
        }
    }
}

impl FromStr for ParameterKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "PSRJ" => ParameterKey::PsrJ,
            "PSRB" => ParameterKey::PsrB,
            "RAJ" => ParameterKey::RaJ,
            "DECJ" => ParameterKey::DecJ,
            "P0" => ParameterKey::P0,
            "F0" => ParameterKey::F0,
            "DM" => ParameterKey::Dm,
            "SNR" => ParameterKey::Snr,
            other => ParameterKey::Other(other.to_string()),
        })
    }
}

impl From<&str> for ParameterKey {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
