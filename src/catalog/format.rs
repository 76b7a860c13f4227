use std::fmt;

use crate::{constants::PLAIN_CATALOG_SIGNATURE, psrmatch_errors::PsrMatchError};

/// On-disk layouts understood by [`crate::catalog::Catalog::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// `KEY value [error] [ref]` lines, sources separated by `@---` lines, `#` comments.
    Plain,
    /// "Long with errors" table exported from the catalogue web form, framed by `---` rules.
    WebExport,
}

impl CatalogFormat {
    /// Detect the layout from the first non-blank line of a catalog file.
    ///
    /// Return
    /// ----------
    /// * [`CatalogFormat::Plain`] if the line starts with `#CATALOGUE`,
    ///   [`CatalogFormat::WebExport`] if it starts with `-`, otherwise
    ///   [`PsrMatchError::UnrecognisedCatalogFormat`] carrying the offending line.
    pub fn detect(content: &str) -> Result<Self, PsrMatchError> {
        let first = content
            .lines()
            .map(str::trim_end)
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();

        if first.starts_with(PLAIN_CATALOG_SIGNATURE) {
            Ok(CatalogFormat::Plain)
        } else if first.starts_with('-') {
            Ok(CatalogFormat::WebExport)
        } else {
            Err(PsrMatchError::UnrecognisedCatalogFormat(first.to_string()))
        }
    }
}

impl fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogFormat::Plain => write!(f, "plain catalogue"),
            CatalogFormat::WebExport => write!(f, "web export"),
        }
    }
}

#[cfg(test)]
mod format_test {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(
            CatalogFormat::detect("\n#CATALOGUE 1.54\nPSRJ J0000+0000\n"),
            Ok(CatalogFormat::Plain)
        );
        assert_eq!(
            CatalogFormat::detect("-----------\n#  NAME  RAJ\n"),
            Ok(CatalogFormat::WebExport)
        );
        assert_eq!(
            CatalogFormat::detect("PSRJ J0000+0000"),
            Err(PsrMatchError::UnrecognisedCatalogFormat(
                "PSRJ J0000+0000".into()
            ))
        );
        assert_eq!(
            CatalogFormat::detect("   \n"),
            Err(PsrMatchError::UnrecognisedCatalogFormat(String::new()))
        );
    }
}
