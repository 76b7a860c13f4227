use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsrMatchError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV read/write error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Catalog file has neither a plain catalog nor a tabular export signature: {0}")]
    UnrecognisedCatalogFormat(String),

    #[error("No source could be read from the catalog: {0}")]
    EmptyCatalog(String),

    #[error("Invalid parameter line: {0:?}")]
    InvalidParameterLine(String),

    #[error("Invalid sexagesimal value: {0:?}")]
    InvalidSexagesimal(String),

    #[error("Invalid numeric value: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown angular separation formula: {0}")]
    UnknownSeparationFormula(String),

    #[error("Text and CSV match outputs resolve to the same file: {0}")]
    OutputPathClash(String),
}

impl PartialEq for PsrMatchError {
    fn eq(&self, other: &Self) -> bool {
        use PsrMatchError::*;
        match (self, other) {
            // not comparable, same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (UnrecognisedCatalogFormat(a), UnrecognisedCatalogFormat(b)) => a == b,
            (EmptyCatalog(a), EmptyCatalog(b)) => a == b,
            (InvalidParameterLine(a), InvalidParameterLine(b)) => a == b,
            (InvalidSexagesimal(a), InvalidSexagesimal(b)) => a == b,
            (InvalidNumber(a), InvalidNumber(b)) => a == b,
            (InvalidSettings(a), InvalidSettings(b)) => a == b,
            (UnknownSeparationFormula(a), UnknownSeparationFormula(b)) => a == b,
            (OutputPathClash(a), OutputPathClash(b)) => a == b,

            _ => false,
        }
    }
}
