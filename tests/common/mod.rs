#![allow(dead_code)]

use camino::Utf8Path;
use psrmatch::{
    catalog::Catalog, matcher::MatchEngine, settings::MatchSettings, source::SourceRecord,
};

pub const PLAIN_CATALOG: &str = "tests/data/psrcat_sample.db";
pub const WEB_CATALOG: &str = "tests/data/psrcat_web.txt";
pub const CANDIDATES: &str = "tests/data/candidates.csv";
pub const SETTINGS: &str = "tests/data/settings.txt";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

pub fn sample_catalog() -> Catalog {
    Catalog::from_path(Utf8Path::new(PLAIN_CATALOG)).unwrap()
}

pub fn engine(catalog: &str, settings: MatchSettings) -> MatchEngine {
    MatchEngine::new(catalog.parse().unwrap(), settings)
}

pub fn candidate(lines: &[&str]) -> SourceRecord {
    SourceRecord::from_lines(lines.iter().copied()).unwrap()
}
