use std::env;

use camino::{Utf8Path, Utf8PathBuf};
use psrmatch::{
    candidate::read_candidates_csv,
    catalog::Catalog,
    matcher::MatchEngine,
    psrmatch_errors::PsrMatchError,
    recorder::{MatchRecorder, MatchSink},
    settings::MatchSettings,
    validation::self_consistency,
};

/// Match a candidate list against a pulsar catalog and append the results to disk.
///
/// Usage:
///   match_candidates <CATALOG> <CANDIDATES.csv> [OUTPUT.txt] [--settings FILE] [--table] [--check]
/// Example:
///   match_candidates tests/data/psrcat_sample.db tests/data/candidates.csv matches.txt --table
///
/// The CSV output is written next to the text output, with a `.csv` extension.
/// Log verbosity follows `RUST_LOG` (default `info`).
fn main() -> Result<(), PsrMatchError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let mut take_flag = |flag: &str| {
        let pos = args.iter().position(|a| a == flag);
        pos.map(|pos| args.remove(pos)).is_some()
    };
    let show_table = take_flag("--table");
    let check = take_flag("--check");

    let settings = match args.iter().position(|a| a == "--settings") {
        Some(pos) if pos + 1 < args.len() => {
            let path = args.remove(pos + 1);
            args.remove(pos);
            MatchSettings::from_file(Utf8Path::new(&path))?
        }
        _ => MatchSettings::default(),
    };

    let catalog_path = args
        .first()
        .cloned()
        .unwrap_or_else(|| "tests/data/psrcat_sample.db".to_string());
    let candidates_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "tests/data/candidates.csv".to_string());
    let output = Utf8PathBuf::from(
        args.get(2)
            .cloned()
            .unwrap_or_else(|| "matches.txt".to_string()),
    );

    let catalog = Catalog::from_path(Utf8Path::new(&catalog_path))?;
    if show_table {
        println!("{}", catalog.table());
    }

    println!("{settings}");
    let engine = MatchEngine::new(catalog, settings);

    if check {
        let report = self_consistency(&engine);
        eprintln!(
            "[match_candidates] self-consistency: {}/{} catalog sources match themselves",
            report.self_matched, report.checked
        );
    }

    let candidates = read_candidates_csv(Utf8Path::new(&candidates_path))?;
    let mut recorder = MatchRecorder::open(&output)?;
    let summary = engine.match_all(&candidates, &mut recorder)?;

    eprintln!(
        "[match_candidates] {} candidates, {} possible matches -> {} / {}",
        summary.candidates,
        recorder.possible_matches(),
        output,
        output.with_extension("csv")
    );
    Ok(())
}
