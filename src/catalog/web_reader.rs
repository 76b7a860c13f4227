//! Reader for the "Long with errors" table exported by the pulsar catalogue web form.
//!
//! ```text
//! ---------------------------------------------------------------------------------------
//! #     NAME         RAJ                       DECJ                      P0          ...
//!                    (hms)                     (dms)                     (s)         ...
//! ---------------------------------------------------------------------------------------
//! 1     J0006+1834   00:06:04.8       2.0e-01  +18:34:59        4.0e+00  0.69374767047 ...
//! ```
//!
//! Column mapping
//! -----------------
//! Header names and row tokens do not line up: from the third column on, every value is
//! followed by its uncertainty. A header declared at index `i > 2` therefore reads its value
//! at token `(i - 1) * 2` and its uncertainty at the next token.
use std::sync::LazyLock;

use regex::Regex;
use smallvec::smallvec;
use tracing::warn;

use super::plain_reader::flush;
use crate::source::{ParameterKey, SourceRecord};

/// J2000 designation: `J` followed by four digits of RA and a signed declination.
static J_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^J\d{4}[+-]\d{2}").expect("valid J-name pattern"));

/// Token position of the value of every header column.
fn column_indices(header: &str) -> Vec<(String, usize)> {
    header
        .split_whitespace()
        .enumerate()
        .filter(|(_, name)| *name != "#")
        .map(|(i, name)| {
            let index = if i > 2 { (i - 1) * 2 } else { i };
            (name.to_string(), index)
        })
        .collect()
}

fn read_row(columns: &[(String, usize)], tokens: &[&str], line_number: usize) -> SourceRecord {
    let mut record = SourceRecord::new();

    for (column, index) in columns {
        let Some(value) = tokens.get(*index) else {
            warn!(line = line_number, %column, "missing column value");
            continue;
        };

        if column == "NAME" {
            let key = if J_NAME.is_match(value) {
                ParameterKey::PsrJ
            } else {
                ParameterKey::PsrB
            };
            record.set_parameter(key, smallvec![value.to_string(), "0".into(), "0".into()]);
            continue;
        }

        let Some(error) = tokens.get(index + 1) else {
            warn!(line = line_number, %column, "missing column uncertainty");
            continue;
        };
        record.set_parameter(
            column.as_str().into(),
            smallvec![value.to_string(), error.to_string(), "0".into()],
        );
    }

    record
}

/// Read every source of a web-export table.
///
/// Rule lines (`-`), unit lines and blank lines (starting with whitespace) are skipped. The
/// `#` header line defines the columns; each following row becomes one source.
pub(super) fn read_web_export(content: &str) -> Vec<SourceRecord> {
    let mut records = Vec::new();
    let mut columns: Vec<(String, usize)> = Vec::new();

    for (line_number, line) in content.lines().enumerate() {
        let line_number = line_number + 1;
        match line.chars().next() {
            None | Some('-') => continue,
            Some(c) if c.is_whitespace() => continue,
            Some('#') => {
                columns = column_indices(line);
                continue;
            }
            Some(_) => {}
        }

        if columns.is_empty() {
            warn!(line = line_number, "row found before the column header, skipped");
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut record = read_row(&columns, &tokens, line_number);
        flush(&mut record, &mut records);
    }

    records
}
