//! Reader for the plain catalogue layout.
//!
//! ```text
//! #CATALOGUE 1.54
//! PSRJ     J0007+7303                    aaa+09c
//! RAJ      00:07:01.7               2    awd+12
//! DECJ     +73:03:07.4              8    awd+12
//! F0       3.165827392              3    awd+12
//! @-----------------------------------------------------------------
//! PSRB     B0021-72G                     rlm+95
//! ...
//! ```
use tracing::warn;

use crate::source::SourceRecord;

/// Move the record being built into `records`, completing it first.
pub(super) fn flush(current: &mut SourceRecord, records: &mut Vec<SourceRecord>) {
    if current.is_empty() {
        return;
    }
    let mut record = std::mem::take(current);
    record.finalize();
    records.push(record);
}

/// Read every source of a plain catalogue.
///
/// Lines starting with `#` are comments, a line starting with `@` closes the current source,
/// every other non-blank line is a parameter line. A source still open at end of input is kept.
pub(super) fn read_plain(content: &str) -> Vec<SourceRecord> {
    let mut records = Vec::new();
    let mut current = SourceRecord::new();

    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('@') {
            flush(&mut current, &mut records);
            continue;
        }
        if let Err(err) = current.add_parameter(line) {
            warn!(line = line_number + 1, %err, "parameter line skipped");
        }
    }
    flush(&mut current, &mut records);

    records
}
