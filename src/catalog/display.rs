//! # Tabular display for catalogs
//!
//! Two renderings of a [`Catalog`]:
//!
//! - **Compact** (`{}`): one [`SourceRecord::short_form`] line per source, in catalog order.
//! - **Table** ([`Catalog::table`]): a [`comfy-table`] listing with rank, name, position,
//!   period, DM and sort key. Derived periods are flagged with `(F0)`.
//!
//! [`comfy-table`]: https://crates.io/crates/comfy-table
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use super::Catalog;
use crate::{
    constants::MISSING_VALUE,
    source::{ParameterKey, SourceRecord},
};

fn cell(value: Option<&str>) -> Cell {
    Cell::new(value.unwrap_or(MISSING_VALUE))
}

impl Catalog {
    /// Render every source as a `comfy-table` table.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("#"),
            Cell::new("Name"),
            Cell::new("RAJ [hms]"),
            Cell::new("DECJ [dms]"),
            Cell::new("P0 [s]"),
            Cell::new("DM [cm^-3 pc]"),
            Cell::new("Sort key"),
        ]);

        for (rank, source) in self.iter().enumerate() {
            let period = match source.value(&ParameterKey::P0) {
                Some(p0) if source.period_is_derived() => format!("{p0} (F0)"),
                Some(p0) => p0.to_string(),
                None => MISSING_VALUE.to_string(),
            };

            table.add_row(Row::from(vec![
                Cell::new(rank).set_alignment(CellAlignment::Right),
                Cell::new(source.name()),
                cell(source.raj()).set_alignment(CellAlignment::Right),
                cell(source.decj()).set_alignment(CellAlignment::Right),
                Cell::new(period).set_alignment(CellAlignment::Right),
                cell(source.value(&ParameterKey::Dm)).set_alignment(CellAlignment::Right),
                Cell::new(source.sort_key()).set_alignment(CellAlignment::Right),
            ]));
        }

        table
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.iter().map(SourceRecord::short_form) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
