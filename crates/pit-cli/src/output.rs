// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Human-readable run summaries.

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use pit_app_core::pipeline::RunSummary;

pub fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Realization", "Retained", "Selected", "Value", "Moves"]);
    for report in &summary.realizations {
        table.add_row(vec![
            Cell::new(report.realization),
            Cell::new(report.retained).set_alignment(CellAlignment::Right),
            Cell::new(report.selected).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", report.value)).set_alignment(CellAlignment::Right),
            Cell::new(report.moves).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pit_app_core::pipeline::RealizationReport;
    use pit_core::EngineKind;

    #[test]
    fn one_row_per_realization() {
        let report = |realization, value| RealizationReport {
            realization,
            retained: 4,
            selected: 2,
            value,
            moves: 3,
            selection: Vec::new(),
        };
        let summary = RunSummary {
            engine: EngineKind::MinCut,
            blocks: 6,
            retained: 4,
            realizations: vec![report(0, 4.0), report(1, -0.5)],
        };
        let text = summary_table(&summary).to_string();
        assert!(text.contains("Realization"));
        assert!(text.contains("4.00"));
        assert!(text.contains("-0.50"));
    }
}
