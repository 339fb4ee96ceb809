//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use serde::Serialize;

/// One helper, value or block reference found in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSiteRow {
    /// 1-based line of the call site.
    pub line: usize,
    /// "mustache", "block" or "subexpression".
    pub kind: &'static str,
    pub callee: String,
    /// "simple", "helper" or "ambiguous".
    pub resolution: &'static str,
}

/// Format the call sites of one template as an ASCII table.
pub fn format_call_site_table(rows: &[CallSiteRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Line", "Kind", "Callee", "Resolution"]);

    for row in rows {
        table.add_row(vec![
            row.line.to_string(),
            row.kind.to_string(),
            row.callee.clone(),
            row.resolution.to_string(),
        ]);
    }

    table
}
