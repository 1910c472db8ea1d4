//! Transcript and recommendation exports.

use super::types::{TableRow, Turn};

/// Render a conversation as a markdown document: one block per turn with
/// non-empty content, blank-line separated.
pub fn markdown_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .filter(|t| !t.content.trim().is_empty())
        .map(|t| {
            format!(
                "**{}** ({}):\n{}",
                t.role.title(),
                t.short_timestamp(),
                t.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render recommendation rows as CSV with the fixed header.
pub fn table_csv(rows: &[TableRow]) -> String {
    let mut out = String::from("Category,Recommendation,Impact\n");
    for row in rows {
        out.push_str(&csv_field(&row.category));
        out.push(',');
        out.push_str(&csv_field(&row.recommendation));
        out.push(',');
        out.push_str(&csv_field(&row.impact));
        out.push('\n');
    }
    out
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
