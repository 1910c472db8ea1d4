//! Recommendation-table extraction from model replies.
//!
//! Replies are expected to embed a 3-column markdown table
//! (`| Category | Recommendation | Impact |`). This module pulls the data
//! rows out into structured form and strips every table-shaped line from the
//! prose, so the caller can render prose and table separately.

use crate::session::types::TableRow;
use regex::Regex;
use std::sync::OnceLock;

/// Matches one 3-cell pipe-delimited row. Cells may not contain `|` or
/// newlines, so a 4-column table yields no full-row match.
fn row_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\|([^|\n]*)\|([^|\n]*)\|([^|\n]*)\|").expect("static row pattern is valid")
    })
}

/// Split `text` into prose and extracted table rows.
///
/// Header rows (containing the literal `Category` label) and separator rows
/// (`---` runs) are skipped; data rows with any blank cell are dropped.
/// Surviving rows keep their source order. All matched rows, including the
/// skipped ones, are removed from the prose, and runs of blank lines left
/// behind are collapsed to single blank lines.
///
/// An empty row vec means the reply had no table; callers treat that as
/// absent rather than an empty-but-present table.
pub fn extract_table(text: &str) -> (String, Vec<TableRow>) {
    let pattern = row_pattern();

    let mut rows = Vec::new();
    for caps in pattern.captures_iter(text) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        if whole.contains("Category") || whole.contains("---") {
            continue;
        }
        let category = caps[1].trim();
        let recommendation = caps[2].trim();
        let impact = caps[3].trim();
        if category.is_empty() || recommendation.is_empty() || impact.is_empty() {
            continue;
        }
        rows.push(TableRow {
            category: category.to_string(),
            recommendation: recommendation.to_string(),
            impact: impact.to_string(),
        });
    }

    let stripped = pattern.replace_all(text, "");
    let prose = collapse_blank_lines(&stripped);

    (prose, rows)
}

/// Collapse runs of blank lines into single blank lines and trim the edges.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push_str(line.trim_end());
        out.push('\n');
        previous_blank = blank;
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY_WITH_TABLE: &str = "\
Here are some ideas 🌿

| Category | Recommendation | Impact |
| --- | --- | --- |
| Clothing | Organic cotton tees | Lower water use |
| Shopping |  | Less waste |

Happy to go deeper on any of these!";

    #[test]
    fn extracts_complete_rows_and_drops_blank_cells() {
        let (prose, rows) = extract_table(REPLY_WITH_TABLE);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Clothing");
        assert_eq!(rows[0].recommendation, "Organic cotton tees");
        assert_eq!(rows[0].impact, "Lower water use");

        assert!(!prose.contains('|'));
        assert!(prose.contains("Here are some ideas"));
        assert!(prose.contains("Happy to go deeper"));
    }

    #[test]
    fn header_and_separator_rows_are_skipped_but_stripped() {
        let (prose, rows) = extract_table(
            "| Category | Recommendation | Impact |\n|---|---|---|\n| Care | Wash cold | Saves energy |",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Care");
        assert!(!prose.contains("Category"));
        assert!(!prose.contains("---"));
    }

    #[test]
    fn rows_preserve_source_order() {
        let (_, rows) = extract_table(
            "| A | one | x |\n| B | two | y |\n| C | three | z |",
        );
        let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, ["A", "B", "C"]);
    }

    #[test]
    fn cells_are_trimmed() {
        let (_, rows) = extract_table("|  Clothing  |  Linen shirts  |  Biodegradable  |");
        assert_eq!(rows[0].category, "Clothing");
        assert_eq!(rows[0].recommendation, "Linen shirts");
        assert_eq!(rows[0].impact, "Biodegradable");
    }

    #[test]
    fn whitespace_only_cells_count_as_blank() {
        let (_, rows) = extract_table("| Clothing |   | Lower impact |");
        assert!(rows.is_empty());
    }

    #[test]
    fn text_without_table_passes_through() {
        let text = "Just a friendly chat.\n\nNo tables here.";
        let (prose, rows) = extract_table(text);
        assert!(rows.is_empty());
        assert_eq!(prose, text);
    }

    #[test]
    fn stripping_collapses_blank_line_runs() {
        let (prose, _) = extract_table(
            "Intro line.\n\n| A | b | c |\n\n| D | e | f |\n\nClosing line.",
        );
        assert!(!prose.contains("\n\n\n"));
        assert!(prose.starts_with("Intro line."));
        assert!(prose.ends_with("Closing line."));
    }

    #[test]
    fn table_only_reply_yields_empty_prose() {
        let (prose, rows) =
            extract_table("| Shopping | Buy second-hand | Extends garment life |");
        assert_eq!(rows.len(), 1);
        assert!(prose.is_empty());
    }

    #[test]
    fn four_column_rows_are_not_matched_as_data() {
        // Cells cannot contain pipes, so the 3-cell pattern anchors on the
        // first three columns only when the shape fits.
        let (_, rows) = extract_table("| A | b | c | d |");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "A");
    }
}
