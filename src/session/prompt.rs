//! System instruction synthesis.
//!
//! The instruction sent as the conversation's system turn is assembled here:
//! a fixed advisor briefing plus a detail-level clause controlling verbosity
//! and expected table size. Nothing in this module touches the transport.

use super::types::DetailLevel;

/// Appended to the final user message when deep-search mode is on. Does not
/// itself perform web retrieval; the model is asked to include trend data.
pub const DEEP_SEARCH_SUFFIX: &str = " (Include latest web-sourced trends)";

const BASE_INSTRUCTION: &str = "\
You are an expert sustainable fashion advisor with deep knowledge of eco-friendly trends, materials, and practices. Provide clear, engaging advice on sustainable fashion. Focus on:
- Eco-friendly clothing (e.g., organic cotton, Tencel, recycled fibers)
- Sustainable shopping (e.g., ethical brands, Fair Trade, second-hand platforms)
- Clothing care to extend garment life (e.g., low-impact washing, repairs)
- Brand recommendations or trends (e.g., carbon footprint, water usage)

Format:
- Use concise, friendly language
- Include a markdown table with columns: [Category, Recommendation, Impact]
- Exclude rows with empty or whitespace-only columns
- Use emojis (🌿, 🛍️, 🧼, 📚) for sections
- No images";

fn detail_instruction(level: DetailLevel) -> &'static str {
    match level {
        DetailLevel::Brief => {
            "Keep responses short (2-3 sentences per section) with minimal detail. Include a table with 1-2 rows."
        }
        DetailLevel::Standard => {
            "Provide balanced responses (3-5 sentences per section) with key details. Include a table with 2-3 rows."
        }
        DetailLevel::Detailed => {
            "Give comprehensive responses (5-7 sentences per section) with data and sources. Include a table with 3-4 rows."
        }
    }
}

/// Build the full system instruction for one conversation.
pub fn system_prompt(level: DetailLevel) -> String {
    format!("{BASE_INSTRUCTION}\n{}", detail_instruction(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_shares_the_base_briefing() {
        for level in [
            DetailLevel::Brief,
            DetailLevel::Standard,
            DetailLevel::Detailed,
        ] {
            let prompt = system_prompt(level);
            assert!(prompt.starts_with("You are an expert sustainable fashion advisor"));
            assert!(prompt.contains("[Category, Recommendation, Impact]"));
        }
    }

    #[test]
    fn levels_differ_only_in_the_detail_clause() {
        let brief = system_prompt(DetailLevel::Brief);
        let standard = system_prompt(DetailLevel::Standard);
        let detailed = system_prompt(DetailLevel::Detailed);

        assert_ne!(brief, standard);
        assert_ne!(standard, detailed);
        assert!(brief.contains("1-2 rows"));
        assert!(standard.contains("2-3 rows"));
        assert!(detailed.contains("3-4 rows"));

        // The shared prefix is everything up to the detail clause.
        assert_eq!(
            brief.lines().count(),
            standard.lines().count(),
            "levels must only swap the final clause"
        );
    }

    #[test]
    fn deep_search_suffix_is_a_plain_instruction() {
        assert!(DEEP_SEARCH_SUFFIX.contains("web-sourced trends"));
        assert!(DEEP_SEARCH_SUFFIX.starts_with(' '));
    }
}
