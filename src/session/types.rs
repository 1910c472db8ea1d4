//! Conversation types — roles, turns, recommendation rows, and session settings.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Role of a message participant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Capitalized form used in markdown exports.
    pub fn title(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a recommendation table. Rows with blank cells never survive
/// parsing, so all three fields are non-empty by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRow {
    pub category: String,
    pub recommendation: String,
    pub impact: String,
}

/// A single message in a conversation. Turns are append-only; a conversation
/// is an ordered `Vec<Turn>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<TableRow>>,
    pub timestamp: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            table: None,
            timestamp: Local::now().to_rfc3339(),
        }
    }

    pub fn with_table(role: Role, content: impl Into<String>, table: Option<Vec<TableRow>>) -> Self {
        Self {
            table,
            ..Self::new(role, content)
        }
    }

    /// Timestamp truncated to seconds, the form shown next to rendered turns.
    pub fn short_timestamp(&self) -> &str {
        let end = self
            .timestamp
            .char_indices()
            .nth(19)
            .map_or(self.timestamp.len(), |(idx, _)| idx);
        &self.timestamp[..end]
    }
}

/// Controls expected verbosity and table row count of model replies. Only the
/// system instruction changes with this setting, never the transport.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl DetailLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "brief" => Some(Self::Brief),
            "standard" => Some(Self::Standard),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Standard => "standard",
            Self::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal rendering theme.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render/export-time filter over recommendation tables. Stored turns are
/// never filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Clothing,
    Shopping,
    Care,
    Resources,
}

impl CategoryFilter {
    pub const NAMES: [&'static str; 5] = ["all", "clothing", "shopping", "care", "resources"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "clothing" => Some(Self::Clothing),
            "shopping" => Some(Self::Shopping),
            "care" => Some(Self::Care),
            "resources" => Some(Self::Resources),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Clothing => "clothing",
            Self::Shopping => "shopping",
            Self::Care => "care",
            Self::Resources => "resources",
        }
    }

    /// Case-insensitive substring match against the row's category cell.
    pub fn matches(self, row: &TableRow) -> bool {
        match self {
            Self::All => true,
            _ => row.category.to_ascii_lowercase().contains(self.as_str()),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }

    #[test]
    fn turn_roundtrip_preserves_table() {
        let turn = Turn::with_table(
            Role::Assistant,
            "Here are some ideas.",
            Some(vec![TableRow {
                category: "Clothing".into(),
                recommendation: "Organic cotton tees".into(),
                impact: "Lower water use".into(),
            }]),
        );
        let json = serde_json::to_string(&turn).unwrap();
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, turn);
    }

    #[test]
    fn turn_without_table_omits_field() {
        let turn = Turn::new(Role::User, "hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("\"table\""));
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.table, None);
    }

    #[test]
    fn short_timestamp_truncates_to_seconds() {
        let turn = Turn {
            role: Role::User,
            content: "hi".into(),
            table: None,
            timestamp: "2026-08-27T10:15:30.123456+02:00".into(),
        };
        assert_eq!(turn.short_timestamp(), "2026-08-27T10:15:30");
    }

    #[test]
    fn detail_level_parsing_is_case_insensitive() {
        assert_eq!(DetailLevel::from_name("Brief"), Some(DetailLevel::Brief));
        assert_eq!(
            DetailLevel::from_name("STANDARD"),
            Some(DetailLevel::Standard)
        );
        assert_eq!(
            DetailLevel::from_name("detailed"),
            Some(DetailLevel::Detailed)
        );
        assert_eq!(DetailLevel::from_name("verbose"), None);
    }

    #[test]
    fn category_filter_matches_substring_case_insensitive() {
        let row = TableRow {
            category: "Clothing Care".into(),
            recommendation: "Wash cold".into(),
            impact: "Less energy".into(),
        };
        assert!(CategoryFilter::All.matches(&row));
        assert!(CategoryFilter::Clothing.matches(&row));
        assert!(CategoryFilter::Care.matches(&row));
        assert!(!CategoryFilter::Shopping.matches(&row));
    }
}
