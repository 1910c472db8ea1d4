//! Session controller — owns one user's conversation and drives each turn.
//!
//! A `Session` exists only between login and logout. Per-turn flow: append
//! the user turn, send (system instruction + all role/content pairs) to the
//! provider, split the reply into prose and table rows, append the assistant
//! turn, persist the full conversation as a fresh snapshot. Failures never
//! escape to the caller; they become apology turns and the loop continues.

pub mod export;
pub mod prompt;
pub mod types;

use crate::providers::{ChatMessage, Provider};
use crate::reply;
use crate::store::Database;
use types::{CategoryFilter, DetailLevel, Role, TableRow, Turn};

/// Fallback assistant turn when the provider call fails (connect error,
/// non-success status, or timeout). The failed call is not persisted.
pub const CONNECT_FAILURE_REPLY: &str = "I'm having trouble connecting. Please try again later.";

/// Fallback assistant turn for any other failure while handling a reply.
pub const UNEXPECTED_FAILURE_REPLY: &str =
    "Sorry, I encountered an error. Please rephrase your request.";

/// What happened to one user turn, for the front end to style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    ConnectionFailed,
    Failed,
}

pub struct Session {
    username: String,
    model: String,
    turns: Vec<Turn>,
    backup: Option<Vec<Turn>>,
    pub detail_level: DetailLevel,
    pub deep_search: bool,
    pub filter: CategoryFilter,
}

impl Session {
    /// Start a session for an authenticated user: seed the welcome turn and
    /// persist the opening snapshot.
    pub fn begin(
        db: &Database,
        username: &str,
        model: &str,
        detail_level: DetailLevel,
    ) -> anyhow::Result<Self> {
        let session = Self {
            username: username.to_string(),
            model: model.to_string(),
            turns: vec![Turn::new(
                Role::Assistant,
                format!(
                    "Welcome, {username}! Ask about sustainable fashion or chat about anything else! 🌱"
                ),
            )],
            backup: None,
            detail_level,
            deep_search: false,
            filter: CategoryFilter::All,
        };
        db.save_snapshot(username, &session.turns)?;
        Ok(session)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// The most recent assistant table, if any turn carries one.
    pub fn last_table(&self) -> Option<&[TableRow]> {
        self.turns
            .iter()
            .rev()
            .find_map(|t| t.table.as_deref())
            .filter(|rows| !rows.is_empty())
    }

    /// Process one user turn end to end. Never fails: provider and handling
    /// errors become fixed apology turns, and only successful turns are
    /// persisted.
    pub async fn send(&mut self, db: &Database, provider: &dyn Provider, input: &str) -> SendOutcome {
        self.turns.push(Turn::new(Role::User, input));

        let raw = match provider
            .chat_with_history(&self.outgoing_messages(), &self.model)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "completion failed");
                self.turns
                    .push(Turn::new(Role::Assistant, CONNECT_FAILURE_REPLY));
                return SendOutcome::ConnectionFailed;
            }
        };

        let (prose, rows) = reply::extract_table(&raw);
        let table = if rows.is_empty() { None } else { Some(rows) };
        self.turns
            .push(Turn::with_table(Role::Assistant, prose, table));

        if let Err(e) = db.save_snapshot(&self.username, &self.turns) {
            tracing::warn!(error = %e, "failed to persist conversation");
            self.turns
                .push(Turn::new(Role::Assistant, UNEXPECTED_FAILURE_REPLY));
            return SendOutcome::Failed;
        }

        SendOutcome::Replied
    }

    /// Build the outgoing wire messages: the system instruction first, then
    /// every turn's role/content pair in order. Deep-search mode appends its
    /// suffix to the final user message in the outgoing copy only.
    fn outgoing_messages(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::new(
            "system",
            prompt::system_prompt(self.detail_level),
        )];
        messages.extend(
            self.turns
                .iter()
                .map(|t| ChatMessage::new(t.role.as_str(), t.content.clone())),
        );

        if self.deep_search {
            if let Some(last) = messages.last_mut() {
                if last.role == "user" {
                    last.content.push_str(prompt::DEEP_SEARCH_SUFFIX);
                }
            }
        }

        messages
    }

    /// Stash the current conversation in the single backup slot (overwriting
    /// any previous backup) and reset to a fresh welcome turn.
    pub fn new_chat(&mut self, db: &Database) -> anyhow::Result<()> {
        self.backup = Some(std::mem::take(&mut self.turns));
        self.turns = vec![Turn::new(
            Role::Assistant,
            format!(
                "New chat started, {}! Ask about sustainable fashion or anything else! 🌱",
                self.username
            ),
        )];
        db.save_snapshot(&self.username, &self.turns)?;
        Ok(())
    }

    /// Like `new_chat`, with the cleared-history welcome.
    pub fn clear(&mut self, db: &Database) -> anyhow::Result<()> {
        self.backup = Some(std::mem::take(&mut self.turns));
        self.turns = vec![Turn::new(
            Role::Assistant,
            "Chat history cleared! Ask about sustainable fashion or anything else! 🌿",
        )];
        db.save_snapshot(&self.username, &self.turns)?;
        Ok(())
    }

    /// Restore the single backup slot, if present. Returns false when there
    /// is nothing to resume.
    pub fn resume(&mut self, db: &Database) -> anyhow::Result<bool> {
        let Some(previous) = self.backup.take() else {
            return Ok(false);
        };
        self.turns = previous;
        db.save_snapshot(&self.username, &self.turns)?;
        Ok(true)
    }

    /// Replace the live conversation with a loaded snapshot.
    pub fn restore_snapshot(&mut self, turns: Vec<Turn>) {
        self.turns = turns;
    }
}
