// log.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LogCategory {
    HandleCommand,
    IssueOrder,
    OrderEffect,
    PhaseChange,
    GameStart,
    GameEnd,
}

impl LogCategory {
    fn prefix(&self) -> &'static str {
        match self {
            LogCategory::HandleCommand => "Command Entered: ",
            LogCategory::IssueOrder => "Order Issued: ",
            LogCategory::OrderEffect => "Log: ",
            LogCategory::PhaseChange => "",
            LogCategory::GameStart => "",
            LogCategory::GameEnd => "",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub category: LogCategory,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            LogCategory::PhaseChange => write!(f, "======= {} =======", self.message),
            LogCategory::GameStart | LogCategory::GameEnd => {
                write!(f, "*** {} ***", self.message)
            }
            _ => write!(f, "{}{}", self.category.prefix(), self.message),
        }
    }
}

/// Tagged sink for every state-changing operation of a game. Entries are
/// kept in memory for the driver and mirrored to `tracing`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: LogCategory, message: impl Into<String>) {
        let entry = self.push(category, message.into());
        tracing::info!(target: "warzone_board_game", category = ?entry.category, "{}", entry);
    }

    /// Same as `record`, for refusals and caught errors.
    pub fn warn(&mut self, category: LogCategory, message: impl Into<String>) {
        let entry = self.push(category, message.into());
        tracing::warn!(target: "warzone_board_game", category = ?entry.category, "{}", entry);
    }

    fn push(&mut self, category: LogCategory, message: String) -> &LogEntry {
        self.entries.push(LogEntry {
            category,
            message,
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn drain(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_category_and_order() {
        let mut log = GameLog::new();
        log.record(LogCategory::HandleCommand, "loadmap europe");
        log.warn(LogCategory::OrderEffect, "order refused");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].category, LogCategory::HandleCommand);
        assert_eq!(log.last().map(|e| e.message.as_str()), Some("order refused"));
        assert!(log.contains("europe"));
    }

    #[test]
    fn display_uses_category_prefix() {
        let mut log = GameLog::new();
        log.record(LogCategory::IssueOrder, "(Player: alice) deploy a 3");
        log.record(LogCategory::PhaseChange, "Issue Orders");
        assert_eq!(
            log.entries()[0].to_string(),
            "Order Issued: (Player: alice) deploy a 3"
        );
        assert_eq!(log.entries()[1].to_string(), "======= Issue Orders =======");
    }

    #[test]
    fn drain_empties_the_sink() {
        let mut log = GameLog::new();
        log.record(LogCategory::GameStart, "start");
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());
    }
}
