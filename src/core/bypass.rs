// read-only transaction bypass detection
// leans towards true: a blocked legit query beats an escaped transaction

use serde::Serialize;

use super::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassKind {
    // COMMIT, then another statement
    TerminatorThenStatement,
    // any semicolon followed by more than whitespace or a comment
    StackedStatements,
}

impl BypassKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::TerminatorThenStatement => "transaction terminated and followed by another statement",
            Self::StackedStatements => "multiple statements in one string",
        }
    }
}

pub fn bypass_reason(sql: &str) -> Option<BypassKind> {
    if patterns::COMMIT_BYPASS.is_match(sql) {
        Some(BypassKind::TerminatorThenStatement)
    } else if patterns::stacked_statements(sql) > 0 {
        Some(BypassKind::StackedStatements)
    } else {
        None
    }
}

pub fn detect_transaction_bypass_attempt(sql: &str) -> bool {
    bypass_reason(sql).is_some()
}
