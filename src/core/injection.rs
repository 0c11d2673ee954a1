// injection scanning - first suspicious pattern wins
// order below is the priority order, don't reshuffle it

use serde::Serialize;
use std::fmt;

use super::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionRule {
    CommentInjection,
    NumericTautology,
    StringTautology,
    UnionSelect,
    Drop,
    Truncate,
    GrantRevoke,
    StackedQueries,
    Sleep,
    PgSleep,
    LoadFile,
    IntoOutfile,
    CopyFrom,
    CopyTo,
    TransactionControl,
}

impl InjectionRule {
    pub const ALL: [InjectionRule; 15] = [
        Self::CommentInjection,
        Self::NumericTautology,
        Self::StringTautology,
        Self::UnionSelect,
        Self::Drop,
        Self::Truncate,
        Self::GrantRevoke,
        Self::StackedQueries,
        Self::Sleep,
        Self::PgSleep,
        Self::LoadFile,
        Self::IntoOutfile,
        Self::CopyFrom,
        Self::CopyTo,
        Self::TransactionControl,
    ];

    // stable name used in finding messages
    pub fn id(self) -> &'static str {
        match self {
            Self::CommentInjection => "comment_injection",
            Self::NumericTautology => "numeric_tautology",
            Self::StringTautology => "string_tautology",
            Self::UnionSelect => "union_select",
            Self::Drop => "drop",
            Self::Truncate => "truncate",
            Self::GrantRevoke => "grant_revoke",
            Self::StackedQueries => "stacked_queries",
            Self::Sleep => "sleep",
            Self::PgSleep => "pg_sleep",
            Self::LoadFile => "load_file",
            Self::IntoOutfile => "into_outfile",
            Self::CopyFrom => "copy_from",
            Self::CopyTo => "copy_to",
            Self::TransactionControl => "transaction_control",
        }
    }

    // regex source, None for the semicolon scan which regex can't express
    // without lookahead
    pub fn source(self) -> Option<&'static str> {
        let src = match self {
            Self::CommentInjection => r"(?i)'.*?--",
            Self::NumericTautology => r"(?i)\bor\b\s+\d+\s*=\s*\d+",
            Self::StringTautology => r"(?i)\bor\b\s*'[^']+'\s*=\s*'[^']+'",
            Self::UnionSelect => r"(?is)\bunion\b.*\bselect\b",
            Self::Drop => r"(?i)\bdrop\b",
            Self::Truncate => r"(?i)\btruncate\b",
            Self::GrantRevoke => r"(?i)\bgrant\b|\brevoke\b",
            Self::StackedQueries => return None,
            Self::Sleep => r"(?i)\bsleep\s*\(",
            Self::PgSleep => r"(?i)\bpg_sleep\s*\(",
            Self::LoadFile => r"(?i)\bload_file\s*\(",
            Self::IntoOutfile => r"(?i)\binto\s+outfile\b",
            Self::CopyFrom => r"(?i)\bcopy\s+.*\s+from\b",
            Self::CopyTo => r"(?i)\bcopy\s+.*\s+to\b",
            Self::TransactionControl => r"(?i)\b(begin|commit|rollback)\b.*;\s*\w+",
        };
        Some(src)
    }

    pub fn matches(self, sql: &str) -> bool {
        match patterns::suspicious(self) {
            Some(re) => re.is_match(sql),
            None => patterns::stacked_statements(sql) > 0,
        }
    }
}

impl fmt::Display for InjectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

pub const FINDING_TYPE: &str = "sql";
pub const SEVERITY_HIGH: &str = "high";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub severity: &'static str,
    #[serde(skip)]
    pub rule: InjectionRule,
}

impl Finding {
    pub fn new(rule: InjectionRule) -> Self {
        Self {
            kind: FINDING_TYPE,
            message: format!("Suspicious pattern detected: {}", rule.id()),
            severity: SEVERITY_HIGH,
            rule,
        }
    }
}

// zero or one finding, never more
pub fn check_sql_injection_risk(sql: &str) -> Vec<Finding> {
    InjectionRule::ALL
        .into_iter()
        .find(|rule| rule.matches(sql))
        .map(Finding::new)
        .into_iter()
        .collect()
}
