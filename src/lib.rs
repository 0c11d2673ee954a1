// sqlguard library - classify sql before it runs

pub mod cli;
mod core;
mod error;
mod output;
mod server;

pub use crate::core::{
    BlockReason, BypassKind, Category, Classification, DEFAULT_MAX_INPUT_LEN, Db, Dialect,
    FINDING_TYPE, Finding, Guard, GuardConfig, InjectionRule, MUTATING_KEYWORDS, Mode,
    QueryResult, Report, SEVERITY_HIGH, bypass_reason, check_sql_injection_risk, classify,
    detect_mutating_keywords, detect_transaction_bypass_attempt, stacked_statements,
};
pub use error::Error;
pub use output::Output;
pub use server::Server;
