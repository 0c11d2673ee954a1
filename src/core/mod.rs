// core logic - classifiers, policy, and guarded execution

mod bypass;
mod category;
mod db;
mod guard;
mod injection;
mod patterns;

pub use bypass::{BypassKind, bypass_reason, detect_transaction_bypass_attempt};
pub use category::{Category, Classification, classify, detect_mutating_keywords};
pub use db::{Db, Dialect, QueryResult};
pub use guard::{BlockReason, DEFAULT_MAX_INPUT_LEN, Guard, GuardConfig, Mode, Report};
pub use injection::{
    FINDING_TYPE, Finding, InjectionRule, SEVERITY_HIGH, check_sql_injection_risk,
};
pub use patterns::{MUTATING_KEYWORDS, stacked_statements};
