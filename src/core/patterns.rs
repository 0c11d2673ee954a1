// shared keyword and pattern tables
// compiled once on first use, read-only after that

use once_cell::sync::Lazy;
use regex::Regex;

use super::injection::InjectionRule;

// verbs that change data or structure
pub const MUTATING_KEYWORDS: [&str; 18] = [
    "INSERT",
    "UPDATE",
    "DELETE",
    "REPLACE",
    "TRUNCATE",
    "CREATE",
    "DROP",
    "ALTER",
    "RENAME",
    "GRANT",
    "REVOKE",
    "LOAD DATA",
    "LOAD XML",
    "INSTALL PLUGIN",
    "UNINSTALL PLUGIN",
    "COPY",
    "MERGE",
    "UPSERT",
];

// patterns are hardcoded, a failure here is a bug in this file
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern '{pattern}': {e}"))
}

pub static MUTATING: Lazy<Regex> = Lazy::new(|| {
    let words: Vec<String> = MUTATING_KEYWORDS.iter().map(|k| regex::escape(k)).collect();
    compile(&format!(r"(?i)\b({})\b", words.join("|")))
});

pub static DDL: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)^\s*(",
        r"CREATE\s+(TABLE|VIEW|INDEX|TRIGGER|PROCEDURE|FUNCTION|EVENT|SCHEMA|DATABASE|ROLE|USER)|",
        r"DROP\s+(TABLE|VIEW|INDEX|TRIGGER|PROCEDURE|FUNCTION|EVENT|SCHEMA|DATABASE|ROLE|USER)|",
        r"ALTER\s+(TABLE|VIEW|TRIGGER|PROCEDURE|FUNCTION|EVENT|SCHEMA|DATABASE|ROLE|USER)|",
        r"RENAME\s+(TABLE)|",
        r"TRUNCATE",
        r")\b",
    ))
});

pub static PERMISSION: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)^\s*(",
        r"GRANT(\s+ROLE)?|",
        r"REVOKE(\s+ROLE)?|",
        r"CREATE\s+(USER|ROLE)|",
        r"DROP\s+(USER|ROLE)|",
        r"SET\s+DEFAULT\s+ROLE|",
        r"SET\s+PASSWORD|",
        r"ALTER\s+USER|",
        r"RENAME\s+USER",
        r")\b",
    ))
});

pub static SYSTEM: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)^\s*(",
        r"SET\s+(GLOBAL|PERSIST|SESSION)|",
        r"RESET\s+(PERSIST|MASTER|SLAVE)|",
        r"FLUSH\s+(PRIVILEGES|HOSTS|LOGS|STATUS|TABLES)?|",
        r"INSTALL\s+PLUGIN|UNINSTALL\s+PLUGIN|",
        r"CHANGE\s+MASTER\s+TO|",
        r"START\s+SLAVE|STOP\s+SLAVE|",
        r"SET\s+GTID_PURGED|",
        r"PURGE\s+BINARY\s+LOGS|",
        r"LOAD\s+DATA\s+INFILE|",
        r"SELECT\s+.*\s+INTO\s+OUTFILE|",
        r"USE\s+\w+|",
        r"SET\s+autocommit|",
        r"COPY\s+.*\s+FROM|",
        r"COPY\s+.*\s+TO",
        r")\b",
    ))
});

pub static TRANSACTION_CONTROL: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)^\s*(",
        r"BEGIN(\s+TRANSACTION)?(\s+READ\s+ONLY)?|",
        r"COMMIT(\s+TRANSACTION)?|",
        r"ROLLBACK(\s+TRANSACTION)?|",
        r"SAVEPOINT|",
        r"RELEASE\s+SAVEPOINT|",
        r"START\s+TRANSACTION",
        r")\b",
    ))
});

// one slot per injection rule, in priority order
// stacked queries has no regex, see stacked_statements
static SUSPICIOUS: Lazy<Vec<Option<Regex>>> = Lazy::new(|| {
    InjectionRule::ALL
        .iter()
        .map(|rule| rule.source().map(compile))
        .collect()
});

pub fn suspicious(rule: InjectionRule) -> Option<&'static Regex> {
    SUSPICIOUS.get(rule as usize).and_then(Option::as_ref)
}

// a COMMIT, then anything (newlines too), then a second statement.
// END is left out, it closes every CASE expression
pub static COMMIT_BYPASS: Lazy<Regex> = Lazy::new(|| compile(r"(?is)\bcommit\b.*?;\s*\w+"));

// \s is unicode White_Space, which leaves out the \x1c-\x1f separators
static LEADING_SPACE: Lazy<Regex> = Lazy::new(|| compile(r"^[\s\x1c-\x1f]*"));

// count semicolons that start another statement.
// a semicolon only counts when something other than whitespace follows it
// and that something is not a `--` or `/*` comment
pub fn stacked_statements(sql: &str) -> usize {
    sql.match_indices(';')
        .filter(|(i, _)| {
            let rest = &sql[i + 1..];
            let rest = &rest[LEADING_SPACE.find(rest).map_or(0, |m| m.end())..];
            !rest.is_empty() && !rest.starts_with("--") && !rest.starts_with("/*")
        })
        .count()
}
