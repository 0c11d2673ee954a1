// policy layer - turns classifier output into allow / block
// the classifiers only report, this is where enforcement happens

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::bypass::{BypassKind, bypass_reason};
use super::category::{Category, classify};
use super::injection::{Finding, check_sql_injection_risk};
use crate::Error;

// same default query length cap as the usual sql security configs
pub const DEFAULT_MAX_INPUT_LEN: usize = 10_000;

// keywords that change schema, permissions, or the server, refused in no-ddl mode
pub const STRUCTURAL_KEYWORDS: [&str; 12] = [
    "CREATE",
    "DROP",
    "ALTER",
    "RENAME",
    "TRUNCATE",
    "GRANT",
    "REVOKE",
    "INSTALL PLUGIN",
    "UNINSTALL PLUGIN",
    "LOAD DATA",
    "LOAD XML",
    "COPY",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// only reads, inside a read-only transaction
    #[default]
    ReadOnly,
    /// writes allowed, schema/permission/system changes are not
    NoDdl,
    /// anything that doesn't look like an injection
    ReadWrite,
}

impl Mode {
    pub fn is_read_only(self) -> bool {
        self == Self::ReadOnly
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadOnly => "read-only",
            Self::NoDdl => "no-ddl",
            Self::ReadWrite => "read-write",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    pub mode: Mode,
    pub max_input_len: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

// everything the classifiers found for one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub categories: Vec<String>,
    pub findings: Vec<Finding>,
    pub bypass: bool,
    #[serde(skip)]
    pub structural: Vec<Category>,
    #[serde(skip)]
    pub bypass_kind: Option<BypassKind>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.categories.is_empty() && self.findings.is_empty() && !self.bypass
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    Suspicious(Finding),
    Mutating { mode: Mode, labels: Vec<String> },
    TransactionBypass(BypassKind),
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suspicious(finding) => write!(f, "{}", finding.message),
            Self::Mutating { mode, labels } => {
                write!(f, "{} not allowed in {mode} mode", labels.join(", "))
            }
            Self::TransactionBypass(kind) => {
                write!(f, "possible read-only bypass: {}", kind.describe())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Guard {
    config: GuardConfig,
}

impl Guard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self::new(GuardConfig {
            mode,
            ..GuardConfig::default()
        })
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    // run all three classifiers, no enforcement
    pub fn inspect(&self, sql: &str) -> Result<Report, Error> {
        if sql.len() > self.config.max_input_len {
            warn!(len = sql.len(), max = self.config.max_input_len, "sql input too large");
            return Err(Error::InputTooLarge {
                len: sql.len(),
                max: self.config.max_input_len,
            });
        }

        let classification = classify(sql);
        let bypass_kind = bypass_reason(sql);

        Ok(Report {
            categories: classification.labels(),
            findings: check_sql_injection_risk(sql),
            bypass: bypass_kind.is_some(),
            structural: classification.categories,
            bypass_kind,
        })
    }

    // inspect, then apply the mode
    pub fn check(&self, sql: &str) -> Result<Report, Error> {
        let report = self.inspect(sql)?;

        if let Some(reason) = self.decide(&report) {
            warn!(mode = %self.config.mode, %reason, "blocked sql");
            return Err(Error::Blocked(reason));
        }

        debug!(mode = %self.config.mode, labels = ?report.categories, "allowed sql");
        Ok(report)
    }

    pub fn decide(&self, report: &Report) -> Option<BlockReason> {
        // injection findings block in every mode
        if let Some(finding) = report.findings.first() {
            return Some(BlockReason::Suspicious(finding.clone()));
        }

        match self.config.mode {
            Mode::ReadOnly => {
                if !report.categories.is_empty() {
                    return Some(BlockReason::Mutating {
                        mode: self.config.mode,
                        labels: report.categories.clone(),
                    });
                }
                report.bypass_kind.map(BlockReason::TransactionBypass)
            }
            Mode::NoDdl => {
                // the anchored rules miss forms like CREATE OR REPLACE VIEW,
                // so the verbs themselves block too
                let blocked: Vec<String> = report
                    .structural
                    .iter()
                    .filter(|c| {
                        matches!(c, Category::Ddl | Category::Permission | Category::System)
                    })
                    .map(|c| c.to_string())
                    .chain(
                        report
                            .categories
                            .iter()
                            .filter(|label| STRUCTURAL_KEYWORDS.contains(&label.as_str()))
                            .cloned(),
                    )
                    .collect();

                (!blocked.is_empty()).then(|| BlockReason::Mutating {
                    mode: self.config.mode,
                    labels: blocked,
                })
            }
            Mode::ReadWrite => None,
        }
    }
}
