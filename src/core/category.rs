// mutation classification - what kind of statement is this
// anchored category rules plus an unanchored keyword scan

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    #[serde(rename = "DDL")]
    Ddl,
    #[serde(rename = "PERMISSION")]
    Permission,
    #[serde(rename = "SYSTEM")]
    System,
    #[serde(rename = "TRANSACTION_CONTROL")]
    TransactionControl,
}

impl Category {
    // evaluation order, also the output order
    pub const ALL: [Category; 4] = [
        Category::Ddl,
        Category::Permission,
        Category::System,
        Category::TransactionControl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ddl => "DDL",
            Self::Permission => "PERMISSION",
            Self::System => "SYSTEM",
            Self::TransactionControl => "TRANSACTION_CONTROL",
        }
    }

    pub fn matches(self, sql: &str) -> bool {
        let rule = match self {
            Self::Ddl => &*patterns::DDL,
            Self::Permission => &*patterns::PERMISSION,
            Self::System => &*patterns::SYSTEM,
            Self::TransactionControl => &*patterns::TRANSACTION_CONTROL,
        };
        rule.is_match(sql)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub categories: Vec<Category>,
    // upper-cased, deduplicated, sorted
    pub keywords: Vec<String>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.keywords.is_empty()
    }

    pub fn has(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    // categories first, then keywords
    pub fn labels(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| c.as_str().to_string())
            .chain(self.keywords.iter().cloned())
            .collect()
    }
}

pub fn classify(sql: &str) -> Classification {
    let categories = Category::ALL
        .into_iter()
        .filter(|c| c.matches(sql))
        .collect();

    // BTreeSet does the dedup and the sort
    let keywords: BTreeSet<String> = patterns::MUTATING
        .find_iter(sql)
        .map(|m| m.as_str().to_uppercase())
        .collect();

    Classification {
        categories,
        keywords: keywords.into_iter().collect(),
    }
}

pub fn detect_mutating_keywords(sql: &str) -> Vec<String> {
    classify(sql).labels()
}
