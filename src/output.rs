// output formatting - pretty text for humans or raw json

use serde::Serialize;

use crate::core::{BlockReason, QueryResult, Report};

pub struct Output;

impl Output {
    // what the classifiers saw and what the guard decided
    pub fn report(sql: &str, report: &Report, blocked: Option<&BlockReason>) {
        println!("sql: {sql}\n");

        if report.categories.is_empty() {
            println!("categories: none");
        } else {
            println!("categories: {}", report.categories.join(", "));
        }

        match report.findings.first() {
            Some(finding) => println!("injection: {} ({})", finding.message, finding.severity),
            None => println!("injection: none"),
        }

        match report.bypass_kind {
            Some(kind) => println!("bypass: yes, {}", kind.describe()),
            None => println!("bypass: no"),
        }

        match blocked {
            Some(reason) => println!("\nverdict: blocked - {reason}"),
            None => println!("\nverdict: allowed"),
        }
    }

    // nice table format for humans
    pub fn pretty(sql: &str, result: &QueryResult) {
        println!("sql: {sql}\n");
        println!("rows: {}\n", result.row_count);

        if result.rows.is_empty() {
            println!("no results");
            return;
        }

        for line in table_lines(result) {
            println!("{line}");
        }
    }

    // raw json for scripts
    pub fn raw<T: Serialize>(value: &T) {
        println!("{}", serde_json::to_string(value).unwrap_or_default());
    }
}

const MAX_WIDTH: usize = 40;

fn table_lines(result: &QueryResult) -> Vec<String> {
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();

    for row in &result.rows {
        for (i, val) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(format_value(val).chars().count());
            }
        }
    }

    // cap so wide text columns don't wrap the terminal
    for w in &mut widths {
        *w = (*w).min(MAX_WIDTH);
    }

    let mut lines = Vec::with_capacity(result.rows.len() + 2);

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{c:w$}"))
        .collect();
    lines.push(header.join(" | "));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(sep.join("-+-"));

    for row in &result.rows {
        let formatted: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{:w$}", truncate(&format_value(v))))
            .collect();
        lines.push(formatted.join(" | "));
    }

    lines
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_WIDTH {
        let head: String = s.chars().take(MAX_WIDTH - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn format_value(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => val.to_string(),
    }
}
