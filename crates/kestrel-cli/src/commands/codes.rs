//! Codes command - print the diagnostic code table

use anyhow::{Context, Result};
use kestrel_sema::DiagnosticKind;
use serde_json::json;

pub fn run(as_json: bool) -> Result<()> {
    if as_json {
        let table: Vec<_> = DiagnosticKind::ALL
            .iter()
            .map(|kind| {
                let info = kind.info();
                json!({
                    "code": kind.code(),
                    "kind": kind.to_string(),
                    "level": kind.level(),
                    "description": info.description,
                    "help": info.help,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&table).context("Failed to serialize code table")?
        );
        return Ok(());
    }

    for line in table_lines() {
        println!("{}", line);
    }
    Ok(())
}

/// `CODE  level    Kind  description`, one per kind
fn table_lines() -> Vec<String> {
    DiagnosticKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "{}  {:<7}  {:<32}  {}",
                kind.code(),
                kind.level().to_string(),
                kind.to_string(),
                kind.info().description
            )
        })
        .collect()
}
