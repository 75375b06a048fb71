use crate::{OutputFormat, Schema};
use anyhow::{Context, Result, bail};
use hartype_core::har::devtools::DevToolsEntry;
use hartype_core::har::{Entry, HarEntry, HarReader};
use std::fs;
use std::path::Path;

/// One structural problem found in a HAR file
#[derive(Debug, Clone, serde::Serialize)]
pub struct Finding {
    pub path: String,
    pub message: String,
}

/// Result of checking a HAR file
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckReport {
    pub file_name: String,
    pub total_entries: usize,
    pub anomalies: Vec<Finding>,
    pub validation_error: Option<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty() && self.validation_error.is_none()
    }
}

/// Parse `content` leniently and collect anomalies and validation problems
pub fn check_str(content: &str, schema: Schema, file_name: &str) -> Result<CheckReport> {
    let report = match schema {
        Schema::Har => inspect::<Entry>(content)?,
        Schema::DevTools => inspect::<DevToolsEntry>(content)?,
    };

    Ok(CheckReport {
        file_name: file_name.to_string(),
        ..report
    })
}

fn inspect<E: HarEntry>(content: &str) -> Result<CheckReport> {
    let (har, anomalies) = HarReader::inspect::<E>(content)?;
    let validation_error = HarReader::validate(&har).err().map(|e| e.to_string());

    Ok(CheckReport {
        file_name: String::new(),
        total_entries: har.log.entries.len(),
        anomalies: anomalies
            .into_iter()
            .map(|a| Finding {
                path: a.path,
                message: a.message,
            })
            .collect(),
        validation_error,
    })
}

pub fn execute(file: &Path, schema: Schema, strict: bool, format: OutputFormat) -> Result<()> {
    tracing::debug!("Checking HAR file: {}", file.display());

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let report = check_str(&content, schema, &file_name)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    if let Some(err) = &report.validation_error {
        bail!("{}: {}", report.file_name, err);
    }
    if strict && !report.anomalies.is_empty() {
        bail!(
            "{}: {} structural anomalies",
            report.file_name,
            report.anomalies.len()
        );
    }

    Ok(())
}

fn output_pretty(report: &CheckReport) {
    use console::style;

    println!("\n{}", style(format!("Check: {}", report.file_name)).bold().cyan());
    println!("  Entries:   {}", style(report.total_entries).yellow());

    if report.is_clean() {
        println!("  {}", style("No problems found").green());
        println!();
        return;
    }

    if !report.anomalies.is_empty() {
        println!(
            "\n{} ({})",
            style("Anomalies").bold(),
            style("defaults substituted").dim()
        );
        for finding in &report.anomalies {
            println!("  {}  {}", style(&finding.path).yellow(), finding.message);
        }
    }

    if let Some(err) = &report.validation_error {
        println!("\n{}", style("Validation").bold());
        println!("  {}", style(err).red());
    }

    println!();
}

fn output_table(report: &CheckReport) {
    println!("Path,Message");
    for finding in &report.anomalies {
        println!("{},{}", finding.path, finding.message);
    }
    if let Some(err) = &report.validation_error {
        println!("<validation>,{}", err);
    }
}
