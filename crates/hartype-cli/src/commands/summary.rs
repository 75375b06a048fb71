use crate::{OutputFormat, Schema};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use hartype_core::har::devtools::DevToolsEntry;
use hartype_core::har::{Entry, Har, HarEntry, HarObject, HarReader, JsonObject};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Quick summary of a HAR file
#[derive(Debug, Clone, serde::Serialize)]
pub struct HarSummary {
    pub file_name: String,
    pub version: String,
    pub creator: String,
    pub browser: Option<String>,
    pub total_pages: usize,
    pub total_entries: usize,
    pub time_range: Option<TimeRange>,
    pub total_time_ms: f64,
    pub status_classes: BTreeMap<String, usize>,
    pub resource_types: BTreeMap<String, usize>,
    /// Top-level keys the model does not know, per object level
    pub vendor_fields: Vec<String>,
    pub anomalies: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
    pub duration_display: String,
}

/// Build a summary from a parsed archive
pub fn summarize<E: HarEntry>(har: &Har<E>, file_name: &str, anomalies: usize) -> HarSummary {
    let log = &har.log;

    let mut status_classes: BTreeMap<String, usize> = BTreeMap::new();
    let mut resource_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut first: Option<DateTime<FixedOffset>> = None;
    let mut last: Option<DateTime<FixedOffset>> = None;
    let mut total_time_ms = 0.0;

    for entry in &log.entries {
        *status_classes.entry(status_class(entry.status())).or_insert(0) += 1;

        if let Some(kind) = entry.resource_type() {
            *resource_types.entry(kind.to_string()).or_insert(0) += 1;
        }

        let started = entry.started_date_time().value();
        if first.is_none_or(|f| started < f) {
            first = Some(started);
        }
        if last.is_none_or(|l| started > l) {
            last = Some(started);
        }

        if entry.time() > 0.0 {
            total_time_ms += entry.time();
        }
    }

    let time_range = first.zip(last).map(|(start, end)| TimeRange {
        start: start.to_rfc3339(),
        end: end.to_rfc3339(),
        duration_display: format_duration(start, end),
    });

    let mut vendor_fields = Vec::new();
    collect_vendor_fields("", &har.custom, &mut vendor_fields);
    collect_vendor_fields("log.", &log.custom, &mut vendor_fields);
    for entry in &log.entries {
        collect_vendor_fields("log.entries[].", HarObject::custom(entry), &mut vendor_fields);
    }
    vendor_fields.sort();
    vendor_fields.dedup();

    HarSummary {
        file_name: file_name.to_string(),
        version: log.version.clone(),
        creator: format!("{} {}", log.creator.name, log.creator.version)
            .trim()
            .to_string(),
        browser: log
            .browser
            .as_ref()
            .map(|b| format!("{} {}", b.name, b.version).trim().to_string()),
        total_pages: log.pages.as_ref().map_or(0, Vec::len),
        total_entries: log.entries.len(),
        time_range,
        total_time_ms,
        status_classes,
        resource_types,
        vendor_fields,
        anomalies,
    }
}

fn collect_vendor_fields(prefix: &str, custom: &JsonObject, out: &mut Vec<String>) {
    out.extend(custom.keys().map(|k| format!("{prefix}{k}")));
}

fn status_class(status: i64) -> String {
    match status {
        100..=599 => format!("{}xx", status / 100),
        _ => "other".to_string(),
    }
}

/// Format duration for display
fn format_duration(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> String {
    let secs = end.signed_duration_since(start).num_seconds();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

pub fn execute(file: &Path, schema: Schema, format: OutputFormat) -> Result<()> {
    tracing::debug!("Summarizing HAR file: {}", file.display());

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let summary = match schema {
        Schema::Har => {
            let (har, anomalies) = HarReader::inspect::<Entry>(&content)?;
            summarize(&har, &file_name, anomalies.len())
        }
        Schema::DevTools => {
            let (har, anomalies) = HarReader::inspect::<DevToolsEntry>(&content)?;
            summarize(&har, &file_name, anomalies.len())
        }
    };

    match format {
        OutputFormat::Json => output_json(&summary)?,
        OutputFormat::Table => output_table(&summary),
        OutputFormat::Pretty => output_pretty(&summary),
    }

    Ok(())
}

fn output_pretty(summary: &HarSummary) {
    use console::style;

    println!(
        "\n{}",
        style(format!("HAR Summary: {}", summary.file_name))
            .bold()
            .cyan()
    );
    println!();

    println!("{}", style("Overview").bold());
    println!("  Version:      {}", summary.version);
    println!("  Creator:      {}", style(&summary.creator).green());
    if let Some(ref browser) = summary.browser {
        println!("  Browser:      {}", browser);
    }
    println!("  Pages:        {}", summary.total_pages);
    println!(
        "  Entries:      {} requests",
        style(summary.total_entries).yellow()
    );

    if let Some(ref tr) = summary.time_range {
        let start_display = tr.start.split('T').next().unwrap_or(&tr.start);
        let end_display = tr.end.split('T').next().unwrap_or(&tr.end);
        println!(
            "  Time Range:   {} to {} ({})",
            start_display, end_display, tr.duration_display
        );
    }
    println!("  Total Time:   {:.0} ms", summary.total_time_ms);

    if !summary.status_classes.is_empty() {
        println!("\n{}", style("Responses").bold());
        for (class, count) in &summary.status_classes {
            println!("  {:<12}  {}", class, count);
        }
    }

    if !summary.resource_types.is_empty() {
        println!("\n{}", style("Resource Types").bold());
        for (kind, count) in &summary.resource_types {
            println!("  {:<12}  {}", kind, count);
        }
    }

    if !summary.vendor_fields.is_empty() {
        println!("\n{}", style("Vendor Fields").bold());
        for field in &summary.vendor_fields {
            println!("  {}", style(field).dim());
        }
    }

    if summary.anomalies > 0 {
        println!(
            "\n{} {} (run {} for details)",
            style("Anomalies:").yellow(),
            summary.anomalies,
            style("hartype check").cyan()
        );
    }

    println!();
}

fn output_json(summary: &HarSummary) -> Result<()> {
    let json_str = serde_json::to_string_pretty(summary)?;
    println!("{}", json_str);
    Ok(())
}

fn output_table(summary: &HarSummary) {
    println!("Metric,Value");
    println!("File,{}", summary.file_name);
    println!("Version,{}", summary.version);
    println!("Creator,{}", summary.creator);
    println!("Pages,{}", summary.total_pages);
    println!("Total Entries,{}", summary.total_entries);

    if let Some(ref tr) = summary.time_range {
        println!("Time Range Start,{}", tr.start);
        println!("Time Range End,{}", tr.end);
        println!("Duration,{}", tr.duration_display);
    }

    println!("Total Time (ms),{:.0}", summary.total_time_ms);
    for (class, count) in &summary.status_classes {
        println!("Status {},{}", class, count);
    }
    for (kind, count) in &summary.resource_types {
        println!("Resource {},{}", kind, count);
    }
    println!("Anomalies,{}", summary.anomalies);
}
