use super::entity::{Anomaly, HarObject, ParseContext};
use super::options::{ParseOptions, ValidationMode};
use super::types::{Har, HarEntry};
use crate::{Error, Result};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct HarReader;

impl HarReader {
    /// Read and parse a HAR file from the given path
    pub fn from_file<E: HarObject>(path: &Path) -> Result<Har<E>> {
        Self::from_file_with(path, &ParseOptions::default())
    }

    pub fn from_file_with<E: HarObject>(path: &Path, options: &ParseOptions) -> Result<Har<E>> {
        tracing::debug!("Reading HAR file from: {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let value: Value = serde_json::from_reader(reader)?;
        let har: Har<E> = Self::from_value_with(&value, options)?;

        tracing::info!(
            "Successfully parsed HAR file with {} entries",
            har.log.entries.len()
        );

        Ok(har)
    }

    /// Parse a HAR file from a JSON string
    pub fn from_str<E: HarObject>(content: &str) -> Result<Har<E>> {
        Self::from_str_with(content, &ParseOptions::default())
    }

    pub fn from_str_with<E: HarObject>(content: &str, options: &ParseOptions) -> Result<Har<E>> {
        tracing::debug!("Parsing HAR from string");

        let value: Value = serde_json::from_str(content)?;
        let har: Har<E> = Self::from_value_with(&value, options)?;

        tracing::info!(
            "Successfully parsed HAR from string with {} entries",
            har.log.entries.len()
        );

        Ok(har)
    }

    /// Build a HAR tree from an already decoded JSON value.
    ///
    /// In strict mode any anomaly fails the whole document; in lenient mode
    /// the defaulted tree is returned.
    pub fn from_value_with<E: HarObject>(value: &Value, options: &ParseOptions) -> Result<Har<E>> {
        let (har, anomalies) = Self::parse_value(value, options.validation);

        if anomalies.is_empty() {
            return Ok(har);
        }

        match options.validation {
            ValidationMode::Strict => Err(Error::Anomalies(anomalies)),
            ValidationMode::Lenient => {
                tracing::debug!(
                    "Replaced {} malformed HAR fields with defaults",
                    anomalies.len()
                );
                Ok(har)
            }
        }
    }

    /// Parse leniently and hand back every anomaly alongside the tree.
    ///
    /// Only text that is not JSON at all fails.
    pub fn inspect<E: HarObject>(content: &str) -> Result<(Har<E>, Vec<Anomaly>)> {
        tracing::debug!("Inspecting HAR from string");

        let value: Value = serde_json::from_str(content)?;
        Ok(Self::parse_value(&value, ValidationMode::Lenient))
    }

    fn parse_value<E: HarObject>(value: &Value, mode: ValidationMode) -> (Har<E>, Vec<Anomaly>) {
        let mut cx = ParseContext::new(mode);
        let har = Har::from_value(value, &mut cx);
        (har, cx.into_anomalies())
    }

    /// Validate that a HAR structure is well-formed
    pub fn validate<E: HarEntry>(har: &Har<E>) -> Result<()> {
        tracing::debug!("Validating HAR structure");

        // Check version
        if har.log.version.is_empty() {
            return Err(Error::InvalidStructure("Missing HAR version".to_string()));
        }

        // Check for at least one entry
        if har.log.entries.is_empty() {
            tracing::warn!("HAR file contains no entries");
        }

        // Basic validation of entries
        for (idx, entry) in har.log.entries.iter().enumerate() {
            if entry.method().is_empty() {
                return Err(Error::InvalidStructure(format!(
                    "Entry {} has empty request method",
                    idx
                )));
            }
            if entry.url().is_empty() {
                return Err(Error::InvalidStructure(format!(
                    "Entry {} has empty request URL",
                    idx
                )));
            }
            if let Some(page_ref) = entry.page_ref()
                && har.log.page(page_ref).is_none()
            {
                return Err(Error::InvalidStructure(format!(
                    "Entry {} references unknown page {}",
                    idx, page_ref
                )));
            }
        }

        tracing::debug!("HAR structure is valid");
        Ok(())
    }
}
