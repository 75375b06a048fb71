use super::entity::HarObject;
use super::options::WriteOptions;
use super::types::Har;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct HarWriter;

impl HarWriter {
    /// Write a HAR structure to a file
    pub fn to_file<E: HarObject>(har: &Har<E>, path: &Path) -> Result<()> {
        Self::to_file_with(har, path, &WriteOptions::default())
    }

    pub fn to_file_with<E: HarObject>(
        har: &Har<E>,
        path: &Path,
        options: &WriteOptions,
    ) -> Result<()> {
        tracing::debug!("Writing HAR file to: {}", path.display());

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let json = har.to_value(options.include_nulls);
        if options.pretty {
            serde_json::to_writer_pretty(&mut writer, &json)?;
        } else {
            serde_json::to_writer(&mut writer, &json)?;
        }
        writer.flush()?;

        tracing::info!(
            "Successfully wrote HAR file with {} entries to {}",
            har.log.entries.len(),
            path.display()
        );

        Ok(())
    }

    /// Convert a HAR structure to a JSON string
    pub fn to_string<E: HarObject>(har: &Har<E>) -> Result<String> {
        Self::to_string_with(har, &WriteOptions::default())
    }

    /// Convert a HAR structure to a compact JSON string
    pub fn to_string_compact<E: HarObject>(har: &Har<E>) -> Result<String> {
        Self::to_string_with(har, &WriteOptions::default().with_pretty(false))
    }

    pub fn to_string_with<E: HarObject>(har: &Har<E>, options: &WriteOptions) -> Result<String> {
        tracing::debug!(
            "Converting HAR to string (include_nulls={}, pretty={})",
            options.include_nulls,
            options.pretty
        );

        let value = har.to_value(options.include_nulls);
        let json = if options.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };

        tracing::info!("Successfully converted HAR to string");

        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::{Creator, HarReader, Log, ParseOptions};
    use tempfile::TempDir;

    fn sample() -> Har {
        Har::new(Log::new(Creator::new("test", "1.0"), vec![]))
    }

    #[test]
    fn test_har_to_string() {
        let result = HarWriter::to_string(&sample());
        assert!(result.is_ok());

        let json = result.unwrap();
        assert!(json.contains("\"version\": \"1.2\""));
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_har_to_string_compact_with_nulls() {
        let options = WriteOptions::new().with_pretty(false).with_include_nulls(true);
        let json = HarWriter::to_string_with(&sample(), &options).unwrap();

        assert!(json.starts_with(r#"{"log":{"version":"1.2","creator":{"name":"test","version":"1.0","comment":null},"browser":null,"pages":null,"entries":[]"#));
        assert!(json.ends_with(r#""comment":null}"#));
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.har");

        let har = sample();
        HarWriter::to_file(&har, &path).unwrap();
        let read: Har = HarReader::from_file_with(&path, &ParseOptions::strict()).unwrap();

        assert_eq!(read, har);
    }
}
