use crate::Schema;
use anyhow::Result;
use hartype_core::har::devtools::DevToolsEntry;
use hartype_core::har::{Entry, HarObject, HarReader, HarWriter, ParseOptions, WriteOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub fn execute(
    file: &Path,
    schema: Schema,
    include_nulls: bool,
    compact: bool,
    strict: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    tracing::debug!("Re-encoding HAR file: {}", file.display());

    let parse_options = if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::lenient()
    };
    let write_options = WriteOptions::new()
        .with_include_nulls(include_nulls)
        .with_pretty(!compact);

    match schema {
        Schema::Har => reformat::<Entry>(file, &parse_options, &write_options, output),
        Schema::DevTools => {
            reformat::<DevToolsEntry>(file, &parse_options, &write_options, output)
        }
    }
}

/// Parse `content` with the given schema and encode it again
pub fn render(
    content: &str,
    schema: Schema,
    parse_options: &ParseOptions,
    write_options: &WriteOptions,
) -> Result<String> {
    let json = match schema {
        Schema::Har => {
            let har = HarReader::from_str_with::<Entry>(content, parse_options)?;
            HarWriter::to_string_with(&har, write_options)?
        }
        Schema::DevTools => {
            let har = HarReader::from_str_with::<DevToolsEntry>(content, parse_options)?;
            HarWriter::to_string_with(&har, write_options)?
        }
    };
    Ok(json)
}

fn reformat<E: HarObject>(
    file: &Path,
    parse_options: &ParseOptions,
    write_options: &WriteOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    let har = HarReader::from_file_with::<E>(file, parse_options)?;

    // Write output (to file or stdout)
    if let Some(output_path) = output {
        tracing::debug!("Writing HAR to: {}", output_path.display());
        HarWriter::to_file_with(&har, &output_path, write_options)?;
    } else {
        tracing::debug!("Writing HAR to stdout");
        let json = HarWriter::to_string_with(&har, write_options)?;
        io::stdout().write_all(json.as_bytes())?;
        io::stdout().write_all(b"\n")?;
    }

    Ok(())
}
