mod date;
pub mod devtools;
mod entity;
pub mod json;
mod options;
mod reader;
mod types;
mod writer;

pub use date::HarDate;
pub use entity::{Anomaly, FieldReader, HarEnum, HarObject, JsonWriter, ParseContext};
pub use json::JsonObject;
pub use options::{ParseOptions, ValidationMode, WriteOptions, VALIDATION_ENV};
pub use reader::HarReader;
pub use types::*;
pub use writer::HarWriter;

/// Parse a HAR 1.2 document with the default [`ParseOptions`].
pub fn parse(text: &str) -> crate::Result<Har> {
    HarReader::from_str(text)
}
