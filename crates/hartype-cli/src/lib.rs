use clap::ValueEnum;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
        }
    }
}

/// Which HAR schema to read a file with
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Schema {
    /// Plain HAR 1.2
    #[default]
    Har,
    /// HAR 1.2 with browser DevTools fields
    DevTools,
}

impl Schema {
    pub fn from_flag(devtools: bool) -> Self {
        if devtools { Schema::DevTools } else { Schema::Har }
    }
}
