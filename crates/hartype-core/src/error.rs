use crate::har::Anomaly;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read HAR file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse HAR file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid HAR structure: {0}")]
    InvalidStructure(String),

    #[error("HAR document has {} structural anomalies (first: {})", .0.len(), first_anomaly(.0))]
    Anomalies(Vec<Anomaly>),
}

fn first_anomaly(anomalies: &[Anomaly]) -> String {
    anomalies
        .first()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "none".to_string())
}

pub type Result<T> = std::result::Result<T, Error>;
