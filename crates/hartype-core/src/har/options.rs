use std::str::FromStr;

/// Environment variable that overrides the default [`ValidationMode`].
pub const VALIDATION_ENV: &str = "HARTYPE_VALIDATION";

/// What to do with structural anomalies found while parsing.
///
/// Parsing always completes with safe defaults. The mode only decides whether
/// the reader then rejects a document that needed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Log anomalies and return the defaulted tree.
    Lenient,
    /// Fail with [`crate::Error::Anomalies`] if any anomaly was recorded.
    Strict,
}

impl ValidationMode {
    /// Mode from `HARTYPE_VALIDATION`, falling back to the build profile:
    /// strict with debug assertions, lenient otherwise.
    pub fn from_env() -> Self {
        Self::resolve(std::env::var(VALIDATION_ENV).ok().as_deref())
    }

    /// An unset or unreadable setting falls back to the build default.
    fn resolve(setting: Option<&str>) -> Self {
        setting
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(Self::build_default)
    }

    fn build_default() -> Self {
        if cfg!(debug_assertions) {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Lenient => "lenient",
            ValidationMode::Strict => "strict",
        }
    }
}

impl Default for ValidationMode {
    fn default() -> Self {
        Self::from_env()
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(format!("unknown validation mode: {}", other)),
        }
    }
}

/// Options for reading HAR documents
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub validation: ValidationMode,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self::new().with_validation(ValidationMode::Lenient)
    }

    pub fn strict() -> Self {
        Self::new().with_validation(ValidationMode::Strict)
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }
}

/// Options for writing HAR documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit every optional field, as `null` when unset
    pub include_nulls: bool,
    /// Indent the output
    pub pretty: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_nulls(mut self, include_nulls: bool) -> Self {
        self.include_nulls = include_nulls;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            include_nulls: false,
            pretty: true,
        }
    }
}
