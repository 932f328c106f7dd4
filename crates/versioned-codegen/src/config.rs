//! Generator configuration

use std::fmt;

/// How a failed accessibility check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// Breaks the build
    #[default]
    Error,

    /// Reported, build continues
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Settings shared by every candidate in a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Prefix prepended to the record name to form the companion name
    pub prefix: String,

    /// Path to the runtime crate as seen from generated code
    pub runtime: syn::Path,

    /// Attribute name that marks records for build-time generation
    pub marker: String,

    /// Severity of inaccessible-type diagnostics
    pub severity: Severity,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: "V_".to_string(),
            runtime: syn::parse_quote!(::versioned),
            marker: "record".to_string(),
            severity: Severity::Error,
        }
    }
}

impl GeneratorConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different companion name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Point generated code at a different runtime path.
    pub fn with_runtime(mut self, runtime: syn::Path) -> Self {
        self.runtime = runtime;
        self
    }

    /// Recognize a different marker attribute.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Report inaccessible records with the given severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Companion type name for a record.
    pub fn companion_name(&self, record: &str) -> String {
        format!("{}{}", self.prefix, record)
    }
}
