//! Batch generation over many candidates
//!
//! A [`Generator`] runs every candidate independently: a candidate that fails
//! validation turns into a [`Diagnostic`] and is skipped, while the others
//! still produce their companions. Nothing is emitted for a failed candidate.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{GeneratorConfig, Severity};
use crate::descriptor::ValueRecordDescriptor;
use crate::discover;
use crate::emit::{self, GeneratedSource};
use crate::error::{FailureKind, SourceError, ValidationFailure};

/// File name of the index module written next to the companion units.
pub const INDEX_FILE: &str = "versioned.rs";

/// A build-time message about one skipped candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable code (`VR0001`, `VR0002`)
    pub code: &'static str,

    /// Whether the build should fail
    pub severity: Severity,

    /// Record the diagnostic is about
    pub subject: String,

    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic for a validation failure under `config`.
    ///
    /// Only inaccessible types honor the configured severity; an invalid
    /// descriptor would produce uncompilable code and is always an error.
    pub fn from_failure(failure: &ValidationFailure, config: &GeneratorConfig) -> Self {
        let severity = match failure.kind() {
            FailureKind::InaccessibleType => config.severity,
            FailureKind::InvalidDescriptor => Severity::Error,
        };
        Self {
            severity,
            ..Self::error(failure)
        }
    }

    /// Error-severity diagnostic for a validation failure.
    pub fn error(failure: &ValidationFailure) -> Self {
        Self {
            code: failure.kind().code(),
            severity: Severity::Error,
            subject: failure.subject().to_string(),
            message: failure.to_string(),
        }
    }

    /// Diagnostic for a marked item lookup could not describe.
    pub fn from_source_error(subject: impl Into<String>, error: &SourceError) -> Self {
        Self {
            code: FailureKind::InvalidDescriptor.code(),
            severity: Severity::Error,
            subject: subject.into(),
            message: error.to_string(),
        }
    }

    /// Whether this diagnostic should fail the build.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// Outcome of a batch run: one output per valid candidate, one diagnostic
/// per skipped candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Generated companions, in candidate order
    pub outputs: Vec<GeneratedSource>,

    /// Diagnostics, in candidate order
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Add a unit unless its module or companion name is already taken.
    ///
    /// Units share one output directory and one index, so the later of two
    /// clashing units is dropped and reported as an invalid descriptor.
    pub fn push(&mut self, output: GeneratedSource) {
        let index_stem = INDEX_FILE.trim_end_matches(".rs");
        let clash = if output.module == index_stem {
            Some(format!("module `{}` would overwrite the index file", output.module))
        } else {
            self.outputs
                .iter()
                .find(|o| o.module == output.module || o.companion == output.companion)
                .map(|earlier| {
                    format!(
                        "companion `{}` in module `{}` is already generated for `{}`",
                        output.companion, output.module, earlier.path
                    )
                })
        };

        match clash {
            Some(reason) => {
                let failure = ValidationFailure::invalid(&output.path, reason);
                let diagnostic = Diagnostic::error(&failure);
                log::warn!("skipping `{}`: {}", output.path, diagnostic);
                self.diagnostics.push(diagnostic);
            }
            None => self.outputs.push(output),
        }
    }

    /// Append another report's outputs and diagnostics.
    pub fn merge(&mut self, other: Report) {
        for output in other.outputs {
            self.push(output);
        }
        self.diagnostics.extend(other.diagnostics);
    }

    /// Source of the index module.
    ///
    /// Each companion gets its own module whose body is the generated unit,
    /// and is re-exported by name:
    ///
    /// ```text
    /// pub mod v_stock { include!("v_stock.rs"); }
    /// pub use v_stock::V_Stock;
    /// ```
    pub fn index_source(&self) -> String {
        let mut index = String::from("// @generated by versioned-codegen. Do not edit.\n");
        for output in &self.outputs {
            index.push_str(&format!(
                "\npub mod {module} {{\n    include!(\"{file}\");\n}}\npub use {module}::{companion};\n",
                module = output.module,
                file = output.file_name(),
                companion = output.companion,
            ));
        }
        index
    }

    /// Write every unit plus the index module into `dir`.
    ///
    /// Returns the paths written, index last.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Io` if the directory cannot be created or a
    /// file cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        fs::create_dir_all(dir).map_err(|e| SourceError::io(dir, e))?;

        let mut written = Vec::with_capacity(self.outputs.len() + 1);
        for output in &self.outputs {
            let path = dir.join(output.file_name());
            write_if_changed(&path, &output.source)?;
            written.push(path);
        }

        let index = dir.join(INDEX_FILE);
        write_if_changed(&index, &self.index_source())?;
        written.push(index);
        Ok(written)
    }
}

/// Skip rewriting identical files so downstream mtimes stay put.
fn write_if_changed(path: &Path, contents: &str) -> Result<(), SourceError> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
        return Ok(());
    }
    fs::write(path, contents).map_err(|e| SourceError::io(path, e))
}

/// Runs generation over batches of candidates.
///
/// # Example
///
/// ```
/// use versioned_codegen::Generator;
///
/// let source = r#"
///     #[versioned::record]
///     #[derive(Clone, Copy)]
///     pub struct Stock { pub quantity: i32 }
///
///     #[versioned::record]
///     pub(crate) struct Hidden { pub x: u8 }
/// "#;
///
/// let report = Generator::default().generate_source(source, "crate").unwrap();
/// assert_eq!(report.outputs.len(), 1);
/// assert_eq!(report.diagnostics.len(), 1);
/// assert_eq!(report.diagnostics[0].code, "VR0001");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one companion.
    pub fn generate(
        &self,
        descriptor: &ValueRecordDescriptor,
    ) -> Result<GeneratedSource, ValidationFailure> {
        emit::generate_with(descriptor, &self.config)
    }

    /// Generate every descriptor, collecting failures as diagnostics.
    pub fn generate_all<'d, I>(&self, descriptors: I) -> Report
    where
        I: IntoIterator<Item = &'d ValueRecordDescriptor>,
    {
        let mut report = Report::new();
        for descriptor in descriptors {
            match self.generate(descriptor) {
                Ok(output) => report.push(output),
                Err(failure) => {
                    let diagnostic = Diagnostic::from_failure(&failure, &self.config);
                    log::warn!("skipping `{}`: {}", descriptor.name, diagnostic);
                    report.diagnostics.push(diagnostic);
                }
            }
        }
        report
    }

    /// Discover, describe, and generate every marked record in `source`.
    ///
    /// `namespace` is the module path the source file is mounted at.
    /// Records lookup cannot describe become diagnostics like any other
    /// failed candidate.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Parse` if `source` is not valid Rust.
    pub fn generate_source(&self, source: &str, namespace: &str) -> Result<Report, SourceError> {
        let candidates = discover::discover_source(source, &self.config.marker)?;

        let mut report = Report::new();
        let mut descriptors = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match discover::resolve(candidate, Some(namespace)) {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(error) => {
                    let diagnostic = Diagnostic::from_source_error(candidate.name(), &error);
                    log::warn!("skipping `{}`: {}", candidate.name(), diagnostic);
                    report.diagnostics.push(diagnostic);
                }
            }
        }
        report.merge(self.generate_all(&descriptors));
        Ok(report)
    }

    /// [`generate_source`](Generator::generate_source) over a file on disk.
    pub fn generate_file(&self, path: &Path, namespace: &str) -> Result<Report, SourceError> {
        let source = fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
        self.generate_source(&source, namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Accessibility, Member, Scope};
    use pretty_assertions::assert_eq;

    fn public(name: &str) -> ValueRecordDescriptor {
        ValueRecordDescriptor::new(name).with_member(Member::field("x", "u8"))
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let descriptors = vec![
            public("A"),
            public("B").with_accessibility(Accessibility::Internal),
            public("C"),
        ];
        let report = Generator::default().generate_all(&descriptors);

        let generated: Vec<_> = report.outputs.iter().map(|o| o.record.as_str()).collect();
        assert_eq!(generated, vec!["A", "C"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].subject, "B");
        assert!(report.has_errors());
    }

    #[test]
    fn test_warning_severity_is_advisory() {
        let config = GeneratorConfig::new().with_severity(Severity::Warning);
        let descriptors = vec![public("B").with_accessibility(Accessibility::Private)];
        let report = Generator::new(config).generate_all(&descriptors);

        assert_eq!(report.diagnostics[0].severity, Severity::Warning);
        assert!(!report.has_errors());
        assert!(report.outputs.is_empty());
    }

    #[test]
    fn test_invalid_descriptor_is_always_error() {
        let config = GeneratorConfig::new().with_severity(Severity::Warning);
        let descriptors = vec![public("A").with_member(Member::field("version", "u64"))];
        let report = Generator::new(config).generate_all(&descriptors);
        assert_eq!(report.diagnostics[0].code, "VR0002");
        assert!(report.has_errors());
    }

    #[test]
    fn test_diagnostic_display() {
        let failure = ValidationFailure::InaccessibleType {
            subject: "Stock".to_string(),
        };
        let diagnostic = Diagnostic::from_failure(&failure, &GeneratorConfig::default());
        assert_eq!(
            diagnostic.to_string(),
            "error[VR0001]: type `Stock` is not reachable from generated code; the record and every enclosing module must be `pub`"
        );
    }

    #[test]
    fn test_generic_record_becomes_diagnostic() {
        let source = r#"
            #[record]
            pub struct Pair<T> { pub a: T }

            #[record]
            pub struct Solo { pub a: u8 }
        "#;
        let report = Generator::default().generate_source(source, "crate").unwrap();
        assert_eq!(report.outputs.len(), 1);
        assert_eq!(report.outputs[0].record, "Solo");
        assert_eq!(report.diagnostics[0].subject, "Pair");
    }

    #[test]
    fn test_index_source_lists_units() {
        let descriptors = vec![public("Stock")];
        let report = Generator::default().generate_all(&descriptors);
        assert_eq!(
            report.index_source(),
            "// @generated by versioned-codegen. Do not edit.\n\
             \npub mod v_stock {\n    include!(\"v_stock.rs\");\n}\npub use v_stock::V_Stock;\n"
        );
    }

    #[test]
    fn test_same_name_in_two_modules_keeps_the_first() {
        let descriptors = vec![
            public("Bin").with_scope(Scope::new("a", Accessibility::Public)),
            public("Bin").with_scope(Scope::new("b", Accessibility::Public)),
            public("Crate"),
        ];
        let report = Generator::default().generate_all(&descriptors);

        let generated: Vec<_> = report.outputs.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(generated, vec!["a::Bin", "Crate"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].code, "VR0002");
        assert_eq!(report.diagnostics[0].subject, "b::Bin");
        assert!(report.diagnostics[0].message.contains("`a::Bin`"));
        assert_eq!(report.index_source().matches("pub mod v_bin").count(), 1);
    }

    #[test]
    fn test_merge_checks_clashes_across_reports() {
        let generator = Generator::default();
        let mut report = generator.generate_all(&[public("Bin").with_namespace("crate::a")]);
        report.merge(generator.generate_all(&[public("Bin").with_namespace("crate::b")]));

        assert_eq!(report.outputs.len(), 1);
        assert_eq!(report.diagnostics[0].subject, "crate::b::Bin");
        assert!(report.has_errors());
    }

    #[test]
    fn test_module_named_like_index_is_rejected() {
        let config = GeneratorConfig::new().with_prefix("");
        let report = Generator::new(config).generate_all(&[public("Versioned")]);
        assert!(report.outputs.is_empty());
        assert!(report.diagnostics[0].message.contains("overwrite the index file"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Generator::default()
            .generate_source("pub struct {", "crate")
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
