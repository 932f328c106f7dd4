//! Build-script integration
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> anyhow::Result<()> {
//!     versioned_codegen::build::generate(
//!         versioned_codegen::GeneratorConfig::default(),
//!         &[("src/inventory.rs", "crate::inventory")],
//!     )?;
//!     Ok(())
//! }
//!
//! // src/lib.rs
//! pub mod generated {
//!     include!(concat!(env!("OUT_DIR"), "/versioned/versioned.rs"));
//! }
//! ```

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::config::GeneratorConfig;
use crate::generator::{Generator, Report};

/// Subdirectory of `OUT_DIR` the units are written to.
pub const OUT_SUBDIR: &str = "versioned";

/// Generate companions for `inputs` (source file, module path) into
/// `$OUT_DIR/versioned`, talking to cargo through stdout.
///
/// # Errors
///
/// Fails if `OUT_DIR` is unset, an input cannot be read or parsed, an
/// output cannot be written, or any diagnostic has error severity.
pub fn generate<P: AsRef<Path>>(
    config: GeneratorConfig,
    inputs: &[(P, &str)],
) -> anyhow::Result<Report> {
    let out_dir = env::var_os("OUT_DIR").context("OUT_DIR is not set; call this from build.rs")?;
    let dir = PathBuf::from(out_dir).join(OUT_SUBDIR);

    for (path, _) in inputs {
        println!("cargo:rerun-if-changed={}", path.as_ref().display());
    }

    let report = generate_into(config, inputs, &dir)?;
    for diagnostic in report.diagnostics.iter().filter(|d| !d.is_error()) {
        println!("cargo:warning={}", diagnostic);
    }
    if report.has_errors() {
        let errors: Vec<String> = report
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.to_string())
            .collect();
        bail!("companion generation failed:\n{}", errors.join("\n"));
    }
    Ok(report)
}

/// Generate companions for `inputs` into `dir`, without touching cargo.
///
/// Units are written even when some candidates fail; the caller decides
/// what the diagnostics mean.
pub fn generate_into<P: AsRef<Path>>(
    config: GeneratorConfig,
    inputs: &[(P, &str)],
    dir: &Path,
) -> anyhow::Result<Report> {
    let generator = Generator::new(config);
    let mut report = Report::new();
    for (path, namespace) in inputs {
        let path = path.as_ref();
        let file_report = generator
            .generate_file(path, namespace)
            .with_context(|| format!("generating companions for {}", path.display()))?;
        report.merge(file_report);
    }
    report
        .write_to(dir)
        .with_context(|| format!("writing companions to {}", dir.display()))?;
    Ok(report)
}
