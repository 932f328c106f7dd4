use versioned_codegen::{build, GeneratorConfig};

fn main() -> anyhow::Result<()> {
    build::generate(
        GeneratorConfig::default(),
        &[("src/inventory.rs", "crate::inventory")],
    )?;
    Ok(())
}
