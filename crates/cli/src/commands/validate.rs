use site_kit_validator::validate_site;
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating site at: {}", path.display());

    let report = validate_site(&path);

    for line in &report.info {
        println!("✓ {}", line);
    }
    for line in &report.warnings {
        println!("⚠ {}", line);
    }
    for line in &report.errors {
        println!("✗ {}", line);
    }

    println!(
        "\n{} error(s), {} warning(s)",
        report.errors.len(),
        report.warnings.len()
    );

    if !report.is_ok() {
        anyhow::bail!("Validation failed");
    }

    Ok(())
}
